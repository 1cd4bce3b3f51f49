//! GraphQL query documents and the request values that fill them.

use crate::error::MediaError;
use serde_json::{json, Value};
use shared::{MediaSeason, MediaSort, MediaType, SeasonYear};

/// Page of media filtered by type and, optionally, by season
pub const MEDIA_LIST_QUERY: &str = r#"
query MediaList($type: MediaType, $page: Int, $perPage: Int, $sort: [MediaSort], $season: MediaSeason, $seasonYear: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo {
      total
      currentPage
      lastPage
      hasNextPage
      perPage
    }
    media(type: $type, sort: $sort, season: $season, seasonYear: $seasonYear) {
      id
      title {
        romaji
        english
        native
      }
      coverImage {
        extraLarge
        large
        medium
        color
      }
      bannerImage
      season
      seasonYear
      averageScore
    }
  }
}
"#;

/// Page of media matching a free-text search
pub const SEARCH_QUERY: &str = r#"
query Search($type: MediaType, $page: Int, $perPage: Int, $search: String, $sort: [MediaSort]) {
  Page(page: $page, perPage: $perPage) {
    pageInfo {
      total
      currentPage
      lastPage
      hasNextPage
      perPage
    }
    media(type: $type, search: $search, sort: $sort) {
      id
      title {
        romaji
        english
        native
      }
      coverImage {
        large
        medium
        color
      }
    }
  }
}
"#;

/// Parameters of one media list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaListRequest {
    pub media_type: MediaType,
    pub page: u32,
    pub per_page: u32,
    pub sort: Vec<MediaSort>,
    pub season: Option<MediaSeason>,
    pub season_year: Option<i32>,
}

impl MediaListRequest {
    /// Request without a season filter
    pub fn new(media_type: MediaType, page: u32, per_page: u32, sort: Vec<MediaSort>) -> Self {
        Self {
            media_type,
            page,
            per_page,
            sort,
            season: None,
            season_year: None,
        }
    }

    /// Restrict the request to one season of one year
    pub fn in_season(mut self, season: SeasonYear) -> Self {
        self.season = Some(season.season);
        self.season_year = Some(season.year);
        self
    }

    /// The season filter, if both halves are present
    pub fn season_filter(&self) -> Option<SeasonYear> {
        match (self.season, self.season_year) {
            (Some(season), Some(year)) => Some(SeasonYear::new(season, year)),
            _ => None,
        }
    }

    /// Reject parameter combinations the catalog would answer inconsistently
    pub fn validate(&self) -> Result<(), MediaError> {
        if self.per_page == 0 {
            return Err(MediaError::invalid("perPage must be greater than zero"));
        }
        if self.sort.is_empty() {
            return Err(MediaError::invalid("sort must name at least one key"));
        }
        match (self.season, self.season_year) {
            (Some(season), None) => Err(MediaError::invalid(format!(
                "season {} given without seasonYear",
                season
            ))),
            (None, Some(year)) => Err(MediaError::invalid(format!(
                "seasonYear {} given without season",
                year
            ))),
            _ => Ok(()),
        }
    }

    /// GraphQL variables for [`MEDIA_LIST_QUERY`]
    pub fn variables(&self) -> Value {
        let mut variables = json!({
            "type": self.media_type,
            "page": self.page,
            "perPage": self.per_page,
            "sort": self.sort,
        });
        if let Some(filter) = self.season_filter() {
            variables["season"] = json!(filter.season);
            variables["seasonYear"] = json!(filter.year);
        }
        variables
    }
}

/// Parameters of one catalog search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub media_type: MediaType,
    pub query: String,
    pub page: u32,
    pub per_page: u32,
    pub sort: Vec<MediaSort>,
}

impl SearchRequest {
    /// First page of best matches
    pub fn new(media_type: MediaType, query: impl Into<String>) -> Self {
        Self {
            media_type,
            query: query.into(),
            page: 0,
            per_page: 10,
            sort: vec![MediaSort::SearchMatch],
        }
    }

    pub fn validate(&self) -> Result<(), MediaError> {
        if self.query.trim().is_empty() {
            return Err(MediaError::invalid("search query is empty"));
        }
        if self.per_page == 0 {
            return Err(MediaError::invalid("perPage must be greater than zero"));
        }
        if self.sort.is_empty() {
            return Err(MediaError::invalid("sort must name at least one key"));
        }
        Ok(())
    }

    /// GraphQL variables for [`SEARCH_QUERY`]
    pub fn variables(&self) -> Value {
        json!({
            "type": self.media_type,
            "page": self.page,
            "perPage": self.per_page,
            "search": self.query.trim(),
            "sort": self.sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasonal_variables() {
        let request = MediaListRequest::new(
            MediaType::Anime,
            0,
            10,
            vec![MediaSort::PopularityDesc],
        )
        .in_season(SeasonYear::new(MediaSeason::Fall, 2026));

        assert!(request.validate().is_ok());
        assert_eq!(
            request.variables(),
            json!({
                "type": "ANIME",
                "page": 0,
                "perPage": 10,
                "sort": ["POPULARITY_DESC"],
                "season": "FALL",
                "seasonYear": 2026,
            })
        );
    }

    #[test]
    fn test_unfiltered_variables_omit_season() {
        let request = MediaListRequest::new(MediaType::Manga, 0, 10, vec![MediaSort::TrendingDesc]);
        let variables = request.variables();

        assert_eq!(variables["type"], "MANGA");
        assert!(variables.get("season").is_none());
        assert!(variables.get("seasonYear").is_none());
    }

    #[test]
    fn test_partial_season_is_rejected() {
        let mut request =
            MediaListRequest::new(MediaType::Anime, 0, 10, vec![MediaSort::PopularityDesc]);
        request.season = Some(MediaSeason::Spring);
        assert!(request.validate().unwrap_err().is_invalid_request());

        request.season = None;
        request.season_year = Some(2026);
        assert!(request.validate().unwrap_err().is_invalid_request());
    }

    #[test]
    fn test_empty_sort_and_zero_page_size_are_rejected() {
        let request = MediaListRequest::new(MediaType::Anime, 0, 10, vec![]);
        assert!(request.validate().is_err());

        let request = MediaListRequest::new(MediaType::Anime, 0, 0, vec![MediaSort::ScoreDesc]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_search_request() {
        let request = SearchRequest::new(MediaType::Anime, "  frieren ");
        assert!(request.validate().is_ok());
        assert_eq!(request.variables()["search"], "frieren");
        assert_eq!(request.variables()["sort"], json!(["SEARCH_MATCH"]));

        let blank = SearchRequest::new(MediaType::Anime, "   ");
        assert!(blank.validate().unwrap_err().is_invalid_request());
    }
}
