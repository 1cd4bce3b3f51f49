//! Catalog vocabulary shared across the workspace.
//!
//! These enums mirror the AniList schema values and are serialized verbatim
//! (`ANIME`, `POPULARITY_DESC`, `FALL`, ...) so they can be dropped straight
//! into GraphQL variables.

use serde::{Deserialize, Serialize};

/// Catalog partition to query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anime" => Ok(MediaType::Anime),
            "manga" => Ok(MediaType::Manga),
            _ => Err(anyhow::anyhow!("Invalid media type: {}", s)),
        }
    }
}

/// Sort keys accepted by the media list query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSort {
    TrendingDesc,
    PopularityDesc,
    ScoreDesc,
    StartDateDesc,
    SearchMatch,
}

impl MediaSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSort::TrendingDesc => "TRENDING_DESC",
            MediaSort::PopularityDesc => "POPULARITY_DESC",
            MediaSort::ScoreDesc => "SCORE_DESC",
            MediaSort::StartDateDesc => "START_DATE_DESC",
            MediaSort::SearchMatch => "SEARCH_MATCH",
        }
    }
}

impl std::fmt::Display for MediaSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar quarter used to bucket release dates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl MediaSeason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSeason::Winter => "WINTER",
            MediaSeason::Spring => "SPRING",
            MediaSeason::Summer => "SUMMER",
            MediaSeason::Fall => "FALL",
        }
    }
}

impl std::fmt::Display for MediaSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A season pinned to a year, e.g. `FALL 2026`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SeasonYear {
    pub season: MediaSeason,
    pub year: i32,
}

impl SeasonYear {
    pub fn new(season: MediaSeason, year: i32) -> Self {
        Self { season, year }
    }
}

impl std::fmt::Display for SeasonYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_str() {
        assert_eq!("anime".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert_eq!("MANGA".parse::<MediaType>().unwrap(), MediaType::Manga);
        assert!("novel".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_enums_serialize_verbatim() {
        assert_eq!(
            serde_json::to_string(&MediaSort::PopularityDesc).unwrap(),
            "\"POPULARITY_DESC\""
        );
        assert_eq!(
            serde_json::to_string(&MediaSeason::Fall).unwrap(),
            "\"FALL\""
        );
        assert_eq!(
            serde_json::to_string(&MediaType::Anime).unwrap(),
            "\"ANIME\""
        );
    }

    #[test]
    fn test_season_year_display() {
        let value = SeasonYear::new(MediaSeason::Winter, 2027);
        assert_eq!(value.to_string(), "WINTER 2027");
    }
}
