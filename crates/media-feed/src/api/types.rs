//! AniList GraphQL payload types.
//!
//! These types represent the JSON envelope and the `Page` object returned by
//! the catalog API. A `MediaPage` is handed to the presentation layer as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

/// `data` object of a page query
#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: MediaPage,
}

/// One page of media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub media: Vec<Media>,
}

impl MediaPage {
    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: Option<u32>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub has_next_page: Option<bool>,
    pub per_page: Option<u32>,
}

/// Media entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub average_score: Option<u32>,
}

impl Media {
    /// Romaji title, then English, then native
    pub fn display_title(&self) -> Option<&str> {
        let title = self.title.as_ref()?;
        title
            .romaji
            .as_deref()
            .or(title.english.as_deref())
            .or(title.native.as_deref())
    }
}

/// Title variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// Cover image URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page_envelope() {
        let body = r##"{
            "data": {
                "Page": {
                    "pageInfo": { "total": 5000, "currentPage": 1, "lastPage": 500, "hasNextPage": true, "perPage": 10 },
                    "media": [
                        { "id": 1, "title": { "romaji": "Cowboy Bebop", "english": "Cowboy Bebop", "native": null } },
                        { "id": 2, "title": { "romaji": null, "english": null, "native": "ナルト" }, "coverImage": { "extraLarge": null, "large": "https://img/2.png", "medium": null, "color": "#e4a15d" } }
                    ]
                }
            }
        }"##;

        let response: GraphQlResponse<PageData> = serde_json::from_str(body).unwrap();
        assert!(response.errors.is_none());

        let page = response.data.unwrap().page;
        assert_eq!(page.len(), 2);
        assert_eq!(page.page_info.as_ref().unwrap().has_next_page, Some(true));
        assert_eq!(page.media[0].display_title(), Some("Cowboy Bebop"));
        assert_eq!(page.media[1].display_title(), Some("ナルト"));
        assert_eq!(
            page.media[1].cover_image.as_ref().unwrap().large.as_deref(),
            Some("https://img/2.png")
        );
        assert_eq!(
            page.media[1].cover_image.as_ref().unwrap().color.as_deref(),
            Some("#e4a15d")
        );
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = r#"{ "data": null, "errors": [ { "message": "Too Many Requests.", "status": 429 } ] }"#;

        let response: GraphQlResponse<PageData> = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());

        let errors = response.errors.unwrap();
        assert_eq!(errors[0].message, "Too Many Requests.");
        assert_eq!(errors[0].status, Some(429));
    }
}
