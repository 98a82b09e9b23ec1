//! Data models for scraped articles and the JSON bodies served to the dashboard.
//!
//! This module defines the structures shared by the scrapers and the HTTP API:
//! - [`Article`]: A normalized article card produced by the listing scraper
//! - [`ArticleDetail`]: The full-text fragment produced by the article extractor
//! - [`Listing`]: The listing scraper's result together with its provenance
//! - Response bodies: [`ListingResponse`], [`ArticleResponse`], [`ErrorResponse`]
//!
//! Field names serialize as camelCase (`imageUrl`) to match what the dashboard
//! front end reads.

use serde::{Deserialize, Serialize};

/// A normalized article card.
///
/// Cards are rebuilt from scratch on every request; nothing here is persisted.
/// The `id` is derived from the article link, so the same story always gets
/// the same id across requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Percent-encoded article link.
    pub id: String,
    /// Cleaned headline, at most 200 characters.
    pub title: String,
    /// Short description, at most 300 characters. Falls back to the title.
    pub summary: String,
    /// A pointer to the original article, or the extracted body text.
    pub content: String,
    /// Absolute URL of the lead image or a thematic fallback image.
    pub image_url: String,
    /// RFC 3339 timestamp.
    pub date: String,
    /// Provenance label of the scraped site.
    pub source: String,
}

/// The fields recovered from a single article page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub title: String,
    /// Body paragraphs separated by a blank line.
    pub content: String,
    pub image_url: String,
    pub date: String,
}

/// Where a set of listing cards came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    /// Scraped from the live site during this request.
    Live,
    /// The built-in fallback set, served because every live attempt failed.
    Fallback,
}

/// The listing scraper's result as seen by the API layer.
#[derive(Debug, Clone)]
pub struct Listing {
    pub articles: Vec<Article>,
    pub source: ListingSource,
}

/// Body of `GET /api/nasa`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ListingResponse {
    pub articles: Vec<Article>,
    /// Set only when the fallback set is served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of a successful `GET /api/article`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleDetail,
}

/// Body of every non-200 API response.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        Article {
            id: "https%3A%2F%2Fwww.space.com%2Fmars".to_string(),
            title: "Mars rover finds ancient lake bed".to_string(),
            summary: "Evidence of water".to_string(),
            content: "Read the full article at Space.com: https://www.space.com/mars".to_string(),
            image_url: "https://cdn.mos.cms.futurecdn.net/mars.jpg".to_string(),
            date: "2025-05-06T12:00:00.000Z".to_string(),
            source: "Space.com".to_string(),
        }
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_value(sample_article()).unwrap();
        assert_eq!(json["imageUrl"], "https://cdn.mos.cms.futurecdn.net/mars.jpg");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_listing_response_omits_missing_note() {
        let body = ListingResponse {
            articles: vec![sample_article()],
            note: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("note"));
    }

    #[test]
    fn test_listing_response_keeps_note() {
        let body = ListingResponse {
            articles: vec![],
            note: Some("degraded".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["note"], "degraded");
    }

    #[test]
    fn test_article_response_deserialization() {
        let json = r#"{
            "article": {
                "title": "Webb spots a galaxy merger",
                "content": "First paragraph.\n\nSecond paragraph.",
                "imageUrl": "/placeholder.svg",
                "date": "2025-05-06T12:00:00Z"
            }
        }"#;

        let body: ArticleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.article.title, "Webb spots a galaxy merger");
        assert_eq!(body.article.image_url, "/placeholder.svg");
    }

    #[test]
    fn test_listing_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ListingSource::Live).unwrap(), "\"live\"");
        assert_eq!(
            serde_json::to_string(&ListingSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
