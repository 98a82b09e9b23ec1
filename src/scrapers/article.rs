//! Article scraper: full text of a single story page.
//!
//! Each field is recovered with its own selector cascade, from the most
//! specific markup the site is known to use down to generic tags:
//!
//! | Field | First choice | Last resort |
//! |-------|--------------|-------------|
//! | title | `h1.article-name` | `h1` |
//! | body | `.article-body` | `.vanilla-body` |
//! | image | `.article-lead-image img` | `article img` |
//! | date | `time[datetime]` | `[data-testid="PublishDate"]` |
//!
//! A page yielding neither a title nor a body is an extraction failure; any
//! other missing field is filled with a generic placeholder.

use super::images::{PLACEHOLDER_IMAGE, lead_image};
use super::{Referral, Site, element_text, fetch_html, selector_table, static_selector};
use crate::error::ScrapeError;
use crate::models::ArticleDetail;
use crate::utils::{now_iso, truncate_for_log};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

/// A title must be longer than this many characters to be accepted.
const MIN_TITLE_CHARS: usize = 10;

/// Paragraphs this short or shorter are captions, bylines and the like.
const MIN_PARAGRAPH_CHARS: usize = 20;

pub const DEFAULT_TITLE: &str = "Article Title";
pub const DEFAULT_CONTENT: &str =
    "Article content could not be extracted. Please visit the original source.";

static TITLE_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    selector_table(&[
        "h1.article-name",
        "h1[data-testid=\"ArticleName\"]",
        ".article-header h1",
        "header h1",
        "h1",
    ])
});

static BODY_CONTAINERS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    selector_table(&[
        ".article-body",
        ".content-body",
        "[data-testid=\"BodyText\"]",
        ".article-content",
        ".entry-content",
        "article .text-copy",
        ".vanilla-body",
    ])
});

/// Subtrees removed from a body container before its text is read.
static NON_CONTENT: Lazy<Selector> = Lazy::new(|| {
    static_selector("script, .ad, .advertisement, .related, .social, .newsletter, .comments")
});

static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| static_selector("p, h2, h3, h4"));

static DATE_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    selector_table(&[
        "time[datetime]",
        ".publish-date",
        ".article-date",
        "[data-testid=\"PublishDate\"]",
    ])
});

fn extract_title(document: &Html) -> Option<String> {
    TITLE_SELECTORS
        .iter()
        .filter_map(|(_, selector)| document.select(selector).next())
        .map(element_text)
        .find(|title| title.chars().count() > MIN_TITLE_CHARS)
}

/// Body text of the first container that yields any paragraph.
///
/// Non-content subtrees of a container are detached from the document before
/// its paragraphs are collected.
fn extract_body(document: &mut Html) -> Option<String> {
    for (name, selector) in BODY_CONTAINERS.iter() {
        let Some(container_id) = document.select(selector).next().map(|el| el.id()) else {
            continue;
        };

        let noise: Vec<_> = document
            .tree
            .get(container_id)
            .and_then(ElementRef::wrap)
            .map(|container| container.select(&NON_CONTENT).map(|el| el.id()).collect::<Vec<_>>())
            .unwrap_or_default();
        for id in noise {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let Some(container) = document.tree.get(container_id).and_then(ElementRef::wrap) else {
            continue;
        };
        let paragraphs: Vec<String> = container
            .select(&PARAGRAPHS)
            .map(element_text)
            .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect();

        if !paragraphs.is_empty() {
            debug!(container = name, paragraphs = paragraphs.len(), "Extracted body");
            return Some(paragraphs.join("\n\n"));
        }
    }

    None
}

fn extract_date(document: &Html) -> Option<String> {
    DATE_SELECTORS
        .iter()
        .filter_map(|(_, selector)| document.select(selector).next())
        .map(|el| {
            el.value()
                .attr("datetime")
                .map(str::trim)
                .filter(|dt| !dt.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| element_text(el))
        })
        .find(|date| !date.is_empty())
}

/// Extract title, body, lead image and publish date from an article page.
///
/// # Arguments
///
/// * `html` - The raw page markup
/// * `site` - Site profile used to resolve and vet the lead image
///
/// # Returns
///
/// The article with placeholders for any missing field: `"Article Title"`,
/// a generic content message, the placeholder image and the capture time.
///
/// # Errors
///
/// Returns [`ScrapeError::Extraction`] when neither a title nor a body could be
/// found.
pub fn extract_article(html: &str, site: &Site) -> Result<ArticleDetail, ScrapeError> {
    let mut document = Html::parse_document(html);

    let title = extract_title(&document);
    let content = extract_body(&mut document);
    let image_url = lead_image(&document, site);
    let date = extract_date(&document);

    if title.is_none() && content.is_none() {
        return Err(ScrapeError::Extraction);
    }

    Ok(ArticleDetail {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        content: content.unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
        image_url: image_url.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        date: date.unwrap_or_else(now_iso),
    })
}

/// Fetch an article page and extract its content.
///
/// The request presents itself as same-site navigation, with the origin's
/// home page as referer.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `site` - Site profile for headers and image vetting
/// * `url` - Absolute article URL; it is fetched as given
///
/// # Errors
///
/// Returns [`ScrapeError::UpstreamStatus`] for non-2xx answers,
/// [`ScrapeError::Http`] for transport failures and
/// [`ScrapeError::Extraction`] when the page has no recognizable content.
#[instrument(level = "info", skip(client, site))]
pub async fn fetch_full_article(
    client: &Client,
    site: &Site,
    url: &str,
) -> Result<ArticleDetail, ScrapeError> {
    info!("Fetching full article");
    let html = fetch_html(client, site, url, Referral::SameOrigin).await?;
    let article = extract_article(&html, site)?;

    info!(
        title = %truncate_for_log(&article.title, 50),
        bytes = article.content.len(),
        "Extracted article"
    );
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::build_client;

    const FULL_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Webb | Space</title></head>
<body>
  <header><h1 class="article-name">James Webb telescope spots a galaxy merger</h1></header>
  <div class="hero-image"><img data-src="//cdn.mos.cms.futurecdn.net/webb-merger.jpg" src="/placeholder.svg"></div>
  <time datetime="2025-05-06T14:30:00Z">May 6, 2025</time>
  <div class="article-body">
    <p>The James Webb Space Telescope has captured two galaxies colliding.</p>
    <p>Credit: NASA</p>
    <div class="ad"><p>Buy a telescope today with this amazing deal!</p></div>
    <h2>A cosmic dance that began billions of years ago</h2>
    <script>var tracking = "this script text is long enough to count";</script>
    <div class="related"><p>Related: Hubble celebrates another anniversary</p></div>
    <p>Astronomers say the merger will continue for millions of years.</p>
  </div>
</body>
</html>"#;

    #[test]
    fn test_extract_full_page() {
        let site = Site::default();
        let article = extract_article(FULL_PAGE, &site).unwrap();

        assert_eq!(article.title, "James Webb telescope spots a galaxy merger");
        assert_eq!(
            article.content,
            "The James Webb Space Telescope has captured two galaxies colliding.\n\n\
             A cosmic dance that began billions of years ago\n\n\
             Astronomers say the merger will continue for millions of years."
        );
        assert_eq!(
            article.image_url,
            "https://cdn.mos.cms.futurecdn.net/webb-merger.jpg"
        );
        assert_eq!(article.date, "2025-05-06T14:30:00Z");
    }

    #[test]
    fn test_title_skips_short_candidates() {
        let html = r#"<html><body>
            <header><h1>Space</h1></header>
            <h1 data-testid="ArticleName">Saturn's rings are slowly disappearing</h1>
        </body></html>"#;
        let article = extract_article(html, &Site::default()).unwrap();
        assert_eq!(article.title, "Saturn's rings are slowly disappearing");
        assert_eq!(article.content, DEFAULT_CONTENT);
    }

    #[test]
    fn test_body_falls_through_containers() {
        let html = r#"<html><body>
            <div class="article-body"><p>Too short.</p></div>
            <div class="entry-content">
                <p>The Europa Clipper probe has begun its long journey to Jupiter.</p>
            </div>
        </body></html>"#;
        let article = extract_article(html, &Site::default()).unwrap();
        assert_eq!(
            article.content,
            "The Europa Clipper probe has begun its long journey to Jupiter."
        );
        assert_eq!(article.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_date_text_fallback_and_placeholders() {
        let html = r#"<html><body>
            <h1>Perseverance collects another rock sample</h1>
            <span class="publish-date">  May 6, 2025 </span>
            <article><img src="https://elsewhere.example/pic.jpg"></article>
        </body></html>"#;
        let article = extract_article(html, &Site::default()).unwrap();
        assert_eq!(article.date, "May 6, 2025");
        assert_eq!(article.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(article.content, DEFAULT_CONTENT);
    }

    #[test]
    fn test_missing_date_uses_capture_time() {
        let html = "<html><body><h1>Perseverance collects another rock sample</h1></body></html>";
        let article = extract_article(html, &Site::default()).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&article.date).is_ok());
    }

    #[test]
    fn test_extraction_failure() {
        let html = "<html><body><div><span>Nothing recognizable here</span></div></body></html>";
        let result = extract_article(html, &Site::default());
        assert!(matches!(result, Err(ScrapeError::Extraction)));
    }

    #[tokio::test]
    async fn test_fetch_full_article() {
        let mut server = mockito::Server::new_async().await;
        let site = Site::new(&server.url(), &[]);
        let mock = server
            .mock("GET", "/news/webb")
            .match_header("referer", format!("{}/", server.url()).as_str())
            .match_header("sec-fetch-site", "same-origin")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(FULL_PAGE)
            .create_async()
            .await;

        let client = build_client(None).unwrap();
        let article = fetch_full_article(&client, &site, &format!("{}/news/webb", server.url()))
            .await
            .unwrap();

        assert_eq!(article.title, "James Webb telescope spots a galaxy merger");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_full_article_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let site = Site::new(&server.url(), &[]);
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = build_client(None).unwrap();
        let result = fetch_full_article(&client, &site, &format!("{}/gone", server.url())).await;
        assert!(matches!(result, Err(ScrapeError::UpstreamStatus(404))));
    }
}
