//! Listing scraper: article cards from the site's news index.
//!
//! The scraper walks the site's candidate listing pages in order. Each usable
//! page is scanned with an ordered table of card selectors, from plain
//! `article` tags down to broad class-name substring matches. The first
//! (page, selector) pair that yields at least one accepted card wins; nothing
//! after it is tried.
//!
//! # Card extraction
//!
//! For every node a selector matches:
//!
//! 1. **Title and link**: an anchor inside a heading, else the first
//!    heading-like text plus the first anchor, else the node itself if it is
//!    an anchor
//! 2. **Image**: see [`ListingImageFinder`], with a keyword-based fallback
//! 3. **Summary**: the first description-like text, else the title
//!
//! Candidates that fail [`accepts`] are dropped silently; they are usually
//! navigation links rather than stories.

use super::images::{ListingImageFinder, fallback_image};
use super::{Referral, Site, element_text, fetch_html, selector_table, static_selector};
use crate::error::ScrapeError;
use crate::fallback;
use crate::models::{Article, Listing, ListingSource};
use crate::utils::{article_id, clean_title, normalize_url, now_iso, truncate_chars};
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Upper bound on the number of cards returned.
pub const MAX_ARTICLES: usize = 20;

/// Bodies shorter than this are treated as an empty page.
const MIN_BODY_BYTES: usize = 100;

const MAX_TITLE_CHARS: usize = 200;
const MAX_SUMMARY_CHARS: usize = 300;

/// Card selector strategies, most specific first.
static CARD_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    selector_table(&[
        "article",
        ".listingResult",
        ".news-item",
        ".article-item",
        "[data-module='ArticleListItem']",
        ".vanilla-image-block",
        ".hawk-item",
        ".summary-item",
        ".entry-title",
        "[class*='article']",
        "[class*='post']",
    ])
});

static TITLE_LINK: Lazy<Selector> = Lazy::new(|| {
    static_selector("h1 a, h2 a, h3 a, .article-name a, .article-link, .entry-title a")
});

static HEADING: Lazy<Selector> = Lazy::new(|| {
    static_selector("h1, h2, h3, h4, .title, [class*='title'], [class*='name'], .entry-title")
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| static_selector("a"));

static SUMMARY: Lazy<Selector> = Lazy::new(|| static_selector(".summary, .description, .excerpt, p"));

/// Whether a scraped (title, link) pair looks like a real story.
///
/// Requires a non-empty link and a title longer than 10 characters that does
/// not mention "homepage".
pub fn accepts(title: &str, link: &str) -> bool {
    !title.is_empty()
        && !link.is_empty()
        && title.chars().count() > 10
        && !title.to_lowercase().contains("homepage")
}

fn href(el: ElementRef<'_>) -> String {
    el.value().attr("href").unwrap_or_default().trim().to_string()
}

/// Raw title and link of a card, before cleanup.
fn title_and_link(card: ElementRef<'_>) -> (String, String) {
    let mut title = String::new();
    let mut link = String::new();

    if let Some(anchor) = card.select(&TITLE_LINK).next() {
        title = element_text(anchor);
        link = href(anchor);
    }

    if title.is_empty() {
        if let Some(heading) = card.select(&HEADING).next() {
            title = element_text(heading);
        }
        if link.is_empty() {
            if let Some(anchor) = card.select(&ANCHOR).next() {
                link = href(anchor);
            }
        }
    }

    if title.is_empty() && card.value().name() == "a" {
        title = element_text(card);
        link = href(card);
    }

    (title, link)
}

/// Turn one matched node into an article card, or `None` if it is not a story.
fn card_to_article(card: ElementRef<'_>, site: &Site, images: &ListingImageFinder) -> Option<Article> {
    let (raw_title, raw_link) = title_and_link(card);
    let title = clean_title(&raw_title);
    if !accepts(&title, &raw_link) {
        return None;
    }

    let link = normalize_url(&site.origin, &raw_link);
    let image_url = images
        .find(card, site)
        .unwrap_or_else(|| fallback_image(&title).to_string());
    let summary = card
        .select(&SUMMARY)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| title.clone());

    Some(Article {
        id: article_id(&link),
        title: truncate_chars(&title, MAX_TITLE_CHARS),
        summary: truncate_chars(&summary, MAX_SUMMARY_CHARS),
        content: format!("Read the full article at {}: {}", site.label, link),
        image_url,
        date: now_iso(),
        source: site.label.clone(),
    })
}

/// Extract the cards matched by one selector strategy.
///
/// Cards are de-duplicated by id (broad selectors match nested wrappers of
/// the same story) and capped at [`MAX_ARTICLES`].
pub fn extract_articles(
    document: &Html,
    selector: &Selector,
    site: &Site,
    images: &ListingImageFinder,
) -> Vec<Article> {
    document
        .select(selector)
        .filter_map(|card| card_to_article(card, site, images))
        .unique_by(|article| article.id.clone())
        .take(MAX_ARTICLES)
        .collect()
}

/// Run the selector cascade over one listing page.
///
/// Returns the cards of the first strategy that yields any, or an empty list.
pub fn scan_listing_page(html: &str, site: &Site, images: &ListingImageFinder) -> Vec<Article> {
    let document = Html::parse_document(html);

    for (name, selector) in CARD_SELECTORS.iter() {
        debug!(selector = name, "Trying card selector");
        let articles = extract_articles(&document, selector, site, images);
        if !articles.is_empty() {
            info!(selector = name, count = articles.len(), "Found listing cards");
            return articles;
        }
    }

    Vec::new()
}

/// Scrape article cards from the first usable candidate listing page.
///
/// Pages answering non-2xx, failing in transport, or returning fewer than
/// 100 bytes are skipped.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `site` - Site profile supplying the candidate pages and image hosts
///
/// # Returns
///
/// At most [`MAX_ARTICLES`] accepted cards, de-duplicated by id, in page order.
///
/// # Errors
///
/// Returns [`ScrapeError::NoArticles`] when no page and selector produced a
/// single accepted card.
#[instrument(level = "info", skip_all, fields(origin = %site.origin))]
pub async fn fetch_listings(client: &Client, site: &Site) -> Result<Vec<Article>, ScrapeError> {
    let images = ListingImageFinder::new(site);

    for url in &site.listing_urls {
        info!(%url, "Scraping listing page");

        let html = match fetch_html(client, site, url, Referral::CrossSite).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Listing page unavailable; trying next source");
                continue;
            }
        };

        if html.len() < MIN_BODY_BYTES {
            let e = ScrapeError::EmptyBody(html.len());
            warn!(%url, error = %e, "Listing page unavailable; trying next source");
            continue;
        }

        let articles = scan_listing_page(&html, site, &images);
        if !articles.is_empty() {
            info!(%url, count = articles.len(), "Scraped listing");
            return Ok(articles);
        }

        info!(%url, "No articles found on listing page");
    }

    Err(ScrapeError::NoArticles)
}

/// Scrape the listing, substituting the built-in fallback set on failure.
///
/// Never fails: the returned [`Listing`] says whether the cards are live.
pub async fn listings_or_fallback(client: &Client, site: &Site) -> Listing {
    match fetch_listings(client, site).await {
        Ok(articles) => Listing {
            articles,
            source: ListingSource::Live,
        },
        Err(e) => {
            warn!(error = %e, "Live listing failed; serving fallback articles");
            Listing {
                articles: fallback::fallback_articles(),
                source: ListingSource::Fallback,
            }
        }
    }
}
