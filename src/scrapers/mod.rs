//! Scrapers for the news site behind the dashboard.
//!
//! The scrapers are two independent, stateless passes over freshly fetched
//! HTML:
//!
//! 1. **Listing**: walk candidate listing pages and selector strategies until
//!    a page yields article cards ([`listing`])
//! 2. **Article**: pull title, body, lead image and publish date out of a
//!    single article page ([`article`])
//!
//! Image discovery and the keyword-based image fallback live in [`images`].
//!
//! # Cascades
//!
//! Every extraction step is an ordered table of CSS selectors evaluated with
//! early exit: the first entry that produces something usable wins. The tables
//! are ranked by how often each markup variant has been seen on the target
//! site. Selector tables are parsed once and shared read-only.
//!
//! # Site profile
//!
//! Origin, candidate listing pages and the image host allow-list come from a
//! [`Site`] so the scrapers can be pointed at another deployment (or a local
//! test server) without code changes.

pub mod article;
pub mod images;
pub mod listing;

use crate::error::ScrapeError;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, PRAGMA, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use scraper::{ElementRef, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default scraped site.
pub const DEFAULT_ORIGIN: &str = "https://www.space.com";

/// Default image CDN allowed besides the origin's own host.
pub const DEFAULT_IMAGE_HOST: &str = "futurecdn.net";

/// Provenance label stamped on every scraped article.
pub const SOURCE_LABEL: &str = "Space.com";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referer sent with listing requests, as if arriving from a search result.
const SEARCH_REFERER: &str = "https://www.google.com/";

/// The site being scraped.
///
/// # Fields
///
/// * `label` - Provenance label written into [`crate::models::Article::source`]
/// * `origin` - Scheme and host, used to absolutize links and as the referer
/// * `listing_urls` - Candidate listing pages, tried in order
/// * `image_hosts` - Hosts (and their subdomains) images may be served from
#[derive(Debug, Clone)]
pub struct Site {
    pub label: String,
    pub origin: String,
    pub listing_urls: Vec<String>,
    pub image_hosts: Vec<String>,
}

impl Site {
    /// Build a site profile for `origin`.
    ///
    /// The candidate listing pages are `/news`, `/news/` and the home page.
    /// The origin's host (without a leading `www.`) is always an allowed image
    /// host; `extra_image_hosts` are added after it.
    pub fn new(origin: &str, extra_image_hosts: &[String]) -> Self {
        let origin = origin.trim_end_matches('/').to_string();

        let mut image_hosts = Vec::new();
        if let Some(host) = Url::parse(&origin)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        {
            image_hosts.push(host);
        }
        for host in extra_image_hosts {
            let host = host.trim().to_lowercase();
            if !host.is_empty() && !image_hosts.contains(&host) {
                image_hosts.push(host);
            }
        }

        Self {
            label: SOURCE_LABEL.to_string(),
            listing_urls: vec![
                format!("{origin}/news"),
                format!("{origin}/news/"),
                format!("{origin}/"),
            ],
            origin,
            image_hosts,
        }
    }

    /// Whether `url` is served from one of the allowed image hosts.
    pub fn allows_image_host(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return false;
        };
        self.image_hosts
            .iter()
            .any(|allowed| host == *allowed || host.ends_with(&format!(".{allowed}")))
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN, &[DEFAULT_IMAGE_HOST.to_string()])
    }
}

/// How a page request presents itself to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referral {
    /// Arriving from a search engine (listing pages).
    CrossSite,
    /// Navigating within the site (article pages).
    SameOrigin,
}

/// Build the shared HTTP client.
///
/// Compression is negotiated by reqwest itself. No timeout is applied unless
/// one is configured.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// The browser-like header set sent with every page request.
fn browser_headers(site: &Site, referral: Referral) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );

    let (referer, fetch_site) = match referral {
        Referral::CrossSite => (SEARCH_REFERER.to_string(), "cross-site"),
        Referral::SameOrigin => (format!("{}/", site.origin), "same-origin"),
    };
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static(fetch_site),
    );
    match HeaderValue::from_str(&referer) {
        Ok(value) => {
            headers.insert(REFERER, value);
        }
        Err(e) => warn!(%referer, error = %e, "Referer is not a valid header value; omitting"),
    }
    headers
}

/// Fetch a page and return its body.
///
/// # Errors
///
/// Returns [`ScrapeError::UpstreamStatus`] for non-2xx answers and
/// [`ScrapeError::Http`] for transport failures.
#[instrument(level = "debug", skip(client, site))]
pub async fn fetch_html(
    client: &Client,
    site: &Site,
    url: &str,
    referral: Referral,
) -> Result<String, ScrapeError> {
    let response = client
        .get(url)
        .headers(browser_headers(site, referral))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::UpstreamStatus(status.as_u16()));
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), %status, "Fetched page");
    Ok(body)
}

/// Parse an ordered table of static selectors.
///
/// The tables are compile-time constants, so a parse failure is a programming
/// error.
pub(crate) fn selector_table(sources: &[&'static str]) -> Vec<(&'static str, Selector)> {
    sources
        .iter()
        .map(|src| {
            let selector = Selector::parse(src)
                .unwrap_or_else(|e| panic!("invalid built-in selector {src:?}: {e:?}"));
            (*src, selector)
        })
        .collect()
}

/// Parse a single static selector.
pub(crate) fn static_selector(src: &'static str) -> Selector {
    Selector::parse(src).unwrap_or_else(|e| panic!("invalid built-in selector {src:?}: {e:?}"))
}

/// Trimmed text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First non-empty value among `attrs`, in order.
pub(crate) fn first_attr(el: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|name| el.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_default_site() {
        let site = Site::default();
        assert_eq!(site.origin, "https://www.space.com");
        assert_eq!(
            site.listing_urls,
            vec![
                "https://www.space.com/news",
                "https://www.space.com/news/",
                "https://www.space.com/",
            ]
        );
        assert_eq!(site.image_hosts, vec!["space.com", "futurecdn.net"]);
        assert_eq!(site.label, "Space.com");
    }

    #[test]
    fn test_allows_image_host() {
        let site = Site::default();
        assert!(site.allows_image_host("https://cdn.mos.cms.futurecdn.net/a.jpg"));
        assert!(site.allows_image_host("https://www.space.com/a.jpg"));
        assert!(site.allows_image_host("https://space.com/a.jpg"));
        assert!(!site.allows_image_host("https://notspace.com/a.jpg"));
        assert!(!site.allows_image_host("https://evil.example/space.com.jpg"));
        assert!(!site.allows_image_host("/placeholder.svg"));
    }

    #[test]
    fn test_site_for_local_origin() {
        let site = Site::new("http://127.0.0.1:8080/", &[]);
        assert_eq!(site.origin, "http://127.0.0.1:8080");
        assert_eq!(site.listing_urls[0], "http://127.0.0.1:8080/news");
        assert!(site.allows_image_host("http://127.0.0.1:8080/img/a.png"));
    }

    #[test]
    fn test_browser_headers_by_referral() {
        let site = Site::default();
        let cross = browser_headers(&site, Referral::CrossSite);
        assert_eq!(cross[REFERER], "https://www.google.com/");
        assert_eq!(cross["sec-fetch-site"], "cross-site");

        let same = browser_headers(&site, Referral::SameOrigin);
        assert_eq!(same[REFERER], "https://www.space.com/");
        assert_eq!(same["sec-fetch-site"], "same-origin");
        assert_eq!(same[CACHE_CONTROL], "no-cache");
    }

    #[test]
    fn test_first_attr_skips_empty_values() {
        let html = Html::parse_fragment(r#"<img data-src="  " src="/a.jpg">"#);
        let img = html.select(&static_selector("img")).next().unwrap();
        assert_eq!(
            first_attr(img, &["data-original", "data-src", "src"]),
            Some("/a.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_html_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("referer", "https://www.google.com/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>hello</body></html>")
            .create_async()
            .await;

        let client = build_client(None).unwrap();
        let site = Site::new(&server.url(), &[]);
        let body = fetch_html(
            &client,
            &site,
            &format!("{}/page", server.url()),
            Referral::CrossSite,
        )
        .await
        .unwrap();

        assert!(body.contains("hello"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_html_status_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = build_client(None).unwrap();
        let site = Site::new(&server.url(), &[]);
        let result = fetch_html(
            &client,
            &site,
            &format!("{}/missing", server.url()),
            Referral::SameOrigin,
        )
        .await;

        assert!(matches!(result, Err(ScrapeError::UpstreamStatus(404))));
        mock.assert_async().await;
    }
}
