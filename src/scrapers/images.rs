//! Image discovery for listing cards and article pages.
//!
//! Listing cards lazy-load their images, so the real URL may sit in any of
//! several attributes. Candidates are normalized to absolute URLs and kept
//! only when they are served from an allowed host and look like a real image.
//!
//! When a card has no usable image, [`fallback_image`] picks a thematic one
//! from the headline so the dashboard never renders an empty card.

use super::{Site, first_attr, selector_table};
use crate::utils::normalize_url;
use once_cell::sync::Lazy;
use rand::{Rng, rng};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Rendered by the front end when an article page has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const SPACE_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-space-1.jpg";
const MOON_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-moon-1.jpg";
const MARS_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-mars-1.jpg";
const TELESCOPE_IMAGE: &str =
    "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-telescope-1.jpg";
const GALAXY_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-galaxy-1.jpg";
const ROCKET_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-rocket-1.jpg";
const SATURN_IMAGE: &str = "https://cdn.mos.cms.futurecdn.net/YzQzNzQzNzQzNzQz-saturn-1.jpg";

/// Every image [`fallback_image`] may return.
pub const FALLBACK_IMAGES: [&str; 7] = [
    SPACE_IMAGE,
    MOON_IMAGE,
    MARS_IMAGE,
    TELESCOPE_IMAGE,
    GALAXY_IMAGE,
    ROCKET_IMAGE,
    SATURN_IMAGE,
];

/// Headline keywords to thematic image; the first matching rule wins.
const KEYWORD_RULES: &[(&[&str], &str)] = &[
    (&["moon", "lunar", "eclipse"], MOON_IMAGE),
    (&["mars", "rover"], MARS_IMAGE),
    (&["webb", "telescope", "hubble"], TELESCOPE_IMAGE),
    (&["galaxy", "star", "dust"], GALAXY_IMAGE),
    (&["spacex", "rocket", "launch"], ROCKET_IMAGE),
    (&["saturn", "planet"], SATURN_IMAGE),
];

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Listing image selectors tried before the host-scoped `img[src*=…]` ones.
const LISTING_IMAGE_HEAD: &[&str] = &[
    "figure[data-original]",
    "figure img",
    "img[data-original]",
    "img[data-src]",
    "img[data-lazy-src]",
    "img.lazy",
];

/// Listing image selectors tried after the host-scoped ones.
const LISTING_IMAGE_TAIL: &[&str] = &[
    ".article-image img",
    ".listing-image img",
    ".vanilla-image-block img",
    "picture img",
    "img[src]",
];

static LEAD_IMAGE_SELECTORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    selector_table(&[
        ".article-lead-image img",
        ".hero-image img",
        "figure.article-lead-image-wrap img",
        ".main-image img",
        "article img",
    ])
});

/// Pick a thematic fallback image for a headline.
///
/// Keyword rules are matched against the lowercase title in order. When none
/// matches, one of [`FALLBACK_IMAGES`] is picked uniformly at random.
pub fn fallback_image(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, image)| *image)
        .unwrap_or_else(|| FALLBACK_IMAGES[rng().random_range(0..FALLBACK_IMAGES.len())])
}

/// The ordered image selector cascade for one site's listing cards.
///
/// Built once per listing request because the host-scoped selectors depend on
/// the site's allow-list.
#[derive(Debug, Clone)]
pub struct ListingImageFinder {
    selectors: Vec<Selector>,
}

impl ListingImageFinder {
    pub fn new(site: &Site) -> Self {
        let head = selector_table(LISTING_IMAGE_HEAD).into_iter().map(|(_, s)| s);
        let scoped = site
            .image_hosts
            .iter()
            .filter_map(|host| Selector::parse(&format!("img[src*=\"{host}\"]")).ok());
        let tail = selector_table(LISTING_IMAGE_TAIL).into_iter().map(|(_, s)| s);

        Self {
            selectors: head.chain(scoped).chain(tail).collect(),
        }
    }

    /// Find the first acceptable image inside a listing card.
    ///
    /// For each selector only the first matching element is inspected; a
    /// selector whose element carries no acceptable URL hands over to the next.
    pub fn find(&self, card: ElementRef<'_>, site: &Site) -> Option<String> {
        self.selectors
            .iter()
            .filter_map(|selector| card.select(selector).next())
            .filter_map(lazy_image_source)
            .map(|src| normalize_image_url(&site.origin, &src))
            .find(|url| is_acceptable_listing_image(site, url))
    }
}

/// Best source attribute of a possibly lazy-loaded image.
fn lazy_image_source(img: ElementRef<'_>) -> Option<String> {
    first_attr(img, &["data-original", "data-src", "data-lazy-src"])
        .or_else(|| {
            img.value()
                .attr("srcset")
                .and_then(|srcset| srcset.split_whitespace().next())
                .map(str::to_string)
        })
        .or_else(|| first_attr(img, &["src"]))
        .or_else(|| {
            img.parent()
                .and_then(ElementRef::wrap)
                .and_then(|parent| first_attr(parent, &["data-original"]))
        })
}

/// Keep the first whitespace-separated token and make it absolute.
fn normalize_image_url(origin: &str, src: &str) -> String {
    let token = src.split_whitespace().next().unwrap_or_default();
    normalize_url(origin, token)
}

fn has_image_extension(url: &str) -> bool {
    Url::parse(url)
        .map(|u| {
            let path = u.path().to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| path.contains(ext))
        })
        .unwrap_or(false)
}

/// A listing image must be real (not a placeholder or inline data), hosted on
/// an allowed host, and carry a recognized image extension.
pub fn is_acceptable_listing_image(site: &Site, url: &str) -> bool {
    let lower = url.to_lowercase();
    !lower.contains("placeholder")
        && !lower.contains("data:image")
        && site.allows_image_host(url)
        && has_image_extension(url)
}

/// Find the lead image of an article page.
///
/// Walks the hero-image cascade; for each selector the first `img` found is
/// read as `data-original` > `data-src` > `src`, made absolute, and accepted
/// when served from an allowed host.
pub fn lead_image(document: &Html, site: &Site) -> Option<String> {
    LEAD_IMAGE_SELECTORS
        .iter()
        .filter_map(|(_, selector)| document.select(selector).next())
        .filter_map(|img| first_attr(img, &["data-original", "data-src", "src"]))
        .map(|src| normalize_url(&site.origin, &src))
        .find(|url| site.allows_image_host(url))
}
