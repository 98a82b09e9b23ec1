//! Error types for the scrapers.

use thiserror::Error;

/// Everything that can go wrong while fetching or extracting a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The upstream answered with a non-2xx status.
    #[error("failed to fetch page: upstream responded with status {0}")]
    UpstreamStatus(u16),

    /// The upstream answered 2xx with a body too short to be a real page.
    #[error("upstream returned an empty page ({0} bytes)")]
    EmptyBody(usize),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every candidate source and selector was tried without a single article.
    #[error("could not scrape any articles from the candidate sources")]
    NoArticles,

    /// Neither a title nor a body could be found on an article page.
    #[error("could not extract article content")]
    Extraction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ScrapeError::UpstreamStatus(404).to_string(),
            "failed to fetch page: upstream responded with status 404"
        );
        assert_eq!(
            ScrapeError::Extraction.to_string(),
            "could not extract article content"
        );
        assert!(ScrapeError::EmptyBody(12).to_string().contains("12 bytes"));
    }
}
