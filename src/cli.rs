//! Command-line interface definitions for AstroNews.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.

use crate::scrapers::{DEFAULT_IMAGE_HOST, DEFAULT_ORIGIN, Site};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Command-line arguments for the AstroNews service.
///
/// # Examples
///
/// ```sh
/// # Serve the JSON API on the default address
/// astro_news
///
/// # Serve on another port with a per-fetch timeout
/// astro_news --bind 127.0.0.1:8080 --upstream-timeout-secs 15 serve
///
/// # Print the current listing or one article as JSON
/// astro_news listings
/// astro_news article https://www.space.com/some-story
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address the HTTP server listens on
    #[arg(short, long, env = "ASTRO_NEWS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Origin of the scraped news site (any path is dropped)
    #[arg(
        long,
        env = "ASTRO_NEWS_ORIGIN",
        default_value = DEFAULT_ORIGIN,
        value_parser = parse_origin
    )]
    pub origin: String,

    /// Extra hosts article images may be served from (besides the origin's)
    #[arg(
        long = "image-host",
        env = "ASTRO_NEWS_IMAGE_HOSTS",
        value_delimiter = ',',
        default_value = DEFAULT_IMAGE_HOST
    )]
    pub image_hosts: Vec<String>,

    /// Give up on an upstream fetch after this many seconds (no limit by default)
    #[arg(long, env = "ASTRO_NEWS_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the JSON API (the default)
    Serve,
    /// Scrape the listing once and print it as JSON
    Listings,
    /// Extract a single article and print it as JSON
    Article {
        /// Article URL
        url: String,
    },
}

/// Reduce `--origin` to its scheme, host and port.
///
/// # Arguments
///
/// * `raw` - The value given on the command line or in the environment
///
/// # Returns
///
/// The serialized origin, e.g. `https://www.space.com`, or a message for
/// clap when the value is not an absolute `http`/`https` URL with a host.
fn parse_origin(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid origin {raw:?}: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("origin {raw:?} must use http or https"));
    }
    if url.host_str().is_none() {
        return Err(format!("origin {raw:?} has no host"));
    }
    Ok(url.origin().ascii_serialization())
}

impl Cli {
    /// The site profile described by the arguments.
    pub fn site(&self) -> Site {
        Site::new(&self.origin, &self.image_hosts)
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["astro_news"]);

        assert_eq!(cli.command, None);
        assert_eq!(cli.bind, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(cli.origin, "https://www.space.com");
        assert_eq!(cli.image_hosts, vec!["futurecdn.net"]);
        assert_eq!(cli.upstream_timeout(), None);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "astro_news",
            "-b",
            "127.0.0.1:8080",
            "--origin",
            "http://localhost:9000",
            "--image-host",
            "img.example,cdn.example",
            "--upstream-timeout-secs",
            "15",
            "listings",
        ]);

        assert_eq!(cli.command, Some(Command::Listings));
        assert_eq!(cli.bind.port(), 8080);
        assert_eq!(cli.image_hosts, vec!["img.example", "cdn.example"]);
        assert_eq!(cli.upstream_timeout(), Some(Duration::from_secs(15)));

        let site = cli.site();
        assert_eq!(site.listing_urls[0], "http://localhost:9000/news");
        assert_eq!(site.image_hosts, vec!["localhost", "img.example", "cdn.example"]);
    }

    #[test]
    fn test_origin_keeps_scheme_and_host_only() {
        let cli = Cli::parse_from(["astro_news", "--origin", "https://news.example.com/sub/"]);
        assert_eq!(cli.origin, "https://news.example.com");

        let site = cli.site();
        assert_eq!(site.listing_urls[0], "https://news.example.com/news");
        assert_eq!(site.image_hosts[0], "news.example.com");

        let cli = Cli::parse_from(["astro_news", "--origin", "http://localhost:9000"]);
        assert_eq!(cli.origin, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        for origin in ["www.space.com", "localhost:9000", "ftp://files.example.com", "not a url"] {
            assert!(
                Cli::try_parse_from(["astro_news", "--origin", origin]).is_err(),
                "accepted {origin:?}"
            );
        }
    }

    #[test]
    fn test_cli_article_command() {
        let cli = Cli::parse_from(["astro_news", "article", "https://www.space.com/a-story"]);
        assert_eq!(
            cli.command,
            Some(Command::Article {
                url: "https://www.space.com/a-story".to_string()
            })
        );
    }
}
