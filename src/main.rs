//! # AstroNews
//!
//! The scraping backend of a space-news dashboard. Article cards and full
//! article text are scraped from Space.com on demand and served as JSON.
//!
//! ## Features
//!
//! - Scrapes listing pages with a cascade of card selectors and heuristic
//!   title, link, image and summary extraction
//! - Extracts title, body, lead image and publish date from article pages
//! - Degrades to a built-in article set when the live listing is unavailable
//! - Serves everything over a small JSON API, or prints it once from the CLI
//!
//! ## Usage
//!
//! ```sh
//! astro_news                      # serve on 0.0.0.0:3000
//! astro_news listings             # print the listing once
//! astro_news article <URL>        # print one article once
//! ```
//!
//! ## Architecture
//!
//! Each request runs one sequential pipeline:
//! 1. **Fetching**: Download the page with a browser-like header set
//! 2. **Extraction**: Walk the selector cascades until something usable appears
//! 3. **Output**: Serialize the normalized records as JSON
//!
//! Nothing is cached or persisted between requests.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod error;
mod fallback;
mod models;
mod scrapers;
mod utils;

use api::{AppState, listing_response};
use cli::{Cli, Command};
use models::ArticleResponse;
use scrapers::article::fetch_full_article;
use scrapers::build_client;
use scrapers::listing::listings_or_fallback;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let site = args.site();
    let client = build_client(args.upstream_timeout())?;
    info!(origin = %site.origin, image_hosts = ?site.image_hosts, "astro_news starting up");

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            api::serve(args.bind, AppState::new(client, site)).await?;
        }
        Command::Listings => {
            let listing = listings_or_fallback(&client, &site).await;
            println!("{}", serde_json::to_string_pretty(&listing_response(listing))?);
        }
        Command::Article { url } => match fetch_full_article(&client, &site, &url).await {
            Ok(article) => {
                println!("{}", serde_json::to_string_pretty(&ArticleResponse { article })?);
            }
            Err(e) => {
                error!(%url, error = %e, "Article extraction failed");
                return Err(e.into());
            }
        },
    }

    Ok(())
}
