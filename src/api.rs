//! JSON HTTP API consumed by the dashboard.
//!
//! # Routes
//!
//! | Route | Handler | Notes |
//! |-------|---------|-------|
//! | `GET /api/nasa` | [`list_articles`] | Always 200; degrades to the fallback set |
//! | `GET /api/article?url=…` | [`get_article`] | 400 without `url`, 500 on fetch or extraction failure |
//! | `GET /healthz` | [`healthz`] | Liveness probe |
//!
//! Every request is handled independently: the scrapers run to completion
//! inside the handler and nothing is cached between requests.

use crate::error::ScrapeError;
use crate::fallback::FALLBACK_NOTE;
use crate::models::{ArticleResponse, ErrorResponse, Listing, ListingResponse, ListingSource};
use crate::scrapers::article::fetch_full_article;
use crate::scrapers::listing::listings_or_fallback;
use crate::scrapers::Site;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};
use url::form_urlencoded;

/// Read-only state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pooled HTTP client used for every upstream fetch.
    pub client: Client,
    pub site: Arc<Site>,
}

impl AppState {
    pub fn new(client: Client, site: Site) -> Self {
        Self {
            client,
            site: Arc::new(site),
        }
    }
}

/// Errors surfaced by the API, each mapped to a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Article URL is required")]
    MissingUrl,

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::Scrape(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// The first `url` parameter of a query string, trimmed.
///
/// Repeated parameters are not an error: later values are ignored.
///
/// # Arguments
///
/// * `query` - The raw query string, without the leading `?`
///
/// # Returns
///
/// `None` when the query is absent or its first `url` value is blank.
fn article_url_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/nasa", get(list_articles))
        .route("/api/article", get(get_article))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Wrap a listing in its response body, adding the degradation note when the
/// fallback set is served.
pub fn listing_response(listing: Listing) -> ListingResponse {
    let note = match listing.source {
        ListingSource::Live => None,
        ListingSource::Fallback => Some(FALLBACK_NOTE.to_string()),
    };
    ListingResponse {
        articles: listing.articles,
        note,
    }
}

/// `GET /api/nasa`: the current article cards.
#[instrument(level = "info", skip_all)]
pub async fn list_articles(State(state): State<AppState>) -> Json<ListingResponse> {
    let listing = listings_or_fallback(&state.client, &state.site).await;
    info!(
        count = listing.articles.len(),
        source = ?listing.source,
        "Serving listing"
    );
    Json(listing_response(listing))
}

/// `GET /api/article?url=…`: full text of one article.
#[instrument(level = "info", skip_all)]
pub async fn get_article(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ArticleResponse>, ApiError> {
    let url = article_url_param(query.as_deref()).ok_or_else(|| {
        warn!("Article request without url");
        ApiError::MissingUrl
    })?;

    match fetch_full_article(&state.client, &state.site, &url).await {
        Ok(article) => Ok(Json(ArticleResponse { article })),
        Err(e) => {
            error!(%url, error = %e, "Article extraction failed");
            Err(e.into())
        }
    }
}

/// `GET /healthz`.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl-C handler; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bind `addr` and serve the API until Ctrl-C.
#[instrument(level = "info", skip(state))]
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, origin = %state.site.origin, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
