//! HTTP server: pages, the comment form and the comment endpoint

mod error;

pub use error::{AppError, AppResult};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderName, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheStatus, PageCache};
use crate::comments::{
    new_comment_document, validate, CommentInput, CommentSubmitter, FormState, COMMENT_ENDPOINT,
};
use crate::content::ContentSource;
use crate::pages::detail::{self, DetailPage};
use crate::pages::{listing, Site};

/// Response header reporting how a detail page was served
pub const CACHE_HEADER: &str = "x-page-cache";

/// Shared server state
pub struct AppState {
    pub site: Arc<Site>,
    pub source: Arc<dyn ContentSource>,
    pub submitter: Arc<dyn CommentSubmitter>,
    pub cache: Arc<PageCache<DetailPage>>,
}

impl AppState {
    pub fn new(
        site: Site,
        source: Arc<dyn ContentSource>,
        submitter: Arc<dyn CommentSubmitter>,
    ) -> Self {
        let cache = Arc::new(PageCache::new(site.config.revalidate()));
        Self {
            site: Arc::new(site),
            source,
            submitter,
            cache,
        }
    }

    /// Generate and cache the page for every known slug.
    ///
    /// Any failure aborts: a site whose pages cannot be built is not served.
    pub async fn prerender(&self) -> Result<Vec<String>> {
        let start = std::time::Instant::now();
        let slugs = detail::static_paths(self.source.as_ref()).await?;

        let mut built = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match detail::generate(&self.site, self.source.as_ref(), &slug).await? {
                Some(page) => {
                    self.cache.insert(&slug, page).await;
                    built.push(slug);
                }
                None => tracing::warn!("Post {:?} disappeared while building", slug),
            }
        }

        tracing::info!(
            "Prerendered {} pages in {:.2}s",
            built.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(built)
    }

    /// The detail page for a slug, through the cache
    pub async fn detail_page(&self, slug: &str) -> AppResult<(DetailPage, CacheStatus)> {
        let site = Arc::clone(&self.site);
        let source = Arc::clone(&self.source);
        let key = slug.to_string();

        let page = self
            .cache
            .get_or_generate(slug, move || async move {
                detail::generate(&site, source.as_ref(), &key).await
            })
            .await?;

        page.ok_or(AppError::NotFound)
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(listing_handler))
        .route("/post/:slug", get(detail_handler).post(comment_form_handler))
        .route(COMMENT_ENDPOINT, post(create_comment_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(state: Arc<AppState>, ip: &str, port: u16) -> Result<()> {
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Home page: all posts, fetched fresh on every request
async fn listing_handler(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let posts = listing::fetch_posts(state.source.as_ref()).await?;
    let html = listing::render(&state.site, &posts)?;
    Ok(Html(html))
}

async fn detail_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let (page, status) = state.detail_page(&slug).await?;
    let mut response = Html(page.html.to_string()).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(CACHE_HEADER),
        HeaderValue::from_static(match status {
            CacheStatus::Hit => "HIT",
            CacheStatus::Stale => "STALE",
            CacheStatus::Miss => "MISS",
        }),
    );
    Ok(response)
}

/// The comment form posts back to the post's own URL
async fn comment_form_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(mut input): Form<CommentInput>,
) -> AppResult<Html<String>> {
    let (page, _) = state.detail_page(&slug).await?;

    // Comments always attach to the post being viewed
    input.post_id = page.post.id.clone();

    let form = FormState::default()
        .submit(input, state.submitter.as_ref())
        .await;
    let html = detail::render(&state.site, &page.post, &form)?;
    Ok(Html(html))
}

/// `POST /api/createComment`: store a new, unapproved comment
async fn create_comment_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let input: CommentInput = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid comment: {}", e)))?;

    if input.post_id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing post id".to_string()));
    }
    if let Some(error) = validate(&input).first() {
        return Err(AppError::BadRequest(error.message().to_string()));
    }

    state.source.create(new_comment_document(&input)).await?;
    tracing::info!("Stored comment on post {} pending approval", input.post_id);

    Ok(Json(json!({ "message": "Comment submitted" })))
}

async fn not_found_handler() -> AppError {
    AppError::NotFound
}
