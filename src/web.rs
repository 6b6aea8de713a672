//! JSON API over HTTP.
//!
//! Core calls are synchronous and touch the filesystem, so every handler
//! runs its work on the blocking pool while holding the searcher lock.

use std::{
    collections::BTreeSet,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    capability::Capability,
    error,
    record::ShaderRecord,
    search,
    searcher::ShaderSearcher,
};

pub const PER_PAGE: usize = 20;
pub const SEARCH_LIMIT: usize = 50;

struct AppState {
    searcher: Mutex<ShaderSearcher>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => {
                tracing::error!("request failed: {m}");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run `f` against the searcher on the blocking pool.
async fn with_searcher<T, F>(
    state: Arc<AppState>,
    f: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ShaderSearcher) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
        let searcher = state
            .searcher
            .lock()
            .map_err(|_| ApiError::Internal("searcher lock poisoned".into()))?;
        Ok(f(&searcher))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("worker failed: {e}")))?
}

// -- /api/search --

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub tags: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Comma-separated capability names.
    pub requires: Option<String>,
}

impl SearchParams {
    fn query(self) -> Result<search::Query, ApiError> {
        let requires = self
            .requires
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Capability>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))
            })
            .collect::<Result<BTreeSet<Capability>, ApiError>>()?;

        Ok(search::Query {
            tags: self.tags,
            name: self.name,
            author: self.author,
            description: self.description,
            requires,
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    shaders: Vec<ShaderRecord>,
    total: usize,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.query()?;
    let mut results =
        with_searcher(state, move |s| s.search(&query, false)).await?;
    search::sort_for_listing(&mut results);

    let total = results.len();
    results.truncate(SEARCH_LIMIT);
    Ok(Json(SearchResponse {
        shaders: results,
        total,
    }))
}

// -- /api/shaders --

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub query: Option<String>,
}

/// One page of a listing plus the window of page links around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub shaders: Vec<ShaderRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub start_page: usize,
    pub end_page: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    /// Slice `records` into page `page` (1-based; 0 is treated as 1).
    pub fn of(records: Vec<ShaderRecord>, page: usize) -> Self {
        let page = page.max(1);
        let total = records.len();
        let total_pages = total.div_ceil(PER_PAGE);
        let start = (page - 1).saturating_mul(PER_PAGE);
        let end = start.saturating_add(PER_PAGE);

        let shaders = records.into_iter().skip(start).take(PER_PAGE).collect();

        Self {
            shaders,
            page,
            total_pages,
            start_page: page.saturating_sub(2).max(1),
            end_page: total_pages.min(page.saturating_add(2)),
            total,
            has_next: end < total,
            has_prev: start > 0,
        }
    }
}

async fn shaders_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page>, ApiError> {
    let text = params.query.unwrap_or_default();
    let records =
        with_searcher(state, move |s| s.engine(false).quick_search(&text))
            .await?;
    Ok(Json(Page::of(records, params.page.unwrap_or(1))))
}

// -- /api/shader/{id} --

async fn shader_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let lookup = id.clone();
    with_searcher(state, move |s| s.shader(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("shader not found: {id}")))
}

pub fn router(searcher: ShaderSearcher) -> Router {
    let state = Arc::new(AppState {
        searcher: Mutex::new(searcher),
    });

    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/shaders", get(shaders_handler))
        .route("/api/shader/{id}", get(shader_handler))
        .with_state(state)
}

pub async fn serve(
    searcher: ShaderSearcher,
    addr: SocketAddr,
) -> error::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(searcher)).await?;
    Ok(())
}
