use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::{Mutex, RwLock};
use search_core::request_queue::HistoryStats;
use search_core::source::{load_documents, InputDocument};
use search_core::{Document, DocumentId, DocumentStatus, RequestHistory, SearchConfig, SearchError, SearchServer, StopWords};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Startup settings, filled from the command line and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub documents: Option<PathBuf>,
    /// JSON file holding a [`SearchConfig`]; missing fields take defaults.
    pub config: Option<PathBuf>,
    pub stop_words: String,
    /// Overrides `max_result_count` from the config file.
    pub max_results: Option<usize>,
    pub history_window: usize,
    pub admin_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { documents: None, config: None, stop_words: String::new(), max_results: None, history_window: 1440, admin_token: None }
    }
}

impl Settings {
    pub fn search_config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => SearchConfig::default(),
        };
        if let Some(max_results) = self.max_results {
            config = config.with_max_result_count(max_results);
        }
        Ok(config)
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub status: DocumentStatus,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Document>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    pub id: DocumentId,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub document_id: DocumentId,
    pub status: DocumentStatus,
    pub words: Vec<String>,
}

#[derive(Serialize)]
pub struct DocumentsResponse {
    pub count: usize,
    pub ids: Vec<DocumentId>,
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub document_id: DocumentId,
    pub rating: i32,
    pub status: DocumentStatus,
    pub word_frequencies: BTreeMap<String, f64>,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub stop_words: Vec<String>,
    #[serde(flatten)]
    pub config: SearchConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum DocumentBatch {
    One(InputDocument),
    Many(Vec<InputDocument>),
}

impl DocumentBatch {
    fn into_vec(self) -> Vec<InputDocument> {
        match self {
            DocumentBatch::One(doc) => vec![doc],
            DocumentBatch::Many(docs) => docs,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RwLock<SearchServer>>,
    pub history: Arc<Mutex<RequestHistory>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(index: SearchServer, history: RequestHistory, admin_token: Option<String>) -> Self {
        Self { index: Arc::new(RwLock::new(index)), history: Arc::new(Mutex::new(history)), admin_token }
    }
}

pub enum ApiError {
    Search(SearchError),
    Unauthorized(&'static str),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError::Search(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Search(err) => {
                let status = match &err {
                    SearchError::DuplicateDocumentId(_) => StatusCode::CONFLICT,
                    e if e.is_validation() => StatusCode::BAD_REQUEST,
                    _ => StatusCode::NOT_FOUND,
                };
                (status, err.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Build the index from `settings` and wrap it in a router.
pub fn build_app(settings: Settings) -> Result<Router> {
    let stop_words = StopWords::from_text(&settings.stop_words).context("invalid stop words")?;
    let config = settings.search_config()?;
    let mut index = SearchServer::with_config(stop_words, config);
    if let Some(path) = &settings.documents {
        for doc in load_documents(path)? {
            index.add_input_document(&doc).with_context(|| format!("document {}", doc.id))?;
        }
        tracing::info!(num_docs = index.document_count(), path = %path.display(), "indexed documents");
    }
    let state = AppState::new(index, RequestHistory::new(settings.history_window), settings.admin_token);
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/documents", get(list_documents).post(add_documents))
        .route("/documents/:id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/config", get(config_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let results = state.index.read().find_top_documents_by_status(&params.q, params.status)?;
    state.history.lock().record(results.len());
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), "search");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn match_handler(State(state): State<AppState>, Query(params): Query<MatchParams>) -> Result<Json<MatchResponse>, ApiError> {
    let (words, status) = state.index.read().match_document(&params.q, params.id)?;
    Ok(Json(MatchResponse { document_id: params.id, status, words }))
}

pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentsResponse> {
    let index = state.index.read();
    Json(DocumentsResponse { count: index.document_count(), ids: index.document_ids().collect() })
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<DocumentId>) -> Result<Json<DocumentResponse>, ApiError> {
    let index = state.index.read();
    let data = index.document(id).ok_or(SearchError::DocumentNotFound(id))?;
    let word_frequencies = index.word_frequencies(id).cloned().unwrap_or_default();
    Ok(Json(DocumentResponse { document_id: id, rating: data.rating, status: data.status, word_frequencies }))
}

pub async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    let index = state.index.read();
    let stop_words = index.stop_words().iter().map(str::to_string).collect();
    Json(ConfigResponse { stop_words, config: *index.config() })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<HistoryStats> {
    Json(state.history.lock().stats())
}

/// Adds a document or a batch. The whole batch is checked before any of it
/// is applied, so it is accepted or rejected as a unit.
pub async fn add_documents(State(state): State<AppState>, headers: HeaderMap, Json(batch): Json<DocumentBatch>) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    authorize(&state, &headers)?;
    let docs = batch.into_vec();
    let mut index = state.index.write();
    let added = index.add_input_documents(&docs).map_err(|err| {
        tracing::warn!(error = %err, "rejected document batch");
        ApiError::from(err)
    })?;
    tracing::info!(added, num_docs = index.document_count(), "documents added");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "added": added }))))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token"))
    }
}
