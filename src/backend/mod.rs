//! In-memory REST backend serving every storefront collection.
//!
//! Routes (all but `/health` sit behind [`require_auth`]):
//! - `GET /health`
//! - `GET /auth/me`
//! - `GET|POST /:resource`
//! - `PUT|DELETE /:resource/:id`
//!
//! The server assigns ids and checks nothing else about the records.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::{require_auth, AuthState, AuthUser};
use crate::resources::ResourceKind;
use crate::store::{RecordId, Resource};

type Collections = Arc<RwLock<HashMap<ResourceKind, Vec<Value>>>>;

#[derive(Clone, Default)]
pub struct BackendState {
    collections: Collections,
}

impl BackendState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load one collection, keeping whatever ids the records carry.
    pub async fn seed(&self, kind: ResourceKind, records: Vec<Value>) {
        self.collections.write().await.insert(kind, records);
    }

    pub async fn records(&self, kind: ResourceKind) -> Vec<Value> {
        self.collections.read().await.get(&kind).cloned().unwrap_or_default()
    }
}

pub fn router(state: BackendState, auth: AuthState, security: &SecurityConfig) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/:resource", get(list).post(create))
        .route("/:resource/:id", put(update).delete(remove))
        .layer(from_fn_with_state(auth, require_auth))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> impl IntoResponse {
    Json(user)
}

fn resource_kind(resource: &str) -> Result<ResourceKind, ApiError> {
    ResourceKind::from_path(resource).ok_or_else(|| ApiError::not_found(format!("unknown resource '{}'", resource)))
}

/// The one record a path id addresses. An id of the same JSON type wins
/// over one that only renders the same.
fn position_of(records: &[Value], id: &str) -> Option<usize> {
    let wanted = RecordId::parse_loose(id);
    records
        .iter()
        .position(|r| r.id().as_ref() == Some(&wanted))
        .or_else(|| records.iter().position(|r| r.id().map(|rid| rid.to_string() == id).unwrap_or(false)))
}

fn into_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match payload? {
        Json(Value::Object(record)) => Ok(record),
        Json(_) => Err(ApiError::bad_request("record must be a JSON object")),
    }
}

/// GET /:resource
async fn list(State(state): State<BackendState>, Path(resource): Path<String>) -> Result<Json<Value>, ApiError> {
    let kind = resource_kind(&resource)?;
    Ok(Json(Value::Array(state.records(kind).await)))
}

/// POST /:resource
async fn create(
    State(state): State<BackendState>,
    Path(resource): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = resource_kind(&resource)?;
    let mut record = into_object(payload)?;

    let id = uuid::Uuid::new_v4().simple().to_string();
    record.insert("id".to_string(), Value::String(id.clone()));
    let record = Value::Object(record);

    state.collections.write().await.entry(kind).or_default().push(record.clone());
    tracing::debug!("Created {}/{}", kind.path(), id);

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /:resource/:id
async fn update(
    State(state): State<BackendState>,
    Path((resource, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let kind = resource_kind(&resource)?;
    let mut record = into_object(payload)?;

    let mut collections = state.collections.write().await;
    let slot = collections
        .get_mut(&kind)
        .and_then(|records| position_of(records, &id).map(move |index| &mut records[index]))
        .ok_or_else(|| ApiError::not_found(format!("{}/{} not found", kind.path(), id)))?;

    // The stored id keeps its original JSON type.
    let stored_id = slot.get("id").cloned().unwrap_or_else(|| Value::String(id.clone()));
    record.insert("id".to_string(), stored_id);
    *slot = Value::Object(record);

    Ok(Json(slot.clone()))
}

/// DELETE /:resource/:id
async fn remove(
    State(state): State<BackendState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resource_kind(&resource)?;

    let mut collections = state.collections.write().await;
    let records = collections.entry(kind).or_default();
    let index = position_of(records, &id)
        .ok_or_else(|| ApiError::not_found(format!("{}/{} not found", kind.path(), id)))?;
    records.remove(index);

    tracing::debug!("Deleted {}/{}", kind.path(), RecordId::parse_loose(&id));
    Ok(Json(json!({})))
}
