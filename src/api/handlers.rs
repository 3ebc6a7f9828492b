// HTTP handlers - thin adapters from requests onto the page, media and identity services

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Html,
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    infrastructure::{identity::SignedInSession, middleware::Vc, server_timestamp},
    models::{MediaItem, Page, PageStatus},
    pages::{render_preview, SaveOutcome},
    services::{collect_stats, DashboardStats, MediaUpload},
};

const SERVICE_NAME: &str = "Content Hub CMS API";

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store_configured = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Document store health check failed: {}", e);
            false
        }
    };
    Json(json!({
        "status": "healthy",
        "timestamp": server_timestamp(),
        "storeConfigured": store_configured
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<SignedInSession>> {
    let session = state.identity.sign_in(&request.email, &request.password).await?;
    Ok(Json(session))
}

pub async fn logout_handler(State(state): State<AppState>, vc: Vc) -> AppResult<StatusCode> {
    vc.require_user()?;
    if let Some(token) = &vc.session_token {
        state.identity.sign_out(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_pages_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Page>>> {
    Ok(Json(state.pages.list().await?))
}

pub async fn get_page_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Json<Page>> {
    state
        .pages
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))
}

pub async fn pages_by_slug_handler(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
) -> AppResult<Json<Vec<Page>>> {
    Ok(Json(state.pages.find_by_slug(&slug).await?))
}

pub async fn preview_page_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Html<String>> {
    let page = state
        .pages
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?;
    Ok(Html(render_preview(&page)))
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub draft: Page,
    #[serde(default)]
    pub status: Option<PageStatus>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    #[serde(flatten)]
    pub outcome: SaveOutcome,
    pub notice: String,
}

pub async fn save_page_handler(
    State(state): State<AppState>,
    vc: Vc,
    Json(request): Json<SaveRequest>,
) -> AppResult<Json<SaveResponse>> {
    let user = vc.require_user()?;
    let outcome = state
        .save_protocol
        .save(&request.draft, request.status, Some(user))
        .await?;
    let notice = outcome.notice();
    Ok(Json(SaveResponse { outcome, notice }))
}

pub async fn delete_page_handler(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(id): AxumPath<String>,
) -> AppResult<StatusCode> {
    vc.require_user()?;
    if !state.pages.delete(&id).await? {
        return Err(AppError::NotFound(format!("Page {} not found", id)));
    }
    info!("Deleted page {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_media_handler(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<Json<Vec<MediaItem>>> {
    vc.require_user()?;
    Ok(Json(state.media.list().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub name: String,
    #[serde(default)]
    pub content_type: String,
    /// Base64 file contents.
    pub data: String,
}

pub async fn upload_media_handler(
    State(state): State<AppState>,
    vc: Vc,
    Json(request): Json<UploadRequest>,
) -> AppResult<(StatusCode, Json<MediaItem>)> {
    let user = vc.require_user()?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(request.data.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 data: {}", e)))?;
    let max = state.config.storage.max_upload_bytes;
    if bytes.len() > max {
        return Err(AppError::BadRequest(format!(
            "File is {} bytes, the limit is {} bytes",
            bytes.len(),
            max
        )));
    }

    let item = state
        .media
        .upload(
            MediaUpload {
                name: request.name,
                content_type: request.content_type,
                bytes,
            },
            user,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn delete_media_handler(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(id): AxumPath<String>,
) -> AppResult<StatusCode> {
    vc.require_user()?;
    state.media.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<Json<DashboardStats>> {
    vc.require_user()?;
    let stats = collect_stats(
        &state.pages,
        &state.media,
        &state.activity,
        state.config.editor.activity_feed_limit,
    )
    .await?;
    Ok(Json(stats))
}
