use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::extractors::PathId;
use crate::state::AppState;
use crate::storage::models::ResourceFile;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", get(get_category))
        .route("/api/categories/{id}/resources", get(category_resources))
        .route("/api/resource-types", get(list_resource_types))
        .route("/api/resources/featured", get(featured_resource_files))
        .route("/api/resources/recent", get(recent_resource_files))
        .route("/api/resources/{id}/download", get(download_resource_file))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.storage.get_all_categories().await?;
    Ok(Json(categories).into_response())
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let category = state
        .storage
        .get_category(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    Ok(Json(category).into_response())
}

async fn category_resources(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let files = state.storage.get_resource_files_by_category(&id).await?;
    Ok(Json(files).into_response())
}

async fn list_resource_types(State(state): State<AppState>) -> AppResult<Response> {
    let types = state.storage.get_all_resource_types().await?;
    Ok(Json(types).into_response())
}

async fn featured_resource_files(State(state): State<AppState>) -> AppResult<Response> {
    let files = state.storage.get_featured_resource_files().await?;
    Ok(Json(files).into_response())
}

async fn recent_resource_files(State(state): State<AppState>) -> AppResult<Response> {
    let files = state.storage.get_recent_resource_files().await?;
    Ok(Json(files).into_response())
}

/// Removes the wrapped path when dropped, so placeholder temp files are
/// cleaned up on every exit path out of the download handler.
struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn attachment_response(file: &ResourceFile, content_type: &str, bytes: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    (headers, bytes).into_response()
}

/// Stored paths look like `/uploads/<generated-name>`; only the final
/// component is trusted when resolving against the uploads directory.
fn disk_path(state: &AppState, file: &ResourceFile) -> AppResult<PathBuf> {
    let name = std::path::Path::new(&file.file_path)
        .file_name()
        .ok_or_else(|| AppError::Internal(format!("Malformed file path: {}", file.file_path)))?;
    Ok(state.config.uploads_path().join(name))
}

async fn download_resource_file(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let file = state
        .storage
        .get_resource_file(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;

    let path = disk_path(&state, &file)?;
    if path.is_file() {
        let bytes = tokio::fs::read(&path).await?;
        state.storage.record_download(id).await?;
        let content_type = mime_guess::from_path(&file.file_name)
            .first_or_octet_stream()
            .to_string();
        return Ok(attachment_response(&file, &content_type, bytes));
    }

    if !state.config.storage.placeholder_downloads {
        return Err(AppError::NotFound("File not found".into()));
    }

    // Demo mode: no real file on disk, so synthesize one.
    let placeholder = format!(
        "NoteSphere placeholder for \"{}\"\n\n{}\n\nCategory: {}\nType: {}\n",
        file.title, file.description, file.category_name, file.type_name
    );
    let temp_path = std::env::temp_dir().join(format!(
        "notesphere-placeholder-{}-{}.txt",
        file.id,
        chrono::Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&temp_path, placeholder.as_bytes()).await?;
    let _guard = TempFileGuard(temp_path.clone());

    let bytes = tokio::fs::read(&temp_path).await?;
    state.storage.record_download(id).await?;
    Ok(attachment_response(&file, "text/plain", bytes))
}
