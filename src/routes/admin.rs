use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Json, Router};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{clear_session_cookie, extract_session_token, session_cookie};
use crate::error::{AppError, AppResult};
use crate::extractors::{AdminUser, PathId};
use crate::state::AppState;
use crate::storage::models::NewResourceFile;

const UPLOAD_FIELD: &str = "pdfFile";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    // The body limit leaves headroom over the per-file cap so oversized
    // uploads reach the handler and fail with a 400 instead of a 413.
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route(
            "/api/admin/resources",
            post(upload_resource).layer(DefaultBodyLimit::max(max_upload_bytes * 2)),
        )
        .route("/api/admin/resources/{id}", delete(delete_resource_file))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let user = state
        .storage
        .get_user_by_username(&req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = bcrypt::verify(&req.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .storage
        .create_session(user.id, state.config.auth.session_hours)
        .await?;
    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    tracing::info!(username = %user.username, "Admin login");
    Ok(([(header::SET_COOKIE, cookie)], Json(user)).into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = extract_session_token(&headers, &state.config.auth.cookie_name) {
        state.storage.delete_session(token).await?;
    }
    let cookie = clear_session_cookie(&state.config.auth.cookie_name);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}

/// Multer-style generated name: `<field>-<millis>-<random><ext>`.
fn generate_stored_name(original: &str) -> String {
    let ext = std::path::Path::new(original)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}{}",
        UPLOAD_FIELD,
        chrono::Utc::now().timestamp_millis(),
        random,
        ext
    )
}

fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

struct UploadForm {
    title: Option<String>,
    description: String,
    category_id: Option<String>,
    type_id: Option<String>,
    is_featured: bool,
    file: Option<(String, Vec<u8>)>,
}

async fn read_upload_form(
    multipart: &mut Multipart,
    max_bytes: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        title: None,
        description: String::new(),
        category_id: None,
        type_id: None,
        is_featured: false,
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => form.title = Some(read_text(field).await?),
            Some("description") => form.description = read_text(field).await?,
            Some("categoryId") => form.category_id = Some(read_text(field).await?),
            Some("typeId") => form.type_id = Some(read_text(field).await?),
            Some("isFeatured") => {
                let value = read_text(field).await?;
                form.is_featured = matches!(value.as_str(), "true" | "on" | "1");
            }
            Some(UPLOAD_FIELD) => {
                if field.content_type() != Some("application/pdf") {
                    return Err(AppError::BadRequest("Only PDF files are allowed".into()));
                }
                let original = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.pdf".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Upload failed: {}", e)))?;
                if data.len() as u64 > max_bytes {
                    return Err(AppError::BadRequest(format!(
                        "File exceeds the {} MB upload limit",
                        max_bytes / (1024 * 1024)
                    )));
                }
                form.file = Some((original, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart field: {}", e)))
}

async fn upload_resource(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let form = read_upload_form(&mut multipart, state.config.max_upload_bytes()).await?;

    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Title is required".into()))?;
    let category_id = form
        .category_id
        .ok_or_else(|| AppError::BadRequest("Category is required".into()))?;
    let type_id = form
        .type_id
        .ok_or_else(|| AppError::BadRequest("Resource type is required".into()))?;
    let (original_name, data) = form
        .file
        .ok_or_else(|| AppError::BadRequest("PDF file is required".into()))?;

    // Names are copied onto the record at write time.
    let category = state
        .storage
        .get_category(&category_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid category".into()))?;
    let resource_type = state
        .storage
        .get_resource_type(&type_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid resource type".into()))?;

    let stored_name = generate_stored_name(&original_name);
    let uploads = state.config.uploads_path();
    tokio::fs::create_dir_all(uploads).await?;
    tokio::fs::write(uploads.join(&stored_name), &data).await?;

    let file = state
        .storage
        .create_resource_file(NewResourceFile {
            title,
            description: form.description,
            file_size: format_file_size(data.len() as u64),
            file_name: original_name,
            file_path: format!("/uploads/{}", stored_name),
            category_id: category.id,
            category_name: category.name,
            type_id: resource_type.id,
            type_name: resource_type.name,
            is_featured: form.is_featured,
            uploaded_by: Some(admin.id),
        })
        .await?;

    tracing::info!(id = file.id, title = %file.title, "Resource uploaded");
    Ok((StatusCode::CREATED, Json(file)).into_response())
}

async fn delete_resource_file(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    PathId(id): PathId,
) -> AppResult<Response> {
    let file = state
        .storage
        .get_resource_file(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;

    // A missing backing file is tolerated; the record still goes.
    if let Some(name) = std::path::Path::new(&file.file_path).file_name() {
        let _ = tokio::fs::remove_file(state.config.uploads_path().join(name)).await;
    }
    state.storage.delete_resource_file(id).await?;

    Ok(Json(json!({ "message": "Resource deleted" })).into_response())
}
