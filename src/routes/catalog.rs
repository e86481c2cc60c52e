use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extractors::PathId;
use crate::state::AppState;
use crate::storage::models::{
    Class, NewBook, NewChapter, NewClass, NewResource, NewSubject, NewTopic,
};
use crate::storage::Storage;

// --- Query filters ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterFilter {
    pub subject_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFilter {
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/classes", get(list_classes).post(create_class))
        .route("/api/classes/{key}", get(get_class))
        .route("/api/classes/{key}/subjects", get(class_subjects))
        .route("/api/subjects", get(list_subjects).post(create_subject))
        .route("/api/subjects/{id}", get(get_subject))
        .route("/api/subjects/{id}/chapters", get(subject_chapters))
        .route("/api/subjects/{id}/resources", get(subject_resources))
        .route("/api/chapters", get(list_chapters).post(create_chapter))
        .route("/api/chapters/{id}", get(get_chapter).delete(delete_chapter))
        .route("/api/chapters/{id}/topics", get(chapter_topics))
        .route("/api/topics", post(create_topic))
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/featured", get(featured_books))
        .route("/api/books/{id}", get(get_book).delete(delete_book))
        .route("/api/resources", get(list_resources).post(create_resource))
        .route(
            "/api/resources/{id}",
            get(get_resource).delete(delete_resource),
        )
}

/// Classes are addressable by numeric id or by name. A numeric key is tried
/// as an id first and falls back to a name lookup, so a class literally named
/// "13" still resolves.
async fn resolve_class(storage: &dyn Storage, key: &str) -> AppResult<Option<Class>> {
    if let Ok(id) = key.parse::<i64>() {
        if let Some(class) = storage.get_class(id).await? {
            return Ok(Some(class));
        }
    }
    Ok(storage.get_class_by_name(key).await?)
}

// --- Class handlers ---

async fn list_classes(State(state): State<AppState>) -> AppResult<Response> {
    let classes = state.storage.get_all_classes().await?;
    Ok(Json(classes).into_response())
}

async fn get_class(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let class = resolve_class(state.storage.as_ref(), &key)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".into()))?;
    Ok(Json(class).into_response())
}

async fn create_class(
    State(state): State<AppState>,
    payload: Result<Json<NewClass>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_class) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_class.validate().map_err(AppError::BadRequest)?;
    let class = state.storage.create_class(new_class).await?;
    Ok((StatusCode::CREATED, Json(class)).into_response())
}

async fn class_subjects(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let subjects = match resolve_class(state.storage.as_ref(), &key).await? {
        Some(class) => state.storage.get_subjects_by_class(class.id).await?,
        None => Vec::new(),
    };
    Ok(Json(subjects).into_response())
}

// --- Subject handlers ---

async fn list_subjects(State(state): State<AppState>) -> AppResult<Response> {
    let subjects = state.storage.get_all_subjects().await?;
    Ok(Json(subjects).into_response())
}

async fn get_subject(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let subject = state
        .storage
        .get_subject(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".into()))?;
    Ok(Json(subject).into_response())
}

async fn create_subject(
    State(state): State<AppState>,
    payload: Result<Json<NewSubject>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_subject) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_subject.validate().map_err(AppError::BadRequest)?;
    let subject = state.storage.create_subject(new_subject).await?;
    Ok((StatusCode::CREATED, Json(subject)).into_response())
}

async fn subject_chapters(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let chapters = state.storage.get_chapters_by_subject(id).await?;
    Ok(Json(chapters).into_response())
}

async fn subject_resources(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let resources = state.storage.get_resources_by_subject(id).await?;
    Ok(Json(resources).into_response())
}

// --- Chapter handlers ---

async fn list_chapters(
    State(state): State<AppState>,
    Query(filter): Query<ChapterFilter>,
) -> AppResult<Response> {
    let chapters = match filter.subject_id {
        Some(subject_id) => state.storage.get_chapters_by_subject(subject_id).await?,
        None => state.storage.get_all_chapters().await?,
    };
    Ok(Json(chapters).into_response())
}

async fn get_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let chapter = state
        .storage
        .get_chapter(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chapter not found".into()))?;
    Ok(Json(chapter).into_response())
}

async fn create_chapter(
    State(state): State<AppState>,
    payload: Result<Json<NewChapter>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_chapter) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_chapter.validate().map_err(AppError::BadRequest)?;
    let chapter = state.storage.create_chapter(new_chapter).await?;
    Ok((StatusCode::CREATED, Json(chapter)).into_response())
}

async fn delete_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    if !state.storage.delete_chapter(id).await? {
        return Err(AppError::NotFound("Chapter not found".into()));
    }
    Ok(Json(json!({ "message": "Chapter deleted" })).into_response())
}

// --- Topic handlers ---

async fn chapter_topics(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let topics = state.storage.get_topics_by_chapter(id).await?;
    Ok(Json(topics).into_response())
}

async fn create_topic(
    State(state): State<AppState>,
    payload: Result<Json<NewTopic>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_topic) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_topic.validate().map_err(AppError::BadRequest)?;
    let topic = state.storage.create_topic(new_topic).await?;
    Ok((StatusCode::CREATED, Json(topic)).into_response())
}

// --- Book handlers ---

async fn list_books(
    State(state): State<AppState>,
    Query(filter): Query<BookFilter>,
) -> AppResult<Response> {
    let books = match (filter.class_id, filter.subject_id) {
        (Some(class_id), Some(subject_id)) => {
            state
                .storage
                .get_books_by_class_and_subject(class_id, subject_id)
                .await?
        }
        (Some(class_id), None) => state.storage.get_books_by_class(class_id).await?,
        (None, Some(subject_id)) => state.storage.get_books_by_subject(subject_id).await?,
        (None, None) => state.storage.get_all_books().await?,
    };
    Ok(Json(books).into_response())
}

async fn featured_books(State(state): State<AppState>) -> AppResult<Response> {
    let books = state.storage.get_featured_books().await?;
    Ok(Json(books).into_response())
}

async fn get_book(State(state): State<AppState>, PathId(id): PathId) -> AppResult<Response> {
    let book = state
        .storage
        .get_book(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".into()))?;
    Ok(Json(book).into_response())
}

async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_book) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_book.validate().map_err(AppError::BadRequest)?;
    let book = state.storage.create_book(new_book).await?;
    Ok((StatusCode::CREATED, Json(book)).into_response())
}

async fn delete_book(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    if !state.storage.delete_book(id).await? {
        return Err(AppError::NotFound("Book not found".into()));
    }
    Ok(Json(json!({ "message": "Book deleted" })).into_response())
}

// --- Resource handlers ---

async fn list_resources(
    State(state): State<AppState>,
    Query(filter): Query<ResourceFilter>,
) -> AppResult<Response> {
    let resources = match (filter.class_id, filter.subject_id, filter.kind) {
        (Some(class_id), Some(subject_id), _) => {
            state
                .storage
                .get_resources_by_class_and_subject(class_id, subject_id)
                .await?
        }
        (Some(class_id), None, _) => state.storage.get_resources_by_class(class_id).await?,
        (None, Some(subject_id), _) => state.storage.get_resources_by_subject(subject_id).await?,
        (None, None, Some(kind)) => state.storage.get_resources_by_type(&kind).await?,
        (None, None, None) => state.storage.get_all_resources().await?,
    };
    Ok(Json(resources).into_response())
}

async fn get_resource(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    let resource = state
        .storage
        .get_resource(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
    Ok(Json(resource).into_response())
}

async fn create_resource(
    State(state): State<AppState>,
    payload: Result<Json<NewResource>, JsonRejection>,
) -> AppResult<Response> {
    let Json(new_resource) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_resource.validate().map_err(AppError::BadRequest)?;
    let resource = state.storage.create_resource(new_resource).await?;
    Ok((StatusCode::CREATED, Json(resource)).into_response())
}

async fn delete_resource(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Response> {
    if !state.storage.delete_resource(id).await? {
        return Err(AppError::NotFound("Resource not found".into()));
    }
    Ok(Json(json!({ "message": "Resource deleted" })).into_response())
}
