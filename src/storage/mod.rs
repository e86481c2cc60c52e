// Repository pattern - single source of truth for all catalog entities
pub mod memory;
pub mod models;
pub mod seed;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use memory::MemStorage;
pub use sqlite::SqliteStorage;

use models::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Catalog repository contract. Two interchangeable implementations exist
/// (in-memory and SQLite); the backend is selected once at process start.
///
/// Lookups signal absence with `Ok(None)` / `Ok(false)`, never an error.
/// Foreign keys are not validated on insert; shape validation belongs to the
/// HTTP layer.
#[async_trait]
pub trait Storage: Send + Sync {
    // User operations
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    // Session operations
    async fn create_session(&self, user_id: i64, hours: u64) -> Result<String, StorageError>;
    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StorageError>;
    async fn delete_session(&self, token: &str) -> Result<(), StorageError>;

    // Class operations
    async fn get_all_classes(&self) -> Result<Vec<Class>, StorageError>;
    async fn get_class(&self, id: i64) -> Result<Option<Class>, StorageError>;
    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>, StorageError>;
    async fn create_class(&self, class: NewClass) -> Result<Class, StorageError>;

    // Subject operations
    async fn get_all_subjects(&self) -> Result<Vec<Subject>, StorageError>;
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StorageError>;
    async fn get_subjects_by_class(&self, class_id: i64) -> Result<Vec<Subject>, StorageError>;
    async fn get_subject_by_class_and_name(
        &self,
        class_id: i64,
        name: &str,
    ) -> Result<Option<Subject>, StorageError>;
    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StorageError>;

    // Chapter operations
    async fn get_all_chapters(&self) -> Result<Vec<Chapter>, StorageError>;
    async fn get_chapter(&self, id: i64) -> Result<Option<Chapter>, StorageError>;
    async fn get_chapters_by_subject(&self, subject_id: i64) -> Result<Vec<Chapter>, StorageError>;
    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, StorageError>;
    async fn delete_chapter(&self, id: i64) -> Result<bool, StorageError>;

    // Topic operations
    async fn get_topics_by_chapter(&self, chapter_id: i64) -> Result<Vec<Topic>, StorageError>;
    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StorageError>;

    // Book operations
    async fn get_all_books(&self) -> Result<Vec<Book>, StorageError>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>, StorageError>;
    async fn get_books_by_class(&self, class_id: i64) -> Result<Vec<Book>, StorageError>;
    async fn get_books_by_subject(&self, subject_id: i64) -> Result<Vec<Book>, StorageError>;
    async fn get_books_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Book>, StorageError>;
    async fn get_featured_books(&self) -> Result<Vec<Book>, StorageError>;
    async fn create_book(&self, book: NewBook) -> Result<Book, StorageError>;
    async fn delete_book(&self, id: i64) -> Result<bool, StorageError>;

    // Resource operations
    async fn get_all_resources(&self) -> Result<Vec<Resource>, StorageError>;
    async fn get_resource(&self, id: i64) -> Result<Option<Resource>, StorageError>;
    async fn get_resources_by_class(&self, class_id: i64) -> Result<Vec<Resource>, StorageError>;
    async fn get_resources_by_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError>;
    async fn get_resources_by_type(&self, kind: &str) -> Result<Vec<Resource>, StorageError>;
    async fn get_resources_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError>;
    async fn create_resource(&self, resource: NewResource) -> Result<Resource, StorageError>;
    async fn delete_resource(&self, id: i64) -> Result<bool, StorageError>;

    // Category / resource-type reference lists
    async fn get_all_categories(&self) -> Result<Vec<Category>, StorageError>;
    async fn get_category(&self, id: &str) -> Result<Option<Category>, StorageError>;
    async fn create_category(&self, category: Category) -> Result<Category, StorageError>;
    async fn get_all_resource_types(&self) -> Result<Vec<ResourceType>, StorageError>;
    async fn get_resource_type(&self, id: &str) -> Result<Option<ResourceType>, StorageError>;
    async fn create_resource_type(
        &self,
        resource_type: ResourceType,
    ) -> Result<ResourceType, StorageError>;

    // Resource file operations
    async fn get_resource_file(&self, id: i64) -> Result<Option<ResourceFile>, StorageError>;
    async fn get_resource_files_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ResourceFile>, StorageError>;
    /// At most 3 featured files, newest first.
    async fn get_featured_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError>;
    /// At most 5 files, newest first.
    async fn get_recent_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError>;
    async fn create_resource_file(
        &self,
        file: NewResourceFile,
    ) -> Result<ResourceFile, StorageError>;
    async fn delete_resource_file(&self, id: i64) -> Result<bool, StorageError>;
    /// Increment the download counter and return the updated record.
    async fn record_download(&self, id: i64) -> Result<Option<ResourceFile>, StorageError>;
}

/// Type alias for Arc-wrapped storage (for AppState)
pub type DynStorage = Arc<dyn Storage>;
