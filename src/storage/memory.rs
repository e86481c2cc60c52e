use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::auth::generate_token;
use crate::storage::models::*;
use crate::storage::{Storage, StorageError};

struct SessionEntry {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

/// Per-entity keyed maps with monotonic id counters. Ids are unique within a
/// type only, and reset at process start. `BTreeMap` keeps iteration in id
/// order so both backends list unsorted entities identically.
#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    classes: BTreeMap<i64, Class>,
    subjects: BTreeMap<i64, Subject>,
    chapters: BTreeMap<i64, Chapter>,
    topics: BTreeMap<i64, Topic>,
    books: BTreeMap<i64, Book>,
    resources: BTreeMap<i64, Resource>,
    categories: BTreeMap<String, Category>,
    resource_types: BTreeMap<String, ResourceType>,
    resource_files: BTreeMap<i64, ResourceFile>,
    sessions: HashMap<String, SessionEntry>,

    next_user_id: i64,
    next_class_id: i64,
    next_subject_id: i64,
    next_chapter_id: i64,
    next_topic_id: i64,
    next_book_id: i64,
    next_resource_id: i64,
    next_resource_file_id: i64,
}

/// In-process storage backend. All mutations happen synchronously under one
/// mutex, never across an await point.
pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Newest first, id descending on equal timestamps.
fn by_created_desc<T, F: Fn(&T) -> (DateTime<Utc>, i64)>(items: &mut [T], key: F) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_user_id);
        let record = User {
            id,
            username: user.username,
            password: user.password,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        inner.users.insert(id, record.clone());
        Ok(record)
    }

    async fn create_session(&self, user_id: i64, hours: u64) -> Result<String, StorageError> {
        let mut inner = self.inner.lock().await;
        let token = generate_token();
        inner.sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                expires_at: Utc::now() + Duration::hours(hours as i64),
            },
        );
        Ok(token)
    }

    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StorageError> {
        let inner = self.inner.lock().await;
        let user = inner
            .sessions
            .get(token)
            .filter(|s| s.expires_at > Utc::now())
            .and_then(|s| inner.users.get(&s.user_id).cloned());
        Ok(user)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StorageError> {
        self.inner.lock().await.sessions.remove(token);
        Ok(())
    }

    async fn get_all_classes(&self) -> Result<Vec<Class>, StorageError> {
        let inner = self.inner.lock().await;
        let mut classes: Vec<Class> = inner.classes.values().cloned().collect();
        classes.sort_by_key(|c| c.order);
        Ok(classes)
    }

    async fn get_class(&self, id: i64) -> Result<Option<Class>, StorageError> {
        Ok(self.inner.lock().await.classes.get(&id).cloned())
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .classes
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create_class(&self, class: NewClass) -> Result<Class, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_class_id);
        let record = Class {
            id,
            name: class.name,
            icon: class.icon,
            description: class.description,
            order: class.order,
        };
        inner.classes.insert(id, record.clone());
        Ok(record)
    }

    async fn get_all_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        Ok(self.inner.lock().await.subjects.values().cloned().collect())
    }

    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StorageError> {
        Ok(self.inner.lock().await.subjects.get(&id).cloned())
    }

    async fn get_subjects_by_class(&self, class_id: i64) -> Result<Vec<Subject>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .subjects
            .values()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn get_subject_by_class_and_name(
        &self,
        class_id: i64,
        name: &str,
    ) -> Result<Option<Subject>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .subjects
            .values()
            .find(|s| s.class_id == class_id && s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_subject_id);
        let record = Subject {
            id,
            name: subject.name,
            class_id: subject.class_id,
            description: subject.description,
            icon: subject.icon,
        };
        inner.subjects.insert(id, record.clone());
        Ok(record)
    }

    async fn get_all_chapters(&self) -> Result<Vec<Chapter>, StorageError> {
        let inner = self.inner.lock().await;
        let mut chapters: Vec<Chapter> = inner.chapters.values().cloned().collect();
        chapters.sort_by_key(|c| c.order);
        Ok(chapters)
    }

    async fn get_chapter(&self, id: i64) -> Result<Option<Chapter>, StorageError> {
        Ok(self.inner.lock().await.chapters.get(&id).cloned())
    }

    async fn get_chapters_by_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Chapter>, StorageError> {
        let inner = self.inner.lock().await;
        let mut chapters: Vec<Chapter> = inner
            .chapters
            .values()
            .filter(|c| c.subject_id == subject_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| c.order);
        Ok(chapters)
    }

    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_chapter_id);
        let record = Chapter {
            id,
            name: chapter.name,
            subject_id: chapter.subject_id,
            description: chapter.description,
            lessons: chapter.lessons,
            practices: chapter.practices,
            status: chapter.status,
            order: chapter.order,
        };
        inner.chapters.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_chapter(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.chapters.remove(&id).is_some())
    }

    async fn get_topics_by_chapter(&self, chapter_id: i64) -> Result<Vec<Topic>, StorageError> {
        let inner = self.inner.lock().await;
        let mut topics: Vec<Topic> = inner
            .topics
            .values()
            .filter(|t| t.chapter_id == chapter_id)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.order);
        Ok(topics)
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_topic_id);
        let record = Topic {
            id,
            name: topic.name,
            chapter_id: topic.chapter_id,
            description: topic.description,
            order: topic.order,
        };
        inner.topics.insert(id, record.clone());
        Ok(record)
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, StorageError> {
        Ok(self.inner.lock().await.books.values().cloned().collect())
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, StorageError> {
        Ok(self.inner.lock().await.books.get(&id).cloned())
    }

    async fn get_books_by_class(&self, class_id: i64) -> Result<Vec<Book>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .books
            .values()
            .filter(|b| b.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn get_books_by_subject(&self, subject_id: i64) -> Result<Vec<Book>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .books
            .values()
            .filter(|b| b.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn get_books_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Book>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .books
            .values()
            .filter(|b| b.class_id == class_id && b.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn get_featured_books(&self) -> Result<Vec<Book>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .books
            .values()
            .filter(|b| b.featured)
            .cloned()
            .collect())
    }

    async fn create_book(&self, book: NewBook) -> Result<Book, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_book_id);
        let record = Book {
            id,
            title: book.title,
            author: book.author,
            description: book.description,
            cover_image: book.cover_image,
            format: book.format,
            page_count: book.page_count,
            file_url: book.file_url,
            subject_id: book.subject_id,
            class_id: book.class_id,
            topics: book.topics,
            ref_number: book.ref_number,
            featured: book.featured,
            recommended: book.recommended,
            download_count: 0,
            rating: book.rating,
            created_at: Utc::now(),
        };
        inner.books.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_book(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.books.remove(&id).is_some())
    }

    async fn get_all_resources(&self) -> Result<Vec<Resource>, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .resources
            .values()
            .cloned()
            .collect())
    }

    async fn get_resource(&self, id: i64) -> Result<Option<Resource>, StorageError> {
        Ok(self.inner.lock().await.resources.get(&id).cloned())
    }

    async fn get_resources_by_class(&self, class_id: i64) -> Result<Vec<Resource>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .resources
            .values()
            .filter(|r| r.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn get_resources_by_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .resources
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn get_resources_by_type(&self, kind: &str) -> Result<Vec<Resource>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .resources
            .values()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    async fn get_resources_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .resources
            .values()
            .filter(|r| r.class_id == class_id && r.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn create_resource(&self, resource: NewResource) -> Result<Resource, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_resource_id);
        let record = Resource {
            id,
            title: resource.title,
            description: resource.description,
            kind: resource.kind,
            icon: resource.icon,
            count: resource.count,
            metadata: resource.metadata,
            subject_id: resource.subject_id,
            class_id: resource.class_id,
            chapter_id: resource.chapter_id,
            featured: resource.featured,
            created_at: Utc::now(),
        };
        inner.resources.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_resource(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.resources.remove(&id).is_some())
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .categories
            .values()
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: &str) -> Result<Option<Category>, StorageError> {
        Ok(self.inner.lock().await.categories.get(id).cloned())
    }

    async fn create_category(&self, category: Category) -> Result<Category, StorageError> {
        let mut inner = self.inner.lock().await;
        inner
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn get_all_resource_types(&self) -> Result<Vec<ResourceType>, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .resource_types
            .values()
            .cloned()
            .collect())
    }

    async fn get_resource_type(&self, id: &str) -> Result<Option<ResourceType>, StorageError> {
        Ok(self.inner.lock().await.resource_types.get(id).cloned())
    }

    async fn create_resource_type(
        &self,
        resource_type: ResourceType,
    ) -> Result<ResourceType, StorageError> {
        let mut inner = self.inner.lock().await;
        inner
            .resource_types
            .insert(resource_type.id.clone(), resource_type.clone());
        Ok(resource_type)
    }

    async fn get_resource_file(&self, id: i64) -> Result<Option<ResourceFile>, StorageError> {
        Ok(self.inner.lock().await.resource_files.get(&id).cloned())
    }

    async fn get_resource_files_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ResourceFile>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .resource_files
            .values()
            .filter(|f| f.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn get_featured_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError> {
        let inner = self.inner.lock().await;
        let mut files: Vec<ResourceFile> = inner
            .resource_files
            .values()
            .filter(|f| f.is_featured)
            .cloned()
            .collect();
        by_created_desc(&mut files, |f| (f.created_at, f.id));
        files.truncate(3);
        Ok(files)
    }

    async fn get_recent_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError> {
        let inner = self.inner.lock().await;
        let mut files: Vec<ResourceFile> = inner.resource_files.values().cloned().collect();
        by_created_desc(&mut files, |f| (f.created_at, f.id));
        files.truncate(5);
        Ok(files)
    }

    async fn create_resource_file(
        &self,
        file: NewResourceFile,
    ) -> Result<ResourceFile, StorageError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(&mut inner.next_resource_file_id);
        let now = Utc::now();
        let record = ResourceFile {
            id,
            title: file.title,
            description: file.description,
            file_size: file.file_size,
            file_name: file.file_name,
            file_path: file.file_path,
            category_id: file.category_id,
            category_name: file.category_name,
            type_id: file.type_id,
            type_name: file.type_name,
            is_featured: file.is_featured,
            uploaded_by: file.uploaded_by,
            download_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.resource_files.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_resource_file(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.resource_files.remove(&id).is_some())
    }

    async fn record_download(&self, id: i64) -> Result<Option<ResourceFile>, StorageError> {
        let mut inner = self.inner.lock().await;
        match inner.resource_files.get_mut(&id) {
            Some(file) => {
                file.download_count += 1;
                file.updated_at = Utc::now();
                Ok(Some(file.clone()))
            }
            None => Ok(None),
        }
    }
}
