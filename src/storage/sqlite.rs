use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::generate_token;
use crate::db::DbPool;
use crate::storage::models::*;
use crate::storage::{Storage, StorageError};

/// SQLite-backed storage. Every operation is a single independent statement;
/// no multi-statement transactions are needed anywhere in the catalog.
pub struct SqliteStorage {
    pool: DbPool,
}

impl SqliteStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn invalid_column(
    idx: usize,
    what: &str,
    value: &str,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("invalid {}: {}", what, value).into(),
    )
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_class(row: &Row) -> rusqlite::Result<Class> {
    Ok(Class {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        description: row.get(3)?,
        order: row.get(4)?,
    })
}

fn row_to_subject(row: &Row) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
    })
}

fn row_to_chapter(row: &Row) -> rusqlite::Result<Chapter> {
    let status: String = row.get(6)?;
    Ok(Chapter {
        id: row.get(0)?,
        name: row.get(1)?,
        subject_id: row.get(2)?,
        description: row.get(3)?,
        lessons: row.get(4)?,
        practices: row.get(5)?,
        status: ChapterStatus::parse(&status)
            .ok_or_else(|| invalid_column(6, "chapter status", &status))?,
        order: row.get(7)?,
    })
}

fn row_to_topic(row: &Row) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        name: row.get(1)?,
        chapter_id: row.get(2)?,
        description: row.get(3)?,
        order: row.get(4)?,
    })
}

fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    let format: String = row.get(5)?;
    let topics_json: String = row.get(10)?;
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
        cover_image: row.get(4)?,
        format: BookFormat::parse(&format)
            .ok_or_else(|| invalid_column(5, "book format", &format))?,
        page_count: row.get(6)?,
        file_url: row.get(7)?,
        subject_id: row.get(8)?,
        class_id: row.get(9)?,
        topics: serde_json::from_str(&topics_json)
            .map_err(|_| invalid_column(10, "book topics", &topics_json))?,
        ref_number: row.get(11)?,
        featured: row.get(12)?,
        recommended: row.get(13)?,
        download_count: row.get(14)?,
        rating: row.get(15)?,
        created_at: row.get(16)?,
    })
}

fn row_to_resource(row: &Row) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        icon: row.get(4)?,
        count: row.get(5)?,
        metadata: row.get(6)?,
        subject_id: row.get(7)?,
        class_id: row.get(8)?,
        chapter_id: row.get(9)?,
        featured: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn row_to_resource_type(row: &Row) -> rusqlite::Result<ResourceType> {
    Ok(ResourceType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn row_to_resource_file(row: &Row) -> rusqlite::Result<ResourceFile> {
    Ok(ResourceFile {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        file_size: row.get(3)?,
        file_name: row.get(4)?,
        file_path: row.get(5)?,
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        type_id: row.get(8)?,
        type_name: row.get(9)?,
        is_featured: row.get(10)?,
        uploaded_by: row.get(11)?,
        download_count: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

const USER_COLS: &str = "id, username, password, is_admin, created_at";
const CLASS_COLS: &str = "id, name, icon, description, sort_order";
const SUBJECT_COLS: &str = "id, name, class_id, description, icon";
const CHAPTER_COLS: &str =
    "id, name, subject_id, description, lessons, practices, status, sort_order";
const TOPIC_COLS: &str = "id, name, chapter_id, description, sort_order";
const BOOK_COLS: &str = "id, title, author, description, cover_image, format, page_count, \
     file_url, subject_id, class_id, topics, ref_number, featured, recommended, \
     download_count, rating, created_at";
const RESOURCE_COLS: &str = "id, title, description, kind, icon, count, metadata, subject_id, \
     class_id, chapter_id, featured, created_at";
const FILE_COLS: &str = "id, title, description, file_size, file_name, file_path, category_id, \
     category_name, type_id, type_name, is_featured, uploaded_by, download_count, \
     created_at, updated_at";

fn query_list<T>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_user).optional()?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLS);
        Ok(conn
            .query_row(&sql, params![username], row_to_user)
            .optional()?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (username, password, is_admin, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.username, user.password, user.is_admin, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_user)?)
    }

    async fn create_session(&self, user_id: i64, hours: u64) -> Result<String, StorageError> {
        let conn = self.pool.get()?;
        let token = generate_token();
        let expires_at: DateTime<Utc> = Utc::now() + Duration::hours(hours as i64);
        conn.execute(
            "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![generate_token(), user_id, token, expires_at],
        )?;
        Ok(token)
    }

    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StorageError> {
        let conn = self.pool.get()?;
        let sql = "SELECT u.id, u.username, u.password, u.is_admin, u.created_at \
             FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > ?2";
        Ok(conn
            .query_row(sql, params![token, Utc::now()], row_to_user)
            .optional()?)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    async fn get_all_classes(&self) -> Result<Vec<Class>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM classes ORDER BY sort_order, id", CLASS_COLS);
        query_list(&conn, &sql, [], row_to_class)
    }

    async fn get_class(&self, id: i64) -> Result<Option<Class>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM classes WHERE id = ?1", CLASS_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_class).optional()?)
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM classes WHERE name = ?1 COLLATE NOCASE",
            CLASS_COLS
        );
        Ok(conn.query_row(&sql, params![name], row_to_class).optional()?)
    }

    async fn create_class(&self, class: NewClass) -> Result<Class, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO classes (name, icon, description, sort_order) VALUES (?1, ?2, ?3, ?4)",
            params![class.name, class.icon, class.description, class.order],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM classes WHERE id = ?1", CLASS_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_class)?)
    }

    async fn get_all_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM subjects ORDER BY id", SUBJECT_COLS);
        query_list(&conn, &sql, [], row_to_subject)
    }

    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM subjects WHERE id = ?1", SUBJECT_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_subject).optional()?)
    }

    async fn get_subjects_by_class(&self, class_id: i64) -> Result<Vec<Subject>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM subjects WHERE class_id = ?1 ORDER BY id",
            SUBJECT_COLS
        );
        query_list(&conn, &sql, params![class_id], row_to_subject)
    }

    async fn get_subject_by_class_and_name(
        &self,
        class_id: i64,
        name: &str,
    ) -> Result<Option<Subject>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM subjects WHERE class_id = ?1 AND name = ?2 COLLATE NOCASE",
            SUBJECT_COLS
        );
        Ok(conn
            .query_row(&sql, params![class_id, name], row_to_subject)
            .optional()?)
    }

    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO subjects (name, class_id, description, icon) VALUES (?1, ?2, ?3, ?4)",
            params![
                subject.name,
                subject.class_id,
                subject.description,
                subject.icon
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM subjects WHERE id = ?1", SUBJECT_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_subject)?)
    }

    async fn get_all_chapters(&self) -> Result<Vec<Chapter>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM chapters ORDER BY sort_order, id",
            CHAPTER_COLS
        );
        query_list(&conn, &sql, [], row_to_chapter)
    }

    async fn get_chapter(&self, id: i64) -> Result<Option<Chapter>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM chapters WHERE id = ?1", CHAPTER_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_chapter).optional()?)
    }

    async fn get_chapters_by_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Chapter>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM chapters WHERE subject_id = ?1 ORDER BY sort_order, id",
            CHAPTER_COLS
        );
        query_list(&conn, &sql, params![subject_id], row_to_chapter)
    }

    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO chapters (name, subject_id, description, lessons, practices, status, sort_order) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                chapter.name,
                chapter.subject_id,
                chapter.description,
                chapter.lessons,
                chapter.practices,
                chapter.status.as_str(),
                chapter.order
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM chapters WHERE id = ?1", CHAPTER_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_chapter)?)
    }

    async fn delete_chapter(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM chapters WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn get_topics_by_chapter(&self, chapter_id: i64) -> Result<Vec<Topic>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM topics WHERE chapter_id = ?1 ORDER BY sort_order, id",
            TOPIC_COLS
        );
        query_list(&conn, &sql, params![chapter_id], row_to_topic)
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO topics (name, chapter_id, description, sort_order) VALUES (?1, ?2, ?3, ?4)",
            params![topic.name, topic.chapter_id, topic.description, topic.order],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM topics WHERE id = ?1", TOPIC_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_topic)?)
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM books ORDER BY id", BOOK_COLS);
        query_list(&conn, &sql, [], row_to_book)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_book).optional()?)
    }

    async fn get_books_by_class(&self, class_id: i64) -> Result<Vec<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM books WHERE class_id = ?1 ORDER BY id",
            BOOK_COLS
        );
        query_list(&conn, &sql, params![class_id], row_to_book)
    }

    async fn get_books_by_subject(&self, subject_id: i64) -> Result<Vec<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM books WHERE subject_id = ?1 ORDER BY id",
            BOOK_COLS
        );
        query_list(&conn, &sql, params![subject_id], row_to_book)
    }

    async fn get_books_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM books WHERE class_id = ?1 AND subject_id = ?2 ORDER BY id",
            BOOK_COLS
        );
        query_list(&conn, &sql, params![class_id, subject_id], row_to_book)
    }

    async fn get_featured_books(&self) -> Result<Vec<Book>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM books WHERE featured ORDER BY id", BOOK_COLS);
        query_list(&conn, &sql, [], row_to_book)
    }

    async fn create_book(&self, book: NewBook) -> Result<Book, StorageError> {
        let conn = self.pool.get()?;
        let topics = serde_json::to_string(&book.topics)?;
        conn.execute(
            "INSERT INTO books (title, author, description, cover_image, format, page_count, \
             file_url, subject_id, class_id, topics, ref_number, featured, recommended, \
             download_count, rating, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, ?14, ?15)",
            params![
                book.title,
                book.author,
                book.description,
                book.cover_image,
                book.format.as_str(),
                book.page_count,
                book.file_url,
                book.subject_id,
                book.class_id,
                topics,
                book.ref_number,
                book.featured,
                book.recommended,
                book.rating,
                Utc::now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_book)?)
    }

    async fn delete_book(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn get_all_resources(&self) -> Result<Vec<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM resources ORDER BY id", RESOURCE_COLS);
        query_list(&conn, &sql, [], row_to_resource)
    }

    async fn get_resource(&self, id: i64) -> Result<Option<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM resources WHERE id = ?1", RESOURCE_COLS);
        Ok(conn
            .query_row(&sql, params![id], row_to_resource)
            .optional()?)
    }

    async fn get_resources_by_class(&self, class_id: i64) -> Result<Vec<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resources WHERE class_id = ?1 ORDER BY id",
            RESOURCE_COLS
        );
        query_list(&conn, &sql, params![class_id], row_to_resource)
    }

    async fn get_resources_by_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resources WHERE subject_id = ?1 ORDER BY id",
            RESOURCE_COLS
        );
        query_list(&conn, &sql, params![subject_id], row_to_resource)
    }

    async fn get_resources_by_type(&self, kind: &str) -> Result<Vec<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resources WHERE kind = ?1 ORDER BY id",
            RESOURCE_COLS
        );
        query_list(&conn, &sql, params![kind], row_to_resource)
    }

    async fn get_resources_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Resource>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resources WHERE class_id = ?1 AND subject_id = ?2 ORDER BY id",
            RESOURCE_COLS
        );
        query_list(&conn, &sql, params![class_id, subject_id], row_to_resource)
    }

    async fn create_resource(&self, resource: NewResource) -> Result<Resource, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO resources (title, description, kind, icon, count, metadata, subject_id, \
             class_id, chapter_id, featured, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                resource.title,
                resource.description,
                resource.kind,
                resource.icon,
                resource.count,
                resource.metadata,
                resource.subject_id,
                resource.class_id,
                resource.chapter_id,
                resource.featured,
                Utc::now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM resources WHERE id = ?1", RESOURCE_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_resource)?)
    }

    async fn delete_resource(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM resources WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>, StorageError> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            "SELECT id, name, description FROM categories ORDER BY id",
            [],
            row_to_category,
        )
    }

    async fn get_category(&self, id: &str) -> Result<Option<Category>, StorageError> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT id, name, description FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?)
    }

    async fn create_category(&self, category: Category) -> Result<Category, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO categories (id, name, description) VALUES (?1, ?2, ?3)",
            params![category.id, category.name, category.description],
        )?;
        Ok(category)
    }

    async fn get_all_resource_types(&self) -> Result<Vec<ResourceType>, StorageError> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            "SELECT id, name, description FROM resource_types ORDER BY id",
            [],
            row_to_resource_type,
        )
    }

    async fn get_resource_type(&self, id: &str) -> Result<Option<ResourceType>, StorageError> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT id, name, description FROM resource_types WHERE id = ?1",
                params![id],
                row_to_resource_type,
            )
            .optional()?)
    }

    async fn create_resource_type(
        &self,
        resource_type: ResourceType,
    ) -> Result<ResourceType, StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO resource_types (id, name, description) VALUES (?1, ?2, ?3)",
            params![
                resource_type.id,
                resource_type.name,
                resource_type.description
            ],
        )?;
        Ok(resource_type)
    }

    async fn get_resource_file(&self, id: i64) -> Result<Option<ResourceFile>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM resource_files WHERE id = ?1", FILE_COLS);
        Ok(conn
            .query_row(&sql, params![id], row_to_resource_file)
            .optional()?)
    }

    async fn get_resource_files_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ResourceFile>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resource_files WHERE category_id = ?1 ORDER BY id",
            FILE_COLS
        );
        query_list(&conn, &sql, params![category_id], row_to_resource_file)
    }

    async fn get_featured_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resource_files WHERE is_featured \
             ORDER BY created_at DESC, id DESC LIMIT 3",
            FILE_COLS
        );
        query_list(&conn, &sql, [], row_to_resource_file)
    }

    async fn get_recent_resource_files(&self) -> Result<Vec<ResourceFile>, StorageError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM resource_files ORDER BY created_at DESC, id DESC LIMIT 5",
            FILE_COLS
        );
        query_list(&conn, &sql, [], row_to_resource_file)
    }

    async fn create_resource_file(
        &self,
        file: NewResourceFile,
    ) -> Result<ResourceFile, StorageError> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO resource_files (title, description, file_size, file_name, file_path, \
             category_id, category_name, type_id, type_name, is_featured, uploaded_by, \
             download_count, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12, ?13)",
            params![
                file.title,
                file.description,
                file.file_size,
                file.file_name,
                file.file_path,
                file.category_id,
                file.category_name,
                file.type_id,
                file.type_name,
                file.is_featured,
                file.uploaded_by,
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {} FROM resource_files WHERE id = ?1", FILE_COLS);
        Ok(conn.query_row(&sql, params![id], row_to_resource_file)?)
    }

    async fn delete_resource_file(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM resource_files WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn record_download(&self, id: i64) -> Result<Option<ResourceFile>, StorageError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE resource_files SET download_count = download_count + 1, updated_at = ?2 \
             WHERE id = ?1",
            params![id, Utc::now()],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        let sql = format!("SELECT {} FROM resource_files WHERE id = ?1", FILE_COLS);
        Ok(conn
            .query_row(&sql, params![id], row_to_resource_file)
            .optional()?)
    }
}
