use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account. The password is a bcrypt hash and never leaves the
/// server: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Top-level educational track (grade level or competitive exam).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i64,
}

impl NewClass {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Class name is required".into());
        }
        if self.icon.trim().is_empty() {
            return Err("Class icon is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub class_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewSubject {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Subject name is required".into());
        }
        Ok(())
    }
}

/// Completion status shown against a chapter in the curriculum view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterStatus {
    New,
    InProgress,
    Completed,
}

impl Default for ChapterStatus {
    fn default() -> Self {
        ChapterStatus::New
    }
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::New => "new",
            ChapterStatus::InProgress => "in-progress",
            ChapterStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ChapterStatus::New),
            "in-progress" => Some(ChapterStatus::InProgress),
            "completed" => Some(ChapterStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i64,
    pub name: String,
    pub subject_id: i64,
    pub description: Option<String>,
    pub lessons: i64,
    pub practices: i64,
    pub status: ChapterStatus,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChapter {
    pub name: String,
    pub subject_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lessons: i64,
    #[serde(default)]
    pub practices: i64,
    #[serde(default)]
    pub status: ChapterStatus,
    pub order: i64,
}

impl NewChapter {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Chapter name is required".into());
        }
        if self.lessons < 0 || self.practices < 0 {
            return Err("Lesson and practice counts cannot be negative".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub chapter_id: i64,
    pub description: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub name: String,
    pub chapter_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i64,
}

impl NewTopic {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Topic name is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookFormat {
    Pdf,
    Epub,
    Mobi,
}

impl BookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "PDF",
            BookFormat::Epub => "EPUB",
            BookFormat::Mobi => "MOBI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PDF" => Some(BookFormat::Pdf),
            "EPUB" => Some(BookFormat::Epub),
            "MOBI" => Some(BookFormat::Mobi),
            _ => None,
        }
    }
}

/// Downloadable book attached to a subject/class pair. `rating` is stored on
/// a 0–50 scale (displayed rating × 10); `download_count` is server-owned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: String,
    pub cover_image: Option<String>,
    pub format: BookFormat,
    pub page_count: Option<i64>,
    pub file_url: String,
    pub subject_id: i64,
    pub class_id: i64,
    pub topics: Vec<String>,
    pub ref_number: Option<String>,
    pub featured: bool,
    pub recommended: bool,
    pub download_count: i64,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub format: BookFormat,
    #[serde(default)]
    pub page_count: Option<i64>,
    pub file_url: String,
    pub subject_id: i64,
    pub class_id: i64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub ref_number: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub rating: i64,
}

impl NewBook {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Book title is required".into());
        }
        if self.file_url.trim().is_empty() {
            return Err("Book file URL is required".into());
        }
        if !(0..=50).contains(&self.rating) {
            return Err("Book rating must be between 0 and 50".into());
        }
        if let Some(ref_number) = &self.ref_number {
            if ref_number.len() > 10 {
                return Err("Reference number must be 10 characters or less".into());
            }
        }
        Ok(())
    }
}

/// Curriculum resource (videos, papers, experiments, notes...) attached to a
/// subject/class pair and optionally a chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: Option<String>,
    pub count: i64,
    pub metadata: Option<String>,
    pub subject_id: i64,
    pub class_id: i64,
    pub chapter_id: Option<i64>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub metadata: Option<String>,
    pub subject_id: i64,
    pub class_id: i64,
    #[serde(default)]
    pub chapter_id: Option<i64>,
    #[serde(default)]
    pub featured: bool,
}

impl NewResource {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Resource title is required".into());
        }
        if self.kind.trim().is_empty() {
            return Err("Resource type is required".into());
        }
        if self.count < 0 {
            return Err("Resource count cannot be negative".into());
        }
        Ok(())
    }
}

/// Static, slug-keyed reference list entry for the flat library.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Uploaded file in the flat library. Category and type names are copied in
/// at write time, not derived at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFile {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub file_size: String,
    pub file_name: String,
    pub file_path: String,
    pub category_id: String,
    pub category_name: String,
    pub type_id: String,
    pub type_name: String,
    pub is_featured: bool,
    pub uploaded_by: Option<i64>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResourceFile {
    pub title: String,
    pub description: String,
    pub file_size: String,
    pub file_name: String,
    pub file_path: String,
    pub category_id: String,
    pub category_name: String,
    pub type_id: String,
    pub type_name: String,
    pub is_featured: bool,
    pub uploaded_by: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> NewBook {
        NewBook {
            title: "Concepts of Physics".into(),
            author: Some("H.C. Verma".into()),
            description: "Mechanics and waves".into(),
            cover_image: None,
            format: BookFormat::Pdf,
            page_count: Some(462),
            file_url: "/files/hcv-1.pdf".into(),
            subject_id: 1,
            class_id: 2,
            topics: vec!["mechanics".into()],
            ref_number: Some("PHY-11-01".into()),
            featured: false,
            recommended: true,
            rating: 45,
        }
    }

    #[test]
    fn book_rating_boundaries() {
        let mut book = sample_book();
        book.rating = 0;
        assert!(book.validate().is_ok());
        book.rating = 50;
        assert!(book.validate().is_ok());
        book.rating = 60;
        assert!(book.validate().is_err());
        book.rating = -1;
        assert!(book.validate().is_err());
    }

    #[test]
    fn book_ref_number_length_capped() {
        let mut book = sample_book();
        book.ref_number = Some("ABCDEFGHIJK".into()); // 11 chars
        assert!(book.validate().is_err());
        book.ref_number = Some("ABCDEFGHIJ".into()); // 10 chars
        assert!(book.validate().is_ok());
    }

    #[test]
    fn blank_names_rejected() {
        let class = NewClass {
            name: "  ".into(),
            icon: "flask".into(),
            description: None,
            order: 1,
        };
        assert!(class.validate().is_err());

        let subject = NewSubject {
            name: String::new(),
            class_id: 1,
            description: None,
            icon: None,
        };
        assert!(subject.validate().is_err());
    }

    #[test]
    fn chapter_status_round_trips() {
        for status in [
            ChapterStatus::New,
            ChapterStatus::InProgress,
            ChapterStatus::Completed,
        ] {
            assert_eq!(ChapterStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ChapterStatus::parse("done"), None);
    }

    #[test]
    fn chapter_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ChapterStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn book_format_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&BookFormat::Pdf).unwrap(), "\"PDF\"");
        assert_eq!(BookFormat::parse("EPUB"), Some(BookFormat::Epub));
        assert_eq!(BookFormat::parse("pdf"), None);
    }

    #[test]
    fn resource_type_field_renamed_on_wire() {
        let resource = Resource {
            id: 1,
            title: "Lab videos".into(),
            description: None,
            kind: "video".into(),
            icon: None,
            count: 12,
            metadata: Some("12 videos".into()),
            subject_id: 1,
            class_id: 2,
            chapter_id: None,
            featured: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["subjectId"], 1);
    }

    #[test]
    fn user_password_never_serialized() {
        let user = User {
            id: 1,
            username: "admin".into(),
            password: "$2b$12$secret".into(),
            is_admin: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["isAdmin"], true);
    }
}
