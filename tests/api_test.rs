use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use notesphere::config::Config;
use notesphere::routes::build_router;
use notesphere::state::AppState;
use notesphere::storage::models::{NewResourceFile, NewUser};
use notesphere::storage::{seed, DynStorage, MemStorage, Storage};

struct TestApp {
    app: Router,
    storage: DynStorage,
    uploads: TempDir,
}

async fn test_app(seeded: bool, placeholder_downloads: bool) -> TestApp {
    let uploads = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.uploads = Some(uploads.path().to_path_buf());
    config.storage.placeholder_downloads = placeholder_downloads;

    let storage: DynStorage = Arc::new(MemStorage::new());
    if seeded {
        seed::run(storage.as_ref()).await.unwrap();
    }

    let app = build_router(AppState {
        storage: storage.clone(),
        config,
    });
    TestApp {
        app,
        storage,
        uploads,
    }
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(path: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn delete_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Logs in and returns the `name=token` pair from the Set-Cookie header.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let request = post_json(
        "/api/admin/login",
        json!({ "username": username, "password": password }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

// --- Seed + classes ---

#[tokio::test]
async fn seed_creates_five_classes_in_display_order() {
    let t = test_app(true, false).await;

    let (status, body) = send(&t.app, get("/api/classes")).await;
    assert_eq!(status, StatusCode::OK);
    let classes = body.as_array().unwrap();
    let names: Vec<&str> = classes.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["10", "11", "12", "JEE", "NEET"]);
    let orders: Vec<i64> = classes.iter().map(|c| c["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);

    // Re-running the seed must not duplicate anything
    assert!(!seed::run(t.storage.as_ref()).await.unwrap());
    let (_, body) = send(&t.app, get("/api/classes")).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn class_lookup_by_id_and_name_agree() {
    let t = test_app(true, false).await;

    let (_, by_name) = send(&t.app, get("/api/classes/JEE")).await;
    let id = by_name["id"].as_i64().unwrap();
    let (status, by_id) = send(&t.app, get(&format!("/api/classes/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, by_name);
}

#[tokio::test]
async fn missing_class_returns_404() {
    let t = test_app(true, false).await;
    let (status, body) = send(&t.app, get("/api/classes/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Class not found");
}

#[tokio::test]
async fn numeric_class_name_resolves_through_fallback() {
    // End-to-end scenario: a class literally named "13" must be reachable
    // by name even though "13" parses as an id.
    let t = test_app(true, false).await;

    let (status, class) = send(
        &t.app,
        post_json("/api/classes", json!({ "name": "13", "icon": "x", "order": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = class["id"].as_i64().unwrap();
    assert!(class_id > 0);

    let (_, classes) = send(&t.app, get("/api/classes")).await;
    let last = classes.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["name"], "13");

    let (status, subject) = send(
        &t.app,
        post_json("/api/subjects", json!({ "name": "Art", "classId": class_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subject["classId"], class_id);

    let (status, subjects) = send(&t.app, get("/api/classes/13/subjects")).await;
    assert_eq!(status, StatusCode::OK);
    let subjects = subjects.as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["name"], "Art");
}

#[tokio::test]
async fn unknown_class_subjects_is_empty_list() {
    let t = test_app(true, false).await;
    let (status, body) = send(&t.app, get("/api/classes/Nope/subjects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn non_numeric_ids_keep_the_json_error_envelope() {
    let t = test_app(true, false).await;

    let (status, body) = send(&t.app, get("/api/books/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let (status, body) = send(&t.app, get("/api/resources/abc/download")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let (status, body) = send(&t.app, delete("/api/chapters/xyz")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());
}

// --- Books ---

#[tokio::test]
async fn book_create_get_delete_roundtrip() {
    let t = test_app(true, false).await;

    let (status, book) = send(
        &t.app,
        post_json(
            "/api/books",
            json!({
                "title": "Problems in General Physics",
                "author": "I.E. Irodov",
                "description": "Problem collection",
                "format": "PDF",
                "fileUrl": "/files/irodov.pdf",
                "subjectId": 1,
                "classId": 1,
                "rating": 45
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = book["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(book["downloadCount"], 0);

    let (status, fetched) = send(&t.app, get(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, book);

    let (status, _) = send(&t.app, delete(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&t.app, get(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&t.app, delete(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_rating_out_of_range_is_rejected() {
    let t = test_app(true, false).await;
    let (status, body) = send(
        &t.app,
        post_json(
            "/api/books",
            json!({
                "title": "Bad Rating",
                "description": "x",
                "format": "PDF",
                "fileUrl": "/files/x.pdf",
                "subjectId": 1,
                "classId": 1,
                "rating": 60
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("rating"));
}

#[tokio::test]
async fn book_shape_failure_is_400() {
    let t = test_app(true, false).await;
    let (status, _) = send(&t.app, post_json("/api/books", json!({ "title": "No body" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_filters_are_combinatorial() {
    let t = test_app(false, false).await;
    for (title, class_id, subject_id) in [("a", 1, 1), ("b", 1, 2), ("c", 2, 2)] {
        let (status, _) = send(
            &t.app,
            post_json(
                "/api/books",
                json!({
                    "title": title,
                    "description": "d",
                    "format": "PDF",
                    "fileUrl": "/f.pdf",
                    "subjectId": subject_id,
                    "classId": class_id
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&t.app, get("/api/books")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    let (_, by_class) = send(&t.app, get("/api/books?classId=1")).await;
    assert_eq!(by_class.as_array().unwrap().len(), 2);
    let (_, by_subject) = send(&t.app, get("/api/books?subjectId=2")).await;
    assert_eq!(by_subject.as_array().unwrap().len(), 2);
    let (_, both) = send(&t.app, get("/api/books?classId=1&subjectId=2")).await;
    let both = both.as_array().unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["title"], "b");
}

#[tokio::test]
async fn featured_books_are_exactly_the_flagged_subset() {
    let t = test_app(true, false).await;
    let (status, body) = send(&t.app, get("/api/books/featured")).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert!(!books.is_empty());
    assert!(books.iter().all(|b| b["featured"] == true));
}

// --- Chapters and topics ---

#[tokio::test]
async fn chapter_and_topic_flow() {
    let t = test_app(true, false).await;

    // Find Class 11 Physics through the public API
    let (_, subjects) = send(&t.app, get("/api/classes/11/subjects")).await;
    let physics = subjects
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Physics")
        .unwrap()
        .clone();
    let physics_id = physics["id"].as_i64().unwrap();

    let (status, chapters) = send(
        &t.app,
        get(&format!("/api/subjects/{}/chapters", physics_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chapters = chapters.as_array().unwrap();
    assert_eq!(chapters.len(), 2);
    let kinematics_id = chapters[0]["id"].as_i64().unwrap();

    let (_, topics) = send(&t.app, get(&format!("/api/chapters/{}/topics", kinematics_id))).await;
    assert_eq!(topics.as_array().unwrap().len(), 2);

    let (status, topic) = send(
        &t.app,
        post_json(
            "/api/topics",
            json!({ "name": "Relative motion", "chapterId": kinematics_id, "order": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(topic["id"].as_i64().unwrap() > 0);

    let (status, chapter) = send(
        &t.app,
        post_json(
            "/api/chapters",
            json!({ "name": "Work and Energy", "subjectId": physics_id, "order": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let chapter_id = chapter["id"].as_i64().unwrap();
    assert_eq!(chapter["status"], "new");

    let (status, _) = send(&t.app, delete(&format!("/api/chapters/{}", chapter_id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&t.app, get(&format!("/api/chapters/{}", chapter_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chapters_filter_by_subject_query() {
    let t = test_app(true, false).await;
    let (_, subjects) = send(&t.app, get("/api/classes/11/subjects")).await;
    let physics_id = subjects.as_array().unwrap()[0]["id"].as_i64().unwrap();

    let (_, filtered) = send(&t.app, get(&format!("/api/chapters?subjectId={}", physics_id))).await;
    assert_eq!(filtered.as_array().unwrap().len(), 2);
    let (_, all) = send(&t.app, get("/api/chapters")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let (_, none) = send(&t.app, get("/api/chapters?subjectId=999")).await;
    assert_eq!(none.as_array().unwrap().len(), 0);
}

// --- Curriculum resources ---

#[tokio::test]
async fn resource_filters_and_type_lookup() {
    let t = test_app(true, false).await;

    let (_, by_type) = send(&t.app, get("/api/resources?type=video")).await;
    let by_type = by_type.as_array().unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0]["type"], "video");

    let (_, all) = send(&t.app, get("/api/resources")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let id = all.as_array().unwrap()[0]["id"].as_i64().unwrap();
    let (status, one) = send(&t.app, get(&format!("/api/resources/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["id"], id);

    let (status, _) = send(&t.app, delete(&format!("/api/resources/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&t.app, get(&format!("/api/resources/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Flat library ---

#[tokio::test]
async fn category_and_resource_type_lists() {
    let t = test_app(true, false).await;

    let (status, categories) = send(&t.app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories.as_array().unwrap().len(), 4);

    let (status, physics) = send(&t.app, get("/api/categories/physics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(physics["name"], "Physics");

    let (status, _) = send(&t.app, get("/api/categories/astrology")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, types) = send(&t.app, get("/api/resource-types")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(types.as_array().unwrap().len(), 4);

    let (status, files) = send(&t.app, get("/api/categories/physics/resources")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn featured_files_capped_at_three_and_recent_at_five() {
    let t = test_app(true, false).await;
    for i in 0..6 {
        t.storage
            .create_resource_file(NewResourceFile {
                title: format!("extra {}", i),
                description: String::new(),
                file_size: "1.0 KB".into(),
                file_name: format!("extra-{}.pdf", i),
                file_path: format!("/uploads/extra-{}.pdf", i),
                category_id: "physics".into(),
                category_name: "Physics".into(),
                type_id: "notes".into(),
                type_name: "Notes".into(),
                is_featured: true,
                uploaded_by: None,
            })
            .await
            .unwrap();
    }

    let (_, featured) = send(&t.app, get("/api/resources/featured")).await;
    let featured = featured.as_array().unwrap();
    assert_eq!(featured.len(), 3);
    assert!(featured.iter().all(|f| f["isFeatured"] == true));

    let (_, recent) = send(&t.app, get("/api/resources/recent")).await;
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 5);
    // Newest first; the last inserted file leads
    assert_eq!(recent[0]["title"], "extra 5");
}

// --- Downloads ---

#[tokio::test]
async fn download_missing_record_is_404_with_no_writes() {
    let t = test_app(true, false).await;
    let before = std::fs::read_dir(t.uploads.path()).unwrap().count();

    let (status, _) = send(&t.app, get("/api/resources/999/download")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(std::fs::read_dir(t.uploads.path()).unwrap().count(), before);
}

#[tokio::test]
async fn download_missing_file_is_404_by_default() {
    // Seeded records point at files that are not on disk
    let t = test_app(true, false).await;
    let (status, body) = send(&t.app, get("/api/resources/1/download")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found");
}

#[tokio::test]
async fn download_streams_file_and_increments_counter() {
    let t = test_app(true, false).await;
    let file = t
        .storage
        .create_resource_file(NewResourceFile {
            title: "Real file".into(),
            description: String::new(),
            file_size: "11 B".into(),
            file_name: "real.pdf".into(),
            file_path: "/uploads/real-on-disk.pdf".into(),
            category_id: "physics".into(),
            category_name: "Physics".into(),
            type_id: "notes".into(),
            type_name: "Notes".into(),
            is_featured: false,
            uploaded_by: None,
        })
        .await
        .unwrap();
    std::fs::write(t.uploads.path().join("real-on-disk.pdf"), b"%PDF-1.4 ok").unwrap();

    let response = t
        .app
        .clone()
        .oneshot(get(&format!("/api/resources/{}/download", file.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(disposition, "attachment; filename=\"real.pdf\"");
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(content_type, "application/pdf");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 ok");

    let updated = t.storage.get_resource_file(file.id).await.unwrap().unwrap();
    assert_eq!(updated.download_count, 1);
}

#[tokio::test]
async fn placeholder_download_synthesizes_and_cleans_up() {
    let t = test_app(true, true).await;

    let response = t
        .app
        .clone()
        .oneshot(get("/api/resources/1/download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Class 11 Physics formula sheet"));

    let updated = t.storage.get_resource_file(1).await.unwrap().unwrap();
    assert_eq!(updated.download_count, 1);

    // The synthesized temp file must not linger
    let leftovers = std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("notesphere-placeholder-1-")
        })
        .count();
    assert_eq!(leftovers, 0);
}

// --- Auth ---

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let t = test_app(true, false).await;

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/admin/login",
            json!({ "username": "admin", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send(
        &t.app,
        post_json(
            "/api/admin/login",
            json!({ "username": "ghost", "password": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_user_without_password() {
    let t = test_app(true, false).await;
    let (status, body) = send(
        &t.app,
        post_json(
            "/api/admin/login",
            json!({ "username": "admin", "password": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "admin");
    assert_eq!(body["isAdmin"], true);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let t = test_app(true, false).await;
    let cookie = login(&t.app, "admin", "admin123").await;

    // Session works before logout
    let (status, _) = send(
        &t.app,
        delete_with_cookie("/api/admin/resources/999", &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        delete_with_cookie("/api/admin/resources/999", &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_gate_matrix() {
    let t = test_app(true, false).await;

    // Unauthenticated -> 401
    let (status, body) = send(&t.app, delete("/api/admin/resources/1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    // Authenticated non-admin -> 403
    t.storage
        .create_user(NewUser {
            username: "student".into(),
            password: bcrypt::hash("student-pass", 4).unwrap(),
            is_admin: false,
        })
        .await
        .unwrap();
    let student_cookie = login(&t.app, "student", "student-pass").await;
    let (status, body) = send(
        &t.app,
        delete_with_cookie("/api/admin/resources/1", &student_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin privileges required");

    // Authenticated admin proceeds
    let admin_cookie = login(&t.app, "admin", "admin123").await;
    let (status, _) = send(
        &t.app,
        delete_with_cookie("/api/admin/resources/1", &admin_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A stale cookie value is not a session
    let (status, _) = send(
        &t.app,
        delete_with_cookie("/api/admin/resources/2", "notesphere_session=forged"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// --- Upload ---

fn multipart_request(path: &str, cookie: &str, boundary: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn text_part(boundary: &str, name: &str, value: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
        boundary, name, value
    )
}

fn file_part(boundary: &str, filename: &str, content_type: &str, data: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"pdfFile\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
        boundary, filename, content_type, data
    )
}

#[tokio::test]
async fn admin_upload_creates_file_and_record() {
    let t = test_app(true, false).await;
    let cookie = login(&t.app, "admin", "admin123").await;

    let boundary = "NOTESPHERE-TEST";
    let body = format!(
        "{}{}{}{}{}{}--{}--\r\n",
        text_part(boundary, "title", "Model paper 2025"),
        text_part(boundary, "description", "Full syllabus model paper"),
        text_part(boundary, "categoryId", "physics"),
        text_part(boundary, "typeId", "question-paper"),
        text_part(boundary, "isFeatured", "true"),
        file_part(boundary, "model-paper.pdf", "application/pdf", "%PDF-1.4 model"),
        boundary
    );

    let (status, file) = send(
        &t.app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(file["fileName"], "model-paper.pdf");
    assert_eq!(file["categoryName"], "Physics");
    assert_eq!(file["typeName"], "Question Paper");
    assert_eq!(file["isFeatured"], true);
    assert_eq!(file["downloadCount"], 0);
    assert!(file["uploadedBy"].as_i64().unwrap() > 0);

    // The generated name keeps the original extension and lands on disk
    let stored = file["filePath"].as_str().unwrap();
    assert!(stored.starts_with("/uploads/pdfFile-"));
    assert!(stored.ends_with(".pdf"));
    let on_disk = t
        .uploads
        .path()
        .join(stored.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(&on_disk).unwrap(), b"%PDF-1.4 model");

    // And it is downloadable straight away
    let id = file["id"].as_i64().unwrap();
    let response = t
        .app
        .clone()
        .oneshot(get(&format!("/api/resources/{}/download", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_rejects_non_pdf_and_unknown_references() {
    let t = test_app(true, false).await;
    let cookie = login(&t.app, "admin", "admin123").await;
    let boundary = "NOTESPHERE-TEST";

    // Wrong MIME type
    let body = format!(
        "{}{}{}{}--{}--\r\n",
        text_part(boundary, "title", "Not a PDF"),
        text_part(boundary, "categoryId", "physics"),
        text_part(boundary, "typeId", "notes"),
        file_part(boundary, "notes.txt", "text/plain", "plain text"),
        boundary
    );
    let (status, msg) = send(
        &t.app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg["message"], "Only PDF files are allowed");

    // Unknown category
    let body = format!(
        "{}{}{}{}--{}--\r\n",
        text_part(boundary, "title", "Orphan"),
        text_part(boundary, "categoryId", "astrology"),
        text_part(boundary, "typeId", "notes"),
        file_part(boundary, "a.pdf", "application/pdf", "%PDF"),
        boundary
    );
    let (status, msg) = send(
        &t.app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg["message"], "Invalid category");

    // Missing file entirely
    let body = format!(
        "{}{}{}--{}--\r\n",
        text_part(boundary, "title", "No file"),
        text_part(boundary, "categoryId", "physics"),
        text_part(boundary, "typeId", "notes"),
        boundary
    );
    let (status, msg) = send(
        &t.app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg["message"], "PDF file is required");
}

#[tokio::test]
async fn upload_over_the_size_cap_is_rejected_without_side_effects() {
    // Shrink the cap to 1 MB so the test stays small
    let uploads = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.uploads = Some(uploads.path().to_path_buf());
    config.storage.max_upload_mb = 1;

    let storage: DynStorage = Arc::new(MemStorage::new());
    seed::run(storage.as_ref()).await.unwrap();
    let app = build_router(AppState {
        storage: storage.clone(),
        config,
    });

    let cookie = login(&app, "admin", "admin123").await;
    let boundary = "NOTESPHERE-TEST";
    let oversized = "x".repeat(1024 * 1024 + 1);
    let body = format!(
        "{}{}{}{}--{}--\r\n",
        text_part(boundary, "title", "Too big"),
        text_part(boundary, "categoryId", "physics"),
        text_part(boundary, "typeId", "notes"),
        file_part(boundary, "big.pdf", "application/pdf", &oversized),
        boundary
    );
    let (status, msg) = send(
        &app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg["message"], "File exceeds the 1 MB upload limit");

    // Nothing written to disk, nothing recorded beyond the seed
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
    assert_eq!(storage.get_recent_resource_files().await.unwrap().len(), 2);

    // Even a body past the transport limit keeps the JSON error envelope
    let huge = "x".repeat(3 * 1024 * 1024);
    let body = format!(
        "{}{}{}{}--{}--\r\n",
        text_part(boundary, "title", "Way too big"),
        text_part(boundary, "categoryId", "physics"),
        text_part(boundary, "typeId", "notes"),
        file_part(boundary, "huge.pdf", "application/pdf", &huge),
        boundary
    );
    let (status, msg) = send(
        &app,
        multipart_request("/api/admin/resources", &cookie, boundary, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(msg["message"].as_str().is_some());
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn admin_delete_removes_record_and_backing_file() {
    let t = test_app(true, false).await;
    let cookie = login(&t.app, "admin", "admin123").await;

    let file = t
        .storage
        .create_resource_file(NewResourceFile {
            title: "Doomed".into(),
            description: String::new(),
            file_size: "4 B".into(),
            file_name: "doomed.pdf".into(),
            file_path: "/uploads/doomed-on-disk.pdf".into(),
            category_id: "physics".into(),
            category_name: "Physics".into(),
            type_id: "notes".into(),
            type_name: "Notes".into(),
            is_featured: false,
            uploaded_by: None,
        })
        .await
        .unwrap();
    let disk = t.uploads.path().join("doomed-on-disk.pdf");
    std::fs::write(&disk, b"%PDF").unwrap();

    let (status, _) = send(
        &t.app,
        delete_with_cookie(&format!("/api/admin/resources/{}", file.id), &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!disk.exists());
    assert!(t.storage.get_resource_file(file.id).await.unwrap().is_none());

    let (status, _) = send(
        &t.app,
        delete_with_cookie(&format!("/api/admin/resources/{}", file.id), &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
