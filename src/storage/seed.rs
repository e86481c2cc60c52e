use crate::storage::models::*;
use crate::storage::Storage;

// First-run demo credentials. Change them immediately on a real deployment.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

/// Populate an empty store with the default taxonomy, demo content, and the
/// admin account. Idempotent: any existing class short-circuits the whole
/// routine, so repeated calls are no-ops. Returns whether anything was
/// inserted.
pub async fn run(storage: &dyn Storage) -> anyhow::Result<bool> {
    if !storage.get_all_classes().await?.is_empty() {
        tracing::debug!("catalog already populated, skipping seed");
        return Ok(false);
    }

    tracing::info!("seeding empty catalog with default taxonomy");

    let password = bcrypt::hash(ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
    storage
        .create_user(NewUser {
            username: ADMIN_USERNAME.into(),
            password,
            is_admin: true,
        })
        .await?;

    let classes: &[(&str, &str, &str)] = &[
        ("10", "school", "Class 10 board preparation"),
        ("11", "book-open", "Class 11 foundations"),
        ("12", "graduation-cap", "Class 12 board preparation"),
        ("JEE", "target", "Joint Entrance Examination"),
        ("NEET", "stethoscope", "National medical entrance"),
    ];

    let mut class_ids = Vec::with_capacity(classes.len());
    for (order, (name, icon, description)) in classes.iter().enumerate() {
        let class = storage
            .create_class(NewClass {
                name: (*name).into(),
                icon: (*icon).into(),
                description: Some((*description).into()),
                order: order as i64 + 1,
            })
            .await?;
        class_ids.push(class.id);
    }

    // Fixed subject distribution: sciences everywhere, mathematics dropped
    // for NEET, biology dropped for JEE.
    let taxonomy: &[(usize, &[&str])] = &[
        (0, &["Physics", "Chemistry", "Mathematics", "Biology"]),
        (1, &["Physics", "Chemistry", "Mathematics", "Biology"]),
        (2, &["Physics", "Chemistry", "Mathematics", "Biology"]),
        (3, &["Physics", "Chemistry", "Mathematics"]),
        (4, &["Physics", "Chemistry", "Biology"]),
    ];

    let mut class11_physics = None;
    for (class_idx, subject_names) in taxonomy {
        for name in *subject_names {
            let subject = storage
                .create_subject(NewSubject {
                    name: (*name).into(),
                    class_id: class_ids[*class_idx],
                    description: None,
                    icon: Some(subject_icon(name).into()),
                })
                .await?;
            if *class_idx == 1 && *name == "Physics" {
                class11_physics = Some(subject);
            }
        }
    }

    // Demo content hangs off Class 11 Physics.
    if let Some(physics) = class11_physics {
        let kinematics = storage
            .create_chapter(NewChapter {
                name: "Motion in a Straight Line".into(),
                subject_id: physics.id,
                description: Some("Kinematics of point particles".into()),
                lessons: 8,
                practices: 4,
                status: ChapterStatus::New,
                order: 1,
            })
            .await?;
        storage
            .create_chapter(NewChapter {
                name: "Laws of Motion".into(),
                subject_id: physics.id,
                description: Some("Newton's laws and friction".into()),
                lessons: 10,
                practices: 6,
                status: ChapterStatus::New,
                order: 2,
            })
            .await?;

        for (order, name) in ["Displacement and velocity", "Uniform acceleration"]
            .iter()
            .enumerate()
        {
            storage
                .create_topic(NewTopic {
                    name: (*name).into(),
                    chapter_id: kinematics.id,
                    description: None,
                    order: order as i64 + 1,
                })
                .await?;
        }

        storage
            .create_book(NewBook {
                title: "Concepts of Physics Part 1".into(),
                author: Some("H.C. Verma".into()),
                description: "Mechanics, waves and optics with solved examples".into(),
                cover_image: None,
                format: BookFormat::Pdf,
                page_count: Some(462),
                file_url: "/files/concepts-of-physics-1.pdf".into(),
                subject_id: physics.id,
                class_id: physics.class_id,
                topics: vec!["mechanics".into(), "waves".into()],
                ref_number: Some("PHY11-001".into()),
                featured: true,
                recommended: true,
                rating: 47,
            })
            .await?;

        storage
            .create_resource(NewResource {
                title: "Kinematics lecture series".into(),
                description: Some("Recorded lectures for chapter one".into()),
                kind: "video".into(),
                icon: Some("video".into()),
                count: 12,
                metadata: Some("12 lectures".into()),
                subject_id: physics.id,
                class_id: physics.class_id,
                chapter_id: Some(kinematics.id),
                featured: true,
            })
            .await?;
        storage
            .create_resource(NewResource {
                title: "Previous year papers".into(),
                description: None,
                kind: "paper".into(),
                icon: Some("file-text".into()),
                count: 5,
                metadata: Some("2020-2024".into()),
                subject_id: physics.id,
                class_id: physics.class_id,
                chapter_id: None,
                featured: false,
            })
            .await?;
    }

    // Flat-library reference lists.
    for (id, name, description) in [
        ("physics", "Physics", "Physics study material"),
        ("chemistry", "Chemistry", "Chemistry study material"),
        ("mathematics", "Mathematics", "Mathematics study material"),
        ("biology", "Biology", "Biology study material"),
    ] {
        storage
            .create_category(Category {
                id: id.into(),
                name: name.into(),
                description: description.into(),
            })
            .await?;
    }
    for (id, name, description) in [
        ("notes", "Notes", "Condensed revision notes"),
        ("question-paper", "Question Paper", "Past and model question papers"),
        ("revision-sheet", "Revision Sheet", "One-page formula sheets"),
        ("syllabus", "Syllabus", "Official syllabus documents"),
    ] {
        storage
            .create_resource_type(ResourceType {
                id: id.into(),
                name: name.into(),
                description: description.into(),
            })
            .await?;
    }

    // A couple of demo files so the flat library has something to list.
    // Their backing files are not on disk; downloads rely on the
    // placeholder mode or a later real upload.
    storage
        .create_resource_file(NewResourceFile {
            title: "Class 11 Physics formula sheet".into(),
            description: "Mechanics and waves formulas on one page".into(),
            file_size: "1.2 MB".into(),
            file_name: "physics-formulas.pdf".into(),
            file_path: "/uploads/seed-physics-formulas.pdf".into(),
            category_id: "physics".into(),
            category_name: "Physics".into(),
            type_id: "revision-sheet".into(),
            type_name: "Revision Sheet".into(),
            is_featured: true,
            uploaded_by: None,
        })
        .await?;
    storage
        .create_resource_file(NewResourceFile {
            title: "Chemistry syllabus 2025".into(),
            description: "Official Class 11 chemistry syllabus".into(),
            file_size: "310.0 KB".into(),
            file_name: "chemistry-syllabus.pdf".into(),
            file_path: "/uploads/seed-chemistry-syllabus.pdf".into(),
            category_id: "chemistry".into(),
            category_name: "Chemistry".into(),
            type_id: "syllabus".into(),
            type_name: "Syllabus".into(),
            is_featured: false,
            uploaded_by: None,
        })
        .await?;

    tracing::info!("seed complete");
    Ok(true)
}

fn subject_icon(name: &str) -> &'static str {
    match name {
        "Physics" => "atom",
        "Chemistry" => "flask",
        "Mathematics" => "sigma",
        "Biology" => "dna",
        _ => "book",
    }
}
