// Image generation: cover-first ordering, reference propagation,
// concurrency modes, partial failures and single-page regeneration.

#[path = "../common/mod.rs"]
mod common;

use common::{Behavior, FakeProvider, OUTLINE, PNG, write_image_config};
use postcraft::AppSettings;
use postcraft::domain::types::{ImageData, OutlinePage, PageType};
use postcraft::generate::{GenerateError, GenerateRequest, GenerationService, RegenerateRequest};
use postcraft::infrastructure::model::RetryPolicy;
use postcraft::infrastructure::storage::{HistoryRecord, HistoryStore, TaskStatus};
use postcraft::outline::parse_outline;
use postcraft::prompts::PromptTemplates;
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

fn service(settings: &AppSettings) -> GenerationService {
    GenerationService::new(
        Arc::new(settings.clone()),
        Arc::new(PromptTemplates::builtin()),
    )
    .with_retry(RetryPolicy::immediate(2))
}

fn request(task_id: Option<&str>) -> GenerateRequest {
    GenerateRequest {
        pages: parse_outline(OUTLINE),
        task_id: task_id.map(str::to_string),
        full_outline: Some(OUTLINE.to_string()),
        topic: Some("home coffee".to_string()),
        reference_images: Vec::new(),
    }
}

async fn setup(
    behavior: Behavior,
    provider_type: &str,
    high_concurrency: bool,
) -> (FakeProvider, TempDir, AppSettings) {
    let fake = FakeProvider::start(behavior).await;
    let dir = tempdir().expect("tempdir");
    write_image_config(dir.path(), &fake.base_url, provider_type, high_concurrency);
    let settings = AppSettings::rooted(dir.path());
    (fake, dir, settings)
}

#[tokio::test]
async fn renders_cover_first_and_reuses_it_as_reference() {
    let (fake, _dir, settings) = setup(Behavior::default(), "google_genai", false).await;

    let outcome = service(&settings)
        .generate(request(None))
        .await
        .expect("generate");

    assert_eq!(outcome.total, 4);
    assert_eq!(outcome.status, TaskStatus::Completed);
    assert!(outcome.failed.is_empty());
    let filenames: Vec<_> = outcome.images.iter().map(|i| i.filename.clone()).collect();
    let expected: Vec<_> = (0..4).map(|i| format!("{}_{i}.png", outcome.task_id)).collect();
    assert_eq!(filenames, expected);
    assert_eq!(outcome.images[0].url, format!("/api/images/{}", expected[0]));

    let requests = fake.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].image_prompt().contains("Page type: cover"));
    assert_eq!(requests[0].inline_images(), 0);
    for later in &requests[1..] {
        assert_eq!(later.inline_images(), 1, "cover is attached as reference");
    }
    assert_eq!(
        requests[0].body["generationConfig"]["imageConfig"]["aspectRatio"],
        "3:4"
    );
    assert_eq!(requests[0].goog_api_key.as_deref(), Some("img-key-0123456789"));

    for filename in &expected {
        let bytes = std::fs::read(settings.output_dir.join(filename)).expect("image written");
        assert_eq!(bytes, PNG.to_vec());
    }

    let record = HistoryStore::new(&settings.history_dir)
        .get(&outcome.task_id)
        .await
        .expect("record");
    assert_eq!(record.status, TaskStatus::Completed);
    assert_eq!(record.images.len(), 4);
    assert_eq!(record.topic, "home coffee");
}

#[tokio::test]
async fn user_references_go_to_every_page() {
    let (fake, _dir, settings) = setup(Behavior::default(), "google_genai", true).await;
    let mut req = request(None);
    req.reference_images = vec![ImageData::sniffed(PNG.to_vec())];

    let outcome = service(&settings).generate(req).await.expect("generate");
    assert_eq!(outcome.images.len(), 4);

    let requests = fake.requests();
    let cover = requests
        .iter()
        .find(|r| r.image_prompt().contains("Page type: cover"))
        .expect("cover request");
    assert_eq!(cover.inline_images(), 1);
    let others: Vec<_> = requests
        .iter()
        .filter(|r| !r.image_prompt().contains("Page type: cover"))
        .collect();
    assert_eq!(others.len(), 3);
    assert!(others.iter().all(|r| r.inline_images() == 2));
}

#[tokio::test]
async fn failed_pages_do_not_abort_the_rest() {
    let behavior = Behavior {
        fail_marker: Some("Overextracted".to_string()),
        ..Behavior::default()
    };
    let (_fake, _dir, settings) = setup(behavior, "google_genai", true).await;
    // The marker lives only in page content, never in the shared outline
    let mut req = request(Some("task-partial"));
    req.pages[2].content = "[内容]\nOverextracted grind".to_string();

    let outcome = service(&settings)
        .generate(req)
        .await
        .expect("generate");

    assert_eq!(outcome.task_id, "task-partial");
    assert_eq!(outcome.status, TaskStatus::Partial);
    assert_eq!(outcome.images.len(), 3);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].index, 2);
    assert!(outcome.failed[0].error.contains("render failed"));

    let record = HistoryStore::new(&settings.history_dir)
        .get("task-partial")
        .await
        .expect("record");
    assert_eq!(record.status, TaskStatus::Partial);
    assert_eq!(record.failed.len(), 1);
}

#[tokio::test]
async fn every_page_failing_marks_task_failed() {
    let behavior = Behavior {
        status: Some(500),
        ..Behavior::default()
    };
    let (_fake, _dir, settings) = setup(behavior, "google_genai", false).await;

    let outcome = service(&settings)
        .generate(request(None))
        .await
        .expect("outcome is still returned");
    assert_eq!(outcome.status, TaskStatus::Failed);
    assert!(outcome.images.is_empty());
    assert_eq!(outcome.failed.len(), 4);
}

#[tokio::test]
async fn openai_images_endpoint_is_supported() {
    let (fake, _dir, settings) = setup(Behavior::default(), "image_api", false).await;

    let outcome = service(&settings)
        .generate(request(None))
        .await
        .expect("generate");
    assert_eq!(outcome.status, TaskStatus::Completed);

    let requests = fake.requests();
    assert!(requests.iter().all(|r| r.path == "/v1/images/generations"));
    assert_eq!(requests[0].body["model"], "fake-image");
    assert_eq!(requests[0].body["size"], "1024x1536");
    assert!(requests[0].body.get("response_format").is_none());
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer img-key-0123456789")
    );
}

#[tokio::test]
async fn updates_the_outline_record() {
    let (_fake, _dir, settings) = setup(Behavior::default(), "google_genai", false).await;
    let history = HistoryStore::new(&settings.history_dir);
    let mut draft = HistoryRecord::new("outline-1", "home coffee");
    draft.outline = OUTLINE.to_string();
    history.create(&draft).await.expect("create");

    let mut req = request(Some("outline-1"));
    req.topic = None;
    req.full_outline = None;
    service(&settings).generate(req).await.expect("generate");

    let record = history.get("outline-1").await.expect("record");
    assert_eq!(record.topic, "home coffee");
    assert_eq!(record.outline, OUTLINE);
    assert_eq!(record.status, TaskStatus::Completed);
    assert_eq!(record.created_at, draft.created_at);
}

#[tokio::test]
async fn validation_errors() {
    let (_fake, _dir, settings) = setup(Behavior::default(), "google_genai", false).await;
    let svc = service(&settings);

    let empty = GenerateRequest::default();
    assert!(matches!(svc.generate(empty).await, Err(GenerateError::NoPages)));

    let bad_id = request(Some("../escape"));
    assert!(matches!(
        svc.generate(bad_id).await,
        Err(GenerateError::InvalidTaskId(_))
    ));

    let missing = RegenerateRequest {
        task_id: "nope".to_string(),
        page: OutlinePage::new(0, PageType::Cover, "x"),
        full_outline: None,
        topic: None,
    };
    assert!(matches!(
        svc.regenerate(missing).await,
        Err(GenerateError::TaskNotFound(_))
    ));
}

#[tokio::test]
async fn regenerates_one_page_with_stored_cover() {
    let (fake, _dir, settings) = setup(Behavior::default(), "google_genai", false).await;
    let svc = service(&settings);
    let outcome = svc.generate(request(Some("regen"))).await.expect("generate");
    assert_eq!(outcome.images.len(), 4);
    let before = fake.requests().len();

    let page = OutlinePage::new(2, PageType::Content, "[内容]\nGrind finer");
    let image = svc
        .regenerate(RegenerateRequest {
            task_id: "regen".to_string(),
            page,
            full_outline: None,
            topic: None,
        })
        .await
        .expect("regenerate");
    assert_eq!(image.filename, "regen_2.png");

    let requests = fake.requests();
    assert_eq!(requests.len(), before + 1);
    let last = requests.last().expect("request");
    assert!(last.image_prompt().contains("Grind finer"));
    assert_eq!(last.inline_images(), 1, "stored cover is the reference");

    let record = HistoryStore::new(&settings.history_dir)
        .get("regen")
        .await
        .expect("record");
    assert_eq!(record.pages[2].content, "[内容]\nGrind finer");
    assert_eq!(record.status, TaskStatus::Completed);
}

#[tokio::test]
async fn rerun_drops_images_of_pages_that_now_fail() {
    let behavior = Behavior {
        fail_marker: Some("Overextracted".to_string()),
        ..Behavior::default()
    };
    let (_fake, _dir, settings) = setup(behavior, "google_genai", false).await;
    let svc = service(&settings);
    svc.generate(request(Some("rerun"))).await.expect("first run");
    assert!(settings.output_dir.join("rerun_2.png").exists());

    let mut req = request(Some("rerun"));
    req.pages[2].content = "[内容]\nOverextracted grind".to_string();
    let outcome = svc.generate(req).await.expect("second run");
    assert_eq!(outcome.status, TaskStatus::Partial);

    let record = HistoryStore::new(&settings.history_dir)
        .get("rerun")
        .await
        .expect("record");
    let imaged: Vec<_> = record.images.iter().map(|i| i.index).collect();
    let failed: Vec<_> = record.failed.iter().map(|f| f.index).collect();
    assert_eq!(imaged, vec![0, 1, 3]);
    assert_eq!(failed, vec![2]);
    assert_eq!(record.status, TaskStatus::Partial);
    assert!(!settings.output_dir.join("rerun_2.png").exists());
}

#[tokio::test]
async fn shorter_rerun_forgets_removed_pages() {
    let (_fake, _dir, settings) = setup(Behavior::default(), "google_genai", true).await;
    let svc = service(&settings);
    svc.generate(request(Some("shrink"))).await.expect("first run");

    let mut req = request(Some("shrink"));
    req.pages.truncate(2);
    let outcome = svc.generate(req).await.expect("second run");
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.status, TaskStatus::Completed);

    let history = HistoryStore::new(&settings.history_dir);
    let record = history.get("shrink").await.expect("record");
    assert_eq!(record.pages.len(), 2);
    assert_eq!(record.images.len(), 2);
    let summary = record.summary();
    assert_eq!(summary.image_count, summary.page_count);
    assert!(settings.output_dir.join("shrink_1.png").exists());
    assert!(!settings.output_dir.join("shrink_2.png").exists());
    assert!(!settings.output_dir.join("shrink_3.png").exists());

    // Regenerating a page keeps the status tied to the current pages
    let page = OutlinePage::new(1, PageType::Content, "[内容]\nBeans again");
    svc.regenerate(RegenerateRequest {
        task_id: "shrink".to_string(),
        page,
        full_outline: None,
        topic: None,
    })
    .await
    .expect("regenerate");
    let record = history.get("shrink").await.expect("record");
    assert_eq!(record.images.len(), 2);
    assert_eq!(record.status, TaskStatus::Completed);
}

#[tokio::test]
async fn duplicate_page_indexes_are_rejected() {
    let (fake, _dir, settings) = setup(Behavior::default(), "google_genai", false).await;
    let mut req = request(Some("dupes"));
    req.pages[3].index = 1;

    let result = service(&settings).generate(req).await;
    assert!(matches!(result, Err(GenerateError::DuplicatePage(1))));
    assert!(fake.requests().is_empty());
    assert!(
        HistoryStore::new(&settings.history_dir)
            .find("dupes")
            .await
            .expect("lookup")
            .is_none()
    );
}
