use super::*;
use crate::schemas::question::{Answer, QType};
use crate::schemas::SectionSummary;
use crate::test_support::{activity, Call, InMemoryBackend, TEST_SESSION_ID};

const SECTION: &str = "sec-1";

fn seeded() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::with_activities(vec![
        activity("a", SECTION, "Intro", 0),
        activity("b", SECTION, "Practice", 1),
        activity("c", SECTION, "Wrap-up", 2),
        activity("x", "sec-2", "Elsewhere", 0),
    ]))
}

async fn opened(backend: &Arc<InMemoryBackend>, activity_id: Option<&str>) -> ActivityEditor<InMemoryBackend> {
    let mut editor = ActivityEditor::with_backend(Arc::clone(backend));
    editor.open_section(SECTION, activity_id).await.expect("open section");
    editor
}

#[tokio::test]
async fn open_section_lists_then_loads_detail() {
    let backend = seeded();
    let editor = opened(&backend, Some("b")).await;

    assert_eq!(editor.activities().ids(), vec!["a", "b", "c"]);
    let section = editor.section().expect("section");
    assert_eq!(section.section_name, "Week 1");
    assert_eq!(section.session_id.as_deref(), Some(TEST_SESSION_ID));
    assert_eq!(editor.form().and_then(|form| form.id.as_deref()), Some("b"));
    assert_eq!(
        backend.calls(),
        vec![Call::ListActivities(SECTION.to_string()), Call::Get("b".to_string())]
    );
}

#[tokio::test]
async fn stale_detail_load_is_discarded() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    let slow = editor.begin_load("a");
    let fast = editor.begin_load("c");
    assert_eq!(slow.activity_id(), "a");

    let fast_result = backend.get_activity("c").await;
    assert!(editor.finish_load(fast, fast_result).expect("fast"));

    let slow_result = backend.get_activity("a").await;
    assert!(!editor.finish_load(slow, slow_result).expect("slow"));
    assert_eq!(editor.form().and_then(|form| form.id.as_deref()), Some("c"));
}

#[tokio::test]
async fn navigating_away_invalidates_pending_load() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    let pending = editor.begin_load("a");
    editor.new_activity(ActivityType::Reading).expect("new");

    let result = backend.get_activity("a").await;
    assert!(!editor.finish_load(pending, result).expect("finish"));
    let form = editor.form().expect("form");
    assert!(form.id.is_none());
    assert_eq!(form.kind, ActivityType::Reading);
    assert_eq!(form.section_id.as_deref(), Some(SECTION));
    assert_eq!(form.order, 3);
}

#[tokio::test]
async fn failed_load_reports_error() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    let err = editor.load_activity("missing").await.expect_err("missing");
    assert!(matches!(err, EditorError::Api(ApiError::Application { .. })));
    assert!(editor.form().is_none());
}

#[tokio::test]
async fn reorder_is_optimistic_and_sends_full_order() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    let handle = editor
        .handle_reorder(ReorderTarget::Activities, "c", ReorderDirection::Up)
        .expect("moved");
    assert_eq!(editor.activities().ids(), vec!["a", "c", "b"]);

    handle.await.expect("reorder task");
    assert!(backend.calls().contains(&Call::Reorder(
        ReorderTarget::Activities,
        vec!["a".to_string(), "c".to_string(), "b".to_string()],
    )));

    let report = editor.reconcile_sidebar(ReorderTarget::Activities).await.expect("reconcile");
    assert!(!report.diverged);
}

#[tokio::test]
async fn reorder_at_boundary_sends_nothing() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;
    let before = backend.calls().len();

    assert!(editor.handle_reorder(ReorderTarget::Activities, "a", ReorderDirection::Up).is_none());
    assert!(editor.handle_reorder(ReorderTarget::Activities, "c", ReorderDirection::Down).is_none());
    assert!(editor.handle_reorder(ReorderTarget::Activities, "zz", ReorderDirection::Up).is_none());

    assert_eq!(editor.activities().ids(), vec!["a", "b", "c"]);
    assert_eq!(backend.calls().len(), before);
}

#[tokio::test]
async fn reconciliation_adopts_server_order() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    backend.set_server_order(&["b", "a", "c"]);
    let report = editor.reconcile_sidebar(ReorderTarget::Activities).await.expect("reconcile");

    assert!(report.diverged);
    assert_eq!(report.local, vec!["a", "b", "c"]);
    assert_eq!(report.server, vec!["b", "a", "c"]);
    assert_eq!(editor.activities().ids(), report.server);
}

#[tokio::test]
async fn sections_reorder_and_load() {
    let backend = seeded();
    backend.set_sections(vec![
        SectionSummary { id: "s2".to_string(), title: "Two".to_string(), order: 1 },
        SectionSummary { id: "s1".to_string(), title: "One".to_string(), order: 0 },
    ]);
    let mut editor = opened(&backend, None).await;
    editor.load_sections().await.expect("sections");
    assert_eq!(editor.sections().ids(), vec!["s1", "s2"]);

    let handle = editor
        .handle_reorder(ReorderTarget::Sections, "s1", ReorderDirection::Down)
        .expect("moved");
    handle.await.expect("task");

    assert!(backend.calls().contains(&Call::ListSections(TEST_SESSION_ID.to_string())));
    assert!(backend.calls().contains(&Call::Reorder(
        ReorderTarget::Sections,
        vec!["s2".to_string(), "s1".to_string()],
    )));
}

#[tokio::test]
async fn save_new_activity_then_refetches_sidebar() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;

    editor.new_activity(ActivityType::Practice).expect("new");
    editor.apply(ActivityEdit::Title("Quiz".to_string())).expect("title");
    editor.add_question().expect("question");
    editor.update_question(0, QuestionEdit::Option { index: 0, text: "4".to_string() }).expect("opt");
    editor.update_question(0, QuestionEdit::Option { index: 1, text: "5".to_string() }).expect("opt");
    editor.update_question(0, QuestionEdit::CorrectAnswer("4".to_string())).expect("answer");

    let saved = editor.save().await.expect("save");
    assert_eq!(saved.id.as_deref(), Some("new-1"));
    assert!(!editor.is_saving());
    assert!(editor.form().is_none());
    assert_eq!(editor.activities().ids(), vec!["a", "b", "c", "new-1"]);

    let calls = backend.calls();
    let create = calls.iter().position(|call| *call == Call::Create("Quiz".to_string()));
    let refetch = calls.iter().rposition(|call| *call == Call::ListActivities(SECTION.to_string()));
    assert!(create.expect("create call") < refetch.expect("refetch call"));

    let stored = backend.stored("new-1").expect("stored");
    assert_eq!(stored.questions()[0].q_type(), QType::Mcq);
}

#[tokio::test]
async fn invalid_form_is_not_sent() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;
    let calls_before = backend.calls().len();

    editor.apply(ActivityEdit::Title(String::new())).expect("title");
    let err = editor.save().await.expect_err("invalid");
    assert!(matches!(err, EditorError::Validation(_)));
    assert!(editor.form().is_some());
    assert!(!editor.is_saving());
    assert_eq!(backend.calls().len(), calls_before);
}

#[tokio::test]
async fn saving_flag_spans_split_save() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;
    editor.apply(ActivityEdit::Title("Renamed".to_string())).expect("title");

    let snapshot = editor.begin_save().expect("begin");
    assert!(editor.is_saving());
    assert!(matches!(editor.begin_save(), Err(EditorError::SaveInFlight)));

    let failed = editor.finish_save(Err(ApiError::Application { message: "nope".to_string() }));
    assert!(failed.is_err());
    assert!(!editor.is_saving());
    assert!(editor.form().is_some());

    let retry = editor.begin_save().expect("retry");
    assert_eq!(retry.title, snapshot.title);
    let result = editor.backend().update_activity("a", &retry).await;
    let saved = editor.finish_save(result).expect("finish");
    assert_eq!(saved.title, "Renamed");
    assert!(!editor.is_saving());
    assert!(editor.form().is_none());
    assert_eq!(editor.activities().entries()[0].title, "Renamed");
}

#[tokio::test]
async fn update_existing_activity() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("b")).await;

    editor.apply(ActivityEdit::Kind(ActivityType::Reading)).expect("kind");
    editor.apply(ActivityEdit::TipText("<p>Read</p>".to_string())).expect("tip");
    editor.add_material().expect("material");
    editor.update_material_url(0, "https://example.com/reader.pdf").expect("url");
    editor.save().await.expect("save");

    assert!(backend.calls().contains(&Call::Update("b".to_string())));
    let stored = backend.stored("b").expect("stored");
    assert_eq!(stored.kind, ActivityType::Reading);
    assert_eq!(stored.reading_data.materials[0].media_type, MaterialMediaType::Pdf);
}

#[tokio::test]
async fn delete_closes_open_form() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("b")).await;

    editor.delete_activity("b").await.expect("delete");
    assert!(editor.form().is_none());
    assert_eq!(editor.activities().ids(), vec!["a", "c"]);

    let err = editor.delete_activity("b").await.expect_err("gone");
    assert!(matches!(err, EditorError::UnknownEntry(id) if id == "b"));
}

#[tokio::test]
async fn question_edits_go_through_the_reducer() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;

    editor.add_question().expect("add");
    editor.add_question().expect("add");
    editor.update_question(1, QuestionEdit::QType(QType::FillBlanks)).expect("switch");
    editor
        .update_question(1, QuestionEdit::FillBlankText("2 + 2 = [$1]".to_string()))
        .expect("text");

    let err = editor.update_question(0, QuestionEdit::FillBlankText("x".to_string())).expect_err("mcq");
    assert!(matches!(err, EditorError::FieldNotApplicable { q_type: QType::Mcq, .. }));

    let questions = editor.form().expect("form").questions();
    assert_eq!(questions[0], Question::template());
    assert_eq!(
        questions[1].answer,
        Answer::FillBlanks { fill_blank_text: "2 + 2 = [$1]".to_string() }
    );
}

#[tokio::test]
async fn edits_without_form_fail() {
    let backend = seeded();
    let mut editor = opened(&backend, None).await;
    assert!(matches!(editor.add_question(), Err(EditorError::NoActivityLoaded)));
    assert!(matches!(editor.save().await, Err(EditorError::NoActivityLoaded)));
}

#[tokio::test]
async fn question_upload_lands_on_same_question_after_reorder() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;
    editor.add_question().expect("add");
    editor.add_question().expect("add");
    editor.update_question(1, QuestionEdit::Prompt("target".to_string())).expect("prompt");

    let ticket = editor
        .begin_question_upload(1, QuestionMediaType::Image, "diagram.png")
        .expect("begin");
    let busy = editor.begin_question_upload(1, QuestionMediaType::Image, "other.png");
    assert!(matches!(busy, Err(EditorError::UploadInFlight(_))));
    assert!(editor.begin_question_upload(1, QuestionMediaType::Video, "clip.mp4").is_ok());

    editor.remove_question(0).expect("remove first");

    let file = MediaFile::new("diagram.png", vec![1, 2, 3]);
    let result = backend.upload_media(file, "image").await;
    assert!(editor.complete_question_upload(ticket, result).expect("complete"));

    let questions = editor.form().expect("form").questions();
    assert_eq!(questions[0].prompt, "target");
    assert_eq!(
        questions[0].media,
        vec![MediaRef::new("https://cdn.test/diagram.png", QuestionMediaType::Image)]
    );
}

#[tokio::test]
async fn upload_for_removed_question_is_dropped() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;
    editor.add_question().expect("add");

    let ticket = editor
        .begin_question_upload(0, QuestionMediaType::Image, "diagram.png")
        .expect("begin");
    editor.remove_question(0).expect("remove");

    let result = backend.upload_media(MediaFile::new("diagram.png", vec![1]), "image").await;
    assert!(!editor.complete_question_upload(ticket, result).expect("complete"));
    assert!(editor.form().expect("form").questions().is_empty());
    assert_eq!(editor.uploads().in_flight().count(), 0);
}

#[tokio::test]
async fn failed_upload_adds_nothing_and_frees_slot() {
    let backend = seeded();
    backend.set_fail_uploads(true);
    let mut editor = opened(&backend, Some("a")).await;
    editor.add_question().expect("add");

    let err = editor
        .upload_question_media(0, QuestionMediaType::Image, MediaFile::new("a.png", vec![0]))
        .await
        .expect_err("upload fails");
    assert!(matches!(err, EditorError::Api(ApiError::Application { .. })));
    assert!(editor.form().expect("form").questions()[0].media.is_empty());
    assert!(!editor.uploads().is_uploading_material());
    assert_eq!(editor.uploads().in_flight().count(), 0);

    let err = editor
        .upload_material(MediaFile::new("notes.pdf", vec![0]))
        .await
        .expect_err("material upload fails");
    assert!(matches!(err, EditorError::Api(_)));
    assert!(editor.form().expect("form").reading_data.materials.is_empty());
}

#[tokio::test]
async fn material_upload_appends_after_success_only() {
    let backend = seeded();
    let mut editor = opened(&backend, Some("a")).await;
    editor.apply(ActivityEdit::Kind(ActivityType::Reading)).expect("kind");

    let ticket = editor.begin_material_upload("week1.pdf").expect("begin");
    assert!(editor.form().expect("form").reading_data.materials.is_empty());
    assert!(matches!(
        editor.begin_material_upload("second.pdf"),
        Err(EditorError::UploadInFlight(_))
    ));

    let result = backend.upload_media(MediaFile::new("week1.pdf", vec![7]), "pdf").await;
    assert!(editor.complete_material_upload(ticket, result).expect("complete"));

    let materials = &editor.form().expect("form").reading_data.materials;
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].title, "week1.pdf");
    assert_eq!(materials[0].url, "https://cdn.test/week1.pdf");
    assert_eq!(materials[0].media_type, MaterialMediaType::Pdf);

    assert!(editor.upload_material(MediaFile::new("clip.mp4", vec![1])).await.expect("upload"));
    assert!(backend
        .calls()
        .contains(&Call::Upload { file_name: "clip.mp4".to_string(), media_type: "video".to_string() }));
}
