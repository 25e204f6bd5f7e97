use doc_model::{GuideUpload, NoteField, ProjectAction, ProjectState};
use guidelens_core::{
    export_json, CoreError, ImportError, ManualClock, ProjectStore, SheetDraft, Workspace,
    WorkspaceConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::{
    GuideFileUrl, HandleStore, KeyValueStore, MemoryKeyValueStore, Storage, StorageBackend,
    StorageError, StorageMode, StorageResult,
};

/// Backend that records every write.
#[derive(Default)]
struct RecordingBackend {
    writes: Mutex<Vec<ProjectState>>,
    guide_files: AtomicUsize,
}

impl StorageBackend for RecordingBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }

    fn save_project_state(&self, state: &ProjectState) -> StorageResult<()> {
        self.writes.lock().unwrap().push(state.clone());
        Ok(())
    }

    fn load_project_state(&self) -> StorageResult<Option<ProjectState>> {
        Ok(self.writes.lock().unwrap().last().cloned())
    }

    fn save_guide_file(&self, _upload: &GuideUpload, _guide_id: &str) -> StorageResult<()> {
        self.guide_files.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn guide_file_url(&self, guide_id: &str) -> StorageResult<GuideFileUrl> {
        Err(StorageError::GuideFileNotFound(guide_id.to_owned()))
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new("2024-05-02T09:30:00Z".parse().unwrap()))
}

#[test]
fn rapid_updates_flush_once_with_final_state() {
    let backend = Arc::new(RecordingBackend::default());
    let clock = clock();
    let store = ProjectStore::open(backend.clone(), clock.clone(), WorkspaceConfig::default());
    let guide_id = store
        .upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec()))
        .unwrap()
        .guide_id()
        .to_owned();
    assert_eq!(backend.guide_files.load(Ordering::SeqCst), 1);

    for n in 1..=10 {
        clock.advance(Duration::from_millis(50));
        store
            .apply(ProjectAction::AddEmergentCode {
                guide_id: guide_id.clone(),
                dimension_id: "dimension-1".to_owned(),
                code: format!("code-{n}"),
            })
            .unwrap();
        store.tick();
    }
    assert!(backend.writes.lock().unwrap().is_empty());

    clock.advance(Duration::from_millis(800));
    assert!(store.tick());
    assert!(!store.tick());

    let writes = backend.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    let codes = &writes[0].sheet(&guide_id, "dimension-1").unwrap().notes.emergent_codes;
    assert_eq!(codes.len(), 10);
    assert_eq!(codes.last().map(String::as_str), Some("code-10"));
}

#[test]
fn sheet_merge_keeps_other_dimensions_and_guides() {
    let clock = clock();
    let store = ProjectStore::open(Arc::new(Storage::in_memory()), clock.clone(), WorkspaceConfig::default());
    let first = store.upload_guide(GuideUpload::new("a.pdf", b"a".to_vec())).unwrap().guide_id().to_owned();
    let second = store.upload_guide(GuideUpload::new("b.pdf", b"b".to_vec())).unwrap().guide_id().to_owned();

    for (guide_id, dimension_id, text) in [
        (&first, "dimension-2", "kept on B"),
        (&second, "dimension-1", "other guide"),
    ] {
        store
            .apply(ProjectAction::UpdateSheetNotes {
                guide_id: guide_id.clone(),
                dimension_id: dimension_id.to_owned(),
                field: NoteField::Descriptive,
                value: text.to_owned(),
            })
            .unwrap();
    }

    let mut draft = SheetDraft::open(&store, &first).unwrap();
    draft.set_field("dimension-1", NoteField::Interpretive, "edited A").unwrap();
    draft.flush().unwrap();

    store.read(|project| {
        assert_eq!(project.sheet(&first, "dimension-1").unwrap().notes.interpretive, "edited A");
        assert_eq!(project.sheet(&first, "dimension-2").unwrap().notes.descriptive, "kept on B");
        assert_eq!(project.sheet(&second, "dimension-1").unwrap().notes.descriptive, "other guide");
    });
}

#[test]
fn stale_directory_on_startup_falls_back_to_local() {
    let fallback: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let handles_kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let handles = HandleStore::new(handles_kv.clone());

    let gone = tempfile::tempdir().unwrap();
    let gone_path = gone.path().to_path_buf();
    handles.save(&gone_path).unwrap();
    drop(gone);

    let storage = Arc::new(Storage::with_stores(fallback, handles_kv, true));
    let workspace = Workspace::with_storage(storage, clock(), WorkspaceConfig::default());

    assert_eq!(workspace.mode(), StorageMode::Local);
    assert!(matches!(
        workspace.bootstrap_report().fallback_reason,
        Some(StorageError::StaleAuthorization { .. })
    ));
    assert_eq!(handles.load().unwrap(), None);

    workspace.store().upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec())).unwrap();
    workspace.shutdown().unwrap();
    assert!(workspace.store().status().last_error.is_none());
}

#[test]
fn rejected_import_leaves_state_unchanged() {
    let store = ProjectStore::open(Arc::new(Storage::in_memory()), clock(), WorkspaceConfig::default());
    store.upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec())).unwrap();
    let before = store.snapshot();

    let error = store.import_json("{\"version\": 1, \"guides\": [").unwrap_err();
    assert!(matches!(error, CoreError::Import(ImportError::Parse(_))));

    let mut future = serde_json::to_value(&before).unwrap();
    future["version"] = serde_json::json!(99);
    let error = store.import_json(&future.to_string()).unwrap_err();
    assert!(matches!(error, CoreError::Import(ImportError::UnsupportedVersion { found: 99 })));

    assert_eq!(store.snapshot(), before);
}

#[test]
fn import_rejects_broken_highlights_and_links() {
    let store = ProjectStore::open(Arc::new(Storage::in_memory()), clock(), WorkspaceConfig::default());
    let guide_id = store
        .upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec()))
        .unwrap()
        .guide_id()
        .to_owned();
    let before = store.snapshot();

    let highlight = serde_json::json!({
        "id": "h1",
        "guideId": guide_id,
        "dimensionId": "dimension-1",
        "text": "Risk assessment",
        "pageNumber": 1,
        "createdAt": "2024-05-02T09:30:00Z",
        "rects": []
    });
    let mut document = serde_json::to_value(&before).unwrap();
    document["highlights"] = serde_json::json!([highlight]);
    let error = store.import_json(&document.to_string()).unwrap_err();
    assert!(matches!(error, CoreError::Import(ImportError::InvalidHighlight { .. })));

    let mut document = serde_json::to_value(&before).unwrap();
    document["tags"] = serde_json::json!([{
        "id": "t1",
        "guideId": guide_id,
        "dimensionId": "dimension-1",
        "label": "Bias",
        "color": "#f59e0b",
        "createdAt": "2024-05-02T09:30:00Z",
        "links": [{ "id": "l1", "createdAt": "2024-05-02T09:30:00Z", "highlightId": "missing", "pageNumber": 1 }]
    }]);
    let error = store.import_json(&document.to_string()).unwrap_err();
    assert!(matches!(error, CoreError::Import(ImportError::DanglingLink { .. })));

    assert_eq!(store.snapshot(), before);
}

#[test]
fn exported_project_imports_into_fresh_store() {
    let source = ProjectStore::open(Arc::new(Storage::in_memory()), clock(), WorkspaceConfig::default());
    source.upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec())).unwrap();
    let document = serde_json::to_string_pretty(&source.snapshot()).unwrap();

    let target = ProjectStore::open(Arc::new(Storage::in_memory()), clock(), WorkspaceConfig::default());
    target.import_json(&document).unwrap();
    assert_eq!(target.snapshot(), source.snapshot());
    assert!(target.status().has_pending_changes);
    assert_eq!(export_json(&target.snapshot()).unwrap(), export_json(&source.snapshot()).unwrap());
}

#[test]
fn auto_save_worker_flushes_in_background() {
    let backend = Arc::new(RecordingBackend::default());
    let config = WorkspaceConfig::default()
        .with_debounce(Duration::from_millis(20))
        .with_auto_save_interval(Duration::from_millis(5));
    let store = ProjectStore::open(backend.clone(), Arc::new(guidelens_core::SystemClock), config);

    let worker = store.spawn_auto_save().unwrap();
    store.upload_guide(GuideUpload::new("report.pdf", b"%PDF".to_vec())).unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while backend.writes.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    worker.stop();

    assert_eq!(backend.writes.lock().unwrap().len(), 1);
    assert!(!store.status().has_pending_changes);
}
