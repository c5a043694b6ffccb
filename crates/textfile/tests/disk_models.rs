//! Manager driving real files through the disk model.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quire_textfile::disk::{DiskModelFactory, DiskTextFile};
use quire_textfile::services::hub::{ConfigurationStore, FileEvents, Lifecycle, OpenEditors};
use quire_textfile::services::{FileChangeKind, FileChanges};
use quire_textfile::{
	ChangeKind, Collaborators, LoadOptions, ManagerOptions, ModelState, Resource, TextFileModel, TextFileModelManager,
};
use serde_json::json;

struct Host {
	files: Arc<FileEvents>,
	editors: Arc<OpenEditors>,
	manager: Arc<TextFileModelManager>,
}

fn host(close_on_delete: bool) -> Host {
	let files = Arc::new(FileEvents::new());
	let editors = Arc::new(OpenEditors::new());
	let configuration = Arc::new(ConfigurationStore::new(json!({
		"workbench": { "editor": { "closeOnExternalFileDelete": close_on_delete } }
	})));
	let manager = TextFileModelManager::new(
		Collaborators {
			files: files.clone(),
			configuration,
			editors: editors.clone(),
			lifecycle: Arc::new(Lifecycle::new()),
			factory: Arc::new(DiskModelFactory),
		},
		ManagerOptions::default().with_debounce(Duration::from_millis(20)),
	);
	Host { files, editors, manager }
}

#[tokio::test]
async fn deleted_file_closes_its_model() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("notes.md");
	std::fs::write(&path, "# notes").unwrap();
	let resource = Resource::from_path(&path).unwrap();
	let host = host(true);

	let model = host
		.manager
		.load_or_create(&resource, LoadOptions::new())
		.await
		.unwrap();
	assert_eq!(model.state(), ModelState::Saved);

	std::fs::remove_file(&path).unwrap();
	host.files
		.files_changed(FileChanges::new().with(resource.clone(), FileChangeKind::Deleted));

	assert!(model.is_disposed());
	assert!(host.manager.get(&resource).is_none());
}

#[tokio::test]
async fn deleted_file_stays_dirty_until_restored() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("notes.md");
	std::fs::write(&path, "# notes").unwrap();
	let resource = Resource::from_path(&path).unwrap();
	let host = host(false);
	host.editors.open(&resource);

	let model = host
		.manager
		.load_or_create(&resource, LoadOptions::new())
		.await
		.unwrap();

	host.files
		.files_changed(FileChanges::new().with(resource.clone(), FileChangeKind::Deleted));
	assert!(!model.is_disposed());
	assert!(model.is_dirty());

	host.files
		.files_changed(FileChanges::new().with(resource.clone(), FileChangeKind::Added));
	assert!(!model.is_dirty());
	assert_eq!(model.state(), ModelState::Saved);
}

#[tokio::test]
async fn missing_file_fails_to_load() {
	let dir = tempfile::tempdir().unwrap();
	let resource = Resource::from_path(&dir.path().join("absent.txt")).unwrap();
	let host = host(true);

	let result = host.manager.load_or_create(&resource, LoadOptions::new()).await;

	assert!(result.is_err());
	assert!(host.manager.get(&resource).is_none());
}

#[tokio::test]
async fn saves_are_batched() {
	let dir = tempfile::tempdir().unwrap();
	let host = host(true);
	let batches = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&batches);
	let _sub = host.manager.on_models_saved().subscribe(move |batch| sink.lock().push(batch.clone()));

	let mut models = Vec::new();
	for name in ["a.txt", "b.txt"] {
		let path = dir.path().join(name);
		std::fs::write(&path, name).unwrap();
		let resource = Resource::from_path(&path).unwrap();
		let model = Arc::new(DiskTextFile::new(resource.clone(), None));
		model.load().await.unwrap();
		host.manager.add(&resource, model.clone());
		models.push(model);
	}

	for model in &models {
		model.set_text("edited");
		model.save().await.unwrap();
	}
	tokio::time::sleep(Duration::from_millis(200)).await;

	let saved: Vec<Resource> = batches
		.lock()
		.iter()
		.flatten()
		.inspect(|change| assert_eq!(change.kind, ChangeKind::Saved))
		.map(|change| change.resource.clone())
		.collect();
	assert_eq!(saved, vec![models[0].resource().clone(), models[1].resource().clone()]);
	assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), "edited");
}
