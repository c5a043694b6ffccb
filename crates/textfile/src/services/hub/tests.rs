use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;
use crate::services::FileChangeKind;

fn counter<T: 'static>(event: Event<T>) -> (Arc<AtomicUsize>, quire_event::Subscription) {
	let count = Arc::new(AtomicUsize::new(0));
	let sink = Arc::clone(&count);
	let sub = event.subscribe(move |_: &T| {
		sink.fetch_add(1, Ordering::SeqCst);
	});
	(count, sub)
}

fn res(name: &str) -> Resource {
	Resource::parse(&format!("file:///work/{name}")).unwrap()
}

#[test]
fn empty_change_batches_are_dropped() {
	let files = FileEvents::new();
	let (fired, _sub) = counter(files.on_did_files_change());

	files.files_changed(FileChanges::new());
	files.files_changed(FileChanges::new().with(res("a"), FileChangeKind::Added));

	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn configuration_replace_updates_snapshot_and_notifies() {
	let store = ConfigurationStore::default();
	let (fired, _sub) = counter(store.on_did_change_configuration());
	assert_eq!(store.snapshot(), json!({}));

	store.replace(json!({ "workbench": {} }));

	assert_eq!(store.snapshot(), json!({ "workbench": {} }));
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn editors_notify_only_on_real_changes() {
	let editors = OpenEditors::new();
	let (fired, _sub) = counter(editors.on_did_editors_change());

	editors.open(&res("a"));
	editors.open(&res("a"));
	assert!(editors.is_open(&res("a")));
	assert_eq!(editors.len(), 1);

	editors.close(&res("a"));
	editors.close(&res("a"));
	assert!(editors.is_empty());
	assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn shutdown_fires_once() {
	let lifecycle = Lifecycle::new();
	let (fired, _sub) = counter(lifecycle.on_will_shutdown());

	lifecycle.shutdown();
	lifecycle.shutdown();

	assert!(lifecycle.is_shut_down());
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}
