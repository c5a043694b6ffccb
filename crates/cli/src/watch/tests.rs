use std::path::PathBuf;

use notify::Event;
use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};
use pretty_assertions::assert_eq;

use super::*;

fn resource(path: &str) -> Resource {
	Resource::from_path(&PathBuf::from(path)).unwrap()
}

fn kinds(changes: &FileChanges) -> Vec<(Resource, FileChangeKind)> {
	changes
		.iter()
		.map(|change| (change.resource.clone(), change.kind))
		.collect()
}

#[test]
fn create_and_remove_map_to_added_and_deleted() {
	let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/tmp/quire/a.txt"));
	let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("/tmp/quire/b.txt"));

	assert_eq!(
		kinds(&translate(&created)),
		vec![(resource("/tmp/quire/a.txt"), FileChangeKind::Added)]
	);
	assert_eq!(
		kinds(&translate(&removed)),
		vec![(resource("/tmp/quire/b.txt"), FileChangeKind::Deleted)]
	);
}

#[test]
fn rename_with_both_paths_deletes_source_and_adds_target() {
	let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
		.add_path(PathBuf::from("/tmp/quire/old.txt"))
		.add_path(PathBuf::from("/tmp/quire/new.txt"));

	assert_eq!(
		kinds(&translate(&renamed)),
		vec![
			(resource("/tmp/quire/old.txt"), FileChangeKind::Deleted),
			(resource("/tmp/quire/new.txt"), FileChangeKind::Added),
		]
	);
}

#[test]
fn rename_halves_map_independently() {
	let from = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From))).add_path(PathBuf::from("/tmp/quire/a"));
	let to = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(PathBuf::from("/tmp/quire/b"));

	assert!(translate(&from).contains(&resource("/tmp/quire/a"), FileChangeKind::Deleted));
	assert!(translate(&to).contains(&resource("/tmp/quire/b"), FileChangeKind::Added));
}

#[test]
fn content_writes_map_to_updated() {
	let written =
		Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(PathBuf::from("/tmp/quire/a.txt"));

	assert_eq!(
		kinds(&translate(&written)),
		vec![(resource("/tmp/quire/a.txt"), FileChangeKind::Updated)]
	);
}

#[test]
fn metadata_and_access_are_ignored() {
	let touched = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)))
		.add_path(PathBuf::from("/tmp/quire/a.txt"));
	let read = Event::new(EventKind::Access(AccessKind::Read)).add_path(PathBuf::from("/tmp/quire/a.txt"));

	assert!(translate(&touched).is_empty());
	assert!(translate(&read).is_empty());
}

#[test]
fn relative_paths_are_skipped() {
	let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("relative.txt"));

	assert!(translate(&created).is_empty());
}
