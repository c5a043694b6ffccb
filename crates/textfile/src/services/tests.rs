use pretty_assertions::assert_eq;

use super::*;

fn res(name: &str) -> Resource {
	Resource::parse(&format!("file:///work/{name}")).unwrap()
}

#[test]
fn changes_are_split_by_kind_in_order() {
	let changes = FileChanges::new()
		.with(res("a"), FileChangeKind::Deleted)
		.with(res("b"), FileChangeKind::Added)
		.with(res("c"), FileChangeKind::Deleted)
		.with(res("d"), FileChangeKind::Updated);

	assert_eq!(changes.len(), 4);
	assert_eq!(changes.deleted().cloned().collect::<Vec<_>>(), vec![res("a"), res("c")]);
	assert_eq!(changes.added().cloned().collect::<Vec<_>>(), vec![res("b")]);
	assert_eq!(changes.updated().cloned().collect::<Vec<_>>(), vec![res("d")]);
	assert!(changes.contains(&res("c"), FileChangeKind::Deleted));
	assert!(!changes.contains(&res("c"), FileChangeKind::Added));
}

#[test]
fn operation_event_carries_target() {
	let event = FileOperationEvent::new(FileOperation::Move, res("a")).with_target(res("b"));

	assert_eq!(event.operation, FileOperation::Move);
	assert_eq!(event.resource, res("a"));
	assert_eq!(event.target, Some(res("b")));
}
