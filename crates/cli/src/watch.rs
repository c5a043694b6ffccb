//! Translation of file watcher notifications into [`FileChanges`].

use std::path::Path;

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};
use quire_textfile::Resource;
use quire_textfile::services::{FileChangeKind, FileChanges};
use tracing::trace;

/// Maps one watcher event onto added, updated and deleted resources.
///
/// Metadata and access events carry no content change and map to nothing.
pub(crate) fn translate(event: &notify::Event) -> FileChanges {
	let mut changes = FileChanges::new();
	match event.kind {
		EventKind::Create(_) => push_all(&mut changes, &event.paths, FileChangeKind::Added),
		EventKind::Remove(_) => push_all(&mut changes, &event.paths, FileChangeKind::Deleted),
		EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
			push_all(&mut changes, &event.paths, FileChangeKind::Deleted)
		}
		EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
			push_all(&mut changes, &event.paths, FileChangeKind::Added)
		}
		EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
			if let [from, to] = event.paths.as_slice() {
				push(&mut changes, from, FileChangeKind::Deleted);
				push(&mut changes, to, FileChangeKind::Added);
			}
		}
		EventKind::Modify(ModifyKind::Name(_)) => {
			// backend could not tell which side of the rename this is
			for path in &event.paths {
				let kind = if path.exists() {
					FileChangeKind::Added
				} else {
					FileChangeKind::Deleted
				};
				push(&mut changes, path, kind);
			}
		}
		EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => {
			push_all(&mut changes, &event.paths, FileChangeKind::Updated)
		}
		_ => trace!(kind = ?event.kind, "watch.ignored"),
	}
	changes
}

fn push_all(changes: &mut FileChanges, paths: &[std::path::PathBuf], kind: FileChangeKind) {
	for path in paths {
		push(changes, path, kind);
	}
}

fn push(changes: &mut FileChanges, path: &Path, kind: FileChangeKind) {
	match Resource::from_path(path) {
		Ok(resource) => changes.push(resource, kind),
		Err(err) => trace!(path = %path.display(), error = %err, "watch.skip_path"),
	}
}

#[cfg(all(test, unix))]
mod tests;
