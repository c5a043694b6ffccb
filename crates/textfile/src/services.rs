//! Collaborator contracts consumed by the manager.
//!
//! Hosts implement these traits over their real file, configuration, editor
//! and lifecycle subsystems, or use the in-process implementations in
//! [`hub`].

use std::sync::Arc;

use quire_event::Event;
use serde_json::Value;

use crate::{Resource, TextFileModel};

pub mod hub;

/// File operation performed through the tracked file service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOperation {
	Create,
	Delete,
	Move,
	Copy,
}

/// Completed file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperationEvent {
	pub operation: FileOperation,
	/// Resource the operation acted on (the source for moves and copies).
	pub resource: Resource,
	/// Destination for moves and copies.
	pub target: Option<Resource>,
}

impl FileOperationEvent {
	pub fn new(operation: FileOperation, resource: Resource) -> Self {
		Self {
			operation,
			resource,
			target: None,
		}
	}

	pub fn with_target(mut self, target: Resource) -> Self {
		self.target = Some(target);
		self
	}
}

/// Kind of an externally detected file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
	Added,
	Updated,
	Deleted,
}

/// One externally detected file change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
	pub resource: Resource,
	pub kind: FileChangeKind,
}

/// Batch of externally detected file changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
	changes: Vec<FileChange>,
}

impl FileChanges {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, resource: Resource, kind: FileChangeKind) {
		self.changes.push(FileChange { resource, kind });
	}

	/// Builder form of [`FileChanges::push`].
	pub fn with(mut self, resource: Resource, kind: FileChangeKind) -> Self {
		self.push(resource, kind);
		self
	}

	pub fn added(&self) -> impl Iterator<Item = &Resource> {
		self.of_kind(FileChangeKind::Added)
	}

	pub fn updated(&self) -> impl Iterator<Item = &Resource> {
		self.of_kind(FileChangeKind::Updated)
	}

	pub fn deleted(&self) -> impl Iterator<Item = &Resource> {
		self.of_kind(FileChangeKind::Deleted)
	}

	pub fn contains(&self, resource: &Resource, kind: FileChangeKind) -> bool {
		self.changes.iter().any(|c| c.kind == kind && &c.resource == resource)
	}

	pub fn iter(&self) -> impl Iterator<Item = &FileChange> {
		self.changes.iter()
	}

	pub fn len(&self) -> usize {
		self.changes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	fn of_kind(&self, kind: FileChangeKind) -> impl Iterator<Item = &Resource> {
		self.changes
			.iter()
			.filter(move |c| c.kind == kind)
			.map(|c| &c.resource)
	}
}

/// Source of file operation and file change notifications.
pub trait FileService: Send + Sync {
	/// Operations initiated through this service (move, delete, ...).
	fn on_did_run_operation(&self) -> Event<FileOperationEvent>;

	/// Changes detected outside this service's own operations.
	fn on_did_files_change(&self) -> Event<FileChanges>;
}

/// Read access to the user configuration.
pub trait ConfigurationService: Send + Sync {
	/// Current configuration tree.
	fn snapshot(&self) -> Value;

	/// Fires the new configuration tree after every change.
	fn on_did_change_configuration(&self) -> Event<Value>;
}

/// Visibility queries against open editors.
pub trait EditorGroupService: Send + Sync {
	/// Fires whenever the set of open editors changes.
	fn on_did_editors_change(&self) -> Event<()>;

	fn is_open(&self, resource: &Resource) -> bool;
}

/// Process lifecycle hooks.
pub trait LifecycleService: Send + Sync {
	/// Fires once before shutdown.
	fn on_will_shutdown(&self) -> Event<()>;
}

/// Constructs models for resources on first load.
///
/// Called with the manager's registry lock held; implementations must not
/// call back into the manager.
pub trait ModelFactory: Send + Sync {
	fn create(&self, resource: &Resource, encoding: Option<&str>) -> Arc<dyn TextFileModel>;
}

#[cfg(test)]
mod tests;
