//! In-process collaborator implementations driven directly by a host.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use quire_event::{Emitter, Event};
use serde_json::Value;
use tracing::{debug, trace};

use super::{ConfigurationService, EditorGroupService, FileChanges, FileOperationEvent, FileService, LifecycleService};
use crate::{Resource, ResourceKey};

/// [`FileService`] whose events are pushed by the host.
#[derive(Debug, Default)]
pub struct FileEvents {
	operations: Emitter<FileOperationEvent>,
	changes: Emitter<FileChanges>,
}

impl FileEvents {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes a completed file operation.
	pub fn operation_completed(&self, event: FileOperationEvent) {
		trace!(operation = ?event.operation, resource = %event.resource, "hub.files.operation");
		self.operations.fire(&event);
	}

	/// Publishes externally detected changes; empty batches are dropped.
	pub fn files_changed(&self, changes: FileChanges) {
		if changes.is_empty() {
			return;
		}
		trace!(changes = changes.len(), "hub.files.changed");
		self.changes.fire(&changes);
	}
}

impl FileService for FileEvents {
	fn on_did_run_operation(&self) -> Event<FileOperationEvent> {
		self.operations.event()
	}

	fn on_did_files_change(&self) -> Event<FileChanges> {
		self.changes.event()
	}
}

/// [`ConfigurationService`] over a replaceable JSON tree.
#[derive(Debug)]
pub struct ConfigurationStore {
	current: RwLock<Value>,
	changed: Emitter<Value>,
}

impl ConfigurationStore {
	pub fn new(initial: Value) -> Self {
		Self {
			current: RwLock::new(initial),
			changed: Emitter::new(),
		}
	}

	/// Replaces the whole tree and notifies listeners.
	pub fn replace(&self, value: Value) {
		*self.current.write() = value.clone();
		debug!("hub.configuration.replace");
		self.changed.fire(&value);
	}
}

impl Default for ConfigurationStore {
	fn default() -> Self {
		Self::new(Value::Object(Default::default()))
	}
}

impl ConfigurationService for ConfigurationStore {
	fn snapshot(&self) -> Value {
		self.current.read().clone()
	}

	fn on_did_change_configuration(&self) -> Event<Value> {
		self.changed.event()
	}
}

/// [`EditorGroupService`] tracking a set of open resources.
#[derive(Debug, Default)]
pub struct OpenEditors {
	open: Mutex<HashSet<ResourceKey>>,
	changed: Emitter<()>,
}

impl OpenEditors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `resource` open; fires the change event if it was not.
	pub fn open(&self, resource: &Resource) {
		let inserted = self.open.lock().insert(resource.key());
		if inserted {
			self.changed.fire(&());
		}
	}

	/// Marks `resource` closed; fires the change event if it was open.
	pub fn close(&self, resource: &Resource) {
		let removed = self.open.lock().remove(&resource.key());
		if removed {
			self.changed.fire(&());
		}
	}

	pub fn len(&self) -> usize {
		self.open.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.open.lock().is_empty()
	}
}

impl EditorGroupService for OpenEditors {
	fn on_did_editors_change(&self) -> Event<()> {
		self.changed.event()
	}

	fn is_open(&self, resource: &Resource) -> bool {
		self.open.lock().contains(&resource.key())
	}
}

/// [`LifecycleService`] with a one-shot shutdown signal.
#[derive(Debug, Default)]
pub struct Lifecycle {
	shutdown: Emitter<()>,
	fired: AtomicBool,
}

impl Lifecycle {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fires the shutdown event; later calls do nothing.
	pub fn shutdown(&self) {
		if self.fired.swap(true, Ordering::AcqRel) {
			return;
		}
		debug!("hub.lifecycle.shutdown");
		self.shutdown.fire(&());
	}

	pub fn is_shut_down(&self) -> bool {
		self.fired.load(Ordering::Acquire)
	}
}

impl LifecycleService for Lifecycle {
	fn on_will_shutdown(&self) -> Event<()> {
		self.shutdown.event()
	}
}

#[cfg(test)]
mod tests;
