//! Reconciling registered models with file system activity.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use super::TextFileModelManager;
use crate::services::{FileChanges, FileOperation, FileOperationEvent};
use crate::{ManagerConfig, ModelState, Resource, TextFileModel};

impl TextFileModelManager {
	/// Deletes and moves done through the file service dispose the affected
	/// models, including models below a deleted or moved folder.
	pub(super) fn on_file_operation(&self, event: &FileOperationEvent) {
		if !matches!(event.operation, FileOperation::Delete | FileOperation::Move) {
			return;
		}

		let affected: Vec<Arc<dyn TextFileModel>> = self
			.get_all(None)
			.into_iter()
			.filter(|model| event.resource.is_equal_or_parent_of(model.resource()))
			.collect();
		for model in affected {
			if self.can_dispose(&model) {
				debug!(
					resource = %model.resource(),
					operation = ?event.operation,
					"textfile.dispose.file_operation"
				);
				model.dispose();
			}
		}
	}

	/// Applies the external delete policy to a batch of detected changes.
	pub(super) fn on_file_changes(&self, changes: &FileChanges) {
		let close = self.config.read().close_on_external_file_delete;

		if !close {
			for resource in changes.added() {
				self.undirty(resource);
			}
		}

		for resource in changes.deleted() {
			if !close {
				self.dirty(resource);
				continue;
			}
			if let Some(model) = self.get(resource)
				&& self.can_dispose(&model)
			{
				debug!(%resource, "textfile.dispose.external_delete");
				model.dispose();
			}
		}
	}

	pub(super) fn on_configuration_change(&self, value: &Value) {
		let next = ManagerConfig::from_snapshot(value);
		let mut current = self.config.write();
		if *current != next {
			debug!(
				close_on_external_file_delete = next.close_on_external_file_delete,
				"textfile.config.change"
			);
			*current = next;
		}
	}

	/// Disposes every registered model that is saved, idle and not open in
	/// any editor.
	pub fn dispose_unused_models(&self) {
		let mut disposed = 0usize;
		for model in self.get_all(None) {
			if self.can_dispose(&model) {
				model.dispose();
				disposed += 1;
			}
		}
		if disposed > 0 {
			debug!(disposed, "textfile.dispose.unused");
		}
	}

	fn can_dispose(&self, model: &Arc<dyn TextFileModel>) -> bool {
		if model.is_disposed() {
			return false;
		}
		let resource = model.resource();
		let loading = self
			.entries
			.lock()
			.get(&resource.key())
			.is_some_and(|entry| entry.pending.is_some());
		if loading {
			trace!(%resource, "textfile.keep.loading");
			return false;
		}
		let state = model.state();
		if state != ModelState::Saved {
			trace!(%resource, ?state, "textfile.keep.unsaved");
			return false;
		}
		if self.editors.is_open(resource) {
			trace!(%resource, "textfile.keep.open");
			return false;
		}
		true
	}

	/// Forces a saved model dirty and remembers how to undo it.
	fn dirty(&self, resource: &Resource) {
		let Some(model) = self.get(resource) else {
			return;
		};
		if model.state() != ModelState::Saved {
			trace!(%resource, "textfile.dirty.skip");
			return;
		}

		let undo = model.set_dirty(true);
		let _stale = {
			let mut entries = self.entries.lock();
			match entries.get_mut(&resource.key()) {
				Some(entry) if entry.holds(&model) => entry.undo_dirty.replace(undo),
				_ => Some(undo),
			}
		};
		debug!(%resource, "textfile.dirty.external_delete");
	}

	/// Reverts a dirty flag previously forced by [`Self::dirty`].
	fn undirty(&self, resource: &Resource) {
		let Some(model) = self.get(resource) else {
			return;
		};
		if model.state() != ModelState::Dirty {
			return;
		}

		let undo = self
			.entries
			.lock()
			.get_mut(&resource.key())
			.filter(|entry| entry.holds(&model))
			.and_then(|entry| entry.undo_dirty.take());
		let Some(undo) = undo else {
			trace!(%resource, "textfile.undirty.no_record");
			return;
		};
		undo.run();
		debug!(%resource, "textfile.undirty.external_add");
	}
}
