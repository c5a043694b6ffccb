//! Emitters republishing model transitions, and their batched forms.

use std::sync::OnceLock;
use std::time::Duration;

use quire_event::{Debounced, Emitter, Event, batch, debounce};
use tracing::trace;

use crate::{ChangeKind, ModelChange, Resource, StateChange};

pub(super) struct ManagerEvents {
	pub disposed: Emitter<Resource>,
	pub content_changed: Emitter<ModelChange>,
	pub dirty: Emitter<ModelChange>,
	pub save_error: Emitter<ModelChange>,
	pub saved: Emitter<ModelChange>,
	pub reverted: Emitter<ModelChange>,
	pub encoding: Emitter<ModelChange>,
}

impl ManagerEvents {
	pub(super) fn new() -> Self {
		Self {
			disposed: Emitter::new(),
			content_changed: Emitter::new(),
			dirty: Emitter::new(),
			save_error: Emitter::new(),
			saved: Emitter::new(),
			reverted: Emitter::new(),
			encoding: Emitter::new(),
		}
	}

	/// Maps a model transition onto the matching granular emitter.
	pub(super) fn republish(&self, resource: &Resource, change: StateChange) {
		let (kind, emitter) = match change {
			StateChange::Dirty => (ChangeKind::Dirty, &self.dirty),
			StateChange::SaveError => (ChangeKind::SaveError, &self.save_error),
			StateChange::Saved => (ChangeKind::Saved, &self.saved),
			StateChange::Reverted => (ChangeKind::Reverted, &self.reverted),
			StateChange::Encoding => (ChangeKind::Encoding, &self.encoding),
			StateChange::Orphaned | StateChange::Restored => {
				trace!(%resource, ?change, "textfile.state_change.ignored");
				return;
			}
		};
		emitter.fire(&ModelChange::new(resource.clone(), kind));
	}

	pub(super) fn content_changed(&self, resource: &Resource) {
		self.content_changed
			.fire(&ModelChange::new(resource.clone(), ChangeKind::ContentChanged));
	}

	pub(super) fn dispose(&self) {
		self.disposed.dispose();
		self.content_changed.dispose();
		self.dirty.dispose();
		self.save_error.dispose();
		self.saved.dispose();
		self.reverted.dispose();
		self.encoding.dispose();
	}
}

type Batch = Debounced<Vec<ModelChange>>;

/// Lazily built debounced views, one per batched event kind.
pub(super) struct BatchedEvents {
	window: Duration,
	dirty: OnceLock<Batch>,
	save_error: OnceLock<Batch>,
	saved: OnceLock<Batch>,
	reverted: OnceLock<Batch>,
}

impl BatchedEvents {
	pub(super) fn new(window: Duration) -> Self {
		Self {
			window,
			dirty: OnceLock::new(),
			save_error: OnceLock::new(),
			saved: OnceLock::new(),
			reverted: OnceLock::new(),
		}
	}

	pub(super) fn dirty(&self, source: &Emitter<ModelChange>) -> Event<Vec<ModelChange>> {
		self.get(&self.dirty, source)
	}

	pub(super) fn save_error(&self, source: &Emitter<ModelChange>) -> Event<Vec<ModelChange>> {
		self.get(&self.save_error, source)
	}

	pub(super) fn saved(&self, source: &Emitter<ModelChange>) -> Event<Vec<ModelChange>> {
		self.get(&self.saved, source)
	}

	pub(super) fn reverted(&self, source: &Emitter<ModelChange>) -> Event<Vec<ModelChange>> {
		self.get(&self.reverted, source)
	}

	fn get(&self, slot: &OnceLock<Batch>, source: &Emitter<ModelChange>) -> Event<Vec<ModelChange>> {
		slot.get_or_init(|| {
			trace!(window = ?self.window, "textfile.batched_event.create");
			debounce(&source.event(), self.window, batch::<ModelChange>)
		})
		.event()
	}

	pub(super) fn dispose(&self) {
		for slot in [&self.dirty, &self.save_error, &self.saved, &self.reverted] {
			if let Some(batched) = slot.get() {
				batched.dispose();
			}
		}
	}
}
