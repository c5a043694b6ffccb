//! The model contract the manager drives, plus its state and change types.

use std::fmt;

use async_trait::async_trait;
use quire_event::Event;

use crate::Resource;

/// Persistence state of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelState {
	/// Content matches storage.
	Saved,
	/// Content diverges from storage.
	Dirty,
	/// The last save failed; content still diverges.
	SaveError,
	/// A save is in progress.
	Pending,
	/// The backing file vanished.
	Orphan,
}

/// Transition reported by a model through [`TextFileModel::on_did_state_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
	Dirty,
	SaveError,
	Saved,
	Reverted,
	Encoding,
	Orphaned,
	Restored,
}

/// Kind of a [`ModelChange`] republished by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	Dirty,
	SaveError,
	Saved,
	Reverted,
	Encoding,
	ContentChanged,
}

/// Change notification emitted by the manager for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChange {
	pub resource: Resource,
	pub kind: ChangeKind,
}

impl ModelChange {
	pub fn new(resource: Resource, kind: ChangeKind) -> Self {
		Self { resource, kind }
	}
}

/// Restores the dirty flag a [`TextFileModel::set_dirty`] call overwrote.
#[must_use = "an UndoDirty does nothing unless run"]
pub struct UndoDirty(Box<dyn FnOnce() + Send>);

impl UndoDirty {
	pub fn new(undo: impl FnOnce() + Send + 'static) -> Self {
		Self(Box::new(undo))
	}

	/// An undo action that does nothing.
	pub fn noop() -> Self {
		Self::new(|| {})
	}

	pub fn run(self) {
		(self.0)();
	}
}

impl fmt::Debug for UndoDirty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("UndoDirty")
	}
}

/// In-memory text buffer bound to a [`Resource`].
///
/// Implementations fire their events synchronously and must tolerate the
/// manager calling back into them from inside those events. `load` resolves
/// once the content is usable and may be called again to refresh it.
///
/// The `on_*` accessors may be called while the manager holds its registry
/// lock and must not call back into the manager.
#[async_trait]
pub trait TextFileModel: Send + Sync + 'static {
	fn resource(&self) -> &Resource;

	/// Loads (or reloads) content from storage.
	async fn load(&self) -> anyhow::Result<()>;

	fn state(&self) -> ModelState;

	fn is_dirty(&self) -> bool;

	fn is_disposed(&self) -> bool;

	/// Encoding label in use, if known.
	fn encoding(&self) -> Option<String>;

	/// Forces the dirty flag, returning how to put the previous flag back.
	fn set_dirty(&self, dirty: bool) -> UndoDirty;

	/// Releases the model; fires [`TextFileModel::on_dispose`] once.
	fn dispose(&self);

	fn on_did_state_change(&self) -> Event<StateChange>;

	fn on_did_content_change(&self) -> Event<()>;

	fn on_dispose(&self) -> Event<()>;
}
