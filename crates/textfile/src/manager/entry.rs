//! Registry entry: everything the manager tracks for one resource key.

use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, Shared};
use quire_event::Subscription;

use crate::{Result, TextFileModel, UndoDirty};

/// Load shared by every caller racing on one resource.
pub(super) type PendingLoad = Shared<BoxFuture<'static, Result<Arc<dyn TextFileModel>>>>;

/// Compares model identity by data address (vtable pointers may differ).
pub(super) fn same_model(a: &Arc<dyn TextFileModel>, b: &Arc<dyn TextFileModel>) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// State-change and content-change listeners installed on one model.
pub(super) struct ModelWatch {
	model: Weak<dyn TextFileModel>,
	_state: Subscription,
	_content: Subscription,
}

impl ModelWatch {
	pub(super) fn new(model: &Arc<dyn TextFileModel>, state: Subscription, content: Subscription) -> Self {
		Self {
			model: Arc::downgrade(model),
			_state: state,
			_content: content,
		}
	}

	pub(super) fn is_for(&self, model: &Arc<dyn TextFileModel>) -> bool {
		std::ptr::addr_eq(self.model.as_ptr(), Arc::as_ptr(model))
	}
}

/// Per-resource registry record.
#[derive(Default)]
pub(super) struct Entry {
	/// Registered model; absent while the first load is in flight.
	pub model: Option<Arc<dyn TextFileModel>>,
	pub pending: Option<PendingLoad>,
	pub on_dispose: Option<Subscription>,
	pub watch: Option<ModelWatch>,
	/// Reverts a dirty flag forced by an external delete.
	pub undo_dirty: Option<UndoDirty>,
}

/// Parts taken out of an entry, dropped once the registry lock is released.
pub(super) struct Released {
	_model: Option<Arc<dyn TextFileModel>>,
	_on_dispose: Option<Subscription>,
	_watch: Option<ModelWatch>,
	_undo_dirty: Option<UndoDirty>,
}

impl Entry {
	/// Takes the model, its listeners and any undo record; keeps `pending`.
	pub(super) fn release(&mut self) -> Released {
		Released {
			_model: self.model.take(),
			_on_dispose: self.on_dispose.take(),
			_watch: self.watch.take(),
			_undo_dirty: self.undo_dirty.take(),
		}
	}

	/// True when nothing is left worth keeping in the table.
	pub(super) fn is_vacant(&self) -> bool {
		self.model.is_none() && self.pending.is_none() && self.on_dispose.is_none() && self.watch.is_none() && self.undo_dirty.is_none()
	}

	pub(super) fn holds(&self, model: &Arc<dyn TextFileModel>) -> bool {
		self.model.as_ref().is_some_and(|known| same_model(known, model))
	}

	pub(super) fn holds_weak(&self, model: &Weak<dyn TextFileModel>) -> bool {
		self.model
			.as_ref()
			.is_some_and(|known| std::ptr::addr_eq(Arc::as_ptr(known), model.as_ptr()))
	}
}
