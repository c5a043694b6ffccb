//! Registry of text file models keyed by resource.
//!
//! The manager owns one [`Entry`] per resource key. An entry carries the
//! registered model, the in-flight load shared by racing callers, the
//! listeners installed on the model and the undo record of a dirty flag
//! forced by an external delete.
//!
//! The registry lock guards short critical sections only. Models are called
//! and events are fired with the lock released, since model events re-enter
//! the manager synchronously.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use quire_event::{Event, Subscription, SubscriptionSet};
use tracing::{debug, trace};

use crate::services::{ConfigurationService, EditorGroupService, FileService, LifecycleService, ModelFactory};
use crate::{ManagerConfig, ManagerOptions, ModelChange, Resource, ResourceKey, StateChange, TextFileModel};

mod entry;
mod events;
mod loader;
mod reconcile;

use entry::{Entry, ModelWatch, same_model};
use events::{BatchedEvents, ManagerEvents};

/// Collaborators the manager listens to and calls into.
#[derive(Clone)]
pub struct Collaborators {
	pub files: Arc<dyn FileService>,
	pub configuration: Arc<dyn ConfigurationService>,
	pub editors: Arc<dyn EditorGroupService>,
	pub lifecycle: Arc<dyn LifecycleService>,
	pub factory: Arc<dyn ModelFactory>,
}

/// Options for [`TextFileModelManager::load_or_create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
	/// Encoding hint passed to the factory when a model is created.
	pub encoding: Option<String>,
	/// Reload an already registered model instead of returning it as is.
	pub force_refresh: bool,
}

impl LoadOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
		self.encoding = Some(encoding.into());
		self
	}

	pub fn force_refresh(mut self) -> Self {
		self.force_refresh = true;
		self
	}
}

/// Coordinates the lifecycle of every text file model in the process.
pub struct TextFileModelManager {
	this: Weak<Self>,
	factory: Arc<dyn ModelFactory>,
	editors: Arc<dyn EditorGroupService>,
	config: RwLock<ManagerConfig>,
	entries: Mutex<HashMap<ResourceKey, Entry>>,
	events: ManagerEvents,
	batched: BatchedEvents,
	subscriptions: Mutex<SubscriptionSet>,
	disposed: AtomicBool,
}

impl TextFileModelManager {
	/// Creates a manager and subscribes it to its collaborators.
	///
	/// The manager disposes itself when the lifecycle service announces
	/// shutdown.
	pub fn new(collaborators: Collaborators, options: ManagerOptions) -> Arc<Self> {
		let config = ManagerConfig::from_snapshot(&collaborators.configuration.snapshot());
		let manager = Arc::new_cyclic(|this| Self {
			this: this.clone(),
			factory: Arc::clone(&collaborators.factory),
			editors: Arc::clone(&collaborators.editors),
			config: RwLock::new(config),
			entries: Mutex::new(HashMap::new()),
			events: ManagerEvents::new(),
			batched: BatchedEvents::new(options.debounce),
			subscriptions: Mutex::new(SubscriptionSet::new()),
			disposed: AtomicBool::new(false),
		});
		manager.register_listeners(&collaborators);
		debug!(
			close_on_external_file_delete = config.close_on_external_file_delete,
			debounce = ?options.debounce,
			"textfile.manager.new"
		);
		manager
	}

	fn register_listeners(&self, collaborators: &Collaborators) {
		let subscriptions = [
			self.listen(collaborators.files.on_did_run_operation(), Self::on_file_operation),
			self.listen(collaborators.files.on_did_files_change(), Self::on_file_changes),
			self.listen(
				collaborators.configuration.on_did_change_configuration(),
				Self::on_configuration_change,
			),
			self.listen(collaborators.editors.on_did_editors_change(), |manager, ()| {
				manager.dispose_unused_models()
			}),
			self.listen(collaborators.lifecycle.on_will_shutdown(), |manager, ()| manager.dispose()),
		];

		let mut set = self.subscriptions.lock();
		for subscription in subscriptions {
			set.add(subscription);
		}
	}

	/// Subscribes `handler` to `event` for as long as the manager lives.
	fn listen<T: 'static>(&self, event: Event<T>, handler: fn(&Self, &T)) -> Subscription {
		let this = self.this.clone();
		event.subscribe(move |value| {
			if let Some(manager) = this.upgrade() {
				handler(&manager, value);
			}
		})
	}

	/// Returns the registered model for `resource`; never starts a load.
	pub fn get(&self, resource: &Resource) -> Option<Arc<dyn TextFileModel>> {
		self.entries
			.lock()
			.get(&resource.key())
			.and_then(|entry| entry.model.clone())
	}

	/// Returns every registered model, or only the one for `resource`.
	///
	/// Models are ordered by resource key.
	pub fn get_all(&self, resource: Option<&Resource>) -> Vec<Arc<dyn TextFileModel>> {
		if let Some(resource) = resource {
			return self.get(resource).into_iter().collect();
		}

		let entries = self.entries.lock();
		let mut keyed: Vec<(&ResourceKey, &Arc<dyn TextFileModel>)> = entries
			.iter()
			.filter_map(|(key, entry)| entry.model.as_ref().map(|model| (key, model)))
			.collect();
		keyed.sort_by(|a, b| a.0.cmp(b.0));
		keyed.into_iter().map(|(_, model)| Arc::clone(model)).collect()
	}

	/// Number of registered models.
	pub fn len(&self) -> usize {
		self.entries
			.lock()
			.values()
			.filter(|entry| entry.model.is_some())
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Current behavior toggles, as last read from configuration.
	pub fn config(&self) -> ManagerConfig {
		*self.config.read()
	}

	/// Registers `model` for `resource`.
	///
	/// Adding the instance already registered is a no-op. Otherwise any
	/// previous model's listeners are released (the previous model itself is
	/// left alone) and a dispose listener is installed that removes the entry
	/// and fires [`Self::on_model_disposed`].
	pub fn add(&self, resource: &Resource, model: Arc<dyn TextFileModel>) {
		if self.get(resource).is_some_and(|known| same_model(&known, &model)) {
			trace!(%resource, "textfile.add.already_registered");
			return;
		}

		let on_dispose = self.watch_dispose(resource, &model);
		let watch = self.watch(resource, &model);

		let (_released, _spare) = {
			let mut entries = self.entries.lock();
			let entry = entries.entry(resource.key()).or_default();
			if entry.holds(&model) {
				return;
			}

			let kept = entry.watch.take_if(|existing| existing.is_for(&model));
			let released = entry.release();
			let (watch, spare) = match kept {
				Some(kept) => (kept, Some(watch)),
				None => (watch, None),
			};
			entry.model = Some(model);
			entry.on_dispose = Some(on_dispose);
			entry.watch = Some(watch);
			(released, spare)
		};
		debug!(%resource, "textfile.add");
	}

	/// Forgets the model for `resource` and releases its listeners.
	///
	/// The model is not disposed. A load in flight for the resource is left
	/// to settle.
	pub fn remove(&self, resource: &Resource) {
		let key = resource.key();
		let _released = {
			let mut entries = self.entries.lock();
			let Some(entry) = entries.get_mut(&key) else {
				return;
			};
			let released = entry.release();
			if entry.is_vacant() {
				entries.remove(&key);
			}
			released
		};
		debug!(%resource, "textfile.remove");
	}

	/// Releases every listener of every entry and empties the registry.
	pub fn clear(&self) {
		let drained: Vec<Entry> = self.entries.lock().drain().map(|(_, entry)| entry).collect();
		debug!(entries = drained.len(), "textfile.clear");
	}

	/// Tears the manager down: detaches from collaborators, clears the
	/// registry and disposes every event stream. Idempotent.
	pub fn dispose(&self) {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		self.subscriptions.lock().dispose();
		self.clear();
		self.batched.dispose();
		self.events.dispose();
		debug!("textfile.manager.dispose");
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}

	/// Fires with the resource of a registered model that disposed.
	pub fn on_model_disposed(&self) -> Event<Resource> {
		self.events.disposed.event()
	}

	pub fn on_model_content_changed(&self) -> Event<ModelChange> {
		self.events.content_changed.event()
	}

	pub fn on_model_dirty(&self) -> Event<ModelChange> {
		self.events.dirty.event()
	}

	pub fn on_model_save_error(&self) -> Event<ModelChange> {
		self.events.save_error.event()
	}

	pub fn on_model_saved(&self) -> Event<ModelChange> {
		self.events.saved.event()
	}

	pub fn on_model_reverted(&self) -> Event<ModelChange> {
		self.events.reverted.event()
	}

	pub fn on_model_encoding_changed(&self) -> Event<ModelChange> {
		self.events.encoding.event()
	}

	/// Debounced batches of [`Self::on_model_dirty`].
	pub fn on_models_dirty(&self) -> Event<Vec<ModelChange>> {
		self.batched.dirty(&self.events.dirty)
	}

	/// Debounced batches of [`Self::on_model_save_error`].
	pub fn on_models_save_error(&self) -> Event<Vec<ModelChange>> {
		self.batched.save_error(&self.events.save_error)
	}

	/// Debounced batches of [`Self::on_model_saved`].
	pub fn on_models_saved(&self) -> Event<Vec<ModelChange>> {
		self.batched.saved(&self.events.saved)
	}

	/// Debounced batches of [`Self::on_model_reverted`].
	pub fn on_models_reverted(&self) -> Event<Vec<ModelChange>> {
		self.batched.reverted(&self.events.reverted)
	}

	/// Installs the state and content listeners that republish `model`'s
	/// transitions through the manager's emitters.
	fn watch(&self, resource: &Resource, model: &Arc<dyn TextFileModel>) -> ModelWatch {
		let state = {
			let this = self.this.clone();
			let resource = resource.clone();
			model.on_did_state_change().subscribe(move |change| {
				if let Some(manager) = this.upgrade() {
					manager.on_model_state_change(&resource, *change);
				}
			})
		};
		let content = {
			let this = self.this.clone();
			let resource = resource.clone();
			model.on_did_content_change().subscribe(move |()| {
				if let Some(manager) = this.upgrade() {
					manager.on_model_edited(&resource);
				}
			})
		};
		ModelWatch::new(model, state, content)
	}

	fn watch_dispose(&self, resource: &Resource, model: &Arc<dyn TextFileModel>) -> Subscription {
		let this = self.this.clone();
		let resource = resource.clone();
		let weak = Arc::downgrade(model);
		model.on_dispose().subscribe(move |()| {
			if let Some(manager) = this.upgrade() {
				manager.on_registered_model_disposed(&resource, &weak);
			}
		})
	}

	fn on_model_state_change(&self, resource: &Resource, change: StateChange) {
		if matches!(change, StateChange::Saved | StateChange::Reverted) {
			let undo = self
				.entries
				.lock()
				.get_mut(&resource.key())
				.and_then(|entry| entry.undo_dirty.take());
			if undo.is_some() {
				trace!(%resource, ?change, "textfile.undo_dirty.discard");
			}
		}
		self.events.republish(resource, change);
	}

	/// Edits make the dirty flag the user's own, so a pending external
	/// delete undo no longer applies.
	fn on_model_edited(&self, resource: &Resource) {
		let undo = self
			.entries
			.lock()
			.get_mut(&resource.key())
			.and_then(|entry| entry.undo_dirty.take());
		if undo.is_some() {
			trace!(%resource, "textfile.undo_dirty.edited");
		}
		self.events.content_changed(resource);
	}

	fn on_registered_model_disposed(&self, resource: &Resource, model: &Weak<dyn TextFileModel>) {
		let key = resource.key();
		let _released = {
			let mut entries = self.entries.lock();
			let Some(entry) = entries.get_mut(&key) else {
				return;
			};
			if !entry.holds_weak(model) {
				return;
			}
			let released = entry.release();
			if entry.is_vacant() {
				entries.remove(&key);
			}
			released
		};
		debug!(%resource, "textfile.model.disposed");
		self.events.disposed.fire(resource);
	}
}

impl Drop for TextFileModelManager {
	fn drop(&mut self) {
		self.dispose();
	}
}
