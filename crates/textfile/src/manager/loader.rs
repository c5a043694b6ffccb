//! Deduplicated model loading.
//!
//! The first caller for a resource spawns the load and parks a shared handle
//! to its outcome in the registry entry. Callers arriving before it settles
//! await that same handle. The spawned task settles the entry exactly once,
//! whether or not anyone is still awaiting.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use quire_event::{TaskClass, spawn};
use tracing::{debug, trace, warn};

use super::TextFileModelManager;
use super::entry::PendingLoad;
use crate::{ChangeKind, Error, LoadOptions, ModelChange, Resource, Result, TextFileModel};

enum Started {
	Ready(Arc<dyn TextFileModel>),
	Pending(PendingLoad),
}

impl TextFileModelManager {
	/// Returns the model for `resource`, loading it first when needed.
	///
	/// - A load already in flight is joined; every racing caller observes
	///   the same outcome.
	/// - A registered model is returned directly, or reloaded when
	///   [`LoadOptions::force_refresh`] is set.
	/// - Otherwise the factory creates a model, which is registered once its
	///   load succeeds. A model dirty right after loading is announced
	///   through [`Self::on_model_dirty`].
	///
	/// A failed load disposes a model created by this call and returns the
	/// model's error; the caller may retry.
	pub async fn load_or_create(&self, resource: &Resource, options: LoadOptions) -> Result<Arc<dyn TextFileModel>> {
		match self.start_load(resource, &options)? {
			Started::Ready(model) => Ok(model),
			Started::Pending(pending) => pending.await,
		}
	}

	fn start_load(&self, resource: &Resource, options: &LoadOptions) -> Result<Started> {
		if self.is_disposed() {
			return Err(Error::ManagerDisposed);
		}

		let mut entries = self.entries.lock();
		let entry = entries.entry(resource.key()).or_default();

		if let Some(pending) = &entry.pending {
			trace!(%resource, "textfile.load.join");
			return Ok(Started::Pending(pending.clone()));
		}

		let (model, created) = match &entry.model {
			Some(model) if !options.force_refresh => return Ok(Started::Ready(Arc::clone(model))),
			Some(model) => (Arc::clone(model), false),
			None => (self.factory.create(resource, options.encoding.as_deref()), true),
		};

		// Listeners go in before the load runs so its transitions are seen.
		if !entry.watch.as_ref().is_some_and(|watch| watch.is_for(&model)) {
			entry.watch = Some(self.watch(resource, &model));
		}

		debug!(%resource, created, encoding = ?options.encoding, "textfile.load.start");
		let task = {
			let this = self.this.clone();
			let resource = resource.clone();
			let model = Arc::clone(&model);
			spawn(TaskClass::Interactive, async move {
				let outcome = match AssertUnwindSafe(model.load()).catch_unwind().await {
					Ok(Ok(())) => Ok(()),
					Ok(Err(err)) => Err(Error::load(resource.clone(), err)),
					Err(_) => {
						warn!(%resource, "textfile.load.panicked");
						Err(Error::LoadAbandoned {
							resource: resource.clone(),
						})
					}
				};
				match this.upgrade() {
					Some(manager) => manager.settle_load(&resource, model, created, outcome),
					None => {
						if created {
							model.dispose();
						}
						Err(Error::ManagerDisposed)
					}
				}
			})
		};

		let abandoned = resource.clone();
		let pending: PendingLoad = async move {
			task.await
				.unwrap_or_else(|_| Err(Error::LoadAbandoned { resource: abandoned }))
		}
		.boxed()
		.shared();
		entry.pending = Some(pending.clone());
		Ok(Started::Pending(pending))
	}

	/// Records the outcome of a load; runs once per spawned load.
	fn settle_load(
		&self,
		resource: &Resource,
		model: Arc<dyn TextFileModel>,
		created: bool,
		outcome: Result<()>,
	) -> Result<Arc<dyn TextFileModel>> {
		if let Err(err) = outcome {
			self.abandon_load(resource, &model, created);
			if created {
				model.dispose();
			}
			warn!(%resource, error = %err, "textfile.load.failed");
			return Err(err);
		}

		if self.is_disposed() {
			if created {
				model.dispose();
			}
			debug!(%resource, "textfile.load.after_dispose");
			return Err(Error::ManagerDisposed);
		}

		if model.is_disposed() {
			self.discard_disposed(resource, &model);
			debug!(%resource, "textfile.load.model_disposed");
			return Err(Error::ModelDisposed {
				resource: resource.clone(),
			});
		}

		self.add(resource, Arc::clone(&model));
		if model.is_dirty() {
			trace!(%resource, "textfile.load.dirty");
			self.events
				.dirty
				.fire(&ModelChange::new(resource.clone(), ChangeKind::Dirty));
		}
		self.clear_pending(resource);
		debug!(%resource, "textfile.load.done");
		Ok(model)
	}

	/// Clears the pending marker of a failed load and drops the listeners
	/// installed for a model that never got registered.
	fn abandon_load(&self, resource: &Resource, model: &Arc<dyn TextFileModel>, created: bool) {
		let key = resource.key();
		let _stale = {
			let mut entries = self.entries.lock();
			let Some(entry) = entries.get_mut(&key) else {
				return;
			};
			entry.pending = None;
			let stale = if created && !entry.holds(model) {
				entry.watch.take_if(|watch| watch.is_for(model))
			} else {
				None
			};
			if entry.is_vacant() {
				entries.remove(&key);
			}
			stale
		};
	}

	/// Drops every trace of a model disposed while its load was in flight.
	fn discard_disposed(&self, resource: &Resource, model: &Arc<dyn TextFileModel>) {
		let key = resource.key();
		let _stale = {
			let mut entries = self.entries.lock();
			let Some(entry) = entries.get_mut(&key) else {
				return;
			};
			entry.pending = None;
			let released = entry.holds(model).then(|| entry.release());
			let watch = entry.watch.take_if(|watch| watch.is_for(model));
			if entry.is_vacant() {
				entries.remove(&key);
			}
			(released, watch)
		};
	}

	fn clear_pending(&self, resource: &Resource) {
		let key = resource.key();
		let mut entries = self.entries.lock();
		if let Some(entry) = entries.get_mut(&key) {
			entry.pending = None;
			if entry.is_vacant() {
				entries.remove(&key);
			}
		}
	}
}
