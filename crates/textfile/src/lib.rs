//! Text file model registry.
//!
//! [`TextFileModelManager`] keeps at most one [`TextFileModel`] per
//! [`Resource`], deduplicates concurrent loads, reconciles models with file
//! operations and externally detected file changes, and republishes model
//! state transitions as granular and debounced batched events.
//!
//! Collaborators (file events, configuration, open editors, shutdown, model
//! construction) are reached only through the traits in [`services`];
//! [`services::hub`] provides in-process implementations a host can drive.
//! [`disk`] offers a [`TextFileModel`] backed by a local file.

pub mod config;
pub mod disk;
mod error;
mod manager;
pub mod model;
mod resource;
pub mod services;

pub use config::{DEFAULT_DEBOUNCE, ManagerConfig, ManagerOptions};
pub use error::{Error, Result};
pub use manager::{Collaborators, LoadOptions, TextFileModelManager};
pub use model::{ChangeKind, ModelChange, ModelState, StateChange, TextFileModel, UndoDirty};
pub use resource::{Resource, ResourceKey};
