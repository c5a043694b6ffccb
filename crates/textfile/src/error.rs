//! Error types for model loading and persistence.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::Resource;

/// Shared, type-erased error from a model's storage layer.
pub type SourceError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the model manager and the disk model.
///
/// Cloneable because one load outcome is handed to every caller that raced
/// on the same resource.
#[derive(Debug, Clone, Error)]
pub enum Error {
	/// The model's own load failed; the error is passed through untouched.
	#[error("failed to load {resource}: {source}")]
	Load {
		/// Resource whose load failed.
		resource: Resource,
		/// Error reported by the model.
		#[source]
		source: SourceError,
	},

	/// The load task ended without producing a result (runtime shutdown).
	#[error("load of {resource} was abandoned")]
	LoadAbandoned {
		/// Resource whose load never settled.
		resource: Resource,
	},

	/// The model was disposed before its load settled.
	#[error("model for {resource} was disposed while loading")]
	ModelDisposed {
		/// Resource whose model went away.
		resource: Resource,
	},

	/// The manager was disposed before or during the operation.
	#[error("text file model manager is disposed")]
	ManagerDisposed,

	/// Reading or writing a backing file failed.
	#[error("I/O error on {path}: {source}")]
	Io {
		/// File that failed.
		path: PathBuf,
		/// Underlying error.
		#[source]
		source: Arc<io::Error>,
	},

	/// A path could not be turned into a `file://` resource.
	#[error("path is not absolute or not representable as a file URI: {0}")]
	InvalidPath(PathBuf),

	/// A string did not parse as a URI.
	#[error("invalid resource URI: {0}")]
	InvalidUri(#[from] url::ParseError),

	/// The resource has no local file path behind it.
	#[error("resource is not a local file: {0}")]
	NotAFile(Resource),
}

impl Error {
	pub(crate) fn load(resource: Resource, err: anyhow::Error) -> Self {
		let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = err.into();
		Self::Load {
			resource,
			source: Arc::from(boxed),
		}
	}

	pub(crate) fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source: Arc::new(err),
		}
	}
}

/// Result type for model manager operations.
pub type Result<T> = std::result::Result<T, Error>;
