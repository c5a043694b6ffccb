//! Manager configuration.
//!
//! [`ManagerConfig`] is read from the configuration service's JSON tree and
//! follows it at runtime. [`ManagerOptions`] is fixed at construction.
//!
//! Recognized settings:
//!
//! ```json
//! { "workbench": { "editor": { "closeOnExternalFileDelete": true } } }
//! ```
//!
//! Missing sections, non-object sections and non-boolean values all fall
//! back to the defaults.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Default window for batched model events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Behavior toggles read from user configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
	/// Dispose models whose file was deleted externally (instead of marking
	/// them dirty so the content survives).
	pub close_on_external_file_delete: bool,
}

impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			close_on_external_file_delete: true,
		}
	}
}

impl ManagerConfig {
	/// Extracts the manager's settings from a configuration tree.
	pub fn from_snapshot(value: &Value) -> Self {
		let snapshot = Snapshot::deserialize(value).unwrap_or_default();
		Self {
			close_on_external_file_delete: snapshot.workbench.editor.close_on_external_file_delete,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
	#[serde(default, deserialize_with = "lenient")]
	workbench: WorkbenchSection,
}

#[derive(Debug, Default, Deserialize)]
struct WorkbenchSection {
	#[serde(default, deserialize_with = "lenient")]
	editor: EditorSection,
}

#[derive(Debug, Deserialize)]
struct EditorSection {
	#[serde(rename = "closeOnExternalFileDelete", default = "default_true", deserialize_with = "bool_or_true")]
	close_on_external_file_delete: bool,
}

impl Default for EditorSection {
	fn default() -> Self {
		Self {
			close_on_external_file_delete: true,
		}
	}
}

fn default_true() -> bool {
	true
}

fn bool_or_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
	Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(true))
}

/// Deserializes a section, substituting its default when the shape is wrong.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: for<'a> Deserialize<'a> + Default,
{
	let value = Value::deserialize(deserializer)?;
	Ok(T::deserialize(&value).unwrap_or_default())
}

/// Construction-time manager options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerOptions {
	/// Window for the batched `on_models_*` events.
	pub debounce: Duration,
}

impl Default for ManagerOptions {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
		}
	}
}

impl ManagerOptions {
	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce = debounce;
		self
	}
}
