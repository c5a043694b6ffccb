//! [`TextFileModel`] backed by a local file.
//!
//! Content lives in a [`Rope`]. Reads and writes go through `tokio::fs`;
//! bytes are decoded as UTF-8, replacing invalid sequences. The encoding
//! label is recorded and reported but does not change decoding.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use quire_event::{Emitter, Event};
use ropey::Rope;
use tracing::{debug, trace, warn};

use crate::services::ModelFactory;
use crate::{Error, ModelState, Resource, Result, StateChange, TextFileModel, UndoDirty};

/// Encoding label used when no hint is given.
pub const DEFAULT_ENCODING: &str = "utf8";

struct Buffer {
	text: Rope,
	encoding: String,
	state: ModelState,
	dirty: bool,
	/// Bumped on every content change; lets a save detect edits made while
	/// it was writing.
	version: u64,
}

/// A text file held in memory, loaded from and saved to disk.
pub struct DiskTextFile {
	resource: Resource,
	path: Option<PathBuf>,
	buffer: Arc<Mutex<Buffer>>,
	disposed: AtomicBool,
	state_changes: Emitter<StateChange>,
	content_changes: Emitter<()>,
	disposals: Emitter<()>,
}

impl DiskTextFile {
	pub fn new(resource: Resource, encoding: Option<&str>) -> Self {
		let path = resource.to_file_path();
		Self {
			resource,
			path,
			buffer: Arc::new(Mutex::new(Buffer {
				text: Rope::new(),
				encoding: encoding.unwrap_or(DEFAULT_ENCODING).to_owned(),
				state: ModelState::Saved,
				dirty: false,
				version: 0,
			})),
			disposed: AtomicBool::new(false),
			state_changes: Emitter::new(),
			content_changes: Emitter::new(),
			disposals: Emitter::new(),
		}
	}

	/// Local path behind the resource, if it is a `file://` resource.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Current content.
	pub fn text(&self) -> String {
		self.buffer.lock().text.to_string()
	}

	/// Cheap snapshot of the current content.
	pub fn rope(&self) -> Rope {
		self.buffer.lock().text.clone()
	}

	/// Replaces the content, marking the model dirty.
	pub fn set_text(&self, text: &str) {
		let became_dirty = {
			let mut buffer = self.buffer.lock();
			buffer.text = Rope::from_str(text);
			buffer.version += 1;
			let became_dirty = !buffer.dirty;
			buffer.dirty = true;
			buffer.state = ModelState::Dirty;
			became_dirty
		};
		self.content_changes.fire(&());
		if became_dirty {
			self.state_changes.fire(&StateChange::Dirty);
		}
	}

	/// Inserts `text` at char index `at`, marking the model dirty.
	pub fn insert(&self, at: usize, text: &str) {
		let became_dirty = {
			let mut buffer = self.buffer.lock();
			let at = at.min(buffer.text.len_chars());
			buffer.text.insert(at, text);
			buffer.version += 1;
			let became_dirty = !buffer.dirty;
			buffer.dirty = true;
			buffer.state = ModelState::Dirty;
			became_dirty
		};
		self.content_changes.fire(&());
		if became_dirty {
			self.state_changes.fire(&StateChange::Dirty);
		}
	}

	/// Writes the content to disk.
	///
	/// The model is [`ModelState::Pending`] while writing. Edits made during
	/// the write keep it dirty afterwards.
	pub async fn save(&self) -> Result<()> {
		let path = self.file_path()?;
		let (text, version) = {
			let mut buffer = self.buffer.lock();
			buffer.state = ModelState::Pending;
			(buffer.text.to_string(), buffer.version)
		};

		match tokio::fs::write(&path, text.as_bytes()).await {
			Ok(()) => {
				let clean = {
					let mut buffer = self.buffer.lock();
					let clean = buffer.version == version;
					buffer.dirty = !clean;
					buffer.state = if clean { ModelState::Saved } else { ModelState::Dirty };
					clean
				};
				debug!(path = %path.display(), bytes = text.len(), clean, "disk.save");
				if clean {
					self.state_changes.fire(&StateChange::Saved);
				}
				Ok(())
			}
			Err(err) => {
				self.buffer.lock().state = ModelState::SaveError;
				warn!(path = %path.display(), error = %err, "disk.save.failed");
				self.state_changes.fire(&StateChange::SaveError);
				Err(Error::io(path, err))
			}
		}
	}

	/// Discards in-memory changes and reloads from disk.
	pub async fn revert(&self) -> Result<()> {
		let path = self.file_path()?;
		let text = read_text(&path).await?;
		let changed = {
			let mut buffer = self.buffer.lock();
			let changed = buffer.text != text.as_str();
			buffer.text = Rope::from_str(&text);
			buffer.version += 1;
			buffer.dirty = false;
			buffer.state = ModelState::Saved;
			changed
		};
		debug!(path = %path.display(), changed, "disk.revert");
		if changed {
			self.content_changes.fire(&());
		}
		self.state_changes.fire(&StateChange::Reverted);
		Ok(())
	}

	/// Changes the encoding label; fires [`StateChange::Encoding`] on change.
	pub fn set_encoding(&self, encoding: &str) {
		{
			let mut buffer = self.buffer.lock();
			if buffer.encoding == encoding {
				return;
			}
			buffer.encoding = encoding.to_owned();
		}
		self.state_changes.fire(&StateChange::Encoding);
	}

	fn file_path(&self) -> Result<PathBuf> {
		self.path
			.clone()
			.ok_or_else(|| Error::NotAFile(self.resource.clone()))
	}
}

async fn read_text(path: &Path) -> Result<String> {
	let bytes = tokio::fs::read(path).await.map_err(|err| Error::io(path, err))?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl TextFileModel for DiskTextFile {
	fn resource(&self) -> &Resource {
		&self.resource
	}

	/// Reads the file; a dirty buffer is left untouched.
	async fn load(&self) -> anyhow::Result<()> {
		let path = self.file_path()?;
		if self.is_dirty() {
			trace!(path = %path.display(), "disk.load.skip_dirty");
			return Ok(());
		}

		let text = read_text(&path).await?;
		let changed = {
			let mut buffer = self.buffer.lock();
			if buffer.dirty {
				// edited while the read was in flight
				false
			} else {
				let changed = buffer.text != text.as_str();
				if changed {
					buffer.text = Rope::from_str(&text);
					buffer.version += 1;
				}
				buffer.state = ModelState::Saved;
				changed
			}
		};
		debug!(path = %path.display(), bytes = text.len(), changed, "disk.load");
		if changed {
			self.content_changes.fire(&());
		}
		Ok(())
	}

	fn state(&self) -> ModelState {
		self.buffer.lock().state
	}

	fn is_dirty(&self) -> bool {
		self.buffer.lock().dirty
	}

	fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}

	fn encoding(&self) -> Option<String> {
		Some(self.buffer.lock().encoding.clone())
	}

	fn set_dirty(&self, dirty: bool) -> UndoDirty {
		let (was_dirty, was_state) = {
			let mut buffer = self.buffer.lock();
			let previous = (buffer.dirty, buffer.state);
			buffer.dirty = dirty;
			buffer.state = if dirty { ModelState::Dirty } else { ModelState::Saved };
			previous
		};
		if dirty && !was_dirty {
			self.state_changes.fire(&StateChange::Dirty);
		}

		let buffer: Weak<Mutex<Buffer>> = Arc::downgrade(&self.buffer);
		UndoDirty::new(move || {
			if let Some(buffer) = buffer.upgrade() {
				let mut buffer = buffer.lock();
				buffer.dirty = was_dirty;
				buffer.state = was_state;
			}
		})
	}

	fn dispose(&self) {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		trace!(resource = %self.resource, "disk.dispose");
		self.disposals.fire(&());
		self.state_changes.dispose();
		self.content_changes.dispose();
		self.disposals.dispose();
	}

	fn on_did_state_change(&self) -> Event<StateChange> {
		self.state_changes.event()
	}

	fn on_did_content_change(&self) -> Event<()> {
		self.content_changes.event()
	}

	fn on_dispose(&self) -> Event<()> {
		self.disposals.event()
	}
}

/// [`ModelFactory`] producing [`DiskTextFile`] models.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskModelFactory;

impl ModelFactory for DiskModelFactory {
	fn create(&self, resource: &Resource, encoding: Option<&str>) -> Arc<dyn TextFileModel> {
		Arc::new(DiskTextFile::new(resource.clone(), encoding))
	}
}
