use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::{Error, Result};

/// Canonical identifier of a file-backed buffer.
///
/// Equality and hashing follow the normalized URI, so two resources naming
/// the same file through differently written URIs compare equal once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource(Url);

/// Registry key derived from a [`Resource`] (its URI string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl Resource {
	pub fn new(url: Url) -> Self {
		Self(url)
	}

	/// Parses a URI string.
	pub fn parse(input: &str) -> Result<Self> {
		Ok(Self(Url::parse(input)?))
	}

	/// Builds a `file://` resource from an absolute path.
	pub fn from_path(path: &Path) -> Result<Self> {
		Url::from_file_path(path)
			.map(Self)
			.map_err(|()| Error::InvalidPath(path.to_path_buf()))
	}

	pub fn url(&self) -> &Url {
		&self.0
	}

	pub fn key(&self) -> ResourceKey {
		ResourceKey(self.0.as_str().to_owned())
	}

	/// Local path for `file://` resources.
	pub fn to_file_path(&self) -> Option<PathBuf> {
		if self.0.scheme() != "file" {
			return None;
		}
		self.0.to_file_path().ok()
	}

	/// Returns true when `other` is this resource or lies below it.
	///
	/// Scheme, host and port must match; path containment is decided on
	/// whole segments, so `/a/b` contains `/a/b/c` but not `/a/bc`.
	pub fn is_equal_or_parent_of(&self, other: &Resource) -> bool {
		let (parent, child) = (&self.0, &other.0);
		if parent.scheme() != child.scheme() || parent.host_str() != child.host_str() || parent.port() != child.port() {
			return false;
		}
		let base = parent.path().trim_end_matches('/');
		let path = child.path();
		path == parent.path() || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0.as_str())
	}
}

impl From<Url> for Resource {
	fn from(url: Url) -> Self {
		Self(url)
	}
}

impl ResourceKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ResourceKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests;
