use super::*;

fn res(uri: &str) -> Resource {
	Resource::parse(uri).unwrap()
}

#[test]
fn key_is_normalized_uri() {
	assert_eq!(res("file:///tmp/./a.txt").key(), res("file:///tmp/a.txt").key());
	assert_eq!(res("FILE:///tmp/a.txt").key().as_str(), "file:///tmp/a.txt");
}

#[cfg(unix)]
#[test]
fn from_path_round_trips_to_file_path() {
	let path = Path::new("/tmp/quire/file.rs");
	let resource = Resource::from_path(path).unwrap();
	assert_eq!(resource.to_string(), "file:///tmp/quire/file.rs");
	assert_eq!(resource.to_file_path().as_deref(), Some(path));
}

#[test]
fn relative_path_is_rejected() {
	let err = Resource::from_path(Path::new("relative/file.rs")).unwrap_err();
	assert!(matches!(err, Error::InvalidPath(_)));
}

#[test]
fn non_file_scheme_has_no_path() {
	assert!(res("untitled:Untitled-1").to_file_path().is_none());
}

#[test]
fn parent_containment_respects_segments() {
	let dir = res("file:///work/src");
	assert!(dir.is_equal_or_parent_of(&res("file:///work/src")));
	assert!(dir.is_equal_or_parent_of(&res("file:///work/src/lib.rs")));
	assert!(dir.is_equal_or_parent_of(&res("file:///work/src/nested/mod.rs")));
	assert!(res("file:///work/src/").is_equal_or_parent_of(&res("file:///work/src/lib.rs")));
	assert!(!dir.is_equal_or_parent_of(&res("file:///work/srcs/lib.rs")));
	assert!(!dir.is_equal_or_parent_of(&res("file:///work")));
	assert!(!dir.is_equal_or_parent_of(&res("vscode-remote://host/work/src/lib.rs")));
}
