mod expander;

pub use expander::PathExpander;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Search path used when `PATH` is unset.
pub const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("HOME not set")]
    HomeNotSet,
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Locate `name` for execution. Names containing `/` are taken as given;
/// anything else is looked up in each directory of `search_path`.
pub fn resolve_command(name: &str, search_path: Option<&str>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        return Some(PathBuf::from(name));
    }

    search_path
        .unwrap_or(DEFAULT_PATH)
        .split(':')
        .map(|dir| if dir.is_empty() { Path::new(".") } else { Path::new(dir) })
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Every executable name reachable through `search_path`, for completion.
pub fn executables(search_path: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = search_path
        .unwrap_or(DEFAULT_PATH)
        .split(':')
        .filter(|dir| !dir.is_empty())
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .filter(|entry| is_executable(&entry.path()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_script(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_slash_names_used_verbatim() {
        assert_eq!(
            resolve_command("./nope", Some("")),
            Some(PathBuf::from("./nope"))
        );
    }

    #[test]
    fn test_search_order_and_permissions() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        make_script(first.path(), "tool", 0o644);
        let expected = make_script(second.path(), "tool", 0o755);

        let path = format!("{}:{}", first.path().display(), second.path().display());
        assert_eq!(resolve_command("tool", Some(path.as_str())), Some(expected));
        assert_eq!(resolve_command("missing", Some(path.as_str())), None);
        assert_eq!(resolve_command("", Some(path.as_str())), None);
    }

    #[test]
    fn test_executables_listing() {
        let dir = tempfile::tempdir().unwrap();
        make_script(dir.path(), "b-tool", 0o755);
        make_script(dir.path(), "a-tool", 0o755);
        make_script(dir.path(), "data", 0o644);

        let listed = executables(dir.path().to_str());
        assert_eq!(listed, ["a-tool", "b-tool"]);
    }
}
