use super::PathError;
use crate::core::env::EnvStore;
use std::path::{Path, PathBuf};

/// Tilde expansion against the shell's `HOME`.
#[derive(Debug, Clone, Default)]
pub struct PathExpander {
    home: Option<PathBuf>,
}

impl PathExpander {
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    /// `HOME` from the store, falling back to the account's home directory.
    pub fn from_env(env: &EnvStore) -> Self {
        let home = env
            .get("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir);
        Self { home }
    }

    pub fn home(&self) -> Result<&Path, PathError> {
        self.home.as_deref().ok_or(PathError::HomeNotSet)
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, PathError> {
        match path.strip_prefix('~') {
            Some("") => Ok(self.home()?.to_path_buf()),
            Some(rest) if rest.starts_with('/') => {
                let mut expanded = self.home()?.to_path_buf();
                expanded.extend(rest.split('/').filter(|part| !part.is_empty()));
                Ok(expanded)
            }
            // `~user` is left alone.
            _ => Ok(PathBuf::from(path)),
        }
    }

    /// Inverse of [`expand`](Self::expand) for display: `/home/me/src` → `~/src`.
    pub fn abbreviate(&self, path: &Path) -> String {
        match self.home.as_deref().map(|home| path.strip_prefix(home)) {
            Some(Ok(rest)) if rest.as_os_str().is_empty() => "~".to_string(),
            Some(Ok(rest)) => format!("~/{}", rest.display()),
            _ => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> PathExpander {
        PathExpander::new(Some(PathBuf::from("/home/test")))
    }

    #[test]
    fn test_expand_tilde() {
        let e = expander();
        assert_eq!(e.expand("~").unwrap(), PathBuf::from("/home/test"));
        assert_eq!(e.expand("~/a//b/").unwrap(), PathBuf::from("/home/test/a/b"));
        assert_eq!(e.expand("~other/x").unwrap(), PathBuf::from("~other/x"));
        assert_eq!(e.expand("/tmp").unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_missing_home() {
        let e = PathExpander::new(None);
        assert!(matches!(e.expand("~"), Err(PathError::HomeNotSet)));
        assert_eq!(e.expand("rel").unwrap(), PathBuf::from("rel"));
    }

    #[test]
    fn test_from_env_prefers_store() {
        let mut env = EnvStore::new();
        env.set("HOME", "/srv/home").unwrap();
        let e = PathExpander::from_env(&env);
        assert_eq!(e.home().unwrap(), Path::new("/srv/home"));
    }

    #[test]
    fn test_abbreviate() {
        let e = expander();
        assert_eq!(e.abbreviate(Path::new("/home/test")), "~");
        assert_eq!(e.abbreviate(Path::new("/home/test/src")), "~/src");
        assert_eq!(e.abbreviate(Path::new("/home/tester")), "/home/tester");
        assert_eq!(e.abbreviate(Path::new("/etc")), "/etc");
    }
}
