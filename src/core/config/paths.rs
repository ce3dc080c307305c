use super::ConfigError;
use crate::core::env::EnvStore;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    pub history_path: PathBuf,
    /// The rc path was given on the command line and must exist.
    pub rc_required: bool,
}

impl ConfigPaths {
    /// Paths under `HOME` from the store, or the account's home directory.
    pub fn new(env: &EnvStore) -> Result<Self, ConfigError> {
        let home = env
            .get("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::HomeDirNotFound)?;

        Ok(ConfigPaths {
            rc_path: home.join(".venarc"),
            history_path: home.join(".vena_history"),
            rc_required: false,
        })
    }

    pub fn with_rc(mut self, rc_path: impl Into<PathBuf>) -> Self {
        self.rc_path = rc_path.into();
        self.rc_required = true;
        self
    }
}
