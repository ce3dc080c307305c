mod loader;
mod paths;

pub use loader::RcLoader;
pub use paths::ConfigPaths;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("home directory not found")]
    HomeDirNotFound,
    #[error("{0}: config file not found")]
    ConfigFileNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
