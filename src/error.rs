use crate::core::config::ConfigError;
use crate::process::ProcessError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures that end the shell itself. Anything a single command line can
/// cause is reported on stderr and becomes `$?` instead.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}
