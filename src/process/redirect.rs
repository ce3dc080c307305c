use super::sys;
use crate::parser::{RedirectKind, Redirection};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("{path}: {}", sys::os_message(.source))]
    Open { path: String, source: io::Error },
    #[error("dup2: {}", sys::os_message(.0))]
    Dup(io::Error),
    /// A heredoc body was never captured.
    #[error("here-document not available")]
    Interrupted,
}

impl RedirectError {
    pub fn status(&self) -> i32 {
        match self {
            RedirectError::Interrupted => 130,
            _ => 1,
        }
    }
}

fn target_fd(kind: RedirectKind) -> RawFd {
    match kind {
        RedirectKind::Input | RedirectKind::Heredoc => libc::STDIN_FILENO,
        RedirectKind::Output | RedirectKind::Append => libc::STDOUT_FILENO,
    }
}

fn open(redir: &Redirection) -> Result<File, RedirectError> {
    let mut options = OpenOptions::new();
    match redir.kind {
        RedirectKind::Input => options.read(true),
        RedirectKind::Output => options.write(true).create(true).truncate(true),
        RedirectKind::Append => options.append(true).create(true),
        RedirectKind::Heredoc => return Err(RedirectError::Interrupted),
    };
    options.open(&redir.target).map_err(|source| RedirectError::Open {
        path: redir.target.clone(),
        source,
    })
}

/// Rewire stdin/stdout of the current process, left to right. A missing
/// heredoc body fails the whole list before any file is touched.
pub fn apply(redirections: &[Redirection]) -> Result<(), RedirectError> {
    if redirections
        .iter()
        .any(|r| r.kind == RedirectKind::Heredoc && r.resolved_fd.is_none())
    {
        return Err(RedirectError::Interrupted);
    }

    for redir in redirections {
        let target = target_fd(redir.kind);
        if target == libc::STDOUT_FILENO {
            let _ = io::stdout().flush();
        }
        match &redir.resolved_fd {
            Some(fd) => sys::dup2(fd.as_raw_fd(), target).map_err(RedirectError::Dup)?,
            None => {
                let file = open(redir)?;
                sys::dup2(file.as_raw_fd(), target).map_err(RedirectError::Dup)?;
            }
        }
    }
    Ok(())
}

/// Copies of the shell's stdin and stdout, put back on drop. Used when a
/// builtin or a bare redirection runs inside the shell process.
pub struct SavedStreams {
    stdin: OwnedFd,
    stdout: OwnedFd,
}

impl SavedStreams {
    pub fn save() -> io::Result<Self> {
        Ok(Self {
            stdin: sys::dup_cloexec(libc::STDIN_FILENO)?,
            stdout: sys::dup_cloexec(libc::STDOUT_FILENO)?,
        })
    }
}

impl Drop for SavedStreams {
    fn drop(&mut self) {
        let _ = io::stdout().flush();
        if let Err(e) = sys::dup2(self.stdin.as_raw_fd(), libc::STDIN_FILENO) {
            tracing::warn!("failed to restore stdin: {}", e);
        }
        if let Err(e) = sys::dup2(self.stdout.as_raw_fd(), libc::STDOUT_FILENO) {
            tracing::warn!("failed to restore stdout: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_heredoc_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never");
        let redirections = vec![
            Redirection::new(RedirectKind::Output, out.to_string_lossy()),
            Redirection::new(RedirectKind::Heredoc, "EOF"),
        ];

        let err = apply(&redirections).unwrap_err();
        assert!(matches!(err, RedirectError::Interrupted));
        assert_eq!(err.status(), 130);
        assert!(!out.exists());
    }

    #[test]
    fn test_open_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let redir = Redirection::new(RedirectKind::Input, missing.to_string_lossy());

        let err = open(&redir).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("{}: No such file or directory", missing.display())
        );
        assert_eq!(err.status(), 1);
    }

    #[test]
    fn test_output_truncates_and_append_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "old contents\n").unwrap();
        let name = path.to_string_lossy().into_owned();

        open(&Redirection::new(RedirectKind::Output, name.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        let mut file = open(&Redirection::new(RedirectKind::Append, name.clone())).unwrap();
        file.write_all(b"a\n").unwrap();
        let mut file = open(&Redirection::new(RedirectKind::Append, name)).unwrap();
        file.write_all(b"b\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
