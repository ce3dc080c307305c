//! Heredoc capture.
//!
//! Each `<<` body is read by a forked child into a pipe before the line
//! runs, so an interrupt lands in the child and cancels the whole line.

use super::signal::{self, SignalMode};
use super::{sys, ProcessError, WaitOutcome};
use crate::parser::{Node, RedirectKind};
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::OwnedFd;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeredocError {
    #[error("here-document interrupted")]
    Interrupted,
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Capture every heredoc in the tree, in evaluation order. Stops at the
/// first failure; bodies captured so far stay attached and are closed
/// when the tree is dropped.
pub fn realize_all(root: &mut Node, interactive: bool) -> Result<(), HeredocError> {
    let mut result = Ok(());
    root.for_each_command_mut(&mut |cmd| {
        for redir in &mut cmd.redirections {
            if result.is_err() || redir.kind != RedirectKind::Heredoc {
                continue;
            }
            match realize(&redir.target, interactive) {
                Ok(fd) => redir.resolved_fd = Some(fd),
                Err(e) => result = Err(e),
            }
        }
    });
    result
}

/// Read lines from stdin until `delimiter` and return the read end of a
/// pipe holding them.
pub fn realize(delimiter: &str, interactive: bool) -> Result<OwnedFd, HeredocError> {
    let (read, write) = sys::pipe().map_err(ProcessError::Pipe)?;
    signal::install(SignalMode::Heredoc)?;

    match sys::fork().map_err(ProcessError::Fork)? {
        sys::Fork::Child => {
            drop(read);
            let status = match signal::install(SignalMode::HeredocChild) {
                Ok(()) => capture(delimiter, File::from(write), interactive),
                Err(_) => 1,
            };
            sys::exit_child(status)
        }
        sys::Fork::Parent(pid) => {
            drop(write);
            let raw = sys::waitpid(pid).map_err(ProcessError::Wait)?;
            match WaitOutcome::from_raw(raw) {
                WaitOutcome::Exited(0) => Ok(read),
                WaitOutcome::Exited(130)
                | WaitOutcome::Signaled {
                    signal: libc::SIGINT,
                    ..
                } => Err(HeredocError::Interrupted),
                outcome => Err(ProcessError::Heredoc(outcome.status()).into()),
            }
        }
    }
}

fn capture(delimiter: &str, mut body: File, interactive: bool) -> i32 {
    loop {
        if interactive {
            eprint!("> ");
        }
        match sys::read_line(libc::STDIN_FILENO) {
            Ok(Some(line)) if line == delimiter => return 0,
            Ok(Some(line)) => {
                if writeln!(body, "{}", line).is_err() {
                    return 1;
                }
            }
            Ok(None) => {
                eprintln!(
                    "vena: warning: here-document delimited by end-of-file (wanted `{}')",
                    delimiter
                );
                return 0;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return 130,
            Err(_) => return 1,
        }
    }
}
