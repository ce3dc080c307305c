mod executor;
pub mod heredoc;
pub mod redirect;
pub mod signal;
pub mod sys;

pub use executor::Executor;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("pipe: {}", sys::os_message(.0))]
    Pipe(io::Error),
    #[error("fork: {}", sys::os_message(.0))]
    Fork(io::Error),
    #[error("waitpid: {}", sys::os_message(.0))]
    Wait(io::Error),
    #[error("sigaction: {}", sys::os_message(.0))]
    Signal(io::Error),
    #[error("here-document capture exited with status {0}")]
    Heredoc(i32),
}

/// How a waited-for child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited(i32),
    Signaled { signal: i32, core_dumped: bool },
}

impl WaitOutcome {
    pub fn from_raw(status: libc::c_int) -> Self {
        if libc::WIFSIGNALED(status) {
            WaitOutcome::Signaled {
                signal: libc::WTERMSIG(status),
                core_dumped: libc::WCOREDUMP(status),
            }
        } else if libc::WIFEXITED(status) {
            WaitOutcome::Exited(libc::WEXITSTATUS(status))
        } else {
            WaitOutcome::Exited(1)
        }
    }

    /// The value `$?` takes: the exit code, or 128 plus the signal.
    pub fn status(self) -> i32 {
        match self {
            WaitOutcome::Exited(code) => code,
            WaitOutcome::Signaled { signal, .. } => 128 + signal,
        }
    }

    /// Tell the terminal about foreground deaths the user should notice.
    pub fn report(self) {
        match self {
            WaitOutcome::Signaled {
                signal: libc::SIGINT,
                ..
            } => eprintln!(),
            WaitOutcome::Signaled {
                signal: libc::SIGQUIT,
                core_dumped,
            } => {
                if core_dumped {
                    eprintln!("Quit (core dumped)");
                } else {
                    eprintln!("Quit");
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Raw statuses in the Linux encoding.
    const EXIT_3: libc::c_int = 3 << 8;
    const KILLED_BY_TERM: libc::c_int = libc::SIGTERM;
    const QUIT_WITH_CORE: libc::c_int = libc::SIGQUIT | 0x80;

    #[test]
    fn test_exit_code() {
        assert_eq!(WaitOutcome::from_raw(EXIT_3), WaitOutcome::Exited(3));
        assert_eq!(WaitOutcome::from_raw(EXIT_3).status(), 3);
    }

    #[test]
    fn test_signal_status_is_offset() {
        let outcome = WaitOutcome::from_raw(KILLED_BY_TERM);
        assert_eq!(
            outcome,
            WaitOutcome::Signaled {
                signal: libc::SIGTERM,
                core_dumped: false
            }
        );
        assert_eq!(outcome.status(), 143);
    }

    #[test]
    fn test_core_dump_flag() {
        assert_eq!(
            WaitOutcome::from_raw(QUIT_WITH_CORE),
            WaitOutcome::Signaled {
                signal: libc::SIGQUIT,
                core_dumped: true
            }
        );
    }
}
