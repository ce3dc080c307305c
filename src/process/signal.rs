//! Per-mode signal dispositions.
//!
//! The shell switches mode around every blocking point: reading a prompt,
//! waiting for a foreground job, capturing a heredoc. Forked children pick
//! the mode matching what they are about to become.

use super::ProcessError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the prompt-mode SIGINT handler, cleared by [`take_interrupt`].
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// Waiting for input: SIGINT flags the line as cancelled.
    Prompt,
    /// Waiting on a foreground child.
    Foreground,
    /// Waiting on a heredoc capture child.
    Heredoc,
    /// A child about to run a command.
    Child,
    /// A child belonging to a background job.
    Background,
    /// The heredoc capture child itself.
    HeredocChild,
}

#[derive(Clone, Copy)]
enum Disposition {
    Default,
    Ignore,
    Handler(extern "C" fn(libc::c_int)),
}

extern "C" fn on_prompt_interrupt(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

extern "C" fn on_heredoc_interrupt(_: libc::c_int) {
    unsafe {
        libc::write(libc::STDERR_FILENO, b"\n".as_ptr().cast(), 1);
        libc::_exit(130);
    }
}

fn set(signal: libc::c_int, disposition: Disposition) -> Result<(), ProcessError> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = match disposition {
            Disposition::Default => libc::SIG_DFL,
            Disposition::Ignore => libc::SIG_IGN,
            Disposition::Handler(handler) => handler as libc::sighandler_t,
        };
        // No SA_RESTART: a blocking read must see EINTR.
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(ProcessError::Signal(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}

pub fn install(mode: SignalMode) -> Result<(), ProcessError> {
    use Disposition::*;

    let (int, quit) = match mode {
        SignalMode::Prompt => (Handler(on_prompt_interrupt), Ignore),
        SignalMode::Foreground => (Ignore, Ignore),
        SignalMode::Heredoc => (Ignore, Ignore),
        SignalMode::Child => (Default, Default),
        SignalMode::Background => (Ignore, Ignore),
        SignalMode::HeredocChild => (Handler(on_heredoc_interrupt), Ignore),
    };
    set(libc::SIGINT, int)?;
    set(libc::SIGQUIT, quit)?;

    // The runtime ignores SIGPIPE and commands expect the default. Job
    // control stops apply to what the shell runs, never to the shell.
    let inherited = match mode {
        SignalMode::Child | SignalMode::Background => Default,
        _ => Ignore,
    };
    for signal in [libc::SIGPIPE, libc::SIGTSTP, libc::SIGTTIN, libc::SIGTTOU] {
        set(signal, inherited)?;
    }

    tracing::trace!(?mode, "installed signal dispositions");
    Ok(())
}

/// The child mode for a command started from this context.
pub fn child_mode(in_background: bool) -> SignalMode {
    if in_background {
        SignalMode::Background
    } else {
        SignalMode::Child
    }
}

/// Whether SIGINT arrived since the last call.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
