//! Thin wrappers over the libc calls the executor needs.

use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

pub enum Fork {
    Child,
    Parent(libc::pid_t),
}

fn check(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

/// Returns `(read, write)`, both close-on-exec.
pub fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as libc::c_int; 2];
    check(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
    let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    set_cloexec(read.as_raw_fd())?;
    set_cloexec(write.as_raw_fd())?;
    Ok((read, write))
}

fn set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = check(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
    check(unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
    Ok(())
}

pub fn fork() -> io::Result<Fork> {
    // Anything buffered would otherwise be written twice.
    let _ = io::stdout().flush();
    match check(unsafe { libc::fork() })? {
        0 => Ok(Fork::Child),
        pid => Ok(Fork::Parent(pid)),
    }
}

pub fn dup2(fd: RawFd, target: RawFd) -> io::Result<()> {
    check(unsafe { libc::dup2(fd, target) })?;
    Ok(())
}

pub fn dup_cloexec(fd: RawFd) -> io::Result<OwnedFd> {
    let new = check(unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 3) })?;
    Ok(unsafe { OwnedFd::from_raw_fd(new) })
}

/// Block until `pid` terminates; returns the raw wait status.
pub fn waitpid(pid: libc::pid_t) -> io::Result<libc::c_int> {
    let mut status = 0;
    loop {
        match check(unsafe { libc::waitpid(pid, &mut status, 0) }) {
            Ok(_) => return Ok(status),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Reap one finished child without blocking.
pub fn try_reap() -> Option<(libc::pid_t, libc::c_int)> {
    let mut status = 0;
    let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
    (pid > 0).then_some((pid, status))
}

pub fn setpgid(pid: libc::pid_t, pgid: libc::pid_t) -> io::Result<()> {
    check(unsafe { libc::setpgid(pid, pgid) })?;
    Ok(())
}

pub fn isatty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

/// Make the shell's own process group the terminal's foreground group.
pub fn reclaim_terminal() {
    if isatty(libc::STDIN_FILENO) {
        unsafe {
            libc::tcsetpgrp(libc::STDIN_FILENO, libc::getpgrp());
        }
    }
}

/// Leave a forked child. Skips the parent's exit handlers.
pub fn exit_child(status: i32) -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    unsafe { libc::_exit(status & 0xff) }
}

/// Only returns on failure.
pub fn execve(path: &CStr, argv: &[CString], envp: &[CString]) -> io::Error {
    let mut argv_ptrs: Vec<*const libc::c_char> = argv.iter().map(|a| a.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());
    let mut envp_ptrs: Vec<*const libc::c_char> = envp.iter().map(|e| e.as_ptr()).collect();
    envp_ptrs.push(std::ptr::null());

    unsafe {
        libc::execve(path.as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
    }
    io::Error::last_os_error()
}

/// Read one line from `fd` a byte at a time, so nothing past the newline
/// is consumed. The newline is not included. `None` at end of input.
pub fn read_line(fd: RawFd) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut byte = 0u8;
    loop {
        let n = unsafe { libc::read(fd, (&mut byte as *mut u8).cast(), 1) };
        match n {
            0 if buf.is_empty() => return Ok(None),
            0 => break,
            n if n < 0 => return Err(io::Error::last_os_error()),
            _ if byte == b'\n' => break,
            _ => buf.push(byte),
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// System error text without the ` (os error N)` suffix.
pub fn os_message(err: &io::Error) -> String {
    let text = err.to_string();
    match text.find(" (os error ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    #[test]
    fn test_os_message_strips_code() {
        let err = io::Error::from_raw_os_error(libc::ENOENT);
        assert_eq!(os_message(&err), "No such file or directory");
    }

    #[test]
    fn test_pipe_roundtrip_and_read_line() -> io::Result<()> {
        let (read, write) = pipe()?;
        let mut writer = File::from(write);
        writer.write_all(b"first\nsecond\nrest")?;
        drop(writer);

        let fd = read.as_raw_fd();
        assert_eq!(read_line(fd)?.as_deref(), Some("first"));
        assert_eq!(read_line(fd)?.as_deref(), Some("second"));
        assert_eq!(read_line(fd)?.as_deref(), Some("rest"));
        assert_eq!(read_line(fd)?, None);
        Ok(())
    }

    #[test]
    fn test_pipe_is_cloexec() -> io::Result<()> {
        let (read, _write) = pipe()?;
        let flags = unsafe { libc::fcntl(read.as_raw_fd(), libc::F_GETFD) };
        assert_ne!(flags & libc::FD_CLOEXEC, 0);
        Ok(())
    }

    #[test]
    fn test_dup_cloexec_shares_file() -> io::Result<()> {
        let (read, write) = pipe()?;
        let copy = dup_cloexec(write.as_raw_fd())?;
        drop(write);
        File::from(copy).write_all(b"x")?;
        let mut out = String::new();
        File::from(read).read_to_string(&mut out)?;
        assert_eq!(out, "x");
        Ok(())
    }
}
