//! Forking and exec'ing external commands.
//!
//! Everything the child needs (argv, paths, error message prefixes) is built
//! before `fork`. The child itself only calls `open`, `dup2`, `sigaction`,
//! `execvp`, `write` and `_exit`.

use std::ffi::{CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult, Pid};

use crate::{
    core::parser::Command,
    errors::{ErrorKind, Result, ResultExt},
    shell::signals,
    util,
};

/// Exit status of a child that could not redirect or exec.
const CHILD_FAILURE_STATUS: i32 = 1;

/// A file to open in the child and move onto `target`.
#[derive(Debug)]
struct Redirect {
    path: CString,
    flags: OFlag,
    mode: Mode,
    target: RawFd,
    /// `cannot open <path> for ...: `
    error_prefix: Vec<u8>,
}

/// A `Command` converted to what `execvp` and `open` take.
#[derive(Debug)]
struct PreparedCommand {
    program: CString,
    argv: Vec<CString>,
    redirects: Vec<Redirect>,
    background: bool,
    /// `<program>: `
    error_prefix: Vec<u8>,
}

impl PreparedCommand {
    fn new(command: &Command) -> Result<Self> {
        let mut redirects = Vec::new();
        if let Some(ref path) = command.input_path {
            let message = ErrorKind::InputRedirect(path.display().to_string()).to_string();
            redirects.push(Redirect {
                path: to_cstring(path.as_os_str())?,
                flags: OFlag::O_RDONLY,
                mode: Mode::empty(),
                target: libc::STDIN_FILENO,
                error_prefix: format!("{}: ", message).into_bytes(),
            });
        }

        if let Some(ref path) = command.output_path {
            let message = ErrorKind::OutputRedirect(path.display().to_string()).to_string();
            redirects.push(Redirect {
                path: to_cstring(path.as_os_str())?,
                flags: OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                mode: Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP,
                target: libc::STDOUT_FILENO,
                error_prefix: format!("{}: ", message).into_bytes(),
            });
        }

        let mut error_prefix = command.program.as_bytes().to_vec();
        error_prefix.extend_from_slice(b": ");

        Ok(Self {
            program: to_cstring(&command.program)?,
            argv: command
                .arguments
                .iter()
                .map(|arg| to_cstring(arg))
                .collect::<Result<_>>()?,
            redirects,
            background: command.background,
            error_prefix,
        })
    }
}

fn to_cstring(word: &OsStr) -> Result<CString> {
    CString::new(word.as_bytes())
        .chain_err(|| ErrorKind::NulByte(Path::new(word).display().to_string()))
}

/// Forks a child that runs `command` and returns its pid.
///
/// Failures after the fork (bad redirect, program not found) are reported by
/// the child itself, which then exits with status 1; the parent only sees an
/// ordinary exit status.
pub fn spawn_process(command: &Command) -> Result<Pid> {
    let prepared = PreparedCommand::new(command)?;

    // Anything still buffered would otherwise be written twice.
    util::flush_stdout();

    match unsafe { unistd::fork() }.chain_err(|| ErrorKind::Fork)? {
        ForkResult::Parent { child } => {
            debug!("forked pid {} for {:?}", child, command.arguments);
            Ok(child)
        }
        ForkResult::Child => run_child(&prepared),
    }
}

/// Child side of the fork. Never returns.
fn run_child(prepared: &PreparedCommand) -> ! {
    for redirect in &prepared.redirects {
        if let Err(errno) = apply_redirect(redirect) {
            exit_child(&redirect.error_prefix, errno);
        }
    }

    if let Err(errno) = signals::apply_child_policy(prepared.background) {
        exit_child(b"smallsh: signal disposition: ", errno);
    }

    let errno = exec(&prepared.program, &prepared.argv);
    exit_child(&prepared.error_prefix, errno);
}

/// Opens the redirect's path and moves the descriptor onto its target.
fn apply_redirect(redirect: &Redirect) -> nix::Result<()> {
    let fd = fcntl::open(redirect.path.as_c_str(), redirect.flags, redirect.mode)?;
    if fd != redirect.target {
        unistd::dup2(fd, redirect.target)?;
        unistd::close(fd)?;
    }

    Ok(())
}

/// Replaces the process image, searching `PATH` for `program`. Only returns
/// on failure.
fn exec(program: &CStr, argv: &[CString]) -> Errno {
    match unistd::execvp(program, argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    }
}

/// Writes `<prefix><strerror>\n` to stderr and leaves without running exit
/// handlers.
fn exit_child(prefix: &[u8], errno: Errno) -> ! {
    let _ = unistd::write(libc::STDERR_FILENO, prefix);
    let _ = unistd::write(libc::STDERR_FILENO, errno.desc().as_bytes());
    let _ = unistd::write(libc::STDERR_FILENO, b"\n");
    unsafe { libc::_exit(CHILD_FAILURE_STATUS) }
}
