//! Signal dispositions for the shell and its children.
//!
//! The shell ignores `SIGINT` and uses `SIGTSTP` to toggle foreground-only
//! mode. Children get `SIGINT` back only when they run in the foreground and
//! never react to `SIGTSTP`.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::unistd;

use crate::errors::{ErrorKind, Result, ResultExt};

/// Operator keystroke (Ctrl-Z) that toggles foreground-only mode.
pub const TOGGLE_SIGNAL: Signal = Signal::SIGTSTP;

pub const ENTER_FOREGROUND_ONLY: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &[u8] = b"\nExiting foreground-only mode\n";

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

/// Returns `true` while a trailing `&` should be ignored.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Flips foreground-only mode and returns the announcement for the new mode.
fn toggle_foreground_only() -> &'static [u8] {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    if was_foreground_only {
        EXIT_FOREGROUND_ONLY
    } else {
        ENTER_FOREGROUND_ONLY
    }
}

// Only async-signal-safe calls here: an atomic op and write(2) of a constant.
extern "C" fn handle_toggle_signal(_: libc::c_int) {
    let notice = toggle_foreground_only();
    let _ = unistd::write(libc::STDOUT_FILENO, notice);
}

/// Installs the shell process's dispositions. Called once at startup.
pub fn install_shell_policy() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // Every catchable signal stays blocked while the handler runs.
    let toggle = SigAction::new(
        SigHandler::Handler(handle_toggle_signal),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );

    unsafe {
        signal::sigaction(Signal::SIGINT, &ignore)
            .chain_err(|| ErrorKind::SignalDisposition(Signal::SIGINT))?;
        signal::sigaction(TOGGLE_SIGNAL, &toggle)
            .chain_err(|| ErrorKind::SignalDisposition(TOGGLE_SIGNAL))?;
    }

    debug!("installed shell signal policy");
    Ok(())
}

/// Sets the dispositions a freshly forked child should exec with.
///
/// Background children keep the shell's ignored `SIGINT` so Ctrl-C at the
/// prompt cannot reach them. Runs between `fork` and `exec`, so errors are
/// returned as a bare `Errno`.
pub fn apply_child_policy(background: bool) -> nix::Result<()> {
    unsafe {
        if !background {
            signal::signal(Signal::SIGINT, SigHandler::SigDfl)?;
        }
        signal::signal(TOGGLE_SIGNAL, SigHandler::SigIgn)?;
        // The Rust runtime ignores SIGPIPE; programs expect the default.
        signal::signal(Signal::SIGPIPE, SigHandler::SigDfl)?;
    }

    Ok(())
}

/// Runs `f` with `signal` blocked, then unblocks it so that a signal raised
/// in the meantime is delivered once `f` is done.
pub fn with_signal_blocked<T, F>(signal: Signal, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let mut mask = SigSet::empty();
    mask.add(signal);

    signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&mask), None)
        .chain_err(|| ErrorKind::SignalMask(signal))?;
    let result = f();
    signal::sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&mask), None)
        .chain_err(|| ErrorKind::SignalMask(signal))?;

    result
}
