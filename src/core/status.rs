use std::fmt;

use nix::sys::wait::WaitStatus;

/// How a child process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Exited(i32),
    Signaled(i32),
}

impl Status {
    /// Converts a terminal `WaitStatus`. Returns `None` for stops, continues
    /// and `StillAlive`.
    pub fn from_wait_status(wait_status: WaitStatus) -> Option<Self> {
        match wait_status {
            WaitStatus::Exited(_, code) => Some(Status::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Status::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn is_signaled(&self) -> bool {
        match *self {
            Status::Signaled(_) => true,
            Status::Exited(_) => false,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Exited(0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::Exited(code) => write!(f, "exit value {}", code),
            Status::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}
