//! smallsh builtins
//!
//! Builtins run inside the shell process. They ignore `&` and redirection and
//! never change the status reported by `status`.

use std::ffi::OsStr;

use self::prelude::{Result, Shell, Write};

use self::cd::Cd;
use self::exit::Exit;
use self::status::Status;

pub mod prelude {
    pub use std::ffi::OsStr;
    pub use std::io::Write;

    pub use crate::errors::{Error, ErrorKind, Result, ResultExt};
    pub use crate::shell::Shell;
}

mod cd;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

/// Represents a smallsh builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The help string to display to the user.
    const HELP: &'static str;
    /// The usage string to display to the user.
    fn usage() -> String {
        Self::HELP.lines().next().unwrap_or(Self::NAME).to_owned()
    }
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<OsStr>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin<T: AsRef<OsStr>>(program: T) -> bool {
    let program = program.as_ref();
    [CD_NAME, EXIT_NAME, STATUS_NAME]
        .iter()
        .any(|name| program == OsStr::new(name))
}

/// precondition: command is a builtin.
pub fn run<S1, S2>(shell: &mut Shell, program: S1, args: &[S2], stdout: &mut dyn Write) -> Result<()>
where
    S1: AsRef<OsStr>,
    S2: AsRef<OsStr>,
{
    debug_assert!(is_builtin(&program));

    match program.as_ref().to_str() {
        Some(CD_NAME) => Cd::run(shell, args, stdout),
        Some(EXIT_NAME) => Exit::run(shell, args, stdout),
        Some(STATUS_NAME) => Status::run(shell, args, stdout),
        _ => unreachable!(),
    }
}
