use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Status;

impl builtins::BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    const HELP: &'static str = "\
status
    Print the exit value or terminating signal of the last foreground
    command, or of the last background command reaped since.";

    fn run<T: AsRef<OsStr>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_status())?;
        Ok(())
    }
}
