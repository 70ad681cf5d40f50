use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Exit;

impl builtins::BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    const HELP: &'static str = "\
exit
    Kill every background job and exit the shell with a status of 0.";

    fn run<T: AsRef<OsStr>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        shell.exit();
    }
}
