use std::env;
use std::path::{Path, PathBuf};

use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    const HELP: &'static str = "\
cd [dir]
    Change the current directory to DIR. The variable $HOME is the default dir.
    Words after DIR are ignored.";

    fn run<T: AsRef<OsStr>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        let dir = target_dir(args)?;
        env::set_current_dir(&dir)
            .chain_err(|| ErrorKind::ChangeDirectory(dir.display().to_string()))?;
        debug!("changed directory to {}", dir.display());
        Ok(())
    }
}

/// The first argument, taken verbatim, or the home directory.
fn target_dir<T: AsRef<OsStr>>(args: &[T]) -> Result<PathBuf> {
    match args.first() {
        Some(dir) => Ok(Path::new(dir.as_ref()).to_path_buf()),
        None => dirs::home_dir().ok_or_else(|| ErrorKind::HomeNotSet.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_prefixed_dir_is_a_path() {
        assert_eq!(target_dir(&["-x"]).unwrap(), PathBuf::from("-x"));
        assert_eq!(target_dir(&["-"]).unwrap(), PathBuf::from("-"));
        assert_eq!(target_dir(&["--", "dir"]).unwrap(), PathBuf::from("--"));
    }

    #[test]
    fn test_extra_words_are_ignored() {
        assert_eq!(target_dir(&["/tmp", "extra"]).unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_no_args_means_home() {
        let no_args: &[&str] = &[];
        if let Some(home) = dirs::home_dir() {
            assert_eq!(target_dir(no_args).unwrap(), home);
        }
    }
}
