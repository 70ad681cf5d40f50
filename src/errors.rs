//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

use nix::sys::signal::Signal;

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Logger(::log::SetLoggerError);
        Nix(::nix::Error);
    }

    errors {
        Syntax(line: String) {
            description("syntax error")
            display("syntax error near: '{}'", line)
        }
        LineTooLong(max: usize) {
            description("command line too long")
            display("command line exceeds {} characters", max)
        }
        TooManyArguments(max: usize) {
            description("too many arguments")
            display("command exceeds {} arguments", max)
        }
        NulByte(word: String) {
            description("word contains a NUL byte")
            display("{}: contains a NUL byte", word)
        }
        ChangeDirectory(dir: String) {
            description("unable to change directory")
            display("cd: {}", dir)
        }
        HomeNotSet {
            description("home directory not set")
            display("cd: HOME not set")
        }
        InputRedirect(path: String) {
            description("unable to open input file")
            display("cannot open {} for input", path)
        }
        OutputRedirect(path: String) {
            description("unable to open output file")
            display("cannot open {} for output", path)
        }
        Fork {
            description("fork failed")
            display("failed to fork")
        }
        SignalDisposition(signal: Signal) {
            description("unable to install signal disposition")
            display("failed to install disposition for {:?}", signal)
        }
        SignalMask(signal: Signal) {
            description("unable to change signal mask")
            display("failed to change blocked state of {:?}", signal)
        }
        KillJob(pid: i32) {
            description("unable to kill background job")
            display("failed to kill background pid {}", pid)
        }
    }
}

impl Error {
    /// Returns `true` if the shell cannot safely keep running after this error.
    pub fn is_fatal(&self) -> bool {
        match *self.kind() {
            ErrorKind::Fork
            | ErrorKind::SignalDisposition(_)
            | ErrorKind::SignalMask(_)
            | ErrorKind::KillJob(_) => true,
            _ => false,
        }
    }

    /// Formats the error and its causes on one line, outermost first.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nix::errno::Errno;

    #[test]
    fn test_fatal_kinds() {
        assert!(Error::from(ErrorKind::Fork).is_fatal());
        assert!(Error::from(ErrorKind::SignalMask(Signal::SIGTSTP)).is_fatal());
        assert!(Error::from(ErrorKind::KillJob(42)).is_fatal());
        assert!(!Error::from(ErrorKind::HomeNotSet).is_fatal());
        assert!(!Error::from(ErrorKind::Syntax("cmd <".into())).is_fatal());
    }

    #[test]
    fn test_describe_includes_cause() {
        let result: Result<()> = Err(Errno::ENOENT.into());
        let err = result
            .chain_err(|| ErrorKind::ChangeDirectory("missing".into()))
            .unwrap_err();
        let message = err.describe();
        assert!(message.starts_with("cd: missing: "), "{}", message);
        assert!(message.contains("No such file or directory"), "{}", message);
    }
}
