use std::ffi::OsString;
use std::path::PathBuf;

/// Where background jobs read from and write to when no redirect is given.
pub const NULL_DEVICE: &str = "/dev/null";

/// A single command line, ready to be dispatched.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// The builtin name, or the program to search for in `PATH`.
    pub program: OsString,
    /// Argument vector; `arguments[0]` is always `program`.
    pub arguments: Vec<OsString>,
    /// File to read stdin from, if one is specified.
    pub input_path: Option<PathBuf>,
    /// File to write stdout to, if one is specified.
    pub output_path: Option<PathBuf>,
    /// Run the command without waiting for it.
    pub background: bool,
}

/// Result of parsing one line of input.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedLine {
    /// Blank line or comment; nothing to dispatch.
    Noop,
    Command(Command),
}

/// Builds `Command`s.
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    arguments: Vec<OsString>,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    background: bool,
}

impl CommandBuilder {
    /// Initializes a new builder with the given program, no arguments and no
    /// redirection, running in the foreground.
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            arguments: vec![program.into()],
            input_path: None,
            output_path: None,
            background: false,
        }
    }

    /// Add an argument to pass to the program.
    pub fn arg<S: Into<OsString>>(&mut self, arg: S) -> &mut Self {
        self.arguments.push(arg.into());
        self
    }

    /// Add several arguments to pass to the program.
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.arguments.extend(args.iter().map(OsString::from));
        self
    }

    /// Add input redirection from the specified filename.
    pub fn input_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.input_path = Some(path.into());
        self
    }

    /// Add output redirection to the specified filename.
    pub fn output_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.output_path = Some(path.into());
        self
    }

    /// Configure the command to run in the background.
    pub fn background(&mut self, background: bool) -> &mut Self {
        self.background = background;
        self
    }

    pub fn num_arguments(&self) -> usize {
        self.arguments.len()
    }

    /// Consumes the builder. Background commands without a redirect are
    /// pointed at the null device so they never touch the terminal.
    pub fn build(self) -> Command {
        let (input_path, output_path) = if self.background {
            (
                self.input_path.or_else(|| Some(PathBuf::from(NULL_DEVICE))),
                self.output_path.or_else(|| Some(PathBuf::from(NULL_DEVICE))),
            )
        } else {
            (self.input_path, self.output_path)
        };

        Command {
            program: self.arguments[0].clone(),
            arguments: self.arguments,
            input_path,
            output_path,
            background: self.background,
        }
    }
}
