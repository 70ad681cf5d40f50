//! smallsh Parser
//!
//! Lines are split on ASCII whitespace only; there is no quoting. `<` and `>`
//! take the following word as a filename and a trailing `&` requests a
//! background job. Words are kept as raw bytes.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use crate::errors::{ErrorKind, Result};

pub use self::ast::{Command, CommandBuilder, ParsedLine, NULL_DEVICE};

pub mod ast;

/// Most words a command may pass to `execvp`, program included.
pub const MAX_ARGUMENTS: usize = 512;

const BACKGROUND_MARKER: u8 = b'&';
const COMMENT_MARKER: u8 = b'#';
const INPUT_REDIRECT: &[u8] = b"<";
const OUTPUT_REDIRECT: &[u8] = b">";

/// Parses a line with its terminator already removed.
///
/// A trailing `&` is always stripped, but only requests a background job when
/// `foreground_only` is `false`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use smallsh::core::parser::{self, ParsedLine};
///
/// let command = match parser::parse(b"ls -l < in.txt > out.txt &", false).unwrap() {
///     ParsedLine::Command(command) => command,
///     ParsedLine::Noop => unreachable!(),
/// };
/// assert_eq!(command.program, "ls");
/// assert_eq!(command.arguments, vec!["ls", "-l"]);
/// assert_eq!(command.input_path.as_deref(), Some(Path::new("in.txt")));
/// assert_eq!(command.output_path.as_deref(), Some(Path::new("out.txt")));
/// assert!(command.background);
/// ```
pub fn parse(line: &[u8], foreground_only: bool) -> Result<ParsedLine> {
    let mut line = trim_end(line);
    let mut background = false;
    if line.last() == Some(&BACKGROUND_MARKER) {
        line = &line[..line.len() - 1];
        background = !foreground_only;
    }

    let mut words = line
        .split(u8::is_ascii_whitespace)
        .filter(|word| !word.is_empty());
    let program = match words.next() {
        Some(program) if program[0] != COMMENT_MARKER => program,
        _ => return Ok(ParsedLine::Noop),
    };

    let mut builder = CommandBuilder::new(OsStr::from_bytes(program));
    builder.background(background);
    while let Some(word) = words.next() {
        if word == INPUT_REDIRECT || word == OUTPUT_REDIRECT {
            let path = words.next().ok_or_else(|| ErrorKind::Syntax(lossy(word)))?;
            let path = OsStr::from_bytes(path);
            if word == INPUT_REDIRECT {
                builder.input_path(path);
            } else {
                builder.output_path(path);
            }
        } else {
            if builder.num_arguments() == MAX_ARGUMENTS {
                return Err(ErrorKind::TooManyArguments(MAX_ARGUMENTS).into());
            }
            builder.arg(OsStr::from_bytes(word));
        }
    }

    let command = builder.build();
    debug!("parsed command: {:?}", command);
    Ok(ParsedLine::Command(command))
}

fn trim_end(mut line: &[u8]) -> &[u8] {
    while let Some((last, rest)) = line.split_last() {
        if !last.is_ascii_whitespace() {
            break;
        }
        line = rest;
    }

    line
}

fn lossy(word: &[u8]) -> String {
    String::from_utf8_lossy(word).into_owned()
}
