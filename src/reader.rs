//! Line input for the shell.
//!
//! Lines are raw bytes: words that are not valid UTF-8 reach `execvp` and
//! `open` unchanged.

use std::io::BufRead;

use nix::unistd::Pid;

use crate::errors::{ErrorKind, Result};

/// Replaced by the shell's pid wherever it appears in a line.
pub const PID_SENTINEL: &[u8] = b"$$";

/// Longest accepted line, in bytes, before `$$` expansion.
pub const MAX_LINE_LENGTH: usize = 2048;

/// Reads logical lines and expands `$$` to the shell's process id.
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    pid: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R, pid: Pid) -> Self {
        Self {
            input,
            pid: pid.to_string().into_bytes(),
        }
    }

    /// Reads the next line without its terminator.
    /// Returns `None` when end of file is reached.
    ///
    /// A line over `MAX_LINE_LENGTH` is consumed and reported as
    /// `LineTooLong`; the next call reads the following line.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }

        if buf.len() > MAX_LINE_LENGTH {
            return Err(ErrorKind::LineTooLong(MAX_LINE_LENGTH).into());
        }

        Ok(Some(expand_pid(&buf, &self.pid)))
    }
}

/// Expands every non-overlapping `$$`, left to right.
pub fn expand_pid(line: &[u8], pid: &[u8]) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(line.len());
    let mut rest = line;
    while !rest.is_empty() {
        if rest.starts_with(PID_SENTINEL) {
            expanded.extend_from_slice(pid);
            rest = &rest[PID_SENTINEL.len()..];
        } else {
            expanded.push(rest[0]);
            rest = &rest[1..];
        }
    }

    expanded
}
