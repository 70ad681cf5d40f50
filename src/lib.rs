//! smallsh - a small shell
//!
//! Reads one line at a time, runs the `cd`, `status` and `exit` builtins in
//! process, and forks everything else either in the foreground or as a
//! background job. Ctrl-Z toggles foreground-only mode.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

#[macro_use]
mod util;

pub mod core;
pub mod errors;
pub mod reader;
pub mod shell;

pub use crate::core::parser::{Command, ParsedLine};
pub use crate::core::status::Status;
pub use crate::reader::LineReader;
pub use crate::shell::{Shell, ShellConfig};
