// Each test crate uses a different subset of the helpers.
#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{self, Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use tempdir::TempDir;

/// How many times `Session::wait_for_line` polls before giving up.
const MAX_POLLS: usize = 600;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// WorkDir represents a scratch directory in which a shell is run.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Creates a fresh scratch directory; `name` is used as its prefix.
    pub fn new(name: &str) -> WorkDir {
        WorkDir {
            dir: TempDir::new(name).expect("failed to create scratch directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Log file used by every shell started here.
    pub fn log_path(&self) -> PathBuf {
        self.path().join("smallsh.log")
    }

    /// Writes `contents` to `name` inside the directory.
    pub fn create<P: AsRef<Path>>(&self, name: P, contents: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create directory");
        }
        fs::write(path, contents).expect("failed to create file");
    }

    pub fn read<P: AsRef<Path>>(&self, name: P) -> String {
        fs::read_to_string(self.path().join(name)).expect("failed to read file")
    }

    /// Builds a command running the shell in this directory with its log
    /// redirected here.
    pub fn command<I, S>(&self, args: I) -> process::Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(bin());
        cmd.current_dir(self.path());
        cmd.arg("--log").arg(self.log_path());
        cmd.args(args);
        cmd
    }

    /// Starts an interactive session with piped stdin and stdout.
    pub fn spawn(&self) -> Session {
        self.spawn_with_args(&[])
    }

    pub fn spawn_with_args(&self, args: &[&str]) -> Session {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start smallsh");
        let stdin = child.stdin.take().expect("stdin is piped");
        let stdout = BufReader::new(child.stdout.take().expect("stdout is piped"));
        Session {
            child,
            stdin: Some(stdin),
            stdout,
        }
    }
}

/// A running shell.
#[derive(Debug)]
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Sends one line of input.
    pub fn send(&mut self, line: &str) {
        self.send_bytes(line.as_bytes());
    }

    /// Sends one line of input that need not be valid UTF-8.
    pub fn send_bytes(&mut self, line: &[u8]) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin.write_all(line).expect("failed to write to smallsh");
        stdin.write_all(b"\n").expect("failed to write to smallsh");
        stdin.flush().expect("failed to flush smallsh stdin");
    }

    fn next_line(&mut self) -> String {
        let mut line = Vec::new();
        let n = self
            .stdout
            .read_until(b'\n', &mut line)
            .expect("failed to read smallsh stdout");
        if n == 0 {
            panic!("smallsh closed stdout");
        }
        String::from_utf8_lossy(&line).into_owned()
    }

    /// Waits for a line containing `needle` that only shows up once a
    /// background job has been reaped.
    ///
    /// The shell reaps after every line, so a no-op command is sent
    /// repeatedly until the line appears.
    pub fn wait_for_line(&mut self, needle: &str) -> String {
        const TICK: &str = "smallsh-test-tick";
        for _ in 0..MAX_POLLS {
            self.send(&format!("echo {}", TICK));
            loop {
                let line = self.next_line();
                if line.contains(needle) {
                    return line;
                }
                if line.contains(TICK) {
                    break;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }

        panic!("smallsh never printed {:?}", needle);
    }

    /// Reads stdout until a line containing `needle` arrives and returns that
    /// line.
    ///
    /// Panics if stdout closes first.
    pub fn expect_line(&mut self, needle: &str) -> String {
        loop {
            let line = self.next_line();
            if line.contains(needle) {
                return line;
            }
        }
    }

    /// Closes stdin and waits for the shell, returning its exit status and
    /// the remaining stdout.
    pub fn finish(mut self) -> (ExitStatus, String) {
        drop(self.stdin.take());
        let mut bytes = Vec::new();
        self.stdout
            .read_to_end(&mut bytes)
            .expect("failed to read smallsh stdout");
        let rest = String::from_utf8_lossy(&bytes).into_owned();
        let status = self.child.wait().expect("failed to wait for smallsh");
        (status, rest)
    }
}

/// Path to the shell binary built for these tests.
pub fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_smallsh"))
}
