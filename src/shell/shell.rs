//! smallsh - Shell Module
//!
//! The Shell owns the background job table and the last status, and runs the
//! read, parse, dispatch, reap loop.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::process;

use nix::unistd::Pid;

use crate::{
    core::{
        parser::{self, Command, ParsedLine},
        status::Status,
    },
    errors::{Error, ErrorKind, Result},
    reader::LineReader,
    shell::{
        builtins,
        execute_command::spawn_process,
        job_control::JobManager,
        signals::{self, TOGGLE_SIGNAL},
        ShellConfig,
    },
    util,
};

const PROMPT: &str = ": ";
const FATAL_ERROR_EXIT_STATUS: i32 = 1;

/// smallsh Shell
pub struct Shell {
    config: ShellConfig,
    job_manager: JobManager,
    /// Outcome of the last foreground command or reaped background job.
    last_status: Status,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        info!("smallsh started up with {:?}", config);
        Self {
            config,
            job_manager: JobManager::with_capacity(config.job_capacity()),
            last_status: Status::default(),
        }
    }

    pub fn last_status(&self) -> Status {
        self.last_status
    }

    /// Returns `true` if the shell has background jobs.
    pub fn has_background_jobs(&self) -> bool {
        self.job_manager.has_jobs()
    }

    /// Prints the prompt and reads the next line.
    /// Returns `None` when end of file is reached.
    pub fn prompt<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<Option<Vec<u8>>> {
        print!("{}", PROMPT);
        util::flush_stdout();
        reader.read_line()
    }

    /// Runs commands from stdin until EOF is received.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut reader = LineReader::new(stdin.lock(), Pid::this());
        self.execute_from_reader(&mut reader)
    }

    /// Runs commands from `reader` until EOF is received or a fatal error
    /// occurs.
    pub fn execute_from_reader<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        loop {
            let line = match self.prompt(reader) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    let too_long = match *e.kind() {
                        ErrorKind::LineTooLong(_) => true,
                        _ => false,
                    };
                    if !too_long {
                        return Err(e);
                    }
                    self.finish_line(Err(e))?;
                    continue;
                }
            };

            self.execute_command_string(&line)?;
        }

        debug!("end of input");
        Ok(())
    }

    /// Runs one line, then reaps finished background jobs.
    ///
    /// Errors affecting only this command are reported to stderr. Only fatal
    /// errors are returned.
    pub fn execute_command_string(&mut self, input: &[u8]) -> Result<()> {
        let result = self.dispatch(input);
        self.finish_line(result)
    }

    fn finish_line(&mut self, result: Result<()>) -> Result<()> {
        report_if_recoverable(result)?;
        let result = self.reap_jobs();
        report_if_recoverable(result)
    }

    fn dispatch(&mut self, input: &[u8]) -> Result<()> {
        let command = match parser::parse(input, signals::foreground_only())? {
            ParsedLine::Noop => return Ok(()),
            ParsedLine::Command(command) => command,
        };

        if builtins::is_builtin(&command.program) {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            builtins::run(self, &command.program, &command.arguments[1..], &mut handle)?;
            handle.flush()?;
            Ok(())
        } else if command.background {
            self.execute_background(&command)
        } else {
            self.execute_foreground(&command)
        }
    }

    fn execute_foreground(&mut self, command: &Command) -> Result<()> {
        let pid = spawn_process(command)?;
        self.last_status = self.job_manager.wait_for_foreground(pid)?;
        if self.last_status.is_signaled() {
            println!("{}", self.last_status);
        }

        Ok(())
    }

    fn execute_background(&mut self, command: &Command) -> Result<()> {
        let pid = spawn_process(command)?;
        let job_manager = &mut self.job_manager;
        let finished = signals::with_signal_blocked(TOGGLE_SIGNAL, || {
            let job_id = job_manager.register(pid)?;
            println!("background pid is {}", pid);
            util::flush_stdout();
            job_manager.poll(job_id)
        })?;

        if let Some((pid, status)) = finished {
            self.report_done(pid, status);
        }

        Ok(())
    }

    /// Reports and forgets every background job that has terminated.
    fn reap_jobs(&mut self) -> Result<()> {
        for (pid, status) in self.job_manager.reap()? {
            self.report_done(pid, status);
        }

        Ok(())
    }

    fn report_done(&mut self, pid: Pid, status: Status) {
        self.last_status = status;
        println!("background pid {} is done: {}", pid, status);
        util::flush_stdout();
    }

    /// Kills every background job and exits the shell with a status of 0.
    pub fn exit(&mut self) -> ! {
        debug!("killing {} background jobs", self.job_manager.num_jobs());
        let result = self.job_manager.kill_all();
        if let Err(e) = result {
            self.abort(&e);
        }

        util::flush_stdout();
        info!("smallsh has shut down");
        process::exit(0);
    }

    /// Reports a fatal error, kills what it can and exits with a status of 1.
    pub fn abort(&mut self, error: &Error) -> ! {
        error!("fatal: {}", error.describe());
        eprintln!("smallsh: {}", error.describe());
        let temp_result = self.job_manager.kill_all();
        log_if_err!(temp_result, "failed to kill background jobs during abort");

        util::flush_stdout();
        process::exit(FATAL_ERROR_EXIT_STATUS);
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}\nlast status: {}\n{:?}",
            self.config, self.last_status, self.job_manager
        )
    }
}

/// Prints a recoverable error to stderr; fatal errors are passed back.
fn report_if_recoverable(result: Result<()>) -> Result<()> {
    match result {
        Err(ref e) if !e.is_fatal() => {
            debug!("command failed: {}", e.describe());
            eprintln!("smallsh: {}", e.describe());
            Ok(())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn run_script(shell: &mut Shell, script: &[u8]) {
        let mut reader = LineReader::new(Cursor::new(script.to_vec()), Pid::this());
        shell.execute_from_reader(&mut reader).unwrap();
    }

    #[test]
    fn test_new_shell() {
        let shell = Shell::new(ShellConfig::default());
        assert_eq!(shell.last_status(), Status::Exited(0));
        assert!(!shell.has_background_jobs());
    }

    // External commands are covered by the integration tests; forking from the
    // multi-threaded test harness is avoided here.
    #[test]
    fn test_recoverable_errors_keep_the_loop_running() {
        let mut shell = Shell::new(ShellConfig::default());
        let mut script = b"status\n# comment\n\ncd /smallsh-test-no-such-dir\nls <\n".to_vec();
        script.extend_from_slice(&[b'x'; crate::reader::MAX_LINE_LENGTH + 1]);
        script.extend_from_slice(b"\nstatus\n");
        run_script(&mut shell, &script);
        assert_eq!(shell.last_status(), Status::Exited(0));
        assert!(!shell.has_background_jobs());
    }

    #[test]
    fn test_report_if_recoverable() {
        assert!(report_if_recoverable(Ok(())).is_ok());
        assert!(report_if_recoverable(Err(ErrorKind::HomeNotSet.into())).is_ok());
        assert!(report_if_recoverable(Err(ErrorKind::LineTooLong(1).into())).is_ok());
        assert!(report_if_recoverable(Err(ErrorKind::Fork.into())).is_err());
    }
}
