#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use nix::unistd::Pid;

use smallsh::errors::Result;
use smallsh::shell::signals;
use smallsh::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".smallsh_log";

const USAGE: &str = "
smallsh.

Usage:
    smallsh [options]
    smallsh (-h | --help)
    smallsh --version

Options:
    -h --help         Show this screen.
    --version         Show version.
    --log=<path>      File to write log to, defaults to ~/.smallsh_log
    --max-jobs=<n>    Capacity of the background job table [default: 500].
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    flag_version: bool,
    flag_log: Option<String>,
    flag_max_jobs: usize,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("smallsh version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = init_logger(&args.flag_log) {
        eprintln!("smallsh: warning: logging disabled: {}", e.describe());
    }
    debug!("{:?}", args);

    if let Err(e) = signals::install_shell_policy() {
        error!("failed to install signal policy: {}", e.describe());
        eprintln!("smallsh: {}", e.describe());
        process::exit(1);
    }

    let mut shell = Shell::new(ShellConfig::with_job_capacity(args.flag_max_jobs));
    if let Err(e) = shell.execute_from_stdin() {
        if e.is_fatal() {
            shell.abort(&e);
        }
        error!("reading input failed: {}", e.describe());
        eprintln!("smallsh: {}", e.describe());
    }

    shell.exit()
}

fn init_logger(path: &Option<String>) -> Result<()> {
    let log_path = match *path {
        Some(ref path) => PathBuf::from(path),
        None => default_log_path()?,
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(fern::log_file(log_path)?)
        .apply()?;
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or("unable to find home directory")?;
    Ok(home.join(LOG_FILE_NAME))
}
