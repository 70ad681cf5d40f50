pub use self::shell::Shell;

pub mod builtins;
mod execute_command;
mod job_control;
mod shell;
pub mod signals;

/// Number of background jobs tracked before the oldest are killed.
pub const DEFAULT_JOB_CAPACITY: usize = 500;

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShellConfig {
    /// Number of background jobs the shell tracks at once. Registering one
    /// more kills every tracked job and starts over.
    job_capacity: usize,
}

impl ShellConfig {
    /// Creates a config tracking at most `job_capacity` background jobs.
    /// A capacity of zero is treated as one.
    pub fn with_job_capacity(job_capacity: usize) -> Self {
        Self {
            job_capacity: job_capacity.max(1),
        }
    }

    pub fn job_capacity(&self) -> usize {
        self.job_capacity
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::with_job_capacity(DEFAULT_JOB_CAPACITY)
    }
}
