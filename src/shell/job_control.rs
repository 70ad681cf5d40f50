//! Waiting on, reaping and killing children of the shell.

use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag};
use nix::unistd::Pid;

use crate::{
    core::{
        job::{JobId, JobTable},
        status::Status,
    },
    errors::{ErrorKind, Result, ResultExt},
};

/// Owns the background job table and every `waitpid` the shell performs.
pub struct JobManager {
    jobs: JobTable,
}

impl JobManager {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: JobTable::with_capacity(capacity),
        }
    }

    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Registers a background child.
    ///
    /// If the table is full every existing job is killed first and the new
    /// one takes slot zero.
    pub fn register(&mut self, pid: Pid) -> Result<JobId> {
        if let Some(job_id) = self.jobs.insert(pid) {
            debug!("registered background pid {} as job {}", pid, job_id);
            return Ok(job_id);
        }

        warn!(
            "job table full ({} jobs), killing all background jobs",
            self.jobs.capacity()
        );
        self.kill_all()?;
        let job_id = self
            .jobs
            .insert(pid)
            .ok_or_else(|| ErrorKind::KillJob(pid.as_raw()))?;
        debug!("registered background pid {} as job {}", pid, job_id);
        Ok(job_id)
    }

    /// Checks a single job without blocking, freeing its slot if it has
    /// terminated.
    pub fn poll(&mut self, job_id: JobId) -> Result<Option<(Pid, Status)>> {
        let pid = match self.jobs.get(job_id) {
            Some(pid) => pid,
            None => return Ok(None),
        };

        match try_wait(pid) {
            Ok(Some(status)) => {
                self.jobs.remove(job_id);
                debug!("reaped background pid {}: {}", pid, status);
                Ok(Some((pid, status)))
            }
            Ok(None) => Ok(None),
            Err(Errno::ECHILD) => {
                warn!("background pid {} is not a child of the shell, dropping it", pid);
                self.jobs.remove(job_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Checks every job without blocking. Terminated jobs are removed and
    /// returned in slot order.
    pub fn reap(&mut self) -> Result<Vec<(Pid, Status)>> {
        let job_ids: Vec<JobId> = self.jobs.iter().map(|(job_id, _)| job_id).collect();
        let mut reaped = Vec::new();
        for job_id in job_ids {
            if let Some(done) = self.poll(job_id)? {
                reaped.push(done);
            }
        }

        Ok(reaped)
    }

    /// Sends `SIGKILL` to every job, reaps them and empties the table.
    ///
    /// A job that has already exited on its own is skipped silently.
    pub fn kill_all(&mut self) -> Result<()> {
        for (_, pid) in self.jobs.iter() {
            debug!("killing background pid {}", pid);
            match signal::kill(pid, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => return Err(e).chain_err(|| ErrorKind::KillJob(pid.as_raw())),
            }
        }

        for pid in self.jobs.clear() {
            let temp_result = wait_for(pid);
            if let Err(ref e) = temp_result {
                if let ErrorKind::Nix(Errno::ECHILD) = *e.kind() {
                    continue;
                }
            }
            log_if_err!(temp_result, "failed to reap killed pid {}", pid);
        }

        Ok(())
    }

    /// Blocks until `pid` terminates.
    pub fn wait_for_foreground(&self, pid: Pid) -> Result<Status> {
        let status = wait_for(pid)?;
        debug!("foreground pid {} finished: {}", pid, status);
        Ok(status)
    }
}

impl fmt::Debug for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} jobs\tcapacity: {}", self.jobs.len(), self.jobs.capacity())?;
        for (job_id, pid) in self.jobs.iter() {
            writeln!(f, "[{}] {}", job_id, pid)?;
        }

        Ok(())
    }
}

/// Returns the child's status if it has terminated, without blocking.
fn try_wait(pid: Pid) -> nix::Result<Option<Status>> {
    loop {
        match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(wait_status) => return Ok(Status::from_wait_status(wait_status)),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

fn wait_for(pid: Pid) -> Result<Status> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(wait_status) => {
                if let Some(status) = Status::from_wait_status(wait_status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn(program: &str, args: &[&str]) -> Pid {
        let child = Command::new(program)
            .args(args)
            .spawn()
            .expect("failed to spawn test child");
        Pid::from_raw(child.id() as i32)
    }

    fn reap_until_empty(manager: &mut JobManager) -> Vec<(Pid, Status)> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reaped = Vec::new();
        while manager.has_jobs() {
            assert!(Instant::now() < deadline, "jobs never finished: {:?}", manager);
            reaped.extend(manager.reap().unwrap());
            thread::sleep(Duration::from_millis(20));
        }
        reaped
    }

    #[test]
    fn test_reap_empty_table() {
        let mut manager = JobManager::with_capacity(4);
        assert!(manager.reap().unwrap().is_empty());
        manager.kill_all().unwrap();
    }

    #[test]
    fn test_reap_reports_each_job_once() {
        let mut manager = JobManager::with_capacity(8);
        let pids: Vec<Pid> = (0..3).map(|_| spawn("true", &[])).collect();
        let job_ids: Vec<_> = pids.iter().map(|&pid| manager.register(pid).unwrap()).collect();
        assert_eq!(job_ids, vec![JobId(0), JobId(1), JobId(2)]);
        assert_eq!(manager.num_jobs(), 3);

        let reaped = reap_until_empty(&mut manager);
        let mut reaped_pids: Vec<Pid> = reaped.iter().map(|&(pid, _)| pid).collect();
        reaped_pids.sort();
        let mut expected = pids.clone();
        expected.sort();
        assert_eq!(reaped_pids, expected);
        assert!(reaped.iter().all(|&(_, status)| status == Status::Exited(0)));
        assert!(manager.reap().unwrap().is_empty());
    }

    #[test]
    fn test_reap_exit_code() {
        let mut manager = JobManager::with_capacity(2);
        let pid = spawn("sh", &["-c", "exit 3"]);
        manager.register(pid).unwrap();
        assert_eq!(reap_until_empty(&mut manager), vec![(pid, Status::Exited(3))]);
    }

    #[test]
    fn test_kill_all() {
        let mut manager = JobManager::with_capacity(4);
        let pid = spawn("sleep", &["30"]);
        manager.register(pid).unwrap();
        manager.kill_all().unwrap();
        assert!(!manager.has_jobs());
        assert_eq!(signal::kill(pid, None), Err(Errno::ESRCH));
    }

    #[test]
    fn test_full_table_kills_existing_jobs() {
        let mut manager = JobManager::with_capacity(1);
        let first = spawn("sleep", &["30"]);
        let second = spawn("sleep", &["30"]);
        assert_eq!(manager.register(first).unwrap(), JobId(0));
        assert_eq!(manager.register(second).unwrap(), JobId(0));
        assert_eq!(manager.num_jobs(), 1);
        assert_eq!(signal::kill(first, None), Err(Errno::ESRCH));

        manager.kill_all().unwrap();
        assert_eq!(signal::kill(second, None), Err(Errno::ESRCH));
    }

    #[test]
    fn test_wait_for_foreground_signal() {
        let manager = JobManager::with_capacity(1);
        let pid = spawn("sleep", &["30"]);
        signal::kill(pid, Signal::SIGTERM).unwrap();
        assert_eq!(
            manager.wait_for_foreground(pid).unwrap(),
            Status::Signaled(Signal::SIGTERM as i32)
        );
    }
}
