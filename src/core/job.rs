use std::fmt;

use nix::unistd::Pid;

/// Index of a slot in the `JobTable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounded registry of background process ids.
///
/// Slots are allocated lazily up to `capacity`. A slot is either free or
/// holds exactly one pid, and a pid is never held by two slots.
#[derive(Clone, Debug)]
pub struct JobTable {
    slots: Vec<Option<Pid>>,
    capacity: usize,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores `pid` in the first free slot.
    ///
    /// Returns `None` when every slot is occupied, or if `pid` is already
    /// registered.
    pub fn insert(&mut self, pid: Pid) -> Option<JobId> {
        if self.find(pid).is_some() {
            return None;
        }

        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(pid);
            return Some(JobId(index));
        }

        if self.slots.len() < self.capacity {
            self.slots.push(Some(pid));
            return Some(JobId(self.slots.len() - 1));
        }

        None
    }

    /// Frees a slot, returning the pid it held.
    pub fn remove(&mut self, job_id: JobId) -> Option<Pid> {
        self.slots.get_mut(job_id.0).and_then(Option::take)
    }

    pub fn get(&self, job_id: JobId) -> Option<Pid> {
        self.slots.get(job_id.0).and_then(|slot| *slot)
    }

    pub fn find(&self, pid: Pid) -> Option<JobId> {
        self.slots
            .iter()
            .position(|slot| *slot == Some(pid))
            .map(JobId)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (JobId, Pid)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|pid| (JobId(index), pid)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity && self.slots.iter().all(Option::is_some)
    }

    /// Frees every slot, returning the pids that were held.
    pub fn clear(&mut self) -> Vec<Pid> {
        self.slots.drain(..).flatten().collect()
    }
}
