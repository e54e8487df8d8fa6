use covenant_core::constants::{
    HIGH_DANGER_THRESHOLD, MID_DANGER_THRESHOLD, POLICY_CONFIRM_TIMEOUT_HIGH_DANGER_SECS,
    POLICY_CONFIRM_TIMEOUT_MID_DANGER_SECS,
};
use covenant_core::Timestamp;
use std::collections::HashMap;

/// A monotonically-assigned confirmation-queue handle (`PolicyPending(handle)`).
pub type Handle = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueResolution {
    Approved,
    Rejected,
    TimedOut,
}

struct QueuedOp {
    enqueued_at: Timestamp,
    timeout_at: Timestamp,
    resolution: Option<QueueResolution>,
}

/// The danger-tier timeout for a queued operation: each pending entry has
/// a per-danger-tier timeout (4h for danger 7+, 24h for 5-6).
pub fn tier_timeout_secs(danger: u8) -> i64 {
    if danger >= HIGH_DANGER_THRESHOLD {
        POLICY_CONFIRM_TIMEOUT_HIGH_DANGER_SECS
    } else if danger >= MID_DANGER_THRESHOLD {
        POLICY_CONFIRM_TIMEOUT_MID_DANGER_SECS
    } else {
        POLICY_CONFIRM_TIMEOUT_MID_DANGER_SECS
    }
}

/// Operator-confirmation queue: queued operations auto-resolve within
/// their danger-tier deadline.
#[derive(Default)]
pub struct ConfirmationQueue {
    next_handle: Handle,
    entries: HashMap<Handle, QueuedOp>,
}

impl ConfirmationQueue {
    pub fn new() -> Self {
        Self { next_handle: 1, entries: HashMap::new() }
    }

    pub fn enqueue(&mut self, danger: u8, now: Timestamp) -> Handle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(
            handle,
            QueuedOp { enqueued_at: now, timeout_at: now + tier_timeout_secs(danger), resolution: None },
        );
        handle
    }

    /// Out-of-band confirmation resolving `handle` to Approve or Reject,
    /// as when an operator acting on an alert channel resolves the handle.
    pub fn resolve(&mut self, handle: Handle, approve: bool) -> Option<QueueResolution> {
        let entry = self.entries.get_mut(&handle)?;
        if entry.resolution.is_some() {
            return entry.resolution;
        }
        let resolution = if approve { QueueResolution::Approved } else { QueueResolution::Rejected };
        entry.resolution = Some(resolution);
        Some(resolution)
    }

    /// Returns the resolution for `handle`, auto-resolving to `TimedOut` if
    /// its tier deadline has passed and it was never confirmed.
    pub fn check(&mut self, handle: Handle, now: Timestamp) -> Option<QueueResolution> {
        let entry = self.entries.get_mut(&handle)?;
        if let Some(r) = entry.resolution {
            return Some(r);
        }
        if now >= entry.timeout_at {
            entry.resolution = Some(QueueResolution::TimedOut);
            return Some(QueueResolution::TimedOut);
        }
        None
    }

    pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<Handle> {
        let mut expired = Vec::new();
        for (handle, entry) in self.entries.iter_mut() {
            if entry.resolution.is_none() && now >= entry.timeout_at {
                entry.resolution = Some(QueueResolution::TimedOut);
                expired.push(*handle);
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_danger_times_out_after_4h() {
        let mut q = ConfirmationQueue::new();
        let handle = q.enqueue(9, 0);
        assert!(q.check(handle, 4 * 3600 - 1).is_none());
        assert_eq!(q.check(handle, 4 * 3600), Some(QueueResolution::TimedOut));
    }

    #[test]
    fn manual_resolution_wins_before_timeout() {
        let mut q = ConfirmationQueue::new();
        let handle = q.enqueue(6, 0);
        assert_eq!(q.resolve(handle, true), Some(QueueResolution::Approved));
        assert_eq!(q.check(handle, 100_000), Some(QueueResolution::Approved));
    }
}
