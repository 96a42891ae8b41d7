use std::time::Duration;

pub const DEFAULT_POLL_BASE: Duration = Duration::from_millis(750);
pub const DEFAULT_POLL_STEP: Duration = Duration::from_millis(150);
pub const DEFAULT_POLL_CAP: Duration = Duration::from_millis(1500);

/// Bounded linear backoff between status reads.
///
/// The wait before attempt `n` (0-indexed) is `min(base + n * step, cap)`, so
/// consecutive reads are never closer than `base` nor further apart than `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    base: Duration,
    step: Duration,
    cap: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_BASE, DEFAULT_POLL_STEP, DEFAULT_POLL_CAP)
    }
}

impl PollSchedule {
    /// A cap below `base` is raised to `base`.
    pub fn new(base: Duration, step: Duration, cap: Duration) -> Self {
        Self {
            base,
            step,
            cap: cap.max(base),
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base
            .saturating_add(self.step.saturating_mul(attempt))
            .min(self.cap)
    }
}
