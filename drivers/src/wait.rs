/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains common functions and types to implement wait routines.

--*/

/// How long a polling loop may run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PollLimit {
    /// Poll until the condition holds, however long that takes.
    Forever,

    /// Give up after this many attempts.
    Cycles(u64),

    /// Give up once this many clock ticks have elapsed since the first attempt.
    Ticks(u64),
}

impl PollLimit {
    /// Map the legacy signed timeout convention (negative means unbounded) to
    /// a cycle bound.
    pub fn from_signed_cycles(timeout: i64) -> Self {
        if timeout < 0 {
            Self::Forever
        } else {
            Self::Cycles(timeout as u64)
        }
    }
}

/// Attempt counter for a bounded polling loop.
///
/// Checked before each attempt, so `Cycles(k)` allows exactly `k` attempts.
pub struct PollBudget {
    limit: PollLimit,
    start: u64,
    attempts: u64,
}

impl PollBudget {
    /// `now` is only consulted for [`PollLimit::Ticks`].
    pub fn new(limit: PollLimit, now: impl FnOnce() -> u64) -> Self {
        let start = match limit {
            PollLimit::Ticks(_) => now(),
            _ => 0,
        };
        Self {
            limit,
            start,
            attempts: 0,
        }
    }

    /// Whether another attempt is allowed.
    #[inline(always)]
    pub fn exhausted(&self, now: impl FnOnce() -> u64) -> bool {
        match self.limit {
            PollLimit::Forever => false,
            PollLimit::Cycles(max) => self.attempts >= max,
            PollLimit::Ticks(max) => now().wrapping_sub(self.start) >= max,
        }
    }

    /// Record an attempt and return its 1-based number.
    #[inline(always)]
    pub fn next_attempt(&mut self) -> u64 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
