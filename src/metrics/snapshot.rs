/// Point-in-time copy of a [`CounterTarget`](crate::metrics::CounterTarget).
///
/// Counters are read individually with relaxed ordering; a snapshot taken
/// while lookups are in flight is a consistent-enough view for monitoring
/// and tests, not a linearizable one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TargetSnapshot {
    /// Lookups served from a fresh entry without running the fetch.
    pub get_hits: u64,
    /// Fetches that ran and returned a success.
    pub get_successes: u64,
    /// Fetches that ran and returned a failure.
    pub get_failures: u64,
}

impl TargetSnapshot {
    /// Total number of counted lookups.
    #[inline]
    pub fn total(&self) -> u64 {
        self.get_hits + self.get_successes + self.get_failures
    }
}
