use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DELTA: AtomicU64 = AtomicU64::new(1);

/// Correlation token for one inbound event or refresh
///
/// All asynchronous work spawned while handling a single trigger shares the
/// same id. Ids come from a process-wide counter and are never reused; there
/// is no way to build one from a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeltaId(u64);

impl DeltaId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        DeltaId(NEXT_DELTA.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DeltaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delta-{}", self.0)
    }
}
