//! Logical clock for analysis passes and the check gate built on it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, totally ordered pass stamp.
///
/// [`CompilationTimeStamp::BASE`] is smaller than every issued stamp and is
/// used to inspect cached results without triggering re-analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompilationTimeStamp(u64);

impl CompilationTimeStamp {
    pub const BASE: CompilationTimeStamp = CompilationTimeStamp(0);

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CompilationTimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Issues strictly increasing stamps, starting at 1.
#[derive(Debug, Default)]
pub struct TimestampAuthority {
    last: AtomicU64,
}

impl TimestampAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> CompilationTimeStamp {
        CompilationTimeStamp(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued stamp, `BASE` before the first pass.
    pub fn current(&self) -> CompilationTimeStamp {
        CompilationTimeStamp(self.last.load(Ordering::Relaxed))
    }
}

/// Per-node memo of the last check.
///
/// A node whose memo is not older than the requested stamp is skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckMemo {
    last_checked: Option<CompilationTimeStamp>,
}

impl CheckMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_checked(&self) -> Option<CompilationTimeStamp> {
        self.last_checked
    }

    pub fn is_current(&self, ts: CompilationTimeStamp) -> bool {
        self.last_checked.is_some_and(|last| last >= ts)
    }

    /// Returns `false` when the check at `ts` must be skipped, otherwise
    /// records `ts` and returns `true`.
    pub fn begin(&mut self, ts: CompilationTimeStamp) -> bool {
        if self.is_current(ts) {
            return false;
        }
        self.last_checked = Some(ts);
        true
    }
}
