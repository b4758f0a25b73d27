use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller flips to stop a run early.
///
/// Clones share the flag. The runner checks it between batches, so trials
/// already in flight finish and are counted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a run stopped before its requested trial count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    DeadlineExceeded,
}

/// Cooperative stop conditions for one run.
#[derive(Debug, Clone)]
pub struct RunBudget {
    start_time: Instant,
    max_wall: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl RunBudget {
    pub fn new(max_wall_ms: Option<u64>, cancel: Option<CancelToken>) -> Self {
        Self {
            start_time: Instant::now(),
            max_wall: max_wall_ms.map(Duration::from_millis),
            cancel,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// `Some` once the run should stop launching trials.
    #[inline]
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(StopReason::Cancelled);
        }
        match self.max_wall {
            Some(max) if self.start_time.elapsed() >= max => Some(StopReason::DeadlineExceeded),
            _ => None,
        }
    }
}
