//! Per-transition busy flags.
//!
//! While a transition of one kind is in flight, a second request of the same
//! kind is refused before it touches the location gate or the network. The
//! flag is released when the guard drops, whatever way the transition ends.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{AppError, AppResult, TransitionKind};

const KINDS: usize = 7;

fn slot(kind: TransitionKind) -> usize {
    match kind {
        TransitionKind::PunchIn => 0,
        TransitionKind::BreakIn => 1,
        TransitionKind::BreakOut => 2,
        TransitionKind::PunchOut => 3,
        TransitionKind::VisitIn => 4,
        TransitionKind::Checkout => 5,
        TransitionKind::Followup => 6,
    }
}

#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: [AtomicBool; KINDS],
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag for `kind`, or fail with `Busy` if it is already held.
    pub fn enter(&self, kind: TransitionKind) -> AppResult<FlightGuard<'_>> {
        let flag = &self.busy[slot(kind)];
        if flag.swap(true, Ordering::SeqCst) {
            return Err(AppError::Busy(kind));
        }
        Ok(FlightGuard { flag })
    }

    pub fn is_busy(&self, kind: TransitionKind) -> bool {
        self.busy[slot(kind)].load(Ordering::SeqCst)
    }
}

#[must_use = "the busy flag is released as soon as the guard is dropped"]
pub struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
