//! A single replaceable timer.
//!
//! [`TimerSlot`] owns at most one pending job. Scheduling a new job aborts
//! the previous one. Each schedule bumps a generation counter; a woken task
//! only runs its job if its generation is still current, so a superseded
//! timer cannot fire even if it woke up just before being replaced.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

use crate::error::{Result, TimingError};

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl SlotState {
    /// Abort the pending task, if any, and invalidate its generation.
    fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.pending.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

/// Shared, cloneable handle to one pending timer.
#[derive(Debug, Clone)]
pub struct TimerSlot {
    handle: Handle,
    state: Arc<Mutex<SlotState>>,
}

impl TimerSlot {
    /// Create a slot bound to the current tokio runtime.
    pub fn new() -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| TimingError::NoRuntime)?;
        Ok(Self::with_handle(handle))
    }

    /// Create a slot that spawns its timers on `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            state: Arc::new(Mutex::new(SlotState::default())),
        }
    }

    /// Replace whatever is pending with `job`, to run at `deadline`.
    ///
    /// Returns whether a timer was pending before the call.
    pub fn schedule<F>(&self, deadline: Instant, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = lock(&self.state);
        let was_pending = state.cancel();
        let generation = state.generation;
        let shared = Arc::clone(&self.state);

        // The spawned task cannot observe the slot before `pending` is set:
        // it needs the lock we are holding.
        let task = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let mut state = lock(&shared);
                if state.generation != generation {
                    trace!(generation, "superseded timer woke up, skipping");
                    return;
                }
                state.pending = None;
            }
            job();
        });
        state.pending = Some(task);
        was_pending
    }

    /// Abort the pending timer. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        lock(&self.state).cancel()
    }

    /// Whether a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

/// Roughly 30 years; stands in for "never" when a deadline overflows.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `Instant::now() + wait`, saturating to a far-future deadline instead of
/// panicking on overflow.
pub(crate) fn deadline_after(wait: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(wait)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// User callbacks never run under this lock, so poisoning can only come
/// from a bug in this module; recover the state rather than propagate.
fn lock(state: &Mutex<SlotState>) -> MutexGuard<'_, SlotState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
