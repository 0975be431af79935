//! Throttle wrapper.
//!
//! [`Throttle`] lets `func` run at most once per `delay` window. A call
//! arriving after the window has elapsed runs synchronously and opens a new
//! window. A call inside the window (re)schedules a trailing call for the
//! moment the window closes.
//!
//! The trailing call does not, by default, receive the context and args of
//! the call that scheduled it: `func` gets `None`. Pass
//! [`TrailingCall::LatestArgs`] to forward them instead.
//!
//! Only a leading call moves the window start, so a trailing call and the
//! next leading call can land close together. [`WindowReset::OnTrailing`]
//! lets the trailing call open the next window as well.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::error::Result;
use crate::slot::{TimerSlot, deadline_after};

type ThrottledFn<C, A> = Arc<dyn Fn(Option<(C, A)>) + Send + Sync>;

/// What the trailing call of a window is handed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingCall {
    /// `func(None)`: context and args are dropped.
    #[default]
    Unbound,
    /// `func(Some((ctx, args)))` from the call that scheduled it.
    LatestArgs,
}

/// Which invocations move the window start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowReset {
    /// Leading calls only.
    #[default]
    LeadingOnly,
    /// Leading and trailing calls; any two invocations are at least
    /// `delay` apart.
    OnTrailing,
}

/// Throttled wrapper around `func`.
pub struct Throttle<C, A> {
    func: ThrottledFn<C, A>,
    delay: Duration,
    trailing: TrailingCall,
    reset: WindowReset,
    window_start: Arc<Mutex<Instant>>,
    slot: TimerSlot,
}

impl<C, A> Clone for Throttle<C, A> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            delay: self.delay,
            trailing: self.trailing,
            reset: self.reset,
            window_start: Arc::clone(&self.window_start),
            slot: self.slot.clone(),
        }
    }
}

impl<C, A> fmt::Debug for Throttle<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("delay", &self.delay)
            .field("trailing", &self.trailing)
            .field("reset", &self.reset)
            .field("window_start", &*lock(&self.window_start))
            .field("pending", &self.slot.is_pending())
            .finish_non_exhaustive()
    }
}

impl<C, A> Throttle<C, A>
where
    C: Send + 'static,
    A: Send + 'static,
{
    /// Throttle with an unbound trailing call. The first window starts now.
    pub fn new<F>(delay: Duration, func: F) -> Result<Self>
    where
        F: Fn(Option<(C, A)>) + Send + Sync + 'static,
    {
        Self::with_trailing(delay, TrailingCall::default(), func)
    }

    /// Must be called from inside a tokio runtime.
    pub fn with_trailing<F>(delay: Duration, trailing: TrailingCall, func: F) -> Result<Self>
    where
        F: Fn(Option<(C, A)>) + Send + Sync + 'static,
    {
        Ok(Self {
            func: Arc::new(func),
            delay,
            trailing,
            reset: WindowReset::default(),
            window_start: Arc::new(Mutex::new(Instant::now())),
            slot: TimerSlot::new()?,
        })
    }

    /// Choose which invocations move the window start.
    pub fn window_reset(mut self, reset: WindowReset) -> Self {
        self.reset = reset;
        self
    }

    /// Register a call.
    pub fn call(&self, ctx: C, args: A) {
        let now = Instant::now();
        let mut start = lock(&self.window_start);
        let elapsed = now.saturating_duration_since(*start);
        self.slot.cancel();

        if elapsed >= self.delay {
            *start = now;
            drop(start);
            trace!(elapsed_ms = elapsed.as_millis() as u64, "throttle leading call");
            (self.func)(Some((ctx, args)));
            return;
        }
        drop(start);

        let payload = match self.trailing {
            TrailingCall::Unbound => None,
            TrailingCall::LatestArgs => Some((ctx, args)),
        };
        let func = Arc::clone(&self.func);
        let job: Box<dyn FnOnce() + Send> = match self.reset {
            WindowReset::LeadingOnly => Box::new(move || func(payload)),
            WindowReset::OnTrailing => {
                let window_start = Arc::clone(&self.window_start);
                Box::new(move || {
                    *lock(&window_start) = Instant::now();
                    func(payload);
                })
            }
        };
        self.slot.schedule(deadline_after(self.delay - elapsed), job);
    }

    /// Start of the current window.
    pub fn window_start(&self) -> Instant {
        *lock(&self.window_start)
    }

    /// Whether a trailing call is scheduled.
    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

fn lock(start: &Mutex<Instant>) -> MutexGuard<'_, Instant> {
    start.lock().unwrap_or_else(PoisonError::into_inner)
}
