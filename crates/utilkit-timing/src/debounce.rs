//! Debounce wrappers.
//!
//! - [`Debounce`] takes the receiver context with every call, and can run
//!   on the trailing edge (after `wait` of quiet) or the leading edge
//!   (immediately, then suppressed until `wait` of quiet).
//! - [`BoundDebounce`] is trailing-only and fixes its context when it is
//!   built; every invocation sees that same context.
//!
//! Neither exposes cancel or flush. A new call supersedes the pending
//! timer, and dropping the wrapper leaves an already scheduled call in
//! place.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::error::Result;
use crate::slot::{TimerSlot, deadline_after};

type CallFn<C, A> = Arc<dyn Fn(C, A) + Send + Sync>;
type BoundFn<C, A> = Arc<dyn Fn(&C, A) + Send + Sync>;

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

/// Debounced wrapper around `func(ctx, args)`.
///
/// Clones share the same timer, so a burst may come from several owners.
pub struct Debounce<C, A> {
    func: CallFn<C, A>,
    wait: Duration,
    immediate: bool,
    slot: TimerSlot,
}

impl<C, A> Clone for Debounce<C, A> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            wait: self.wait,
            immediate: self.immediate,
            slot: self.slot.clone(),
        }
    }
}

impl<C, A> fmt::Debug for Debounce<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounce")
            .field("wait", &self.wait)
            .field("immediate", &self.immediate)
            .field("pending", &self.slot.is_pending())
            .finish_non_exhaustive()
    }
}

impl<C, A> Debounce<C, A>
where
    C: Send + 'static,
    A: Send + 'static,
{
    /// Trailing-edge debounce: `func` runs once, `wait` after the last call
    /// of a burst, with that call's context and args.
    pub fn new<F>(wait: Duration, func: F) -> Result<Self>
    where
        F: Fn(C, A) + Send + Sync + 'static,
    {
        Self::with_options(wait, false, func)
    }

    /// Leading-edge debounce: the first call of a quiet period runs `func`
    /// synchronously; further calls only push the quiet period out.
    pub fn leading<F>(wait: Duration, func: F) -> Result<Self>
    where
        F: Fn(C, A) + Send + Sync + 'static,
    {
        Self::with_options(wait, true, func)
    }

    /// Build either variant. Must be called from inside a tokio runtime.
    pub fn with_options<F>(wait: Duration, immediate: bool, func: F) -> Result<Self>
    where
        F: Fn(C, A) + Send + Sync + 'static,
    {
        Ok(Self {
            func: Arc::new(func),
            wait,
            immediate,
            slot: TimerSlot::new()?,
        })
    }

    /// Register a call.
    ///
    /// In leading mode a panic from `func` unwinds out of this call; the
    /// wrapper stays usable.
    pub fn call(&self, ctx: C, args: A) {
        let deadline = deadline_after(self.wait);

        if self.immediate {
            // The timer only marks the end of the quiet period.
            let was_pending = self.slot.schedule(deadline, || {});
            if !was_pending {
                trace!(wait_ms = self.wait.as_millis() as u64, "debounce leading call");
                (self.func)(ctx, args);
            }
        } else {
            let func = Arc::clone(&self.func);
            self.slot.schedule(deadline, move || func(ctx, args));
        }
    }

    /// Whether a timer is pending (a trailing call, or the leading-mode
    /// quiet period).
    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }
}

// ---------------------------------------------------------------------------
// BoundDebounce
// ---------------------------------------------------------------------------

/// Trailing-edge debounce whose context is fixed at construction.
pub struct BoundDebounce<C, A> {
    ctx: Arc<C>,
    func: BoundFn<C, A>,
    wait: Duration,
    slot: TimerSlot,
}

impl<C, A> Clone for BoundDebounce<C, A> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            func: Arc::clone(&self.func),
            wait: self.wait,
            slot: self.slot.clone(),
        }
    }
}

impl<C: fmt::Debug, A> fmt::Debug for BoundDebounce<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundDebounce")
            .field("ctx", &self.ctx)
            .field("wait", &self.wait)
            .field("pending", &self.slot.is_pending())
            .finish_non_exhaustive()
    }
}

impl<C, A> BoundDebounce<C, A>
where
    C: Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn new<F>(ctx: C, wait: Duration, func: F) -> Result<Self>
    where
        F: Fn(&C, A) + Send + Sync + 'static,
    {
        Ok(Self {
            ctx: Arc::new(ctx),
            func: Arc::new(func),
            wait,
            slot: TimerSlot::new()?,
        })
    }

    /// Register a call; `func(ctx, args)` runs `wait` after the last one.
    pub fn call(&self, args: A) {
        let deadline = deadline_after(self.wait);
        let ctx = Arc::clone(&self.ctx);
        let func = Arc::clone(&self.func);
        self.slot.schedule(deadline, move || func(&ctx, args));
    }

    /// The context every invocation receives.
    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }
}
