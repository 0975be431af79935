//! # utilkit-timing
//!
//! Rate-control wrappers for callbacks, driven by tokio timers:
//!
//! - **[`Debounce`]** -- trailing- or leading-edge debounce with the
//!   receiver context passed on every call.
//! - **[`BoundDebounce`]** -- trailing debounce with a context fixed at
//!   construction.
//! - **[`Throttle`]** -- at most one invocation per window, with a trailing
//!   call for calls that land inside the window.
//! - **[`TimerSlot`]** -- the replaceable single timer all three are built
//!   on.
//!
//! Wrappers capture the tokio runtime they are created in and may be called
//! from any thread afterwards. Deadlines use [`tokio::time::Instant`], so
//! tests can run them under a paused clock.

pub mod debounce;
pub mod error;
pub mod slot;
pub mod throttle;

pub use debounce::{BoundDebounce, Debounce};
pub use error::{Result, TimingError};
pub use slot::TimerSlot;
pub use throttle::{Throttle, TrailingCall, WindowReset};
