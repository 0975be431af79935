//! `utilkit pulse`: drive a timing wrapper with a synthetic event burst.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;
use tracing::debug;
use utilkit_timing::{Debounce, Throttle, TrailingCall};

use crate::cli::PulseMode;

/// One invocation of the wrapped callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    /// Time since the first event.
    pub at: Duration,
    /// Event that triggered it; `None` for an unbound trailing call.
    pub event: Option<u32>,
}

impl fmt::Display for Firing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event {
            Some(n) => write!(f, "{:>6} ms  event #{n}", self.at.as_millis()),
            None => write!(f, "{:>6} ms  trailing call (no args)", self.at.as_millis()),
        }
    }
}

/// Burst shape and wrapper settings.
#[derive(Debug, Clone, Copy)]
pub struct PulsePlan {
    pub mode: PulseMode,
    pub events: u32,
    pub interval: Duration,
    pub window: Duration,
    pub trailing: TrailingCall,
}

/// Send `plan.events` calls `plan.interval` apart, wait for any trailing
/// call, and return every invocation in order.
pub async fn run(plan: PulsePlan) -> Result<Vec<Firing>> {
    let fired: Arc<Mutex<Vec<Firing>>> = Arc::new(Mutex::new(Vec::new()));
    let origin = Instant::now();

    let record = {
        let fired = Arc::clone(&fired);
        move |event: Option<u32>| {
            let firing = Firing {
                at: origin.elapsed(),
                event,
            };
            debug!(?firing, "callback invoked");
            if let Ok(mut fired) = fired.lock() {
                fired.push(firing);
            }
        }
    };

    match plan.mode {
        PulseMode::Debounce | PulseMode::Leading => {
            let immediate = plan.mode == PulseMode::Leading;
            let wrapper = Debounce::with_options(plan.window, immediate, move |_: (), n: u32| {
                record(Some(n))
            })?;
            for n in 0..plan.events {
                wrapper.call((), n);
                tokio::time::sleep(plan.interval).await;
            }
        }
        PulseMode::Throttle => {
            // Build before the first event so the burst opens on an idle
            // window, the way a long-lived handler would see it.
            let wrapper = Throttle::with_trailing(
                plan.window,
                plan.trailing,
                move |call: Option<((), u32)>| record(call.map(|((), n)| n)),
            )?;
            tokio::time::sleep(plan.window).await;
            let origin_shift = origin.elapsed();
            for n in 0..plan.events {
                wrapper.call((), n);
                tokio::time::sleep(plan.interval).await;
            }
            tokio::time::sleep(plan.window).await;
            return Ok(shift(fired, origin_shift));
        }
    }

    tokio::time::sleep(plan.window).await;
    Ok(shift(fired, Duration::ZERO))
}

/// Take the recorded firings, re-based so the first event is at zero.
fn shift(fired: Arc<Mutex<Vec<Firing>>>, by: Duration) -> Vec<Firing> {
    let fired = match fired.lock() {
        Ok(fired) => fired.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    fired
        .into_iter()
        .map(|f| Firing {
            at: f.at.saturating_sub(by),
            event: f.event,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(mode: PulseMode) -> PulsePlan {
        PulsePlan {
            mode,
            events: 5,
            interval: Duration::from_millis(2),
            window: Duration::from_millis(50),
            trailing: TrailingCall::Unbound,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_fires_once_for_last_event() {
        let fired = run(plan(PulseMode::Debounce)).await.unwrap();
        assert_eq!(
            fired,
            vec![Firing {
                at: Duration::from_millis(58),
                event: Some(4),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leading_fires_once_for_first_event() {
        let fired = run(plan(PulseMode::Leading)).await.unwrap();
        assert_eq!(
            fired,
            vec![Firing {
                at: Duration::ZERO,
                event: Some(0),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_fires_first_event_then_unbound_trailing_call() {
        let fired = run(plan(PulseMode::Throttle)).await.unwrap();
        assert_eq!(fired.len(), 2);
        assert_eq!(
            fired[0],
            Firing {
                at: Duration::ZERO,
                event: Some(0),
            }
        );
        assert_eq!(fired[1].event, None);
        assert_eq!(fired[1].at, Duration::from_millis(50));
    }

    #[test]
    fn firing_display() {
        let f = Firing {
            at: Duration::from_millis(42),
            event: Some(3),
        };
        assert_eq!(f.to_string(), "    42 ms  event #3");
    }
}
