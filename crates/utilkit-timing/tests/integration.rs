//! Integration tests for the utilkit-timing crate.
//!
//! Most tests run under a paused tokio clock, so the timings asserted
//! here are exact rather than approximate.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use utilkit_timing::{BoundDebounce, Debounce, Throttle, WindowReset};

// ═══════════════════════════════════════════════════════════════════════
//  Debounce
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn trailing_debounce_fires_once_fifty_ms_after_last_call() {
    let fired: Arc<Mutex<Vec<(Instant, u32)>>> = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::clone(&fired);
    let debounced = Debounce::new(Duration::from_millis(50), move |_: (), n: u32| {
        f.lock().unwrap().push((Instant::now(), n));
    })
    .unwrap();

    // Five calls within 10 ms.
    let mut last_call = Instant::now();
    for n in 1..=5 {
        last_call = Instant::now();
        debounced.call((), n);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    tokio::time::sleep(Duration::from_millis(47)).await;
    assert!(fired.lock().unwrap().is_empty(), "fired before the quiet period");

    tokio::time::sleep(Duration::from_millis(5)).await;
    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].1, 5);
    assert_eq!(fired[0].0 - last_call, Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_each_fire_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let debounced = Debounce::new(Duration::from_millis(20), move |_: (), _: ()| {
        c.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    for _ in 0..3 {
        for _ in 0..4 {
            debounced.call((), ());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn clones_share_one_timer() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let a = Debounce::new(Duration::from_millis(10), move |_: (), _: ()| {
        c.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    let b = a.clone();

    a.call((), ());
    b.call((), ());
    a.call((), ());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_wrapper_keeps_the_scheduled_call() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let debounced = Debounce::new(Duration::from_millis(10), move |_: (), _: ()| {
        c.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    debounced.call((), ());
    drop(debounced);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn leading_panic_propagates_and_wrapper_recovers() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let debounced = Debounce::leading(Duration::from_millis(10), move |_: (), explode: bool| {
        c.fetch_add(1, Ordering::SeqCst);
        if explode {
            panic!("callback failure");
        }
    })
    .unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| debounced.call((), true)));
    assert!(result.is_err());

    tokio::time::sleep(Duration::from_millis(20)).await;
    debounced.call((), false);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn calls_from_a_plain_thread_are_scheduled_on_the_runtime() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let debounced = Debounce::new(Duration::from_millis(10), move |_: (), _: ()| {
        c.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    let remote = debounced.clone();
    std::thread::spawn(move || {
        for _ in 0..3 {
            remote.call((), ());
        }
    })
    .join()
    .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn bound_debounce_ignores_caller_context() {
    #[derive(Debug)]
    struct Panel {
        id: u32,
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let debounced = BoundDebounce::new(
        Panel { id: 9 },
        Duration::from_millis(15),
        move |p: &Panel, n: u32| {
            s.lock().unwrap().push((p.id, n));
        },
    )
    .unwrap();

    let other = debounced.clone();
    debounced.call(1);
    other.call(2);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(*seen.lock().unwrap(), vec![(9, 2)]);
    assert_eq!(other.context().id, 9);
}

// ═══════════════════════════════════════════════════════════════════════
//  Throttle
// ═══════════════════════════════════════════════════════════════════════

type Fired = Arc<Mutex<Vec<(Instant, Option<((), u32)>)>>>;

/// Run `throttled` through one call every 20 ms for 500 ms, starting on an
/// idle window. Returns the burst start.
async fn burst(throttled: &Throttle<(), u32>, delay: Duration) -> Instant {
    // Let the first window lapse so the burst starts on an idle wrapper.
    tokio::time::sleep(delay).await;
    let burst_start = Instant::now();
    for n in 0..25 {
        throttled.call((), n);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(delay).await;
    burst_start
}

fn recording_throttle(delay: Duration) -> (Fired, Throttle<(), u32>) {
    let fired: Fired = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::clone(&fired);
    let throttled = Throttle::new(delay, move |call: Option<((), u32)>| {
        f.lock().unwrap().push((Instant::now(), call));
    })
    .unwrap();
    (fired, throttled)
}

#[tokio::test(start_paused = true)]
async fn throttle_leading_calls_run_once_per_window() {
    let delay = Duration::from_millis(100);
    let (fired, throttled) = recording_throttle(delay);
    let burst_start = burst(&throttled, delay).await;

    // Calls 0, 5, 10, 15 and 20 each land on a window boundary and run
    // immediately with their args; trailing calls in between get `None`.
    let leading: Vec<_> = fired
        .lock()
        .unwrap()
        .iter()
        .filter_map(|(at, call)| call.map(|((), n)| (*at - burst_start, n)))
        .collect();
    assert_eq!(
        leading,
        (0..5)
            .map(|k| (Duration::from_millis(100 * k), (5 * k) as u32))
            .collect::<Vec<_>>()
    );
    assert_eq!(fired.lock().unwrap().last().map(|(_, call)| *call), Some(None));
}

#[tokio::test(start_paused = true)]
async fn throttle_with_trailing_reset_spaces_every_invocation() {
    let delay = Duration::from_millis(100);
    let (fired, throttled) = recording_throttle(delay);
    let throttled = throttled.window_reset(WindowReset::OnTrailing);
    let burst_start = burst(&throttled, delay).await;

    let fired = fired.lock().unwrap();
    assert!(fired.len() >= 4, "too few invocations: {}", fired.len());

    // The first call ran immediately, with its arguments.
    assert_eq!(fired[0].0, burst_start);
    assert_eq!(fired[0].1, Some(((), 0)));

    for pair in fired.windows(2) {
        let gap = pair[1].0 - pair[0].0;
        assert!(gap >= delay, "invocations only {gap:?} apart");
    }
}

#[tokio::test(start_paused = true)]
async fn throttle_stays_callable_indefinitely() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let throttled = Throttle::new(Duration::from_millis(10), move |_: Option<((), ())>| {
        c.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(30)).await;
        throttled.call((), ());
    }
    assert_eq!(count.load(Ordering::SeqCst), 5);
    assert!(!throttled.is_pending());
}
