//! Integration tests for click sequencing, rejection and state reporting.
//!
//! Concurrent callers are modelled as futures joined on one thread (the
//! cooperative case) or as OS threads sharing the controller.

use std::pin::pin;
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

use async_io_mini::Timer;
use atxctl::Error;
use atxctl::error::GpioError;
use embedded_hal::digital::ErrorKind;
use futures_lite::future;

use crate::mock_hw::Rig;

fn sleep(ms: u64) -> Timer {
    Timer::after(Duration::from_millis(ms))
}

// ── Pulse shape ───────────────────────────────────────────────

#[test]
fn click_power_holds_line_for_short_delay() {
    let rig = Rig::new(0.1, 0.6);

    let (clicked, (mid, after)) = future::block_on(future::zip(rig.atx.click_power(), async {
        sleep(50).await;
        let mid = (rig.power_switch.level(), rig.atx.get_state().unwrap().busy);
        sleep(70).await;
        let after = (rig.power_switch.level(), rig.atx.get_state().unwrap().busy);
        (mid, after)
    }));

    assert_eq!(clicked, Ok(()));
    assert_eq!(mid, (true, true), "line asserted and busy at 50ms");
    assert_eq!(after, (false, false), "line released and idle at 120ms");
    assert_eq!(rig.power_switch.writes(), vec![false, true, false]);
    assert!(!rig.reset_switch.was_asserted());
}

#[test]
fn click_power_long_holds_line_for_long_delay() {
    let rig = Rig::new(0.05, 0.2);

    let (clicked, (mid, after)) =
        future::block_on(future::zip(rig.atx.click_power_long(), async {
            sleep(100).await;
            let mid = rig.power_switch.level();
            sleep(150).await;
            (mid, rig.power_switch.level())
        }));

    assert_eq!(clicked, Ok(()));
    assert!(mid, "still held past the short delay");
    assert!(!after);
    assert!(!rig.atx.is_busy());
}

#[test]
fn click_reset_drives_only_reset_line() {
    let rig = Rig::new(0.02, 0.1);

    assert_eq!(future::block_on(rig.atx.click_reset()), Ok(()));

    assert_eq!(rig.reset_switch.writes(), vec![false, true, false]);
    assert_eq!(rig.power_switch.writes(), vec![false]);
}

#[test]
fn successful_click_takes_at_least_the_delay() {
    let rig = Rig::new(0.05, 0.1);
    let start = Instant::now();
    future::block_on(rig.atx.click_power()).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(50));
}

// ── Mutual exclusion ──────────────────────────────────────────

#[test]
fn reset_during_power_click_is_rejected() {
    let rig = Rig::new(0.1, 0.6);

    let (power, reset) = future::block_on(future::zip(rig.atx.click_power(), async {
        sleep(10).await;
        rig.atx.click_reset().await
    }));

    assert_eq!(power, Ok(()));
    assert_eq!(reset, Err(Error::Busy("ATX controller")));
    assert_eq!(reset.unwrap_err().to_string(), "ATX controller busy");
    assert!(!rig.reset_switch.was_asserted(), "reset line must never move");
    assert_eq!(rig.reset_switch.writes(), vec![false]);
}

#[test]
fn rejection_does_not_wait_for_the_pulse() {
    let rig = Rig::new(0.3, 0.6);

    let (_, waited) = future::block_on(future::zip(rig.atx.click_power(), async {
        sleep(10).await;
        let start = Instant::now();
        let res = rig.atx.click_power_long().await;
        assert!(res.unwrap_err().is_busy());
        start.elapsed()
    }));

    assert!(waited < Duration::from_millis(50), "rejection took {waited:?}");
}

#[test]
fn rejected_click_leaves_holder_untouched() {
    let rig = Rig::new(0.1, 0.6);

    let (_, state) = future::block_on(future::zip(rig.atx.click_power(), async {
        sleep(20).await;
        assert!(rig.atx.click_power().await.is_err());
        rig.atx.get_state().unwrap()
    }));

    assert!(state.busy, "first click still holds the region");
    assert_eq!(rig.power_switch.writes(), vec![false, true, false]);
}

#[test]
fn sequential_clicks_all_succeed() {
    let rig = Rig::new(0.01, 0.02);

    future::block_on(async {
        rig.atx.click_power().await.unwrap();
        rig.atx.click_reset().await.unwrap();
        rig.atx.click_power_long().await.unwrap();
    });

    assert_eq!(rig.power_switch.writes(), vec![false, true, false, true, false]);
    assert_eq!(rig.reset_switch.writes(), vec![false, true, false]);
}

#[test]
fn only_one_thread_pulses() {
    const CALLERS: usize = 4;
    let rig = Arc::new(Rig::new(0.1, 0.6));
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let rig = rig.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                future::block_on(rig.atx.click_power())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.err())
            .all(|e| e == Error::Busy("ATX controller"))
    );
    assert_eq!(rig.power_switch.writes(), vec![false, true, false]);
}

// ── Cancellation and failure ──────────────────────────────────

#[test]
fn cancelled_click_releases_line_and_region() {
    let rig = Rig::new(0.1, 5.0);

    future::block_on(async {
        let mut click = pin!(rig.atx.click_power_long());
        assert!(future::poll_once(&mut click).await.is_none());
        assert!(rig.power_switch.level());
        assert!(rig.atx.is_busy());
    });

    // Future dropped mid-hold.
    assert!(!rig.power_switch.level());
    assert!(!rig.atx.is_busy());
    assert_eq!(rig.power_switch.writes(), vec![false, true, false]);

    assert_eq!(future::block_on(rig.atx.click_reset()), Ok(()));
}

#[test]
fn timed_out_caller_still_releases() {
    let rig = Rig::new(0.1, 5.0);

    let outcome = future::block_on(future::or(
        async { rig.atx.click_power_long().await.map(|_| "clicked") },
        async {
            sleep(30).await;
            Ok("gave up")
        },
    ));

    assert_eq!(outcome, Ok("gave up"));
    assert!(!rig.power_switch.level());
    assert!(!rig.atx.is_busy());
}

#[test]
fn write_failure_propagates_and_frees_region() {
    let rig = Rig::new(0.01, 0.02);
    rig.power_switch.fail_writes(true);

    let res = future::block_on(rig.atx.click_power());
    assert_eq!(
        res,
        Err(Error::Gpio(GpioError::WriteFailed(ErrorKind::Other)))
    );
    assert!(!rig.atx.is_busy());

    rig.power_switch.fail_writes(false);
    assert_eq!(future::block_on(rig.atx.click_power()), Ok(()));
    assert!(!rig.power_switch.level());
}

// ── State reporting ───────────────────────────────────────────

#[test]
fn leds_are_inverted_raw_levels() {
    let rig = Rig::new(0.01, 0.02);

    let state = rig.atx.get_state().unwrap();
    assert!(!state.leds.power && !state.leds.hdd, "HIGH lines mean LEDs off");

    rig.power_led.set_level(false);
    let state = rig.atx.get_state().unwrap();
    assert!(state.leds.power);
    assert!(!state.leds.hdd);

    rig.hdd_led.set_level(false);
    rig.power_led.set_level(true);
    let state = rig.atx.get_state().unwrap();
    assert!(!state.leds.power);
    assert!(state.leds.hdd);
}

#[test]
fn state_reads_leds_during_a_pulse() {
    let rig = Rig::new(0.1, 0.6);
    rig.hdd_led.set_level(false);

    let (_, state) = future::block_on(future::zip(rig.atx.click_reset(), async {
        sleep(30).await;
        rig.atx.get_state().unwrap()
    }));

    assert!(state.busy);
    assert!(state.leds.hdd);
    assert!(!state.leds.power);
}

#[test]
fn led_read_failure_is_reported() {
    let rig = Rig::new(0.01, 0.02);
    rig.hdd_led.fail_reads(true);

    assert_eq!(
        rig.atx.get_state(),
        Err(Error::Gpio(GpioError::ReadFailed(ErrorKind::Other)))
    );
}
