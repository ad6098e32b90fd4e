#![allow(missing_docs)]

//! End-to-end tests for the time substrate: timer driver, sleep, interval,
//! and a debouncer pump loop, all driven by a virtual clock.

#[macro_use]
mod common;

use common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Poll, Wake, Waker};
use std::time::Duration;
use tempo::time::{interval, sleep_until, TimeSource, TimerDriver};
use tempo::types::Time;
use tempo::Debouncer;

/// Waker that records its tag in a shared list when woken.
struct OrderWaker {
    order: Arc<Mutex<Vec<u64>>>,
    tag: u64,
}

impl Wake for OrderWaker {
    fn wake(self: Arc<Self>) {
        self.order.lock().unwrap().push(self.tag);
    }
}

fn order_waker(order: &Arc<Mutex<Vec<u64>>>, tag: u64) -> Waker {
    Waker::from(Arc::new(OrderWaker {
        order: Arc::clone(order),
        tag,
    }))
}

/// Waker that flips a flag when woken.
struct FlagWaker(Arc<AtomicBool>);

impl Wake for FlagWaker {
    fn wake(self: Arc<Self>) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn flag_waker(flag: &Arc<AtomicBool>) -> Waker {
    Waker::from(Arc::new(FlagWaker(Arc::clone(flag))))
}

#[test]
fn driver_fires_wakers_in_deadline_order() {
    init_test_logging();
    test_phase!("driver_fires_wakers_in_deadline_order");

    test_section!("setup");
    let clock = test_clock();
    let driver = TimerDriver::with_clock(clock.clone());
    let order = Arc::new(Mutex::new(Vec::new()));

    // Register out of deadline order; tags double as deadlines in ms.
    driver.register(Time::from_millis(30), order_waker(&order, 30));
    driver.register(Time::from_millis(10), order_waker(&order, 10));
    driver.register(Time::from_millis(20), order_waker(&order, 20));
    assert_with_log!(
        driver.pending_count() == 3,
        "three timers pending",
        3,
        driver.pending_count()
    );
    assert_with_log!(
        driver.next_deadline() == Some(Time::from_millis(10)),
        "earliest deadline surfaces first",
        Some(Time::from_millis(10)),
        driver.next_deadline()
    );

    test_section!("advance_past_all_deadlines");
    clock.advance(Time::from_millis(40).as_nanos());
    let fired = driver.process_timers();
    assert_with_log!(fired == 3, "all timers fired", 3, fired);

    test_section!("verify_order");
    let woken = order.lock().unwrap().clone();
    assert_with_log!(
        woken == vec![10, 20, 30],
        "woken in deadline order",
        "[10, 20, 30]",
        format!("{woken:?}")
    );
    assert_with_log!(driver.is_empty(), "queue drained", true, driver.is_empty());
    test_complete!("driver_fires_wakers_in_deadline_order");
}

#[test]
fn cancel_prevents_wake() {
    init_test_logging();
    test_phase!("cancel_prevents_wake");

    test_section!("setup");
    let clock = test_clock();
    let driver = TimerDriver::with_clock(clock.clone());
    let flag = Arc::new(AtomicBool::new(false));
    let handle = driver.register(Time::from_millis(10), flag_waker(&flag));

    test_section!("cancel");
    let cancelled = driver.cancel(&handle);
    assert_with_log!(cancelled, "cancel succeeds on live timer", true, cancelled);
    let again = driver.cancel(&handle);
    assert_with_log!(!again, "second cancel is a no-op", false, again);

    test_section!("advance_past_deadline");
    clock.advance(Time::from_millis(20).as_nanos());
    let fired = driver.process_timers();
    assert_with_log!(fired == 0, "cancelled timer does not fire", 0, fired);
    assert_with_log!(
        !flag.load(Ordering::SeqCst),
        "waker never called",
        false,
        flag.load(Ordering::SeqCst)
    );
    test_complete!("cancel_prevents_wake");
}

#[test]
fn update_moves_deadline() {
    init_test_logging();
    test_phase!("update_moves_deadline");

    test_section!("setup");
    let clock = test_clock();
    let driver = TimerDriver::with_clock(clock.clone());
    let flag = Arc::new(AtomicBool::new(false));
    let handle = driver.register(Time::from_millis(10), flag_waker(&flag));

    test_section!("push_deadline_out");
    let handle = driver.update(&handle, Time::from_millis(50), flag_waker(&flag));
    clock.advance(Time::from_millis(20).as_nanos());
    let fired = driver.process_timers();
    assert_with_log!(fired == 0, "old deadline no longer fires", 0, fired);

    test_section!("fire_at_new_deadline");
    clock.advance(Time::from_millis(30).as_nanos());
    let fired = driver.process_timers();
    assert_with_log!(fired == 1, "updated timer fires once", 1, fired);
    assert_with_log!(
        flag.load(Ordering::SeqCst),
        "waker called at new deadline",
        true,
        flag.load(Ordering::SeqCst)
    );
    let stale = driver.cancel(&handle);
    assert_with_log!(!stale, "handle is spent after firing", false, stale);
    test_complete!("update_moves_deadline");
}

#[test]
fn capacity_is_enforced_and_reported() {
    init_test_logging();
    test_phase!("capacity_is_enforced_and_reported");

    test_section!("fill_to_capacity");
    let clock = test_clock();
    let driver = TimerDriver::with_capacity(clock, 1);
    let flag = Arc::new(AtomicBool::new(false));
    let first = driver
        .try_register(Time::from_millis(10), flag_waker(&flag))
        .expect("first registration fits");

    test_section!("overflow");
    let err = driver
        .try_register(Time::from_millis(20), flag_waker(&flag))
        .expect_err("second registration exceeds capacity");
    let message = err.to_string();
    assert_with_log!(
        message.contains("capacity"),
        "error names the limit",
        "contains 'capacity'",
        message
    );
    assert_with_log!(
        err.capacity == 1,
        "error carries configured capacity",
        1,
        err.capacity
    );

    test_section!("cancel_frees_a_slot");
    assert!(driver.cancel(&first));
    let refilled = driver.try_register(Time::from_millis(30), flag_waker(&flag));
    assert_with_log!(
        refilled.is_ok(),
        "slot reusable after cancel",
        true,
        refilled.is_ok()
    );
    test_complete!("capacity_is_enforced_and_reported");
}

#[test]
fn sleep_driven_by_timer_driver() {
    init_test_logging();
    test_phase!("sleep_driven_by_timer_driver");

    test_section!("setup");
    let clock = test_clock();
    let driver = TimerDriver::with_clock(clock.clone());
    let sleep = sleep_until(Time::from_millis(100));
    let flag = Arc::new(AtomicBool::new(false));
    driver.register(sleep.deadline(), flag_waker(&flag));

    test_section!("before_deadline");
    let pending = sleep.poll_with_time(driver.now()).is_pending();
    assert_with_log!(pending, "sleep pending at t=0", true, pending);
    clock.advance(Time::from_millis(99).as_nanos());
    driver.process_timers();
    assert_with_log!(
        !flag.load(Ordering::SeqCst),
        "no wake before deadline",
        false,
        flag.load(Ordering::SeqCst)
    );

    test_section!("deadline_reached");
    clock.advance(Time::from_millis(1).as_nanos());
    let fired = driver.process_timers();
    assert_with_log!(fired == 1, "driver wakes the sleeper", 1, fired);
    let ready = sleep.poll_with_time(driver.now()).is_ready();
    assert_with_log!(ready, "sleep is ready when repolled", true, ready);
    test_complete!("sleep_driven_by_timer_driver");
}

#[test]
fn interval_ticks_with_virtual_clock() {
    init_test_logging();
    test_phase!("interval_ticks_with_virtual_clock");

    test_section!("setup");
    let clock = test_clock();
    let mut ticker = interval(clock.now(), Duration::from_millis(250));

    test_section!("tick_sequence");
    let first = ticker.poll_tick(clock.now());
    assert_with_log!(
        first == Poll::Ready(Time::ZERO),
        "first tick is immediate",
        "Ready(Time(0ns))",
        format!("{first:?}")
    );

    clock.advance(Time::from_millis(100).as_nanos());
    let early = ticker.poll_tick(clock.now());
    assert_with_log!(
        early.is_pending(),
        "pending inside the period",
        true,
        early.is_pending()
    );

    clock.advance(Time::from_millis(150).as_nanos());
    let second = ticker.poll_tick(clock.now());
    assert_with_log!(
        second == Poll::Ready(Time::from_millis(250)),
        "second tick at one period",
        "Ready(250ms)",
        format!("{second:?}")
    );

    clock.advance(Time::from_millis(250).as_nanos());
    let third = ticker.poll_tick(clock.now());
    assert_with_log!(
        third == Poll::Ready(Time::from_millis(500)),
        "third tick stays on schedule",
        "Ready(500ms)",
        format!("{third:?}")
    );
    test_complete!("interval_ticks_with_virtual_clock");
}

#[test]
fn debouncer_pump_loop_delivers_trailing_value() {
    init_test_logging();
    test_phase!("debouncer_pump_loop_delivers_trailing_value");

    test_section!("setup");
    let clock = test_clock();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&emitted);
    let mut debouncer = Debouncer::new(
        Arc::clone(&clock),
        Duration::from_millis(100),
        move |value: u32| sink.lock().unwrap().push(value),
    );

    test_section!("burst");
    for value in 1..=5 {
        debouncer.feed(value);
        clock.advance(Time::from_millis(10).as_nanos());
    }
    let quiet = emitted.lock().unwrap().is_empty();
    assert_with_log!(quiet, "quiet period still open after burst", true, quiet);

    // Pump the way an event loop would: advance to the next deadline and poll.
    test_section!("pump_until_idle");
    while let Some(deadline) = debouncer.next_deadline() {
        clock.advance_to(deadline);
        debouncer.poll_emit();
    }

    test_section!("verify");
    let seen = emitted.lock().unwrap().clone();
    assert_with_log!(
        seen == vec![5],
        "one emission carrying the last value",
        "[5]",
        format!("{seen:?}")
    );
    assert_with_log!(debouncer.fed() == 5, "five values fed", 5, debouncer.fed());
    assert_with_log!(
        debouncer.emitted() == 1,
        "one emission recorded",
        1,
        debouncer.emitted()
    );
    test_complete!("debouncer_pump_loop_delivers_trailing_value");
}
