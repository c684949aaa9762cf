//! Integration tests for the per-room timers.
//!
//! All tests run with paused, auto-advancing Tokio time, so sleeps resolve
//! as soon as every task is idle.

use std::time::Duration;

use tokio::time::Instant;
use zodiac_timer::{TimerFired, Timers};

// =========================================================================
// Arming and cancelling
// =========================================================================

#[test]
fn test_new_timers_are_disarmed() {
    let timers = Timers::new();
    assert!(!timers.is_turn_armed());
    assert!(!timers.is_game_armed());
}

#[tokio::test(start_paused = true)]
async fn test_disarmed_timers_pend_forever() {
    let mut timers = Timers::new();
    let result = tokio::time::timeout(Duration::from_secs(3600), timers.next_fire()).await;
    assert!(result.is_err(), "nothing armed, nothing should fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_disarms_both() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_secs(1));
    timers.rearm_game(Duration::from_secs(5));
    timers.cancel_all();

    assert!(!timers.is_turn_armed());
    assert!(!timers.is_game_armed());
    let result = tokio::time::timeout(Duration::from_secs(10), timers.next_fire()).await;
    assert!(result.is_err());
}

// =========================================================================
// Turn timer
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_turn_timer_repeats_on_fixed_cadence() {
    let mut timers = Timers::new();
    let start = Instant::now();
    timers.rearm_turn(Duration::from_secs(1));

    for expected in 1..=3 {
        assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: expected });
        assert_eq!(start.elapsed(), Duration::from_secs(expected));
    }
    assert!(timers.is_turn_armed(), "turn timer keeps running");
}

#[tokio::test(start_paused = true)]
async fn test_rearm_turn_replaces_running_timer() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_secs(1));
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 1 });

    let rearmed_at = Instant::now();
    timers.rearm_turn(Duration::from_secs(2));

    // Tick numbering restarts and only the new cadence is observed.
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 1 });
    assert_eq!(rearmed_at.elapsed(), Duration::from_secs(2));
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 2 });
    assert_eq!(rearmed_at.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_late_poll_reschedules_from_now() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_secs(1));

    // Nobody polls for 5 periods.
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 1 });

    // The missed periods are skipped rather than delivered in a burst.
    let after_overrun = Instant::now();
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 2 });
    assert_eq!(after_overrun.elapsed(), Duration::from_secs(1));
}

// =========================================================================
// Game timer
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_game_timer_fires_once() {
    let mut timers = Timers::new();
    let start = Instant::now();
    timers.rearm_game(Duration::from_secs(120));

    assert_eq!(timers.next_fire().await, TimerFired::GameTimeout);
    assert_eq!(start.elapsed(), Duration::from_secs(120));
    assert!(!timers.is_game_armed());

    let result = tokio::time::timeout(Duration::from_secs(600), timers.next_fire()).await;
    assert!(result.is_err(), "a fired game timer must not fire again");
}

#[tokio::test(start_paused = true)]
async fn test_turns_interleave_with_game_deadline() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_secs(1));
    timers.rearm_game(Duration::from_millis(2500));

    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 1 });
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 2 });
    assert_eq!(timers.next_fire().await, TimerFired::GameTimeout);
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 3 });
}

#[tokio::test(start_paused = true)]
async fn test_game_timeout_wins_a_tie() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_secs(2));
    timers.rearm_game(Duration::from_secs(2));

    assert_eq!(timers.next_fire().await, TimerFired::GameTimeout);
    assert_eq!(timers.next_fire().await, TimerFired::Turn { tick: 1 });
}

// =========================================================================
// select! loop pattern (mirrors the room actor)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern_is_cancel_safe() {
    let mut timers = Timers::new();
    timers.rearm_turn(Duration::from_millis(100));

    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);
    tokio::spawn(async move {
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tx.send("ping").await.ok();
        }
        tokio::time::sleep(Duration::from_millis(230)).await;
        tx.send("stop").await.ok();
    });

    let mut pings = 0;
    let mut last_tick = 0;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                if cmd == "stop" {
                    break;
                }
                pings += 1;
            }
            fired = timers.next_fire() => {
                let TimerFired::Turn { tick } = fired else {
                    panic!("unexpected {fired:?}");
                };
                assert_eq!(tick, last_tick + 1, "no tick lost to cancellation");
                last_tick = tick;
            }
        }
    }

    assert_eq!(pings, 4);
    assert_eq!(last_tick, 3);
}
