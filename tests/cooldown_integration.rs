//! Integration tests for the cooldown engine.
//!
//! All tests run on a paused Tokio clock, so timer deadlines are exact.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep};
use uado::cooldown::{CooldownConfig, CooldownEngine, CooldownState};
use uado::models::{ChurnKind, CooldownEvent, EndReason};

fn engine(timeout_ms: u64, window_ms: u64) -> CooldownEngine {
    CooldownEngine::new(CooldownConfig::from_millis(Some(timeout_ms), Some(window_ms)))
}

fn drain(events: &mut broadcast::Receiver<CooldownEvent>) -> Vec<CooldownEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_single_churn_ends_at_timeout_not_earlier() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::FileChanged);
    assert_eq!(events.recv().await.unwrap(), CooldownEvent::Active);

    let ended = events.recv().await.unwrap();
    assert_eq!(
        ended,
        CooldownEvent::Ended {
            reason: EndReason::Timeout
        }
    );
    assert_eq!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(engine.state(), CooldownState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_continuous_churn_resets_safety_timer() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::FileChanged);
    for _ in 0..3 {
        sleep(Duration::from_millis(60)).await;
        engine.churn_heavy(ChurnKind::FileChanged);
    }
    // Last churn at t=180.
    sleep(Duration::from_millis(99)).await;
    assert!(engine.is_active());

    assert_eq!(events.recv().await.unwrap(), CooldownEvent::Active);
    assert!(events.recv().await.unwrap().is_ended());
    assert_eq!(start.elapsed(), Duration::from_millis(280));
}

#[tokio::test(start_paused = true)]
async fn test_stability_hint_ends_after_window() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::LspBusy);
    sleep(Duration::from_millis(10)).await;
    engine.stability_hint();
    assert!(engine.is_active(), "a hint alone never ends cooldown");

    assert_eq!(events.recv().await.unwrap(), CooldownEvent::Active);
    assert_eq!(
        events.recv().await.unwrap(),
        CooldownEvent::Ended {
            reason: EndReason::Stable
        }
    );
    assert_eq!(start.elapsed(), Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_hint_restarts_window() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::LspBusy);
    engine.stability_hint();
    sleep(Duration::from_millis(15)).await;
    engine.stability_hint();

    events.recv().await.unwrap();
    assert!(events.recv().await.unwrap().is_ended());
    assert_eq!(start.elapsed(), Duration::from_millis(35));
}

#[tokio::test(start_paused = true)]
async fn test_churn_cancels_pending_stability_timer() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::FileChanged);
    sleep(Duration::from_millis(10)).await;
    engine.stability_hint();
    sleep(Duration::from_millis(10)).await;
    engine.churn_heavy(ChurnKind::FileChanged);

    // The cancelled stability timer would have fired at t=30.
    sleep(Duration::from_millis(50)).await;
    assert!(engine.is_active());

    events.recv().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        CooldownEvent::Ended {
            reason: EndReason::Timeout
        }
    );
    assert_eq!(start.elapsed(), Duration::from_millis(120));
}

#[tokio::test(start_paused = true)]
async fn test_late_hint_never_postpones_safety_ceiling() {
    let engine = engine(100, 50);
    let mut events = engine.subscribe();
    let start = Instant::now();

    engine.churn_heavy(ChurnKind::FileChanged);
    sleep(Duration::from_millis(80)).await;
    engine.stability_hint();

    events.recv().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        CooldownEvent::Ended {
            reason: EndReason::Timeout
        }
    );
    assert_eq!(start.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_idle_ignores_stability_hint() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();

    engine.stability_hint();
    sleep(Duration::from_millis(500)).await;

    assert_eq!(engine.state(), CooldownState::Idle);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_active_is_never_emitted_twice_in_a_row() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();

    for round in 0..3u64 {
        for _ in 0..5 {
            engine.churn_heavy(ChurnKind::FileChanged);
            engine.stability_hint();
            engine.churn_heavy(ChurnKind::LspBusy);
            sleep(Duration::from_millis(5 + round)).await;
        }
        sleep(Duration::from_millis(200)).await;
    }

    let emitted = drain(&mut events);
    assert_eq!(emitted.len(), 6);
    for pair in emitted.chunks(2) {
        assert_eq!(pair[0], CooldownEvent::Active);
        assert!(pair[1].is_ended());
    }
}

#[tokio::test(start_paused = true)]
async fn test_new_cooldown_after_end_emits_again() {
    let engine = engine(100, 20);
    let mut events = engine.subscribe();

    engine.churn_heavy(ChurnKind::FileChanged);
    engine.stability_hint();
    sleep(Duration::from_millis(25)).await;
    assert!(!engine.is_active());

    engine.churn_heavy(ChurnKind::FileChanged);
    assert!(engine.is_active());

    assert_eq!(
        drain(&mut events),
        vec![
            CooldownEvent::Active,
            CooldownEvent::Ended {
                reason: EndReason::Stable
            },
            CooldownEvent::Active,
        ]
    );
}
