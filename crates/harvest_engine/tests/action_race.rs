use std::sync::Arc;
use std::time::Duration;

use harvest_core::Vec3;
use harvest_engine::{
    ActionError, ActionRace, CancelCause, CancelSignal, EventKind, RaceOutcome, SimWorld,
    StuckDetection, StuckWatchdog, WorldEvent, WorldEventBus,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn death() -> WorldEvent {
    WorldEvent::Death {
        respawn_at: Vec3::new(0.0, 64.0, 0.0),
    }
}

#[tokio::test]
async fn completed_action_succeeds() {
    let bus = WorldEventBus::new();
    let outcome = ActionRace::new("test", &bus, Duration::from_secs(5))
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .run(async { Ok::<_, ActionError>(7) })
        .await;

    assert_eq!(outcome, RaceOutcome::Succeeded(7));
    assert_eq!(bus.active_subscriptions(), 0);
}

#[tokio::test]
async fn failing_action_reports_its_error() {
    let bus = WorldEventBus::new();
    let outcome = ActionRace::new("test", &bus, Duration::from_secs(5))
        .run(async { Err::<(), _>(ActionError::new("no path")) })
        .await;

    assert_eq!(outcome, RaceOutcome::Failed(ActionError::new("no path")));
}

#[tokio::test(start_paused = true)]
async fn slow_action_times_out() {
    let bus = WorldEventBus::new();
    let started = Instant::now();

    let outcome = ActionRace::new("test", &bus, Duration::from_secs(30))
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .run(std::future::pending::<Result<(), ActionError>>())
        .await;

    assert_eq!(outcome, RaceOutcome::TimedOut);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
    assert_eq!(bus.active_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn death_cancels_the_action() {
    let bus = WorldEventBus::new();
    let publisher = bus.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        publisher.publish(death());
    });

    let outcome = ActionRace::new("test", &bus, Duration::from_secs(30))
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .run(std::future::pending::<Result<(), ActionError>>())
        .await;

    assert_eq!(
        outcome,
        RaceOutcome::Cancelled(CancelCause::Died {
            respawn_at: Vec3::new(0.0, 64.0, 0.0)
        })
    );
    assert_eq!(bus.active_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn chat_does_not_trigger_a_death_listener() {
    let bus = WorldEventBus::new();
    let publisher = bus.clone();
    tokio::spawn(async move {
        publisher.publish(WorldEvent::Chat {
            sender: "alex".into(),
            message: "hello".into(),
        });
    });

    let outcome = ActionRace::new("test", &bus, Duration::from_secs(2))
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .run(async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, ActionError>("done")
        })
        .await;

    assert_eq!(outcome, RaceOutcome::Succeeded("done"));
}

#[tokio::test(start_paused = true)]
async fn caller_token_cancels_the_action() {
    let bus = WorldEventBus::new();
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let outcome = ActionRace::new("test", &bus, Duration::from_secs(30))
        .cancel_on(CancelSignal::Token(token))
        .run(std::future::pending::<Result<(), ActionError>>())
        .await;

    assert_eq!(outcome, RaceOutcome::Cancelled(CancelCause::Aborted));
}

#[tokio::test]
async fn ready_action_wins_over_a_signal_fired_in_the_same_poll() {
    let bus = WorldEventBus::new();
    let publisher = bus.clone();

    let outcome = ActionRace::new("test", &bus, Duration::from_secs(30))
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .run(async move {
            // The listener is already registered, so this death is delivered.
            assert_eq!(publisher.publish(death()), 1);
            Ok::<_, ActionError>(())
        })
        .await;

    assert_eq!(outcome, RaceOutcome::Succeeded(()));
    assert_eq!(bus.active_subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn stuck_watchdog_fires_after_repeated_slow_samples() {
    let world = Arc::new(
        SimWorld::builder()
            .position((5.0, 64.0, 5.0))
            .build(),
    );
    let detection = StuckDetection::default();
    let started = Instant::now();

    let outcome = ActionRace::new("travel", world.event_bus(), Duration::from_secs(120))
        .cancel_on(CancelSignal::Stuck(StuckWatchdog::new(world.clone(), detection)))
        .run(std::future::pending::<Result<(), ActionError>>())
        .await;

    assert_eq!(
        outcome,
        RaceOutcome::Cancelled(CancelCause::Stuck {
            at: Vec3::new(5.0, 64.0, 5.0)
        })
    );
    // Four slow samples, two seconds apart.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(8) && elapsed < Duration::from_secs(9));
}
