//! Integration tests for a full countdown through controller, poller and presenter.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tickdown_core::sound::{MemorySink, RecordingSoundPlayer, SoundCall};
use tickdown_core::timer::{ManualClock, NextTick, Preload, NANOS_PER_SEC};
use tickdown_core::{
    ConfigStore, EngineOutcome, Event, FileConfigStore, Presenter, SoundId, StartError,
    StreamHandle, TimerController,
};

const S: i64 = NANOS_PER_SEC;

#[tokio::test]
async fn test_full_countdown_with_persisted_lead() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    // Menu: pick a two second lead, persisted for later sessions.
    let mut store = FileConfigStore::new(&path);
    store.set_tick_lead_seconds(2).unwrap();

    let clock = ManualClock::new(1_000 * S);
    let errors = MemorySink::new();
    let mut controller = TimerController::with_clock(
        FileConfigStore::new(&path),
        errors.clone(),
        Arc::new(clock.clone()),
    );

    let mut run = controller.start("4").unwrap();
    assert_eq!(run.session().next_tick(), NextTick::Pending(2 * S));
    assert_eq!(run.session().preload(), Preload::Pending(2 * S + S / 2));

    let player = RecordingSoundPlayer::new();
    let display = MemorySink::new();
    let mut presenter = Presenter::new(player.clone(), display.clone());

    let driver = tokio::spawn(async move {
        let mut events = Vec::new();
        let last = run
            .drive(&mut presenter, |o| events.push(Event::from_outcome(o, 2)))
            .await;
        (last, events)
    });

    for offset in [S, 1_600_000_000, 2 * S, 3 * S, 4 * S] {
        tokio::time::sleep(Duration::from_millis(40)).await;
        clock.set(1_000 * S + offset);
    }

    let (last, events) = driver.await.unwrap();
    assert_eq!(last, Some(EngineOutcome::PlayDone));

    let lifecycle: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::PreloadIssued { .. } => Some("preload"),
            Event::TickingStarted { .. } => Some("ticking"),
            Event::CountdownFinished { .. } => Some("finished"),
            _ => None,
        })
        .collect();
    assert_eq!(lifecycle, vec!["preload", "ticking", "finished"]);

    assert_eq!(
        player.calls(),
        vec![
            SoundCall::PlayMuted(SoundId::Tick),
            SoundCall::PlayLooping(SoundId::Tick, StreamHandle(1)),
            SoundCall::Stop(StreamHandle(1)),
            SoundCall::PlayOnce(SoundId::Ding),
        ]
    );
    assert_eq!(display.displays().first().map(String::as_str), Some("4.00"));
    assert_eq!(display.last_display().as_deref(), Some("0.00"));
    assert_eq!(errors.error(), "");
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_short_countdown_on_real_clock() {
    let dir = TempDir::new().unwrap();
    let mut controller = TimerController::new(
        FileConfigStore::new(dir.path().join("config.toml")),
        MemorySink::new(),
    );

    // Under half a second: no ticking, ding only.
    let mut run = controller.start("0.2").unwrap();
    assert_eq!(run.session().next_tick(), NextTick::Pending(0));

    let player = RecordingSoundPlayer::new();
    let mut presenter = Presenter::new(player.clone(), MemorySink::new());
    let last = tokio::time::timeout(Duration::from_secs(5), run.drive(&mut presenter, |_| {}))
        .await
        .expect("countdown did not finish");

    assert_eq!(last, Some(EngineOutcome::PlayDone));
    let calls = player.calls();
    assert_eq!(calls.last(), Some(&SoundCall::PlayOnce(SoundId::Ding)));
    assert!(!calls
        .iter()
        .any(|c| matches!(c, SoundCall::PlayLooping(..))));
}

#[tokio::test]
async fn test_rejections_leave_controller_idle() {
    let dir = TempDir::new().unwrap();
    let errors = MemorySink::new();
    let mut controller = TimerController::with_clock(
        FileConfigStore::new(dir.path().join("config.toml")),
        errors.clone(),
        Arc::new(ManualClock::new(0)),
    );

    for (input, expected, text) in [
        ("abc", StartError::NotANumber, "not a number"),
        ("-3", StartError::NotANumber, "not a number"),
        ("2000", StartError::TooLarge, "value too large"),
    ] {
        assert_eq!(controller.start(input).unwrap_err(), expected);
        assert_eq!(errors.error(), text);
        assert!(!controller.is_running());
    }
}
