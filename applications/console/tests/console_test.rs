//! End-to-end tests: console commands against the simulated transport

use chorus_console::{Console, ConsoleConfig, ConsoleError, Reply};
use chorus_core::ChatId;
use chorus_playback::{PlaybackError, SessionState};
use std::time::Duration;

// ===== Helpers =====

fn config() -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.simulation.time_scale = 0.01;
    config.simulation.offline_chats = vec![-404];
    config
}

async fn say(console: &mut Console, line: &str) -> String {
    match console.handle_line(line).await {
        Ok(Some(Reply::Text(text))) => text,
        other => panic!("unexpected reply to {:?}: {:?}", line, other),
    }
}

// ===== Tests =====

#[tokio::test(start_paused = true)]
async fn play_queue_and_auto_advance() {
    let mut console = Console::new(&config());
    let chat = ChatId::new(-1);

    assert_eq!(say(&mut console, "play -1 morning").await, "Playing: Morning Coffee [03:05]");
    assert_eq!(say(&mut console, "play -1 night").await, "Queued at #1: Night Drive [04:02]");

    let queue = say(&mut console, "queue -1").await;
    assert!(queue.starts_with("▶ 0. Morning Coffee"));
    assert!(queue.contains("2 tracks, 07:07 total, 48 slots free"));

    // 185 s at 1% speed
    tokio::time::sleep(Duration::from_secs(2)).await;
    let status = console.orchestrator().status(chat).await;
    assert_eq!(status.current.unwrap().title, "Night Drive");

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(console.orchestrator().status(chat).await.state, SessionState::Idle);
    assert_eq!(say(&mut console, "queue -1").await, "Queue is empty.");

    console.shutdown().await;
}

#[tokio::test]
async fn search_then_pick() {
    let mut console = Console::new(&config());

    let listing = say(&mut console, "search o").await;
    assert!(listing.contains("1. Morning Coffee [03:05]"));

    assert_eq!(say(&mut console, "pick 7 1").await, "Playing: Morning Coffee [03:05]");
    assert!(matches!(
        console.handle_line("pick 7 99").await,
        Err(ConsoleError::NoSuchResult(99))
    ));

    console.shutdown().await;
}

#[tokio::test]
async fn pick_before_search_is_explained() {
    let mut console = Console::new(&config());
    assert!(matches!(
        console.handle_line("pick 7 1").await,
        Err(ConsoleError::NoSearchResults)
    ));
    console.shutdown().await;
}

#[tokio::test]
async fn request_errors_reach_the_user() {
    let mut console = Console::new(&config());

    assert!(matches!(
        console.handle_line("play 1 nothing matches this").await,
        Err(ConsoleError::Playback(PlaybackError::NoResults(_)))
    ));
    assert!(matches!(
        console.handle_line("play 1 long road").await,
        Err(ConsoleError::Playback(PlaybackError::DurationLimitExceeded { .. }))
    ));
    assert!(matches!(
        console.handle_line("play -404 morning").await,
        Err(ConsoleError::Playback(PlaybackError::JoinFailed(_)))
    ));
    assert!(matches!(
        console.handle_line("skip 1").await,
        Err(ConsoleError::Playback(PlaybackError::NotPlaying))
    ));

    console.shutdown().await;
}

#[tokio::test]
async fn controls_round_trip() {
    let mut console = Console::new(&config());
    say(&mut console, "play 5 rainy").await;
    say(&mut console, "play 5 city").await;
    say(&mut console, "play 5 night").await;

    assert_eq!(say(&mut console, "pause 5").await, "Paused.");
    assert_eq!(say(&mut console, "resume 5").await, "Resumed.");
    assert_eq!(say(&mut console, "volume 5 150").await, "Volume set to 150%.");
    assert_eq!(say(&mut console, "move 5 2 1").await, "Moved #2 to #1.");
    assert_eq!(say(&mut console, "remove 5 2").await, "Removed #2: City Lights");
    assert_eq!(
        say(&mut console, "skip 5").await,
        "Skipped. Now playing: Night Drive [04:02]"
    );
    assert!(say(&mut console, "status").await.starts_with("5: Playing Night Drive (volume 150%)"));
    assert_eq!(say(&mut console, "clear 5").await, "Queue cleared.");
    assert_eq!(say(&mut console, "stop 5").await, "Nothing is playing.");

    console.shutdown().await;
}

#[tokio::test]
async fn ending_the_call_resets_the_chat() {
    let mut console = Console::new(&config());
    let chat = ChatId::new(9);
    say(&mut console, "play 9 morning").await;
    say(&mut console, "play 9 night").await;

    assert_eq!(say(&mut console, "end-call 9").await, "Voice call in 9 ended.");

    // The pump applies the event asynchronously
    for _ in 0..100 {
        if console.orchestrator().status(chat).await.state == SessionState::Idle {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(console.orchestrator().status(chat).await.state, SessionState::Idle);
    assert_eq!(say(&mut console, "queue 9").await, "Queue is empty.");
    assert_eq!(say(&mut console, "end-call 9").await, "No voice call in 9.");

    console.shutdown().await;
}

#[tokio::test]
async fn quit_and_blank_lines() {
    let mut console = Console::new(&config());
    assert_eq!(console.handle_line("   ").await.unwrap(), None);
    assert_eq!(console.handle_line("quit").await.unwrap(), Some(Reply::Quit));
    console.shutdown().await;
}
