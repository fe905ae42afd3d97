//! Command execution and the interactive loop

use crate::commands::{Command, HELP};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::resolver::CatalogResolver;
use crate::transport::SimulatedTransport;
use chorus_core::types::format_duration;
use chorus_core::{ChatId, SearchResult, Transport, UserId};
use chorus_playback::{
    EnqueueOutcome, EventPump, Orchestrator, PlaybackEvent, SkipOutcome, StopReason,
};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the transport → pump channel
const TRANSPORT_EVENT_BUFFER: usize = 64;

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Playback core wired to the simulated transport and catalog
pub struct Console {
    orchestrator: Arc<Orchestrator>,
    transport: Arc<SimulatedTransport>,
    user: UserId,
    last_search: Vec<SearchResult>,
    pump: JoinHandle<()>,
}

impl Console {
    /// Build the orchestrator, transport and event pump from `config`
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &ConsoleConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(TRANSPORT_EVENT_BUFFER);
        let transport = Arc::new(SimulatedTransport::new(
            events_tx,
            config.simulation.time_scale,
            &config.catalog,
            config.simulation.offline_chats.iter().copied().map(ChatId::new),
        ));
        let resolver = Arc::new(CatalogResolver::new(config.catalog.clone()));
        let orchestrator = Arc::new(Orchestrator::new(
            config.playback.clone(),
            Arc::clone(&transport) as Arc<dyn Transport>,
            resolver,
        ));
        let pump = EventPump::new(Arc::clone(&orchestrator), events_rx).spawn();

        Self {
            orchestrator,
            transport,
            user: UserId::new(config.simulation.user_id),
            last_search: Vec::new(),
            pump,
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Parse and execute one input line
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<Reply>> {
        match Command::parse_line(line)? {
            Some(command) => self.execute(command).await.map(Some),
            None => Ok(None),
        }
    }

    /// Execute one command, rendering the reply a chat would see
    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!(?command, "Executing command");
        let orchestrator = Arc::clone(&self.orchestrator);

        let text = match command {
            Command::Play { chat_id, query } => {
                let (track, outcome) = orchestrator.request(chat_id, &query, self.user).await?;
                render_enqueue(&track.title, &track.display_duration(), outcome)
            }
            Command::Search { query } => {
                self.last_search = orchestrator.search(&query).await;
                render_search(&query, &self.last_search)
            }
            Command::Pick { chat_id, index } => {
                if self.last_search.is_empty() {
                    return Err(ConsoleError::NoSearchResults);
                }
                let result = index
                    .checked_sub(1)
                    .and_then(|i| self.last_search.get(i))
                    .cloned()
                    .ok_or(ConsoleError::NoSuchResult(index))?;
                let (track, outcome) = orchestrator
                    .request_result(chat_id, result, self.user)
                    .await?;
                render_enqueue(&track.title, &track.display_duration(), outcome)
            }
            Command::Queue { chat_id } => render_queue(&orchestrator, chat_id).await,
            Command::Skip { chat_id } => match orchestrator.skip(chat_id).await? {
                SkipOutcome::Advanced(track) => {
                    format!("Skipped. Now playing: {} [{}]", track.title, track.display_duration())
                }
                SkipOutcome::QueueDrainedAndStopped => {
                    "Skipped. Queue is empty, left the voice chat.".to_string()
                }
            },
            Command::Pause { chat_id } => {
                orchestrator.pause(chat_id).await?;
                "Paused.".to_string()
            }
            Command::Resume { chat_id } => {
                orchestrator.resume(chat_id).await?;
                "Resumed.".to_string()
            }
            Command::Stop { chat_id } => {
                if orchestrator.stop(chat_id).await {
                    "Stopped and left the voice chat.".to_string()
                } else {
                    "Nothing is playing.".to_string()
                }
            }
            Command::Clear { chat_id } => {
                if orchestrator.clear_queue(chat_id).await {
                    "Queue cleared.".to_string()
                } else {
                    "Queue is already empty.".to_string()
                }
            }
            Command::Volume { chat_id, level } => {
                let volume = orchestrator.set_volume(chat_id, level).await?;
                format!("Volume set to {}%.", volume.level())
            }
            Command::Remove { chat_id, position } => {
                let track = orchestrator.remove_from_queue(chat_id, position).await?;
                format!("Removed #{}: {}", position, track.title)
            }
            Command::Move { chat_id, from, to } => {
                orchestrator.move_in_queue(chat_id, from, to).await?;
                format!("Moved #{} to #{}.", from, to)
            }
            Command::Status => render_status(&orchestrator, &self.transport).await,
            Command::EndCall { chat_id } => {
                if self.transport.end_call(chat_id).await? {
                    format!("Voice call in {} ended.", chat_id)
                } else {
                    format!("No voice call in {}.", chat_id)
                }
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Text(text))
    }

    /// Drop the transport side and wait for queued events to drain
    pub async fn shutdown(self) {
        let Self {
            orchestrator,
            transport,
            pump,
            ..
        } = self;

        for chat_id in orchestrator.active_chats().await {
            orchestrator.stop(chat_id).await;
        }
        // The pump ends once the transport drops its event sender.
        transport.close();
        if let Err(e) = pump.await {
            warn!(error = %e, "Event pump task failed");
        }
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(config: ConsoleConfig) -> Result<()> {
    let mut console = Console::new(&config);
    let announcer = spawn_announcer(console.orchestrator().subscribe());

    info!(
        catalog = config.catalog.len(),
        time_scale = config.simulation.time_scale,
        "Console ready"
    );
    println!("Chorus console. Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console.handle_line(&line).await {
            Ok(Some(Reply::Text(text))) => println!("{}", text),
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    }

    console.shutdown().await;
    announcer.abort();
    Ok(())
}

/// Print notifications for changes nobody typed a command for
fn spawn_announcer(mut events: broadcast::Receiver<PlaybackEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(text) = announcement(&event) {
                        println!("[{}] {}", event.chat_id(), text);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Announcer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Chat message for an event, if it deserves one
pub fn announcement(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::TrackChanged { track, .. } => Some(format!(
            "Now playing: {} [{}]",
            track.title,
            track.display_duration()
        )),
        PlaybackEvent::Stopped {
            reason: StopReason::QueueDrained,
            ..
        } => Some("Queue finished, left the voice chat.".to_string()),
        PlaybackEvent::Stopped {
            reason: StopReason::CallEnded,
            ..
        } => Some("Voice call ended, queue cleared.".to_string()),
        PlaybackEvent::Error { message, .. } => Some(format!("Playback stopped: {}", message)),
        _ => None,
    }
}

fn render_enqueue(title: &str, duration: &str, outcome: EnqueueOutcome) -> String {
    match outcome {
        EnqueueOutcome::StartedPlaying => format!("Playing: {} [{}]", title, duration),
        EnqueueOutcome::Enqueued { position } => {
            format!("Queued at #{}: {} [{}]", position, title, duration)
        }
    }
}

fn render_search(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results for \"{}\".", query);
    }

    let mut out = format!("Results for \"{}\":", query);
    for (i, result) in results.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}. {} [{}]",
            i + 1,
            result.title,
            format_duration(result.duration)
        );
    }
    out
}

async fn render_queue(orchestrator: &Orchestrator, chat_id: ChatId) -> String {
    let snapshot = orchestrator.queue_snapshot(chat_id).await;
    if snapshot.tracks.is_empty() {
        return "Queue is empty.".to_string();
    }

    let mut out = String::new();
    for (i, track) in snapshot.tracks.iter().enumerate() {
        let marker = if i == 0 { "▶" } else { " " };
        let _ = writeln!(
            out,
            "{} {}. {} [{}]",
            marker,
            i,
            track.title,
            track.display_duration()
        );
    }
    let _ = write!(
        out,
        "{} tracks, {} total, {} slots free",
        snapshot.stats.size,
        format_duration(snapshot.stats.total_duration),
        snapshot.stats.remaining
    );
    out
}

async fn render_status(orchestrator: &Orchestrator, transport: &SimulatedTransport) -> String {
    let active = orchestrator.active_chats().await;
    if active.is_empty() {
        return "No active chats.".to_string();
    }

    let mut out = String::new();
    for chat_id in active {
        let status = orchestrator.status(chat_id).await;
        let title = status
            .current
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "{}: {:?} {} (volume {}%)",
            chat_id,
            status.state,
            title,
            status.volume.level()
        );
    }
    let _ = write!(out, "{} call(s) open", transport.calls().len());
    out
}
