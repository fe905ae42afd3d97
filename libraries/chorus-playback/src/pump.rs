//! Transport event delivery
//!
//! Each chat gets its own lane (a channel plus a worker task) so events for
//! one chat are handled in arrival order while a slow chat never delays
//! another.

use std::collections::HashMap;
use std::sync::Arc;

use chorus_core::{ChatId, TransportEvent};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::orchestrator::Orchestrator;

/// Routes `TransportEvent`s from the transport to the orchestrator
pub struct EventPump {
    orchestrator: Arc<Orchestrator>,
    events: mpsc::Receiver<TransportEvent>,
}

impl EventPump {
    /// Pump events from `events` into `orchestrator`
    pub fn new(orchestrator: Arc<Orchestrator>, events: mpsc::Receiver<TransportEvent>) -> Self {
        Self {
            orchestrator,
            events,
        }
    }

    /// Run the pump on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Deliver events until the sending side closes
    ///
    /// Returns once every event already received has been handled.
    pub async fn run(mut self) {
        let mut lanes: HashMap<ChatId, mpsc::UnboundedSender<TransportEvent>> = HashMap::new();
        let mut workers = JoinSet::new();

        while let Some(event) = self.events.recv().await {
            let chat_id = event.chat_id();
            let lane = lanes.entry(chat_id).or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                workers.spawn(drain_lane(Arc::clone(&self.orchestrator), chat_id, rx));
                tx
            });

            if let Err(mpsc::error::SendError(event)) = lane.send(event) {
                warn!(chat_id = %chat_id, ?event, "Event lane closed, dropping event");
            }
        }

        // Closing the lanes lets each worker finish its backlog and exit.
        drop(lanes);
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Event lane worker failed");
            }
        }
        debug!("Event pump stopped");
    }
}

async fn drain_lane(
    orchestrator: Arc<Orchestrator>,
    chat_id: ChatId,
    mut rx: mpsc::UnboundedReceiver<TransportEvent>,
) {
    debug!(chat_id = %chat_id, "Event lane opened");
    while let Some(event) = rx.recv().await {
        orchestrator.handle_transport_event(event).await;
    }
}
