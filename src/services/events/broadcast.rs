use std::pin::Pin;

use async_stream::stream;
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::{EventNotifier, PlaybackEvent};

/// Event notifier over a tokio broadcast channel
///
/// Slow subscribers lose the oldest events rather than holding up playback.
#[derive(Clone)]
pub struct BroadcastNotifier {
    events_tx: broadcast::Sender<PlaybackEvent>,
}

impl BroadcastNotifier {
    /// Creates a notifier buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        Self { events_tx }
    }

    /// Raw receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events_tx.subscribe()
    }

    /// Stream of events published from now on, skipping over lag.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = PlaybackEvent> + Send>> {
        let mut events_rx = self.events_tx.subscribe();

        Box::pin(stream! {
            loop {
                match events_rx.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventNotifier for BroadcastNotifier {
    fn notify(&self, event: PlaybackEvent) {
        debug!(event = event.name(), "Publishing playback event");
        // No subscribers is not an error for fire-and-forget delivery.
        let _ = self.events_tx.send(event);
    }
}
