use tokio::sync::broadcast;
use tracing::debug;
use wayfarer_shared::models::events::{TripEvent, TripEventKind};
use wayfarer_trip::Trip;

/// In-process fan-out of trip events to SSE subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TripEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns how many subscribers received the event. Zero is not an error.
    pub fn publish(&self, event: TripEvent) -> usize {
        let trip_id = event.trip_id;
        let kind = event.kind.as_str();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(trip_id, kind, receivers, "Published trip event");
                receivers
            }
            Err(_) => {
                debug!(trip_id, kind, "Dropped trip event, nobody is listening");
                0
            }
        }
    }

    pub fn trip_changed(&self, trip: &Trip, kind: TripEventKind) -> usize {
        self.publish(TripEvent::new(
            trip.id,
            kind,
            trip.status.as_str(),
            trip.total_price_cents,
        ))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TripEvent> {
        self.sender.subscribe()
    }
}
