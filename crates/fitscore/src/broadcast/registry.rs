use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::message::Envelope;

static CONNECTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(CONNECTION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Sending half of an observer connection. The receiving half is drained by whatever
/// transport owns the connection.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl Subscriber {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::next(),
                sender,
            },
            receiver,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn deliver(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }
}

/// Channel name to live subscribers.
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
    channels: DashMap<String, HashMap<ConnectionId, Subscriber>>,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: subscribing the same connection twice keeps a single entry.
    pub fn subscribe(&self, channel: &str, subscriber: &Subscriber) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(subscriber.id, subscriber.clone());
        debug!(channel, connection = %subscriber.id, "subscribed");
    }

    /// Drop the connection from every channel it joined.
    pub fn unsubscribe(&self, connection: ConnectionId) {
        self.channels.retain(|_, subscribers| {
            subscribers.remove(&connection);
            !subscribers.is_empty()
        });
        debug!(connection = %connection, "unsubscribed from all channels");
    }

    /// Serialize `{channel, data}` once and hand it to every live subscriber of `channel`.
    /// Returns how many subscribers received the frame; zero when nobody listens.
    pub fn publish<T>(&self, channel: &str, payload: &T) -> usize
    where
        T: Serialize + ?Sized,
    {
        let frame = match serde_json::to_string(&Envelope {
            channel,
            data: payload,
        }) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(channel, error = %err, "dropping unserializable broadcast payload");
                return 0;
            }
        };

        let delivered = {
            let Some(mut subscribers) = self.channels.get_mut(channel) else {
                return 0;
            };
            let before = subscribers.len();
            subscribers.retain(|_, subscriber| subscriber.deliver(&frame));
            let delivered = subscribers.len();
            if delivered < before {
                debug!(channel, pruned = before - delivered, "pruned closed subscribers");
            }
            delivered
        };

        if delivered == 0 {
            self.channels
                .remove_if(channel, |_, subscribers| subscribers.is_empty());
        }
        delivered
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
