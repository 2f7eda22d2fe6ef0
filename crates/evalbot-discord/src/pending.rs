//! Routing of edit and reaction events to the eval session waiting on them.

use std::sync::Arc;

use dashmap::DashMap;
use serenity::model::id::MessageId;
use tokio::sync::mpsc;
use tracing::debug;

use evalbot_sandbox::ReevalEvent;

/// Eval sessions that may still react to their triggering message, keyed by
/// that message's id. Shared across gateway reconnects.
#[derive(Debug, Clone, Default)]
pub struct PendingReevals {
    senders: Arc<DashMap<MessageId, mpsc::Sender<ReevalEvent>>>,
}

impl PendingReevals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route events for `message_id` to `tx` until the returned handle drops.
    pub fn register(&self, message_id: MessageId, tx: mpsc::Sender<ReevalEvent>) -> Registration {
        self.senders.insert(message_id, tx);
        Registration {
            senders: Arc::clone(&self.senders),
            message_id,
        }
    }

    /// Hand `event` to the session watching `message_id`, if any.
    ///
    /// Never blocks the gateway: a full or closed channel drops the event.
    pub fn forward(&self, message_id: MessageId, event: ReevalEvent) -> bool {
        let Some(tx) = self.senders.get(&message_id) else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(message = %message_id, error = %e, "dropped re-eval event");
                false
            }
        }
    }

    pub fn is_watching(&self, message_id: MessageId) -> bool {
        self.senders.contains_key(&message_id)
    }
}

/// Keeps a message registered; dropping it stops the routing.
#[derive(Debug)]
pub struct Registration {
    senders: Arc<DashMap<MessageId, mpsc::Sender<ReevalEvent>>>,
    message_id: MessageId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.senders.remove(&self.message_id);
    }
}
