//! Re-run on edit.
//!
//! After a reply is posted the author may edit the original message; the bot
//! then offers a 🔁 reaction, and clicking it re-runs the edited code. The flow
//! is an explicit state machine:
//!
//! ```text
//! AwaitingEdit ──edit──▶ AwaitingReaction ──🔁 by author──▶ Restart
//!      │                        │
//!   timeout                  timeout
//!      ▼                        ▼
//!  Terminated               Terminated
//! ```
//!
//! Transport events arrive on an mpsc channel, so the machine knows nothing
//! about Discord. Both waits have a single deadline; unrelated events are
//! skipped without extending it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use evalbot_core::UserId;

/// The reaction the author clicks to confirm a re-run (`:repeat:`).
pub const REEVAL_EMOJI: &str = "\u{1f501}";

/// Something that happened to the message that triggered an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReevalEvent {
    Edited { content: String },
    Reacted { user_id: UserId, emoji: String },
}

/// Why a re-evaluation chain ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    EditTimeout,
    ReactionTimeout,
    /// The event source went away.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReevalState {
    AwaitingEdit,
    AwaitingReaction { content: String },
    Restart { content: String },
    Terminated(Termination),
}

/// One round of the re-run flow for a single triggering message.
#[derive(Debug)]
pub struct ReevalSession {
    author: UserId,
    last_content: String,
    edit_timeout: Duration,
    reaction_timeout: Duration,
    state: ReevalState,
}

impl ReevalSession {
    pub fn new(
        author: UserId,
        original_content: impl Into<String>,
        edit_timeout: Duration,
        reaction_timeout: Duration,
    ) -> Self {
        Self {
            author,
            last_content: original_content.into(),
            edit_timeout,
            reaction_timeout,
            state: ReevalState::AwaitingEdit,
        }
    }

    #[cfg(test)]
    fn state(&self) -> &ReevalState {
        &self.state
    }

    /// True once the session reached `Restart` or `Terminated`.
    #[cfg(test)]
    fn is_finished(&self) -> bool {
        matches!(
            self.state,
            ReevalState::Restart { .. } | ReevalState::Terminated(_)
        )
    }

    /// Perform one transition, waiting on `events` as needed.
    ///
    /// Finished states are sticky: advancing them is a no-op.
    pub async fn advance(&mut self, events: &mut mpsc::Receiver<ReevalEvent>) -> &ReevalState {
        let next = match &self.state {
            ReevalState::AwaitingEdit => self.await_edit(events).await,
            ReevalState::AwaitingReaction { content } => {
                let content = content.clone();
                self.await_reaction(events, content).await
            }
            ReevalState::Restart { .. } | ReevalState::Terminated(_) => return &self.state,
        };
        debug!(author = %self.author, from = ?self.state, to = ?next, "re-eval transition");
        self.state = next;
        &self.state
    }

    async fn await_edit(&mut self, events: &mut mpsc::Receiver<ReevalEvent>) -> ReevalState {
        let deadline = Instant::now() + self.edit_timeout;
        loop {
            match timeout_at(deadline, events.recv()).await {
                Err(_) => return ReevalState::Terminated(Termination::EditTimeout),
                Ok(None) => return ReevalState::Terminated(Termination::Closed),
                Ok(Some(ReevalEvent::Edited { content })) if content != self.last_content => {
                    self.last_content = content.clone();
                    return ReevalState::AwaitingReaction { content };
                }
                Ok(Some(_)) => continue,
            }
        }
    }

    async fn await_reaction(
        &mut self,
        events: &mut mpsc::Receiver<ReevalEvent>,
        mut content: String,
    ) -> ReevalState {
        let deadline = Instant::now() + self.reaction_timeout;
        loop {
            match timeout_at(deadline, events.recv()).await {
                Err(_) => return ReevalState::Terminated(Termination::ReactionTimeout),
                Ok(None) => return ReevalState::Terminated(Termination::Closed),
                Ok(Some(ReevalEvent::Reacted { user_id, emoji }))
                    if user_id == self.author && emoji == REEVAL_EMOJI =>
                {
                    return ReevalState::Restart { content };
                }
                // A later edit replaces what will be re-run.
                Ok(Some(ReevalEvent::Edited { content: newer })) => {
                    self.last_content = newer.clone();
                    content = newer;
                }
                Ok(Some(_)) => continue,
            }
        }
    }
}
