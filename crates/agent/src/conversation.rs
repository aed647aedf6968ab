//! Conversation log
//!
//! Turns are only ever appended as a user turn immediately followed by the
//! assistant turn that answers it, so the log always alternates.

use parking_lot::RwLock;

use avatar_assistant_core::Turn;

/// Append-only, ordered turn log for one session
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: RwLock<Vec<Turn>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one exchange. Both turns land together or not at all.
    pub fn record_exchange(&self, user: Turn, assistant: Turn) -> usize {
        let mut turns = self.turns.write();
        turns.push(user);
        turns.push(assistant);
        turns.len()
    }

    /// Snapshot of all turns in append order
    pub fn turns(&self) -> Vec<Turn> {
        self.turns.read().clone()
    }

    pub fn len(&self) -> usize {
        self.turns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.read().is_empty()
    }

    /// Number of completed exchanges
    pub fn exchange_count(&self) -> usize {
        self.len() / 2
    }
}
