//! Keyed in-memory store of live dialogue states.
//!
//! # Invariants
//! - One entry per conversation; writes for one conversation never touch
//!   another conversation's entry.
//! - Entries are never persisted.

use crate::dialogue::state::{ConversationId, DialogueState};
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    state: DialogueState,
    touched_at: Instant,
}

/// Concurrent `conversation -> state` map owned by the dialogue engine.
#[derive(Debug, Default)]
pub struct DialogueStore {
    entries: DashMap<ConversationId, Entry>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the conversation's live state.
    pub fn get(&self, conversation: ConversationId) -> Option<DialogueState> {
        self.entries
            .get(&conversation)
            .map(|entry| entry.state.clone())
    }

    /// Stores `state`, returning whatever state it replaced.
    pub fn set(&self, conversation: ConversationId, state: DialogueState) -> Option<DialogueState> {
        self.entries
            .insert(
                conversation,
                Entry {
                    state,
                    touched_at: Instant::now(),
                },
            )
            .map(|previous| previous.state)
    }

    /// Drops the conversation's state.
    pub fn clear(&self, conversation: ConversationId) -> Option<DialogueState> {
        self.entries
            .remove(&conversation)
            .map(|(_, entry)| entry.state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops states untouched for longer than `max_idle`; returns the count.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        self.expire_idle_at(Instant::now(), max_idle)
    }

    fn expire_idle_at(&self, now: Instant, max_idle: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.touched_at) <= max_idle);
        let expired = before.saturating_sub(self.entries.len());
        if expired > 0 {
            log::info!("event=dialogue_expire module=dialogue status=ok expired={expired}");
        }
        expired
    }
}
