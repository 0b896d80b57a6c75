//! One-shot milestone events surfaced to the host.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::{FIRST_MILESTONE_KEY, FIRST_MILESTONE_MESSAGE, FIRST_MILESTONE_QUEST};

/// Event raised the first time a milestone key fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEvent {
    pub key: String,
    pub message: String,
    pub quest_id: String,
}

/// Seen-set of fired milestones. Persist it alongside the save so events
/// do not repeat across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTracker {
    seen: BTreeSet<String>,
}

impl MilestoneTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Fire `key` with the given content. Returns `None` once it has fired.
    pub fn trigger(&mut self, key: &str, message: &str, quest_id: &str) -> Option<MilestoneEvent> {
        if !self.seen.insert(key.to_string()) {
            return None;
        }
        log::debug!("milestone '{key}' reached");
        Some(MilestoneEvent {
            key: key.to_string(),
            message: message.to_string(),
            quest_id: quest_id.to_string(),
        })
    }

    /// The Phoenix arrival that opens the first quest.
    pub fn trigger_first_flame(&mut self) -> Option<MilestoneEvent> {
        self.trigger(FIRST_MILESTONE_KEY, FIRST_MILESTONE_MESSAGE, FIRST_MILESTONE_QUEST)
    }
}
