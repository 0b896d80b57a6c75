//! Host-side write debouncing for saves.

use crate::constants::{AUTOSAVE_MAX_WAIT_MS, AUTOSAVE_QUIET_MS};

/// Trailing debounce with a ceiling.
///
/// A save is due once the state has been quiet for `quiet_ms`, or once
/// `max_wait_ms` has passed since the first unsaved change, whichever comes
/// first. The ceiling keeps per-frame ticks from postponing saves forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveDebouncer {
    quiet_ms: i64,
    max_wait_ms: i64,
    first_dirty_ms: Option<i64>,
    last_dirty_ms: Option<i64>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(AUTOSAVE_QUIET_MS, AUTOSAVE_MAX_WAIT_MS)
    }
}

impl SaveDebouncer {
    #[must_use]
    pub const fn new(quiet_ms: i64, max_wait_ms: i64) -> Self {
        Self {
            quiet_ms,
            max_wait_ms,
            first_dirty_ms: None,
            last_dirty_ms: None,
        }
    }

    /// Record a state change at `now_ms`.
    pub fn mark_dirty(&mut self, now_ms: i64) {
        self.first_dirty_ms.get_or_insert(now_ms);
        self.last_dirty_ms = Some(now_ms);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.first_dirty_ms.is_some()
    }

    #[must_use]
    pub fn is_due(&self, now_ms: i64) -> bool {
        match (self.first_dirty_ms, self.last_dirty_ms) {
            (Some(first), Some(last)) => {
                now_ms.saturating_sub(last) >= self.quiet_ms
                    || now_ms.saturating_sub(first) >= self.max_wait_ms
            }
            _ => false,
        }
    }

    /// Returns `true` and clears the pending change when a save is due.
    pub fn take_due(&mut self, now_ms: i64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.first_dirty_ms = None;
        self.last_dirty_ms = None;
        true
    }
}
