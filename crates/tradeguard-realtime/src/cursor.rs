//! Per-connection activity high-water mark.

use chrono::{DateTime, Utc};

use tradeguard_entity::dashboard::ActivityEntry;

/// Timestamp of the newest activity entry already sent on a connection.
///
/// Only entries strictly newer than the mark are pushed on later ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCursor {
    last_sent: Option<DateTime<Utc>>,
}

impl ActivityCursor {
    /// Cursor that has sent nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor resuming after a timestamp the device already holds.
    pub fn resume_after(at: DateTime<Utc>) -> Self {
        Self { last_sent: Some(at) }
    }

    /// The mark, if anything has been sent.
    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }

    /// Moves the mark to the newest of `entries`. Never moves it backwards.
    pub fn advance(&mut self, entries: &[ActivityEntry]) {
        if let Some(newest) = entries.iter().map(|e| e.occurred_at).max() {
            self.last_sent = Some(match self.last_sent {
                Some(current) => current.max(newest),
                None => newest,
            });
        }
    }

    /// Drops entries at or before the mark.
    pub fn unseen(&self, entries: Vec<ActivityEntry>) -> Vec<ActivityEntry> {
        match self.last_sent {
            Some(mark) => entries.into_iter().filter(|e| e.occurred_at > mark).collect(),
            None => entries,
        }
    }
}
