use crate::detection::LandmarkSnapshot;

/// One processed frame: when it was seen and what was detected
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub elapsed_secs: f64,
    pub landmarks: LandmarkSnapshot,
}

/// Append-only, time-ordered log of a session's snapshots
///
/// In-memory only; dropped with the session.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, stored exactly as given
    ///
    /// Callers read time from a monotonic clock, so timestamps never go
    /// backwards.
    pub fn record(&mut self, elapsed_secs: f64, landmarks: LandmarkSnapshot) {
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |last| last.elapsed_secs <= elapsed_secs),
            "history timestamp {elapsed_secs:.3}s precedes the last entry"
        );

        self.entries.push(HistoryEntry {
            elapsed_secs,
            landmarks,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}
