use log::{debug, warn};
use quickread_core::{ProgressRecord, ProgressStore};

/// Periodic progress saving, independent of the playback schedule.
pub(super) struct AutosaveState {
    interval_ms: u64,
    next_due_ms: u64,
    /// `(document_id, current_index)` of the last successful save.
    last_saved: Option<(String, usize)>,
}

impl AutosaveState {
    pub(super) fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            next_due_ms: now_ms.saturating_add(interval_ms),
            last_saved: None,
        }
    }

    pub(super) fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    pub(super) fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    /// Start a fresh period, e.g. after a document switch.
    pub(super) fn restart(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms.saturating_add(self.interval_ms);
    }

    /// Record the loaded position so an untouched document is not rewritten.
    pub(super) fn mark_saved(&mut self, record: &ProgressRecord) {
        self.last_saved = Some((record.document_id.clone(), record.current_index));
    }

    /// Save `record` unless it matches the last save. Failures are retried on
    /// the next period.
    pub(super) fn flush<S>(&mut self, store: &mut S, record: &ProgressRecord, now_ms: u64) -> bool
    where
        S: ProgressStore,
        S::Error: core::fmt::Display,
    {
        self.restart(now_ms);

        let unchanged = self
            .last_saved
            .as_ref()
            .is_some_and(|(id, index)| *id == record.document_id && *index == record.current_index);
        if unchanged {
            return false;
        }

        match store.save(record) {
            Ok(()) => {
                debug!(
                    "progress: saved doc={} index={} percent={}",
                    record.document_id, record.current_index, record.percent
                );
                self.mark_saved(record);
                true
            }
            Err(err) => {
                warn!(
                    "progress: save failed doc={} err={}",
                    record.document_id, err
                );
                false
            }
        }
    }
}
