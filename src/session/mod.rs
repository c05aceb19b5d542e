//! One open document: loading, navigation, resume and progress saving.
//!
//! Loads are stamped with a generation number when they start. A result is
//! only committed if no newer load started in the meantime, so the last load
//! wins no matter which extraction finishes first.

mod autosave;

use core::sync::atomic::{AtomicU64, Ordering};
use std::{fmt::Display, sync::Arc};

use chrono::{Local, Utc};
use log::{debug, info, warn};
use quickread_core::{
    Codecs, Document, ExtractError, FocusSplit, ProgressRecord, ProgressStore, ReaderAction,
    SectionMarker, current_section_for, detect_sections, load_document, split_at_focus,
    text_policy::{PREVIEW_WORDS, preview_snippet},
};

use self::autosave::AutosaveState;
use crate::{config::ReaderSettings, driver::PlaybackDriver, error::SessionError};

/// Handle for an in-flight load, returned by [`ReaderSession::begin_load`].
#[derive(Debug)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
    name: String,
}

impl LoadTicket {
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct ReaderSession<S> {
    driver: Arc<PlaybackDriver>,
    store: S,
    document: Option<Document>,
    sections: Vec<SectionMarker>,
    generation: AtomicU64,
    autosave: AutosaveState,
}

impl<S> ReaderSession<S>
where
    S: ProgressStore,
    S::Error: Display,
{
    pub fn new(driver: Arc<PlaybackDriver>, store: S, settings: &ReaderSettings) -> Self {
        let now_ms = driver.now_ms();
        Self {
            autosave: AutosaveState::new(settings.autosave_interval_ms(), now_ms),
            driver,
            store,
            document: None,
            sections: Vec::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn driver(&self) -> &Arc<PlaybackDriver> {
        &self.driver
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Start a load. Any load started earlier becomes stale.
    pub fn begin_load(&self, name: &str) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("session: begin load name={} generation={}", name, generation);
        LoadTicket {
            generation,
            name: name.to_owned(),
        }
    }

    /// Install the result of a load if it is still the newest one.
    pub fn commit(
        &mut self,
        ticket: LoadTicket,
        result: Result<Document, ExtractError>,
    ) -> Result<&Document, SessionError> {
        let current = self.generation.load(Ordering::SeqCst);
        if ticket.generation != current {
            info!(
                "session: drop stale load name={} generation={} current={}",
                ticket.name, ticket.generation, current
            );
            return Err(SessionError::Superseded(ticket.name));
        }

        let document = match result {
            Ok(document) => document,
            Err(err) => {
                warn!("session: load failed name={} err={}", ticket.name, err);
                return Err(err.into());
            }
        };

        self.save_now();
        Ok(self.install(document))
    }

    /// Extract, tokenize and install a file.
    pub async fn open_file<C: Codecs>(
        &mut self,
        codecs: &mut C,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<&Document, SessionError> {
        let ticket = self.begin_load(filename);
        let result = load_document(codecs, filename, bytes).await;
        self.commit(ticket, result)
    }

    /// Install pasted text under a name derived from today's date.
    pub fn open_pasted(&mut self, text: &str) -> Result<&Document, SessionError> {
        let today = Local::now().date_naive();
        let result = Document::pasted(text, today);
        let ticket = self.begin_load(
            result
                .as_ref()
                .map(|doc| doc.id.as_str())
                .unwrap_or("pasted text"),
        );
        self.commit(ticket, result)
    }

    fn install(&mut self, document: Document) -> &Document {
        let total_words = document.len();
        self.sections = detect_sections(&document.words);
        self.driver.load(total_words);

        match self.store.load(&document.id) {
            Ok(Some(record)) if record.current_index > 0 => {
                self.driver.go_to_word_index(record.current_index);
                self.autosave.mark_saved(&record);
                info!(
                    "session: resume doc={} index={} percent={}",
                    document.id, record.current_index, record.percent
                );
            }
            Ok(_) => {}
            Err(err) => warn!("session: progress lookup failed doc={} err={}", document.id, err),
        }

        info!(
            "session: open doc={} words={} sections={}",
            document.id,
            total_words,
            self.sections.len()
        );
        self.autosave.restart(self.driver.now_ms());
        self.document.insert(document)
    }

    pub fn apply(&self, action: ReaderAction) -> bool {
        self.driver.apply(action)
    }

    pub fn go_to_word_index(&self, index: usize) {
        self.driver.go_to_word_index(index);
    }

    pub fn go_to_percent(&self, percent: f32) {
        self.driver.apply(ReaderAction::Seek(percent));
    }

    pub fn current_index(&self) -> usize {
        self.driver.state().current_index
    }

    /// The word under the cursor, split around its focus letter.
    pub fn current_word(&self) -> Option<FocusSplit<'_>> {
        let document = self.document.as_ref()?;
        document
            .words
            .get(self.current_index())
            .map(|word| split_at_focus(word))
    }

    pub fn sections(&self) -> &[SectionMarker] {
        &self.sections
    }

    pub fn current_section(&self) -> Option<&SectionMarker> {
        self.current_section_for(self.current_index())
    }

    pub fn current_section_for(&self, word_index: usize) -> Option<&SectionMarker> {
        current_section_for(&self.sections, word_index)
    }

    /// Opening words of section `section_index`.
    pub fn section_preview(&self, section_index: usize) -> Option<String> {
        let document = self.document.as_ref()?;
        let marker = self.sections.get(section_index)?;
        Some(preview_snippet(&document.words, marker.word_index, PREVIEW_WORDS))
    }

    pub fn time_remaining_label(&self) -> String {
        self.driver.inspect(|clock| clock.time_remaining_label())
    }

    /// Previously read documents, most recent first.
    pub fn history(&mut self) -> Result<Vec<ProgressRecord>, S::Error> {
        self.store.list_all()
    }

    pub fn forget(&mut self, document_id: &str) -> Result<bool, S::Error> {
        self.store.delete(document_id)
    }

    pub fn next_autosave_ms(&self) -> u64 {
        self.autosave.next_due_ms()
    }

    /// Save progress if the autosave period has elapsed. Returns whether a record was written.
    pub fn poll_autosave(&mut self, now_ms: u64) -> bool {
        if !self.autosave.is_due(now_ms) {
            return false;
        }
        match self.progress_record() {
            Some(record) => self.autosave.flush(&mut self.store, &record, now_ms),
            None => {
                self.autosave.restart(now_ms);
                false
            }
        }
    }

    /// Save progress immediately, unless nothing changed since the last save.
    pub fn save_now(&mut self) -> bool {
        let now_ms = self.driver.now_ms();
        self.progress_record()
            .is_some_and(|record| self.autosave.flush(&mut self.store, &record, now_ms))
    }

    /// End the session with one final save and hand the store back.
    pub fn close(mut self) -> S {
        self.driver.apply(ReaderAction::Pause);
        self.save_now();
        self.store
    }

    fn progress_record(&self) -> Option<ProgressRecord> {
        let document = self.document.as_ref()?;
        let state = self.driver.state();
        ProgressRecord::new(
            document.id.clone(),
            state.current_index,
            state.total_words,
            Utc::now(),
        )
    }
}

#[cfg(test)]
mod tests;
