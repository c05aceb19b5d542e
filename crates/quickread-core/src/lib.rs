//! Sans-IO core of the quickread RSVP engine.
//!
//! Everything in this crate is deterministic: time enters as `now_ms`, bytes
//! enter through the codec traits in [`content`], and nothing here owns a
//! timer, a file or a logger.

pub mod content;
pub mod error;
pub mod input;
pub mod orp;
pub mod playback;
pub mod progress;
pub mod sections;
pub mod text_policy;

pub use content::{
    Codecs, Document, DocumentFormat, WordSequence, ZipCodecs, extract_text, load_document, tokenize,
};
pub use error::{ArchiveFault, CodecError, ExtractError};
pub use input::ReaderAction;
pub use orp::{FocusSplit, focus_index, split_at_focus};
pub use playback::{PlaybackClock, PlaybackPhase, PlaybackState, ReaderConfig, TickResult};
pub use progress::{MemoryProgressStore, ProgressRecord, ProgressStore};
pub use sections::{SectionMarker, current_section_for, detect_sections};
