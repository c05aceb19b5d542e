//! Host runtime for the quickread RSVP engine.
//!
//! [`quickread_core`] is sans-IO. This crate adds the pieces that need a clock
//! and a filesystem: the timer-driven [`PlaybackDriver`], the document
//! [`ReaderSession`], the PDF and EPUB decoders in [`HostCodecs`], the JSON
//! progress file and `settings.toml`.

pub mod codecs;
pub mod config;
pub mod driver;
pub mod error;
pub mod progress_file;
pub mod session;

pub use codecs::{HostCodecs, PdfPages};
pub use config::{AppPaths, ReaderSettings};
pub use driver::PlaybackDriver;
pub use error::{ConfigError, SessionError, StoreError};
pub use progress_file::JsonProgressStore;
pub use quickread_core;
pub use session::{LoadTicket, ReaderSession};
