//! Document sources and the word pipeline.
//!
//! Everything that turns `{ filename, bytes }` into a [`WordSequence`] lives
//! here. Codecs the engine does not own (a PDF renderer, a ZIP reader) are
//! reached through [`Codecs`], [`PageSource`] and [`ArchiveSource`].

mod archive;
pub mod epub;
mod html_entities;
mod markup;
mod parsing_utils;
pub mod pdf;
mod text_utils;

use core::ops::Deref;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};

pub use epub::{EntryLookup, ManifestItem, PackageDocument, ReadingOrder};
pub use markup::html_to_text;
pub use archive::ZipContainer;
pub use text_utils::{decode_text, tokenize};

use crate::error::{CodecError, ExtractError};
use parsing_utils::ends_with_ascii_case_insensitive;

pub const PASTED_TEXT_PREFIX: &str = "Pasted text - ";

/// Source format, chosen from the filename suffix alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Epub,
    PlainText,
    Unknown,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.trim().as_bytes();
        if ends_with_ascii_case_insensitive(name, b".pdf") {
            Self::Pdf
        } else if ends_with_ascii_case_insensitive(name, b".epub") {
            Self::Epub
        } else if ends_with_ascii_case_insensitive(name, b".txt") {
            Self::PlainText
        } else {
            Self::Unknown
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// A paginated document opened by an external renderer.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text fragments of page `index` (zero-based) joined by single spaces.
    async fn page_text(&mut self, index: usize) -> Result<String, CodecError>;
}

/// A ZIP-like archive addressed by entry path.
#[allow(async_fn_in_trait)]
pub trait ArchiveSource {
    /// Entry decoded as text, or `None` when the path does not exist.
    async fn read_entry(&mut self, path: &str) -> Result<Option<String>, CodecError>;
}

/// Opens the binary formats the engine delegates.
#[allow(async_fn_in_trait)]
pub trait Codecs {
    type Pages: PageSource;
    type Archive: ArchiveSource;

    async fn open_pages(&mut self, bytes: Vec<u8>) -> Result<Self::Pages, CodecError>;
    async fn open_archive(&mut self, bytes: Vec<u8>) -> Result<Self::Archive, CodecError>;
}

/// Page source for a build without a PDF renderer. Cannot be constructed.
#[derive(Debug)]
pub enum NoPages {}

impl PageSource for NoPages {
    fn page_count(&self) -> usize {
        match *self {}
    }

    async fn page_text(&mut self, _index: usize) -> Result<String, CodecError> {
        match *self {}
    }
}

/// Codecs for builds without a PDF renderer: EPUB and plain text only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipCodecs;

impl Codecs for ZipCodecs {
    type Pages = NoPages;
    type Archive = ZipContainer;

    async fn open_pages(&mut self, _bytes: Vec<u8>) -> Result<Self::Pages, CodecError> {
        Err(CodecError::new("no PDF renderer configured"))
    }

    async fn open_archive(&mut self, bytes: Vec<u8>) -> Result<Self::Archive, CodecError> {
        ZipContainer::new(bytes)
    }
}

/// Immutable, shareable word sequence. Clones share one allocation.
#[derive(Clone, Debug, Default)]
pub struct WordSequence(Arc<[String]>);

impl WordSequence {
    pub fn from_text(text: &str) -> Self {
        Self(tokenize(text).into())
    }

    /// Whether both handles point at the same loaded sequence.
    pub fn same_identity(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for WordSequence {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for WordSequence {
    fn from(words: Vec<String>) -> Self {
        Self(words.into())
    }
}

impl PartialEq for WordSequence {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other) || self.0[..] == other.0[..]
    }
}

impl Eq for WordSequence {}

/// A loaded document: display identity plus its words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    pub id: String,
    pub words: WordSequence,
}

impl Document {
    pub fn from_text(id: impl Into<String>, text: &str) -> Result<Self, ExtractError> {
        let words = WordSequence::from_text(text);
        if words.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        Ok(Self {
            id: id.into(),
            words,
        })
    }

    /// Document for pasted text, identified by the day it was pasted.
    pub fn pasted(text: &str, today: NaiveDate) -> Result<Self, ExtractError> {
        Self::from_text(pasted_text_id(today), text)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// `"Pasted text - M/D/YYYY"`.
pub fn pasted_text_id(today: NaiveDate) -> String {
    format!("{PASTED_TEXT_PREFIX}{}", today.format("%-m/%-d/%Y"))
}

/// Extract the raw reading text of one file, dispatching on its suffix.
pub async fn extract_text<C: Codecs>(
    codecs: &mut C,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_filename(filename);
    debug!(
        "extract: file={} format={} bytes={}",
        filename,
        format.label(),
        bytes.len()
    );
    if bytes.is_empty() {
        return Err(ExtractError::UnsupportedOrMissingSource(filename.to_owned()));
    }

    match format {
        DocumentFormat::Pdf => {
            let mut pages = codecs
                .open_pages(bytes)
                .await
                .map_err(ExtractError::PaginatedDocumentParse)?;
            pdf::extract_pdf_text(&mut pages).await
        }
        DocumentFormat::Epub => {
            let mut archive = codecs
                .open_archive(bytes)
                .await
                .map_err(ExtractError::ArchiveRead)?;
            epub::extract_epub_text(&mut archive).await
        }
        DocumentFormat::PlainText | DocumentFormat::Unknown => Ok(decode_text(&bytes)),
    }
}

/// Extract and tokenize one file into a [`Document`] named after it.
pub async fn load_document<C: Codecs>(
    codecs: &mut C,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<Document, ExtractError> {
    let text = extract_text(codecs, filename, bytes).await?;
    let document = Document::from_text(filename, &text)?;
    info!("extract: file={} words={}", filename, document.len());
    Ok(document)
}
