//! Error taxonomy for document extraction.

use thiserror::Error;

/// Structural problems found while walking an EPUB-like archive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveFault {
    MissingContainer,
    MissingPackagePath,
    MissingPackage,
    NoReadableContent,
}

impl ArchiveFault {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingContainer => "missing container",
            Self::MissingPackagePath => "container has no package path",
            Self::MissingPackage => "missing package document",
            Self::NoReadableContent => "no readable content",
        }
    }
}

/// Failure reported by an external codec collaborator (PDF renderer, ZIP reader).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{message}")]
pub struct CodecError {
    pub message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Single reportable error surfaced when a document cannot be turned into words.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExtractError {
    #[error("could not read {0}: no data. Please try a different file.")]
    UnsupportedOrMissingSource(String),

    #[error("failed to parse PDF ({0}). Please try a different file.")]
    PaginatedDocumentParse(CodecError),

    #[error("failed to parse EPUB: {}. Please try a different file.", .0.as_str())]
    ArchiveStructure(ArchiveFault),

    #[error("failed to read EPUB archive ({0}). Please try a different file.")]
    ArchiveRead(CodecError),

    #[error("document contains no readable words")]
    EmptyDocument,
}
