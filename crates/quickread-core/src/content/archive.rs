//! In-memory ZIP container, the default archive collaborator for EPUB files.

use std::io::{Cursor, Read};

use log::debug;
use zip::{ZipArchive, result::ZipError};

use super::{ArchiveSource, text_utils::decode_text};
use crate::error::CodecError;

/// A ZIP archive held fully in memory and addressed by entry path.
pub struct ZipContainer {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl ZipContainer {
    pub fn new(bytes: Vec<u8>) -> Result<Self, CodecError> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|err| CodecError::new(format!("not a zip archive: {err}")))?;
        debug!("zip: indexed entries={}", archive.len());
        Ok(Self { archive })
    }

    /// Raw bytes of an entry, or `None` when the archive has no such path.
    pub fn read_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>, CodecError> {
        let mut entry = match self.archive.by_name(path) {
            Ok(entry) if entry.is_dir() => return Ok(None),
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(CodecError::new(format!("cannot open {path}: {err}"))),
        };

        let mut data = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|err| CodecError::new(format!("cannot read {path}: {err}")))?;
        debug!(
            "zip: read entry={} method={:?} packed={} size={}",
            path,
            entry.compression(),
            entry.compressed_size(),
            data.len()
        );
        Ok(Some(data))
    }
}

impl ArchiveSource for ZipContainer {
    async fn read_entry(&mut self, path: &str) -> Result<Option<String>, CodecError> {
        Ok(self.read_bytes(path)?.map(|bytes| decode_text(&bytes)))
    }
}
