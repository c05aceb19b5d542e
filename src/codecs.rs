//! Codecs with real decoders behind them: `pdf_oxide` for PDF and the
//! in-memory ZIP container for EPUB.

use std::io::Write;

use log::debug;
use pdf_oxide::PdfDocument;
use quickread_core::{
    CodecError,
    content::{Codecs, PageSource, ZipContainer},
};
use tempfile::NamedTempFile;

/// An open PDF. The bytes are staged in a temp file that lives as long as
/// the document, because `pdf_oxide` reads from a path.
pub struct PdfPages {
    document: PdfDocument,
    page_count: usize,
    _staged: NamedTempFile,
}

impl PdfPages {
    pub fn open(bytes: &[u8]) -> Result<Self, CodecError> {
        let stage_err = |err: std::io::Error| CodecError::new(format!("cannot stage pdf: {err}"));
        let mut staged = NamedTempFile::new().map_err(stage_err)?;
        staged.write_all(bytes).map_err(stage_err)?;
        staged.flush().map_err(stage_err)?;

        let mut document = PdfDocument::open(staged.path()).map_err(pdf_err)?;
        let page_count = document.page_count().map_err(pdf_err)?;
        debug!("pdf: opened pages={} bytes={}", page_count, bytes.len());

        Ok(Self {
            document,
            page_count,
            _staged: staged,
        })
    }
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn page_text(&mut self, index: usize) -> Result<String, CodecError> {
        self.document.extract_text(index).map_err(pdf_err)
    }
}

fn pdf_err(err: pdf_oxide::Error) -> CodecError {
    CodecError::new(err.to_string())
}

/// Default codecs for the host: every supported format can be opened.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostCodecs;

impl Codecs for HostCodecs {
    type Pages = PdfPages;
    type Archive = ZipContainer;

    async fn open_pages(&mut self, bytes: Vec<u8>) -> Result<Self::Pages, CodecError> {
        PdfPages::open(&bytes)
    }

    async fn open_archive(&mut self, bytes: Vec<u8>) -> Result<Self::Archive, CodecError> {
        ZipContainer::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use pdf_oxide::writer::{DocumentBuilder, PageSize};
    use quickread_core::{ExtractError, load_document};

    use super::*;

    fn two_page_pdf() -> Vec<u8> {
        let mut builder = DocumentBuilder::new();
        {
            let page = builder.page(PageSize::Letter);
            page.at(72.0, 720.0).text("Alpha opens the paper").done();
        }
        {
            let page = builder.page(PageSize::Letter);
            page.at(72.0, 720.0).text("Beta closes it").done();
        }
        builder.build().unwrap()
    }

    #[test]
    fn pdf_pages_are_counted_and_read() {
        let mut pages = PdfPages::open(&two_page_pdf()).unwrap();
        assert_eq!(pages.page_count(), 2);
        assert!(block_on(pages.page_text(0)).unwrap().contains("Alpha"));
        assert!(block_on(pages.page_text(1)).unwrap().contains("Beta"));
    }

    #[test]
    fn pdf_loads_end_to_end_in_page_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let doc = block_on(load_document(&mut HostCodecs, "paper.pdf", two_page_pdf())).unwrap();

        let position = |word: &str| doc.words.iter().position(|w| w == word);
        let alpha = position("Alpha").unwrap();
        let beta = position("Beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn broken_pdf_is_a_parse_error() {
        let err = block_on(load_document(
            &mut HostCodecs,
            "paper.pdf",
            b"this is not a pdf".to_vec(),
        ))
        .unwrap_err();
        assert!(matches!(err, ExtractError::PaginatedDocumentParse(_)));
    }
}
