//! Paginated documents: page texts joined in page order.

use log::debug;

use super::PageSource;
use crate::error::ExtractError;

pub async fn extract_pdf_text<P: PageSource>(pages: &mut P) -> Result<String, ExtractError> {
    let page_count = pages.page_count();
    let mut full_text = String::new();

    for index in 0..page_count {
        let page = pages
            .page_text(index)
            .await
            .map_err(ExtractError::PaginatedDocumentParse)?;
        full_text.push_str(&page);
        full_text.push(' ');
    }

    debug!("extract: pdf pages={} chars={}", page_count, full_text.len());
    Ok(full_text)
}
