//! EPUB-like archives: container, package document, spine, content text.
//!
//! The package is matched heuristically. The two fallbacks are modeled as
//! enums so every path through the extractor is visible in one place:
//! [`ReadingOrder`] (spine, or manifest order when the spine is empty) and
//! [`EntryLookup`] (path resolved against the package directory, or the bare
//! href for archives with inconsistent prefixes).

use heapless::Vec as HeaplessVec;
use log::{debug, info};

use super::{
    ArchiveSource,
    markup::html_to_text,
    parsing_utils::{
        contains_ascii_case_insensitive, find_xml_attr_value, find_xml_element_bounds, trim_ascii,
    },
};
use crate::error::{ArchiveFault, ExtractError};

pub const CONTAINER_PATH: &str = "META-INF/container.xml";
const ZIP_PATH_SEGMENTS_MAX: usize = 32;

/// One `<item>` of the package manifest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

impl ManifestItem {
    fn is_markup(&self) -> bool {
        let media = self.media_type.as_bytes();
        contains_ascii_case_insensitive(media, b"html") || contains_ascii_case_insensitive(media, b"xml")
    }

    fn is_html(&self) -> bool {
        contains_ascii_case_insensitive(self.media_type.as_bytes(), b"html")
    }
}

/// Manifest and spine of a package document, in document order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageDocument {
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<String>,
}

impl PackageDocument {
    pub fn parse(opf: &str) -> Self {
        let opf = opf.as_bytes();
        let mut manifest = Vec::new();
        let mut cursor = 0usize;
        while let Some((start, end)) = find_xml_element_bounds(opf, b"item", cursor) {
            let tag = &opf[start..end];
            let attr = |name: &[u8]| {
                find_xml_attr_value(tag, name).map(|value| String::from_utf8_lossy(value).into_owned())
            };
            if let (Some(id), Some(href), Some(media_type)) =
                (attr(b"id"), attr(b"href"), attr(b"media-type"))
            {
                manifest.push(ManifestItem {
                    id,
                    href,
                    media_type,
                });
            }
            cursor = end;
        }

        let mut spine = Vec::new();
        let mut cursor = 0usize;
        while let Some((start, end)) = find_xml_element_bounds(opf, b"itemref", cursor) {
            if let Some(idref) = find_xml_attr_value(&opf[start..end], b"idref") {
                spine.push(String::from_utf8_lossy(idref).into_owned());
            }
            cursor = end;
        }

        Self { manifest, spine }
    }

    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    pub fn reading_order(&self) -> ReadingOrder {
        if self.spine.is_empty() {
            ReadingOrder::ManifestFallback(
                self.manifest
                    .iter()
                    .filter(|item| item.is_html())
                    .map(|item| item.id.clone())
                    .collect(),
            )
        } else {
            ReadingOrder::Spine(self.spine.clone())
        }
    }
}

/// Ordered content ids and where they came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadingOrder {
    Spine(Vec<String>),
    ManifestFallback(Vec<String>),
}

impl ReadingOrder {
    pub fn ids(&self) -> &[String] {
        match self {
            Self::Spine(ids) | Self::ManifestFallback(ids) => ids,
        }
    }
}

/// Outcome of looking one content document up in the archive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryLookup {
    Resolved(String),
    BareHref(String),
    Missing,
}

/// Read every spine document and join their text in reading order.
pub async fn extract_epub_text<A: ArchiveSource>(archive: &mut A) -> Result<String, ExtractError> {
    let container = read_entry(archive, CONTAINER_PATH)
        .await?
        .ok_or(ExtractError::ArchiveStructure(ArchiveFault::MissingContainer))?;
    let package_path = find_xml_attr_value(container.as_bytes(), b"full-path")
        .map(trim_ascii)
        .filter(|path| !path.is_empty())
        .map(|path| String::from_utf8_lossy(path).into_owned())
        .ok_or(ExtractError::ArchiveStructure(ArchiveFault::MissingPackagePath))?;

    let opf = read_entry(archive, &package_path)
        .await?
        .ok_or(ExtractError::ArchiveStructure(ArchiveFault::MissingPackage))?;
    let package = PackageDocument::parse(&opf);
    let order = package.reading_order();
    info!(
        "epub: package={} manifest={} spine={} fallback={}",
        package_path,
        package.manifest.len(),
        package.spine.len(),
        matches!(order, ReadingOrder::ManifestFallback(_))
    );

    let mut full_text = String::new();
    for id in order.ids() {
        let Some(item) = package.item(id) else {
            debug!("epub: spine id={} has no manifest item", id);
            continue;
        };
        if !item.is_markup() {
            debug!("epub: skip id={} media_type={}", id, item.media_type);
            continue;
        }

        let (lookup, content) = lookup_entry(archive, &package_path, &item.href).await?;
        let Some(content) = content else {
            debug!("epub: missing content id={} href={}", id, item.href);
            continue;
        };
        if let EntryLookup::BareHref(path) = &lookup {
            debug!("epub: resolved via bare href id={} path={}", id, path);
        }

        let text = html_to_text(&content);
        if text.is_empty() {
            continue;
        }
        if !full_text.is_empty() {
            full_text.push(' ');
        }
        full_text.push_str(&text);
    }

    if full_text.trim().is_empty() {
        return Err(ExtractError::ArchiveStructure(ArchiveFault::NoReadableContent));
    }
    Ok(full_text)
}

async fn read_entry<A: ArchiveSource>(
    archive: &mut A,
    path: &str,
) -> Result<Option<String>, ExtractError> {
    archive
        .read_entry(path)
        .await
        .map_err(ExtractError::ArchiveRead)
}

async fn lookup_entry<A: ArchiveSource>(
    archive: &mut A,
    package_path: &str,
    href: &str,
) -> Result<(EntryLookup, Option<String>), ExtractError> {
    if let Some(resolved) = resolve_opf_href(package_path, href)
        && let Some(content) = read_entry(archive, &resolved).await?
    {
        return Ok((EntryLookup::Resolved(resolved), Some(content)));
    }

    let bare = strip_fragment(href);
    if !bare.is_empty()
        && let Some(content) = read_entry(archive, bare).await?
    {
        return Ok((EntryLookup::BareHref(bare.to_owned()), Some(content)));
    }

    Ok((EntryLookup::Missing, None))
}

fn strip_fragment(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    href[..end].trim()
}

/// Resolve a manifest href against the package document's directory,
/// normalizing `.` and `..` segments.
pub fn resolve_opf_href(opf_path: &str, href: &str) -> Option<String> {
    let href = strip_fragment(href);
    if href.is_empty() {
        return None;
    }

    let base_dir = opf_path
        .rsplit_once('/')
        .map(|(left, _)| left)
        .unwrap_or("");
    let (base_dir, href) = match href.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (base_dir, href),
    };

    let mut segments: HeaplessVec<&str, ZIP_PATH_SEGMENTS_MAX> = HeaplessVec::new();
    for seg in base_dir.split('/').chain(href.split('/')) {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." {
            let _ = segments.pop();
            continue;
        }
        segments.push(seg).ok()?;
    }

    let resolved = segments.join("/");
    (!resolved.is_empty()).then_some(resolved)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use embassy_futures::block_on;

    use super::*;
    use crate::{
        content::{ZipContainer, archive::fixture::ZipFixture},
        error::CodecError,
    };

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    #[derive(Default)]
    struct MapArchive {
        entries: HashMap<String, String>,
        reads: Vec<String>,
    }

    impl MapArchive {
        fn with(mut self, path: &str, body: &str) -> Self {
            self.entries.insert(path.to_owned(), body.to_owned());
            self
        }
    }

    impl ArchiveSource for MapArchive {
        async fn read_entry(&mut self, path: &str) -> Result<Option<String>, CodecError> {
            self.reads.push(path.to_owned());
            Ok(self.entries.get(path).cloned())
        }
    }

    fn opf(manifest: &str, spine: &str) -> String {
        format!(
            "<package><manifest>{manifest}</manifest><spine toc=\"ncx\">{spine}</spine></package>"
        )
    }

    #[test]
    fn spine_order_wins_over_manifest_order() {
        let mut archive = MapArchive::default()
            .with(CONTAINER_PATH, CONTAINER)
            .with(
                "OEBPS/content.opf",
                &opf(
                    r#"<item id="c1" href="text/one.xhtml" media-type="application/xhtml+xml"/>
                       <item media-type="application/xhtml+xml" href="text/two.xhtml" id="c2"/>
                       <item id="css" href="style.css" media-type="text/css"/>"#,
                    r#"<itemref idref="c2"/><itemref idref="css"/><itemref idref="c1"/>"#,
                ),
            )
            .with("OEBPS/text/one.xhtml", "<p>first file</p>")
            .with("OEBPS/text/two.xhtml", "<p>second file</p>");

        let text = block_on(extract_epub_text(&mut archive)).unwrap();
        assert_eq!(text, "second file first file");
        assert!(!archive.reads.iter().any(|path| path.ends_with("style.css")));
    }

    #[test]
    fn empty_spine_falls_back_to_html_manifest_items() {
        let package = PackageDocument::parse(&opf(
            r#"<item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
               <item id="img" href="cover.jpg" media-type="image/jpeg"/>
               <item id="b" href="b.html" media-type="text/html"/>"#,
            "",
        ));
        assert_eq!(
            package.reading_order(),
            ReadingOrder::ManifestFallback(vec!["a".to_owned(), "b".to_owned()])
        );
    }

    #[test]
    fn bare_href_is_tried_when_resolved_path_is_missing() {
        let mut archive = MapArchive::default()
            .with(CONTAINER_PATH, CONTAINER)
            .with(
                "OEBPS/content.opf",
                &opf(
                    r#"<item id="c1" href="chapter.xhtml" media-type="application/xhtml+xml"/>"#,
                    r#"<itemref idref="c1"/>"#,
                ),
            )
            .with("chapter.xhtml", "<p>found anyway</p>");

        let text = block_on(extract_epub_text(&mut archive)).unwrap();
        assert_eq!(text, "found anyway");
        assert_eq!(
            archive.reads,
            vec![
                CONTAINER_PATH.to_owned(),
                "OEBPS/content.opf".to_owned(),
                "OEBPS/chapter.xhtml".to_owned(),
                "chapter.xhtml".to_owned(),
            ]
        );
    }

    #[test]
    fn missing_container_is_reported() {
        let mut archive = MapArchive::default();
        assert_eq!(
            block_on(extract_epub_text(&mut archive)),
            Err(ExtractError::ArchiveStructure(ArchiveFault::MissingContainer))
        );
    }

    #[test]
    fn container_without_full_path_is_reported() {
        let mut archive = MapArchive::default().with(CONTAINER_PATH, "<container/>");
        assert_eq!(
            block_on(extract_epub_text(&mut archive)),
            Err(ExtractError::ArchiveStructure(ArchiveFault::MissingPackagePath))
        );
    }

    #[test]
    fn missing_package_is_reported() {
        let mut archive = MapArchive::default().with(CONTAINER_PATH, CONTAINER);
        assert_eq!(
            block_on(extract_epub_text(&mut archive)),
            Err(ExtractError::ArchiveStructure(ArchiveFault::MissingPackage))
        );
    }

    #[test]
    fn blank_content_is_reported() {
        let mut archive = MapArchive::default()
            .with(CONTAINER_PATH, CONTAINER)
            .with(
                "OEBPS/content.opf",
                &opf(
                    r#"<item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>"#,
                    r#"<itemref idref="c1"/><itemref idref="ghost"/>"#,
                ),
            )
            .with("OEBPS/c1.xhtml", "<html><head><title>t</title></head><body> </body></html>");

        assert_eq!(
            block_on(extract_epub_text(&mut archive)),
            Err(ExtractError::ArchiveStructure(ArchiveFault::NoReadableContent))
        );
    }

    #[test]
    fn hrefs_resolve_relative_to_package_directory() {
        assert_eq!(
            resolve_opf_href("OEBPS/content.opf", "text/ch1.xhtml").as_deref(),
            Some("OEBPS/text/ch1.xhtml")
        );
        assert_eq!(
            resolve_opf_href("OEBPS/pkg/content.opf", "../text/ch1.xhtml#top").as_deref(),
            Some("OEBPS/text/ch1.xhtml")
        );
        assert_eq!(
            resolve_opf_href("content.opf", "./ch1.xhtml").as_deref(),
            Some("ch1.xhtml")
        );
        assert_eq!(resolve_opf_href("content.opf", "#only-fragment"), None);
    }

    #[test]
    fn reads_a_real_zip_container() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bytes = ZipFixture::new()
            .stored("mimetype", b"application/epub+zip")
            .deflated(CONTAINER_PATH, CONTAINER.as_bytes())
            .deflated(
                "OEBPS/content.opf",
                opf(
                    r#"<item id="ch" href="ch.xhtml" media-type="application/xhtml+xml"/>"#,
                    r#"<itemref idref="ch"/>"#,
                )
                .as_bytes(),
            )
            .deflated(
                "OEBPS/ch.xhtml",
                b"<html><body><h1>Chapter 1</h1><p>It was a dark &amp; stormy night.</p></body></html>",
            )
            .finish();
        let mut archive = ZipContainer::new(bytes).unwrap();

        let text = block_on(extract_epub_text(&mut archive)).unwrap();
        assert_eq!(text, "Chapter 1 It was a dark & stormy night.");
    }

    #[test]
    fn byte_order_marks_in_entries_are_ignored() {
        let bytes = ZipFixture::new()
            .deflated(CONTAINER_PATH, format!("\u{feff}{CONTAINER}").as_bytes())
            .deflated(
                "OEBPS/content.opf",
                opf(
                    r#"<item id="ch" href="ch.xhtml" media-type="application/xhtml+xml"/>"#,
                    r#"<itemref idref="ch"/>"#,
                )
                .as_bytes(),
            )
            .deflated("OEBPS/ch.xhtml", "\u{feff}<p>Chapter 2 opens</p>".as_bytes())
            .finish();
        let mut archive = ZipContainer::new(bytes).unwrap();

        let text = block_on(extract_epub_text(&mut archive)).unwrap();
        assert_eq!(text, "Chapter 2 opens");
    }
}
