//! XHTML content documents to plain reading text.

use super::{
    html_entities::{MAX_ENTITY_BYTES, decode_html_entity},
    parsing_utils::{eq_ascii_case_insensitive, find_ascii_case_insensitive, local_name, trim_ascii},
    text_utils::collapse_whitespace,
};

/// Elements whose whole body is dropped.
const SKIPPED_BLOCKS: [&[u8]; 3] = [b"script", b"style", b"head"];

#[derive(Clone, Copy)]
struct HtmlTagInfo<'a> {
    local_name: &'a [u8],
    is_closing: bool,
    is_self_closing: bool,
}

fn parse_html_tag_info(tag: &[u8]) -> Option<HtmlTagInfo<'_>> {
    let tag = trim_ascii(tag);
    if tag.is_empty() || tag.starts_with(b"!") || tag.starts_with(b"?") {
        return None;
    }

    let (is_closing, rest) = match tag.strip_prefix(b"/") {
        Some(rest) => (true, trim_ascii(rest)),
        None => (false, tag),
    };
    if rest.is_empty() {
        return None;
    }

    let name_end = rest
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/' || *b == b'>')
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }

    Some(HtmlTagInfo {
        local_name: local_name(&rest[..name_end]),
        is_closing,
        is_self_closing: rest.ends_with(b"/"),
    })
}

/// Convert one content document to whitespace-collapsed text.
///
/// Every tag boundary, block-level (`p`, `div`, `br`, `h1`-`h6`, `li`, `tr`,
/// `td`, `th`) or inline, reads as a word gap so adjacent blocks never fuse.
pub fn html_to_text(markup: &str) -> String {
    let bytes = markup.as_bytes();
    let mut raw = String::with_capacity(markup.len());
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        match bytes[cursor] {
            b'<' => cursor = consume_markup(markup, cursor, &mut raw),
            b'&' => cursor = consume_entity(markup, cursor, &mut raw),
            _ => {
                let next = bytes[cursor..]
                    .iter()
                    .position(|b| matches!(b, b'<' | b'&'))
                    .map(|rel| cursor + rel)
                    .unwrap_or(bytes.len());
                raw.push_str(&markup[cursor..next]);
                cursor = next;
            }
        }
    }

    collapse_whitespace(&raw)
}

fn consume_markup(markup: &str, cursor: usize, out: &mut String) -> usize {
    let bytes = markup.as_bytes();

    if bytes[cursor..].starts_with(b"<!--") {
        return find_ascii_case_insensitive(bytes, b"-->", cursor + 4)
            .map(|end| end + 3)
            .unwrap_or(bytes.len());
    }

    let Some(gt_rel) = bytes[cursor + 1..].iter().position(|b| *b == b'>') else {
        out.push('<');
        return cursor + 1;
    };
    let tag_end = cursor + 1 + gt_rel;
    let after_tag = tag_end + 1;

    if let Some(info) = parse_html_tag_info(&bytes[cursor + 1..tag_end])
        && !info.is_closing
        && !info.is_self_closing
        && SKIPPED_BLOCKS
            .iter()
            .any(|name| eq_ascii_case_insensitive(info.local_name, name))
        && let Some(block_end) = find_block_end(bytes, info.local_name, after_tag)
    {
        return block_end;
    }

    out.push(' ');
    after_tag
}

/// Index just past `</name ...>`, searching from `from`.
fn find_block_end(bytes: &[u8], name: &[u8], from: usize) -> Option<usize> {
    let mut search_from = from;
    while let Some(open) = find_ascii_case_insensitive(bytes, b"</", search_from) {
        let gt = open + bytes[open..].iter().position(|b| *b == b'>')?;
        if let Some(info) = parse_html_tag_info(&bytes[open + 1..gt])
            && eq_ascii_case_insensitive(info.local_name, name)
        {
            return Some(gt + 1);
        }
        search_from = open + 2;
    }
    None
}

fn consume_entity(markup: &str, cursor: usize, out: &mut String) -> usize {
    let bytes = markup.as_bytes();
    let window_end = bytes.len().min(cursor + 2 + MAX_ENTITY_BYTES);
    let decoded = bytes[cursor + 1..window_end]
        .iter()
        .position(|b| *b == b';')
        .and_then(|rel| {
            let semi = cursor + 1 + rel;
            decode_html_entity(&markup[cursor + 1..semi]).map(|ch| (ch, semi + 1))
        });

    match decoded {
        Some((ch, next)) => {
            out.push(ch);
            next
        }
        None => {
            out.push('&');
            cursor + 1
        }
    }
}
