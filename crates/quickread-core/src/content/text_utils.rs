const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decode file bytes as UTF-8 (lossy) and drop a leading byte-order mark.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => rest.to_owned(),
        None => text.into_owned(),
    }
}

/// Split `text` into reading tokens: whitespace runs separate words, nothing else does.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cursor = 0usize;

    while let Some((word, next_cursor)) = next_word_at(text, cursor) {
        words.push(word.to_owned());
        cursor = next_cursor;
    }

    words
}

pub(super) fn next_word_at(text: &str, cursor: usize) -> Option<(&str, usize)> {
    let rest = text.get(cursor..)?;
    let start = cursor + rest.find(|ch: char| !ch.is_whitespace())?;
    let end = text[start..]
        .find(char::is_whitespace)
        .map(|rel| start + rel)
        .unwrap_or(text.len());

    Some((&text[start..end], end))
}

/// Collapse every whitespace run to one ASCII space and trim both ends.
pub(super) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    while let Some((word, next_cursor)) = next_word_at(text, cursor) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        cursor = next_cursor;
    }

    out
}
