//! Byte-level helpers shared by the markup and package parsers.
//!
//! EPUB packages are matched heuristically rather than through a full XML
//! parser, so everything here tolerates namespaces, attribute order and both
//! quote styles.

pub(super) fn eq_ascii_case_insensitive(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

pub(super) fn find_ascii_case_insensitive(
    haystack: &[u8],
    needle: &[u8],
    from: usize,
) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() || needle.len() > haystack.len() {
        return None;
    }
    let max_start = haystack.len().saturating_sub(needle.len());
    if from > max_start {
        return None;
    }

    (from..=max_start)
        .find(|&idx| eq_ascii_case_insensitive(&haystack[idx..idx + needle.len()], needle))
}

pub(super) fn contains_ascii_case_insensitive(haystack: &[u8], needle: &[u8]) -> bool {
    find_ascii_case_insensitive(haystack, needle, 0).is_some()
}

pub(super) fn ends_with_ascii_case_insensitive(path: &[u8], suffix: &[u8]) -> bool {
    if suffix.len() > path.len() {
        return false;
    }
    eq_ascii_case_insensitive(&path[path.len() - suffix.len()..], suffix)
}

pub(super) fn trim_ascii(slice: &[u8]) -> &[u8] {
    let mut start = 0usize;
    let mut end = slice.len();
    while start < end && slice[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && slice[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &slice[start..end]
}

/// Strip an optional `prefix:` namespace from an element name.
pub(super) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|b| *b == b':')
        .map(|idx| &name[idx + 1..])
        .unwrap_or(name)
}

/// Byte range `[start, end)` of the next opening `<local_name ...>` tag at or after `from`.
pub(super) fn find_xml_element_bounds(
    xml: &[u8],
    element: &[u8],
    from: usize,
) -> Option<(usize, usize)> {
    let end = xml.len();
    let mut cursor = from;
    while cursor < end {
        let lt_rel = xml[cursor..end].iter().position(|b| *b == b'<')?;
        let start = cursor + lt_rel;
        let mut name_start = start + 1;
        if name_start >= end {
            return None;
        }

        // Closing tags, doctype and processing instructions never match.
        if matches!(xml[name_start], b'/' | b'!' | b'?') {
            cursor = name_start + 1;
            continue;
        }

        while name_start < end && xml[name_start].is_ascii_whitespace() {
            name_start += 1;
        }

        let mut name_end = name_start;
        while name_end < end
            && !xml[name_end].is_ascii_whitespace()
            && xml[name_end] != b'/'
            && xml[name_end] != b'>'
        {
            name_end += 1;
        }
        if name_end <= name_start {
            cursor = start + 1;
            continue;
        }

        if eq_ascii_case_insensitive(local_name(&xml[name_start..name_end]), element) {
            let end_rel = xml[name_end..end].iter().position(|b| *b == b'>')?;
            return Some((start, name_end + end_rel + 1));
        }

        cursor = name_end;
    }

    None
}

/// Value of attribute `attr` inside a single tag, quoted or bare.
pub(super) fn find_xml_attr_value<'a>(tag: &'a [u8], attr: &[u8]) -> Option<&'a [u8]> {
    let mut search_from = 0usize;
    while let Some(attr_pos) = find_ascii_case_insensitive(tag, attr, search_from) {
        let prev_ok = attr_pos == 0
            || tag[attr_pos - 1].is_ascii_whitespace()
            || tag[attr_pos - 1] == b'<'
            || tag[attr_pos - 1] == b':';
        if !prev_ok {
            search_from = attr_pos + 1;
            continue;
        }

        let mut idx = attr_pos + attr.len();
        while idx < tag.len() && tag[idx].is_ascii_whitespace() {
            idx += 1;
        }
        if idx >= tag.len() || tag[idx] != b'=' {
            search_from = attr_pos + 1;
            continue;
        }
        idx += 1;
        while idx < tag.len() && tag[idx].is_ascii_whitespace() {
            idx += 1;
        }
        if idx >= tag.len() {
            return None;
        }

        let quote = tag[idx];
        if quote == b'"' || quote == b'\'' {
            idx += 1;
            let start = idx;
            while idx < tag.len() && tag[idx] != quote {
                idx += 1;
            }
            return Some(&tag[start..idx]);
        }

        let start = idx;
        while idx < tag.len()
            && !tag[idx].is_ascii_whitespace()
            && tag[idx] != b'>'
            && tag[idx] != b'/'
        {
            idx += 1;
        }
        return (idx > start).then(|| &tag[start..idx]);
    }
    None
}
