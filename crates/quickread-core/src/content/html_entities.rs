/// Longest entity body (between `&` and `;`) worth looking at.
pub(super) const MAX_ENTITY_BYTES: usize = 16;

/// Decode the body of a character reference such as `amp` or `#x2014`.
///
/// Returns `None` when `entity` is not shaped like a reference at all, in which
/// case the caller keeps the `&` literally.
pub(super) fn decode_html_entity(entity: &str) -> Option<char> {
    if entity.starts_with('#') {
        return decode_numeric_entity(entity);
    }

    if entity.is_empty() || !entity.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        // Unknown named references and &nbsp; read as word gaps.
        _ => ' ',
    };
    Some(decoded)
}

/// Numeric references. Out-of-range or surrogate code points decode to U+FFFD.
pub(super) fn decode_numeric_entity(entity: &str) -> Option<char> {
    let body = entity.strip_prefix('#')?;
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }

    let value = digits.chars().fold(0u32, |acc, ch| {
        acc.saturating_mul(radix)
            .saturating_add(ch.to_digit(radix).unwrap_or(0))
    });

    Some(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
}
