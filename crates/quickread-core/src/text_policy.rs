//! Shared text shaping for compact reader surfaces.

pub const PREVIEW_WORDS: usize = 10;

/// Up to `len` words starting at `index`, joined by spaces and followed by `...`.
pub fn preview_snippet<S: AsRef<str>>(words: &[S], index: usize, len: usize) -> String {
    let start = index.min(words.len());
    let end = start.saturating_add(len).min(words.len());
    let mut out = words[start..end]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str("...");
    out
}

/// `m:ss` for a duration in seconds. Negative or non-finite input reads `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_owned();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
