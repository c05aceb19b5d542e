//! Heuristic chapter/section detection over a word sequence.
//!
//! Markers come out ascending by word index and the first one always sits at
//! index 0, so [`current_section_for`] is defined for every reading position.

use log::debug;

use crate::progress::rounded_percent;
pub use crate::text_policy::preview_snippet;

const SECTION_KEYWORDS: [&str; 8] = [
    "chapter",
    "part",
    "section",
    "prologue",
    "epilogue",
    "introduction",
    "conclusion",
    "preface",
];
const TITLE_SNIPPET_WORDS: usize = 5;
const FALLBACK_MIN_WORDS: usize = 500;
const FALLBACK_MAX_STRIDE: usize = 1000;
const BEGINNING_TITLE: &str = "Beginning";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SectionMarker {
    pub title: String,
    pub word_index: usize,
    /// `round(100 * word_index / N)`.
    pub percent: u8,
}

impl SectionMarker {
    fn new(title: String, word_index: usize, total: usize) -> Self {
        Self {
            title,
            word_index,
            percent: rounded_percent(word_index, total),
        }
    }
}

pub fn detect_sections<S: AsRef<str>>(words: &[S]) -> Vec<SectionMarker> {
    let total = words.len();
    let word = |idx: usize| words.get(idx).map(AsRef::as_ref).unwrap_or("");

    let mut sections: Vec<SectionMarker> = (0..total)
        .filter(|&idx| is_section_keyword(word(idx)))
        .map(|idx| SectionMarker::new(section_title(words, idx), idx, total))
        .collect();
    let detected = sections.len();

    if sections.is_empty() && total > FALLBACK_MIN_WORDS {
        let stride = FALLBACK_MAX_STRIDE.min(total / 10);
        sections = (0..total)
            .step_by(stride)
            .enumerate()
            .map(|(k, idx)| SectionMarker::new(format!("Section {}", k + 1), idx, total))
            .collect();
    }

    if sections.first().is_none_or(|first| first.word_index != 0) {
        sections.insert(0, SectionMarker::new(BEGINNING_TITLE.to_owned(), 0, total));
    }

    debug!(
        "sections: words={} detected={} markers={}",
        total,
        detected,
        sections.len()
    );
    sections
}

/// Last marker starting at or before `word_index`.
pub fn current_section_for(sections: &[SectionMarker], word_index: usize) -> Option<&SectionMarker> {
    let after = sections.partition_point(|marker| marker.word_index <= word_index);
    after.checked_sub(1).map(|idx| &sections[idx])
}

fn is_section_keyword(word: &str) -> bool {
    SECTION_KEYWORDS
        .iter()
        .any(|keyword| word.eq_ignore_ascii_case(keyword))
}

fn section_title<S: AsRef<str>>(words: &[S], idx: usize) -> String {
    let word = |idx: usize| words.get(idx).map(AsRef::as_ref).unwrap_or("");

    let mut title = word(idx).to_owned();
    let number = word(idx + 1);
    if is_section_number(number) {
        title.push(' ');
        title.push_str(number);

        if matches!(word(idx + 2), ":" | "-") {
            let start = (idx + 3).min(words.len());
            let end = (idx + 3 + TITLE_SNIPPET_WORDS).min(words.len());
            let snippet = words[start..end]
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(" ");
            if !snippet.is_empty() {
                title.push_str(" - ");
                title.push_str(&snippet);
            }
        }
    }

    capitalize_first(&title)
}

/// Arabic digits or a roman numeral made of `IVXLCDM` in either case.
fn is_section_number(word: &str) -> bool {
    !word.is_empty()
        && (word.bytes().all(|b| b.is_ascii_digit())
            || word
                .bytes()
                .all(|b| matches!(b.to_ascii_uppercase(), b'I' | b'V' | b'X' | b'L' | b'C' | b'D' | b'M')))
}

fn capitalize_first(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
