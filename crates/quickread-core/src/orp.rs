//! Optimal Recognition Point: the letter the reader's eye is anchored on.

/// A word cut around its focus letter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FocusSplit<'a> {
    pub before: &'a str,
    pub focus: &'a str,
    pub after: &'a str,
}

/// Zero-based character index of the focus letter for `word`.
///
/// Lengths are counted in `char`s so multi-byte letters count once.
pub fn focus_index(word: &str) -> usize {
    match word.chars().count() {
        0..=2 => 0,
        3 | 4 => 1,
        5 | 6 => 2,
        7..=9 => 3,
        10..=13 => 4,
        _ => 5,
    }
}

/// Split `word` into the text before the focus letter, the letter, and the rest.
pub fn split_at_focus(word: &str) -> FocusSplit<'_> {
    let target = focus_index(word);
    let Some((start, ch)) = word.char_indices().nth(target) else {
        return FocusSplit::default();
    };
    let end = start + ch.len_utf8();

    FocusSplit {
        before: &word[..start],
        focus: &word[start..end],
        after: &word[end..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_follows_length_table() {
        let cases = [
            ("", 0),
            ("a", 0),
            ("an", 0),
            ("the", 1),
            ("word", 1),
            ("quick", 2),
            ("rabbit", 2),
            ("reading", 3),
            ("wonderful", 3),
            ("remarkable", 4),
            ("extraordinary", 4),
            ("incomprehensible", 5),
        ];
        for (word, expected) in cases {
            assert_eq!(focus_index(word), expected, "word={word:?}");
        }
    }

    #[test]
    fn focus_stays_inside_word() {
        for word in ["x", "ab", "abc", "hello", "antidisestablishmentarianism"] {
            let idx = focus_index(word);
            assert_eq!(idx, focus_index(word));
            assert!(idx < word.chars().count().max(1));
        }
    }

    #[test]
    fn split_reconstructs_word() {
        for word in ["I", "to", "cat", "Alice", "mañana", "straightforward"] {
            let split = split_at_focus(word);
            assert_eq!(
                format!("{}{}{}", split.before, split.focus, split.after),
                word
            );
            assert_eq!(split.focus.chars().count(), 1);
        }
    }

    #[test]
    fn split_handles_multibyte_focus() {
        let split = split_at_focus("señor");
        assert_eq!(split.before, "se");
        assert_eq!(split.focus, "ñ");
        assert_eq!(split.after, "or");
    }

    #[test]
    fn empty_word_splits_into_empty_parts() {
        assert_eq!(split_at_focus(""), FocusSplit::default());
    }
}
