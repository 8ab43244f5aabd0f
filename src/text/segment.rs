//! Whitespace word segmentation with Optimal Focal Point and punctuation pause weights.

/// One displayable word.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordUnit {
    /// Raw token, punctuation retained.
    pub text: String,
    /// Char index of the focal character (Optimal Focal Point).
    pub focal_index: usize,
    /// Interval multiplier, `>= 1`, derived from the trailing char.
    pub pause_weight: f64,
}

impl WordUnit {
    /// Build a unit from a single token, deriving focal index and pause weight.
    pub fn new(token: impl Into<String>) -> Self {
        let text = token.into();
        let len = text.chars().count();
        let pause_weight = pause_weight_for(&text);
        Self {
            focal_index: focal_index_for_len(len),
            pause_weight,
            text,
        }
    }
}

/// Length-banded Optimal Focal Point lookup.
///
/// Roughly the 1/3 to 1/4 mark of the word. Always `< len` for `len >= 1`.
pub fn focal_index_for_len(len: usize) -> usize {
    match len {
        0..=1 => 0,
        2..=3 => 1,
        4..=5 => 2,
        6..=9 => 3,
        _ => 4,
    }
}

/// Pause multiplier from the last char of `token` only.
pub fn pause_weight_for(token: &str) -> f64 {
    match token.chars().last() {
        Some('.' | '!' | '?') => 2.0,
        Some(',' | ';' | ':') => 1.5,
        _ => 1.0,
    }
}

/// Split `text` on runs of whitespace into word units.
///
/// Blank input yields an empty sequence.
pub fn segment(text: &str) -> Vec<WordUnit> {
    text.split_whitespace().map(WordUnit::new).collect()
}

/// A word split around its focal character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordParts<'a> {
    pub prefix: &'a str,
    /// The focal char, or empty when the index is past the end.
    pub focal: &'a str,
    pub suffix: &'a str,
}

/// Split a unit at its focal index (char-based, never splits a UTF-8 sequence).
pub fn split_word(unit: &WordUnit) -> WordParts<'_> {
    let text = unit.text.as_str();
    let mut indices = text.char_indices().skip(unit.focal_index);
    let Some((start, ch)) = indices.next() else {
        return WordParts {
            prefix: text,
            focal: "",
            suffix: "",
        };
    };
    let end = start + ch.len_utf8();
    WordParts {
        prefix: &text[..start],
        focal: &text[start..end],
        suffix: &text[end..],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/segment.rs"]
mod tests;
