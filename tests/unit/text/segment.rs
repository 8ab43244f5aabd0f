use super::*;

#[test]
fn focal_index_boundary_table() {
    let lens = [1, 3, 4, 5, 6, 9, 10];
    let expected = [0, 1, 2, 2, 3, 3, 4];
    for (len, want) in lens.into_iter().zip(expected) {
        assert_eq!(focal_index_for_len(len), want, "len {len}");
    }
    assert_eq!(focal_index_for_len(0), 0);
    assert_eq!(focal_index_for_len(42), 4);
}

#[test]
fn pause_weight_uses_last_char_only() {
    assert_eq!(pause_weight_for("end."), 2.0);
    assert_eq!(pause_weight_for("wait,"), 1.5);
    assert_eq!(pause_weight_for("plain"), 1.0);
    assert_eq!(pause_weight_for("Really?!"), 2.0);
    assert_eq!(pause_weight_for("so.."), 2.0);
    assert_eq!(pause_weight_for("note:"), 1.5);
    assert_eq!(pause_weight_for("(aside)"), 1.0);
}

#[test]
fn segment_splits_on_whitespace_runs() {
    let words = segment("  One\ttwo \n\n three.  ");
    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["One", "two", "three."]);
    assert_eq!(words[2].pause_weight, 2.0);
    assert_eq!(words[2].focal_index, 3);
}

#[test]
fn segment_blank_input_is_empty() {
    assert!(segment("").is_empty());
    assert!(segment(" \t\n ").is_empty());
}

#[test]
fn segment_is_idempotent() {
    let text = "Speed reading, is a skill! Practice: daily?";
    assert_eq!(segment(text), segment(text));
}

#[test]
fn focal_index_stays_inside_every_token() {
    for w in segment("a an the word wordy longer lengthier superlongword ü ßß") {
        assert!(w.focal_index < w.text.chars().count(), "{}", w.text);
        assert!(w.pause_weight >= 1.0);
    }
}

#[test]
fn split_word_around_focal_char() {
    let unit = WordUnit::new("reading");
    let parts = split_word(&unit);
    assert_eq!(parts.prefix, "rea");
    assert_eq!(parts.focal, "d");
    assert_eq!(parts.suffix, "ing");

    let unit = WordUnit::new("a");
    let single = split_word(&unit);
    assert_eq!(single, WordParts { prefix: "", focal: "a", suffix: "" });
}

#[test]
fn split_word_respects_multibyte_chars() {
    let unit = WordUnit::new("größte");
    let parts = split_word(&unit);
    assert_eq!(parts.prefix, "grö");
    assert_eq!(parts.focal, "ß");
    assert_eq!(parts.suffix, "te");
}

#[test]
fn split_word_with_out_of_range_index_has_empty_focal() {
    let unit = WordUnit {
        text: "ab".to_string(),
        focal_index: 5,
        pause_weight: 1.0,
    };
    let parts = split_word(&unit);
    assert_eq!(parts.prefix, "ab");
    assert_eq!(parts.focal, "");
    assert_eq!(parts.suffix, "");
}
