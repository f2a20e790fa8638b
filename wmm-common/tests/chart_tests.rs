//! Chart engine properties checked across every selectable key

use serde_json::json;
use wmm_common::chords::theory::{FLAT_PREFERRED_KEYS, SHARP_SCALE};
use wmm_common::chords::{
    key_distance, prefers_flats, render_chart, text_to_nashville, transpose_chord,
    transpose_text, DisplayKey, Lyrics, Note, KEY_CHOICES,
};

const CHART: &str = "[Intro] G  D/F#  Em7  Cmaj7\n\
                     [G]Be Thou my [D/F#]vision, O [Em]Lord of my [C]heart\n\
                     N.C.  [Bridge]  Gsus4 G";

fn note(s: &str) -> Note {
    Note::parse(s).unwrap()
}

fn selectable_keys() -> Vec<Note> {
    KEY_CHOICES.iter().filter_map(|k| Note::parse(k)).collect()
}

#[test]
fn test_key_choices_are_parsable() {
    assert_eq!(selectable_keys().len(), KEY_CHOICES.len() - 1);
    assert!(DisplayKey::parse(KEY_CHOICES[KEY_CHOICES.len() - 1]).is_nashville());
}

#[test]
fn test_zero_shift_is_identity_in_every_key() {
    for key in selectable_keys() {
        assert_eq!(transpose_text(CHART, 0, key), CHART, "key {}", key);
    }
}

#[test]
fn test_round_trip_returns_to_original_pitches() {
    let g = note("G");
    for target in selectable_keys() {
        let shift = key_distance(g, target.canonical());
        let there = transpose_text(CHART, shift, target);
        let back = transpose_text(&there, -shift, g);
        assert_eq!(back, CHART, "via {}", target);
    }
}

#[test]
fn test_lyric_words_never_change() {
    let words = "Be Thou my vision, O Lord of my heart; naught be all else to me";
    for key in selectable_keys() {
        for shift in -6..=6 {
            assert_eq!(transpose_text(words, shift, key), words);
        }
        assert_eq!(text_to_nashville(words, key), words);
    }
}

#[test]
fn test_accidental_policy_follows_display_key() {
    for key in selectable_keys() {
        let flats = FLAT_PREFERRED_KEYS.contains(&key);
        assert_eq!(prefers_flats(key), flats, "key {}", key);

        // Every chromatic root rendered for this key uses one accidental kind
        for root in SHARP_SCALE {
            let out = transpose_chord(&root.to_string(), 1, key);
            if flats {
                assert!(!out.contains('#'), "{} in {} gave {}", root, key, out);
            } else {
                assert!(!out.contains('b'), "{} in {} gave {}", root, key, out);
            }
        }
    }
}

#[test]
fn test_nashville_is_independent_of_key_spelling() {
    let lyrics = Lyrics::from_json(json!(["[C#] [F#m] [G#7]", "C#  F#  G#"]));
    let sharp = render_chart(&lyrics, note("C#"), DisplayKey::Nashville);
    let respelled = Lyrics::from_json(json!(["[Db] [Gbm] [Ab7]", "Db  Gb  Ab"]));
    let flat = render_chart(&respelled, note("Db"), DisplayKey::Nashville);

    assert_eq!(sharp, flat);
    assert_eq!(sharp.as_json(), &json!(["[1] [4-] [57]", "1  4  5"]));
}

#[test]
fn test_rendering_every_key_keeps_structure() {
    let lyrics = Lyrics::from_json(json!({
        "verse": ["[G]One", "[C]Two"],
        "chorus": "[D]Three",
    }));
    for choice in KEY_CHOICES {
        let out = render_chart(&lyrics, note("G"), DisplayKey::parse(choice));
        let obj = out.as_json().as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["verse"].as_array().map(Vec::len), Some(2));
        assert!(obj["chorus"].as_str().unwrap().ends_with("Three"));
    }
}
