//! Nashville Number System conversion
//!
//! Chords are written as major-scale degrees of the song key: in G, `G`
//! is `1`, `Em` is `6-`, `D/F#` is `5/7`. Notes between degrees get a
//! `#`/`b` prefix on the nearest degree.

use super::chord::{is_no_chord, Bass, ChordSymbol};
use super::theory::{Note, MAJOR_SCALE_SEMITONES};

/// A scale degree label and its signed distance from the exact degree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degree {
    pub label: String,
    pub offset: i32,
}

/// Scale degree of `note` in `key`
///
/// Ties between two degrees resolve to the lower one, so chromatic notes
/// are labelled as raised degrees (`#4`, not `b5`).
pub fn degree_for_note(note: Note, key: Note) -> Degree {
    let rel = (note.pitch_class() as i32 - key.pitch_class() as i32).rem_euclid(12);

    let mut best_degree = 0;
    let mut best_diff: i32 = 99;
    for (i, target) in MAJOR_SCALE_SEMITONES.iter().enumerate() {
        let mut diff = rel - target;
        if diff > 6 {
            diff -= 12;
        }
        if diff < -6 {
            diff += 12;
        }
        if diff.abs() < best_diff.abs() {
            best_diff = diff;
            best_degree = i + 1;
        }
    }

    let accidental = match best_diff {
        0 => "",
        d if d < 0 => "b",
        _ => "#",
    };
    Degree {
        label: format!("{}{}", accidental, best_degree),
        offset: best_diff,
    }
}

/// Minor unless the `m` is part of `maj`; the `m` must open the quality or
/// follow a non-letter
fn is_minor(quality: &str) -> bool {
    let bytes = quality.as_bytes();
    bytes.iter().enumerate().any(|(i, b)| {
        *b == b'm'
            && (i == 0 || !bytes[i - 1].is_ascii_alphabetic())
            && !quality[i + 1..].starts_with("aj")
    })
}

/// Drop a leading minor `m` (but not `maj`) from the quality
fn extension(quality: &str) -> &str {
    match quality.strip_prefix('m') {
        Some(rest) if !rest.starts_with("aj") => rest,
        _ => quality,
    }
}

/// Convert one chord token to Nashville notation relative to `key`
///
/// # Examples
///
/// ```
/// use wmm_common::chords::{chord_to_nashville, Note};
///
/// let g = Note::parse("G").unwrap();
/// assert_eq!(chord_to_nashville("Em7", g), "6-7");
/// assert_eq!(chord_to_nashville("D/F#", g), "5/7");
/// ```
pub fn chord_to_nashville(token: &str, key: Note) -> String {
    if token.trim().is_empty() || is_no_chord(token) {
        return "N.C.".to_string();
    }
    let Some(chord) = ChordSymbol::parse(token) else {
        return token.to_string();
    };

    let degree = degree_for_note(chord.root, key);
    let minor = if is_minor(chord.quality) { "-" } else { "" };
    let base = format!("{}{}{}", degree.label, minor, extension(chord.quality));

    match chord.bass {
        Some(Bass::Note { note, suffix }) => {
            format!("{}/{}{}", base, degree_for_note(note, key).label, suffix)
        }
        Some(Bass::Text(text)) => format!("{}/{}", base, text),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        Note::parse(s).unwrap()
    }

    #[test]
    fn test_diatonic_degrees_in_c() {
        let c = n("C");
        let labels: Vec<String> = ["C", "D", "E", "F", "G", "A", "B"]
            .iter()
            .map(|s| degree_for_note(n(s), c).label)
            .collect();
        assert_eq!(labels, ["1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_chromatic_degrees_take_sharps() {
        let c = n("C");
        assert_eq!(degree_for_note(n("C#"), c).label, "#1");
        assert_eq!(degree_for_note(n("Eb"), c).label, "#2");
        assert_eq!(degree_for_note(n("F#"), c).label, "#4");
        assert_eq!(degree_for_note(n("Ab"), c).label, "#5");
        assert_eq!(degree_for_note(n("Bb"), c).label, "#6");
        assert_eq!(degree_for_note(n("Bb"), c).offset, 1);
    }

    #[test]
    fn test_degrees_ignore_key_spelling() {
        assert_eq!(degree_for_note(n("Gb"), n("Db")).label, "4");
        assert_eq!(degree_for_note(n("F#"), n("C#")).label, "4");
        assert_eq!(degree_for_note(n("B"), n("Cb")).label, "1");
    }

    #[test]
    fn test_minor_detection() {
        assert!(is_minor("m"));
        assert!(is_minor("m7"));
        assert!(is_minor("7(m)"));
        assert!(!is_minor("maj7"));
        assert!(!is_minor("dim"));
        assert!(!is_minor("sus4"));
    }

    #[test]
    fn test_chord_to_nashville() {
        let d = n("D");
        assert_eq!(chord_to_nashville("D", d), "1");
        assert_eq!(chord_to_nashville("Bm", d), "6-");
        assert_eq!(chord_to_nashville("Gmaj7", d), "4maj7");
        assert_eq!(chord_to_nashville("A7sus4", d), "57sus4");
        assert_eq!(chord_to_nashville("Em/G", d), "2-/4");
        assert_eq!(chord_to_nashville("C", d), "#6");
    }

    #[test]
    fn test_nashville_special_tokens() {
        let c = n("C");
        assert_eq!(chord_to_nashville("N.C.", c), "N.C.");
        assert_eq!(chord_to_nashville("nc", c), "N.C.");
        assert_eq!(chord_to_nashville("", c), "N.C.");
        assert_eq!(chord_to_nashville("xyz", c), "xyz");
        assert_eq!(chord_to_nashville("G/x", c), "5/x");
    }
}
