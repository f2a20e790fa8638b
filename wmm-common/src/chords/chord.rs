//! Chord symbols: parsing and transposition
//!
//! A chord symbol is `root quality [/ bass]`, e.g. `F#m7`, `G/B`,
//! `Bbmaj7/D`. Only the root and the bass note move when transposing;
//! the quality text is carried through untouched.

use super::key::prefers_flats;
use super::theory::{transpose_note, Note};

/// Bass part of a slash chord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bass<'a> {
    /// A bass note with any trailing text (`B`, `F#`, `E7`)
    Note { note: Note, suffix: &'a str },
    /// Text after the slash that does not start with a note
    Text(&'a str),
}

/// A parsed chord token, borrowing the quality and bass text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordSymbol<'a> {
    pub root: Note,
    pub quality: &'a str,
    pub bass: Option<Bass<'a>>,
}

impl<'a> ChordSymbol<'a> {
    /// Parse `token` (trimmed). Returns `None` unless it starts with a note.
    pub fn parse(token: &'a str) -> Option<Self> {
        let token = token.trim();
        let (root, consumed) = Note::parse_prefix(token)?;
        let rest = &token[consumed..];

        let (quality, bass) = match rest.find('/') {
            Some(idx) => {
                let slash = &rest[idx + 1..];
                let bass = match Note::parse_prefix(slash) {
                    Some((note, used)) => Bass::Note {
                        note,
                        suffix: &slash[used..],
                    },
                    None => Bass::Text(slash),
                };
                (&rest[..idx], Some(bass))
            }
            None => (rest, None),
        };

        Some(Self {
            root,
            quality,
            bass,
        })
    }

    /// Render the chord with new root and bass notes
    fn render(&self, root: Note, bass_note: Option<Note>) -> String {
        let mut out = format!("{}{}", root, self.quality);
        match (self.bass, bass_note) {
            (Some(Bass::Note { suffix, .. }), Some(note)) => {
                out.push('/');
                out.push_str(&note.to_string());
                out.push_str(suffix);
            }
            (Some(Bass::Text(text)), _) => {
                out.push('/');
                out.push_str(text);
            }
            _ => {}
        }
        out
    }
}

/// `N.C.`, `NC`, `n.c` and friends: the "no chord" marker
pub fn is_no_chord(token: &str) -> bool {
    let t = token.trim().to_ascii_uppercase();
    let t = t.strip_prefix('N').unwrap_or("");
    let t = t.strip_prefix('.').unwrap_or(t);
    let Some(t) = t.strip_prefix('C') else {
        return false;
    };
    t.is_empty() || t == "."
}

/// Transpose one chord token by `semitones`, spelling for `display_key`
///
/// Empty tokens, `N.C.` and anything that does not start with a note are
/// returned unchanged, as is every token when the shift is a whole number
/// of octaves.
///
/// # Examples
///
/// ```
/// use wmm_common::chords::{transpose_chord, Note};
///
/// let d = Note::parse("D").unwrap();
/// assert_eq!(transpose_chord("G/B", 2, d), "A/C#");
/// assert_eq!(transpose_chord("N.C.", 2, d), "N.C.");
/// assert_eq!(transpose_chord("F#m", 0, Note::parse("Bb").unwrap()), "F#m");
/// ```
pub fn transpose_chord(token: &str, semitones: i32, display_key: Note) -> String {
    if semitones.rem_euclid(12) == 0 {
        return token.to_string();
    }
    shift_chord(token, semitones, display_key)
}

/// Re-spell a chord's notes for `display_key` without moving them
///
/// Used when a chart is shown in the enharmonic twin of its key (`C#`
/// charts shown in `Db`).
pub fn respell_chord(token: &str, display_key: Note) -> String {
    shift_chord(token, 0, display_key)
}

fn shift_chord(token: &str, semitones: i32, display_key: Note) -> String {
    if token.trim().is_empty() || is_no_chord(token) {
        return token.to_string();
    }
    let Some(chord) = ChordSymbol::parse(token) else {
        return token.to_string();
    };

    let flats = prefers_flats(display_key);
    let root = transpose_note(chord.root, semitones, flats);
    let bass = match chord.bass {
        Some(Bass::Note { note, .. }) => Some(transpose_note(note, semitones, flats)),
        _ => None,
    };
    chord.render(root, bass)
}

const QUALITY_WORDS: [&str; 11] = [
    "maj", "Maj", "min", "dim", "aug", "sus", "add", "alt", "no", "m", "M",
];

const QUALITY_CHARS: &str = "0123456789#b+-°ø^Δ(),";

fn is_quality_text(mut s: &str) -> bool {
    while !s.is_empty() {
        if let Some(word) = QUALITY_WORDS.iter().find(|w| s.starts_with(**w)) {
            s = &s[word.len()..];
            continue;
        }
        match s.chars().next() {
            Some(c) if QUALITY_CHARS.contains(c) => s = &s[c.len_utf8()..],
            _ => return false,
        }
    }
    true
}

/// Strict recogniser for tokens inside `[...]` tags
///
/// Accepts a note followed only by chord-quality text, so `[Am7]` and
/// `[D/F#]` are chords while `[Chorus]` and `[Bridge]` are not.
pub fn looks_like_chord(token: &str) -> bool {
    let Some(chord) = ChordSymbol::parse(token) else {
        return false;
    };
    if !is_quality_text(chord.quality) {
        return false;
    }
    match chord.bass {
        None => true,
        Some(Bass::Note { suffix, .. }) => is_quality_text(suffix),
        Some(Bass::Text(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        Note::parse(s).unwrap()
    }

    #[test]
    fn test_parse_slash_chord() {
        let chord = ChordSymbol::parse("Bbmaj7/D").unwrap();
        assert_eq!(chord.root, n("Bb"));
        assert_eq!(chord.quality, "maj7");
        assert_eq!(
            chord.bass,
            Some(Bass::Note {
                note: n("D"),
                suffix: ""
            })
        );
    }

    #[test]
    fn test_parse_keeps_unparsable_bass_text() {
        let chord = ChordSymbol::parse("C/x9").unwrap();
        assert_eq!(chord.bass, Some(Bass::Text("x9")));
        assert_eq!(transpose_chord("C/x9", 2, n("D")), "D/x9");
    }

    #[test]
    fn test_no_chord_marker() {
        for t in ["N.C.", "NC", "n.c.", "N.C", "NC."] {
            assert!(is_no_chord(t), "{}", t);
        }
        for t in ["N", "C", "NCC", "N..C", "Nc7"] {
            assert!(!is_no_chord(t), "{}", t);
        }
    }

    #[test]
    fn test_transpose_up_with_sharps() {
        let e = n("E");
        assert_eq!(transpose_chord("C", 4, e), "E");
        assert_eq!(transpose_chord("Am7", 4, e), "C#m7");
        assert_eq!(transpose_chord("F/A", 4, e), "A/C#");
    }

    #[test]
    fn test_transpose_flat_roots_move_from_their_own_pitch() {
        let f = n("F");
        assert_eq!(transpose_chord("Bb", 2, n("D")), "C");
        assert_eq!(transpose_chord("Eb/G", -2, f), "Db/F");
    }

    #[test]
    fn test_transpose_spells_flats_for_flat_keys() {
        let bb = n("Bb");
        assert_eq!(transpose_chord("C", -2, bb), "Bb");
        assert_eq!(respell_chord("G#dim", bb), "Abdim");
        assert_eq!(transpose_chord("D/F#", -2, bb), "C/E");
    }

    #[test]
    fn test_transpose_zero_is_identity_for_key_spelling() {
        let g = n("G");
        for chord in ["G", "Em7", "Cadd9", "D/F#", "Asus4"] {
            assert_eq!(transpose_chord(chord, 0, g), chord);
        }
        assert_eq!(transpose_chord("F#m", 12, n("Eb")), "F#m");
        assert_eq!(transpose_chord("F#m", -12, n("Eb")), "F#m");
    }

    #[test]
    fn test_transpose_leaves_non_chords() {
        let d = n("D");
        assert_eq!(transpose_chord("", 2, d), "");
        assert_eq!(transpose_chord("x", 2, d), "x");
        assert_eq!(transpose_chord("NC", 2, d), "NC");
    }

    #[test]
    fn test_looks_like_chord() {
        for t in ["C", "Am7", "D/F#", "F#m7b5", "Gsus4", "Cmaj9(#11)", "Bb°", "Eø7", "C7/E"] {
            assert!(looks_like_chord(t), "{}", t);
        }
        for t in ["Chorus", "Bridge", "Verse", "End", "Ab-ba", "C/x"] {
            assert!(!looks_like_chord(t), "{}", t);
        }
    }
}
