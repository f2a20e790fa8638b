//! Music-theory lookup tables and note spelling
//!
//! Everything the chart engine knows about pitch lives in the constant
//! tables below. Notes are compared by pitch class (0 = C .. 11 = B) and
//! re-spelled from either the sharp or the flat chromatic scale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accidental attached to a note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn as_str(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A spelled note name such as `C`, `F#` or `Bb`
///
/// The letter is always stored upper-case. Spelling is preserved, so `C#`
/// and `Db` are different values with the same [`Note::pitch_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    letter: char,
    accidental: Accidental,
}

impl Note {
    pub const C: Note = Note::new('C', Accidental::Natural);

    /// Build a note from parts. `letter` must be an upper-case `A`..`G`.
    pub const fn new(letter: char, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    /// Parse a bare note name (`^[A-Ga-g][#b]?$` after trimming)
    ///
    /// # Examples
    ///
    /// ```
    /// use wmm_common::chords::Note;
    ///
    /// assert_eq!(Note::parse(" eb ").unwrap().to_string(), "Eb");
    /// assert!(Note::parse("H").is_none());
    /// assert!(Note::parse("C#m").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Note> {
        let (note, consumed) = Note::parse_prefix(s.trim())?;
        if consumed == s.trim().len() {
            Some(note)
        } else {
            None
        }
    }

    /// Parse a note at the start of `s`, returning it with the number of
    /// bytes consumed. The accidental is taken greedily.
    pub fn parse_prefix(s: &str) -> Option<(Note, usize)> {
        let bytes = s.as_bytes();
        let letter = match bytes.first()? {
            b @ (b'A'..=b'G' | b'a'..=b'g') => b.to_ascii_uppercase() as char,
            _ => return None,
        };
        match bytes.get(1) {
            Some(b'#') => Some((Note::new(letter, Accidental::Sharp), 2)),
            Some(b'b') => Some((Note::new(letter, Accidental::Flat), 2)),
            _ => Some((Note::new(letter, Accidental::Natural), 1)),
        }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    /// Fold the rare spellings (`B#`, `E#`, `Cb`, `Fb`) onto their naturals
    pub fn canonical(self) -> Note {
        ENHARMONIC_FOLDS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(self)
    }

    /// Position of the note in the chromatic scale, 0 = C
    pub fn pitch_class(self) -> u8 {
        let canon = self.canonical();
        SHARP_SCALE
            .iter()
            .position(|n| *n == canon)
            .or_else(|| FLAT_SCALE.iter().position(|n| *n == canon))
            .map(|idx| idx as u8)
            .unwrap_or(0)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.accidental.as_str())
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

impl TryFrom<String> for Note {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Note::parse(&value).ok_or_else(|| format!("not a note name: {:?}", value))
    }
}

const fn natural(letter: char) -> Note {
    Note::new(letter, Accidental::Natural)
}

const fn sharp(letter: char) -> Note {
    Note::new(letter, Accidental::Sharp)
}

const fn flat(letter: char) -> Note {
    Note::new(letter, Accidental::Flat)
}

/// Chromatic scale spelled with sharps
pub const SHARP_SCALE: [Note; 12] = [
    natural('C'), sharp('C'), natural('D'), sharp('D'), natural('E'), natural('F'),
    sharp('F'), natural('G'), sharp('G'), natural('A'), sharp('A'), natural('B'),
];

/// Chromatic scale spelled with flats
pub const FLAT_SCALE: [Note; 12] = [
    natural('C'), flat('D'), natural('D'), flat('E'), natural('E'), natural('F'),
    flat('G'), natural('G'), flat('A'), natural('A'), flat('B'), natural('B'),
];

/// Spellings that sit on a natural and are folded onto it
pub const ENHARMONIC_FOLDS: [(Note, Note); 4] = [
    (sharp('B'), natural('C')),
    (sharp('E'), natural('F')),
    (flat('C'), natural('B')),
    (flat('F'), natural('E')),
];

/// Keys whose charts are spelled with flats
pub const FLAT_PREFERRED_KEYS: [Note; 7] = [
    natural('F'), flat('B'), flat('E'), flat('A'), flat('D'), flat('G'), flat('C'),
];

/// Semitone offsets of major-scale degrees 1..7
pub const MAJOR_SCALE_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Keys offered by the chart view, `NN` selects Nashville numbers
pub const KEY_CHOICES: [&str; 16] = [
    "Ab", "A", "Bb", "B", "Cb", "C", "C#", "Db", "D", "Eb", "E", "F", "F#", "Gb", "G", "NN",
];

/// Enharmonic twins shown next to a selected key
pub const ENHARMONIC_PAIRS: [(Note, Note); 5] = [
    (sharp('A'), flat('B')),
    (sharp('C'), flat('D')),
    (sharp('D'), flat('E')),
    (sharp('F'), flat('G')),
    (sharp('G'), flat('A')),
];

/// Name a pitch class from the flat or the sharp scale
pub fn spell(pitch_class: i32, prefer_flats: bool) -> Note {
    let idx = pitch_class.rem_euclid(12) as usize;
    if prefer_flats {
        FLAT_SCALE[idx]
    } else {
        SHARP_SCALE[idx]
    }
}

/// Move a note by `semitones` and spell the result
pub fn transpose_note(note: Note, semitones: i32, prefer_flats: bool) -> Note {
    spell(note.pitch_class() as i32 + semitones, prefer_flats)
}
