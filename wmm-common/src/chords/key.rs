//! Song keys and the key selector
//!
//! A key is a [`Note`]. Distances and comparisons work on the
//! enharmonically folded key; the spelling the user picked only decides
//! whether the transposed chart uses flats or sharps.

use super::theory::{Note, ENHARMONIC_PAIRS, FLAT_PREFERRED_KEYS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a key name; anything unparsable becomes `C`
pub fn normalize_key(key: &str) -> Note {
    Note::parse(key).map(Note::canonical).unwrap_or(Note::C)
}

/// Whether two keys name the same tonic
pub fn keys_equal(a: Note, b: Note) -> bool {
    a.canonical() == b.canonical()
}

/// Signed shortest distance from one key to another, within `[-6, 6]`
///
/// # Examples
///
/// ```
/// use wmm_common::chords::{key_distance, Note};
///
/// let c = Note::parse("C").unwrap();
/// assert_eq!(key_distance(c, Note::parse("D").unwrap()), 2);
/// assert_eq!(key_distance(c, Note::parse("Bb").unwrap()), -2);
/// ```
pub fn key_distance(from: Note, to: Note) -> i32 {
    let mut d = to.pitch_class() as i32 - from.pitch_class() as i32;
    if d > 6 {
        d -= 12;
    }
    if d < -6 {
        d += 12;
    }
    d
}

/// Whether a chart in `key` should be spelled with flats
pub fn prefers_flats(key: Note) -> bool {
    FLAT_PREFERRED_KEYS.contains(&key)
}

/// The enharmonic twin of a key (`C#` ↔ `Db`), if it has a common one
pub fn enharmonic_twin(key: Note) -> Option<Note> {
    ENHARMONIC_PAIRS.iter().find_map(|(a, b)| {
        if *a == key {
            Some(*b)
        } else if *b == key {
            Some(*a)
        } else {
            None
        }
    })
}

/// Key chosen in the chart view: a concrete key, or Nashville numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisplayKey {
    Key(Note),
    Nashville,
}

impl DisplayKey {
    /// Parse a selector value. `NN` (any case) is Nashville; an
    /// unparsable key falls back to `C`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("NN") {
            DisplayKey::Nashville
        } else {
            DisplayKey::Key(Note::parse(s).unwrap_or(Note::C))
        }
    }

    pub fn is_nashville(&self) -> bool {
        matches!(self, DisplayKey::Nashville)
    }

    /// Enharmonic hint for the selector; none in Nashville mode
    pub fn enharmonic_label(&self) -> Option<Note> {
        match self {
            DisplayKey::Key(note) => enharmonic_twin(*note),
            DisplayKey::Nashville => None,
        }
    }
}

impl fmt::Display for DisplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayKey::Key(note) => write!(f, "{}", note),
            DisplayKey::Nashville => f.write_str("NN"),
        }
    }
}

impl From<String> for DisplayKey {
    fn from(s: String) -> Self {
        DisplayKey::parse(&s)
    }
}

impl From<DisplayKey> for String {
    fn from(key: DisplayKey) -> Self {
        key.to_string()
    }
}
