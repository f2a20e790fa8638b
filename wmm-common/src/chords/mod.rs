//! Chord chart engine
//!
//! Transposes chord charts between keys and converts them to Nashville
//! numbers. The engine is pure: text in, text out, no I/O.
//!
//! - [`theory`]: constant music-theory tables and [`Note`]
//! - [`key`]: key normalization, distance and the [`DisplayKey`] selector
//! - [`chord`]: chord symbol parsing and transposition
//! - [`nashville`]: scale-degree conversion
//! - [`text`]: finding chords inside lyric text
//! - [`lyrics`]: JSON lyric documents and [`render_chart`]

pub mod chord;
pub mod key;
pub mod lyrics;
pub mod nashville;
pub mod text;
pub mod theory;

pub use chord::{
    is_no_chord, looks_like_chord, respell_chord, transpose_chord, Bass, ChordSymbol,
};
pub use key::{
    enharmonic_twin, key_distance, keys_equal, normalize_key, prefers_flats, DisplayKey,
};
pub use lyrics::{chart_mode, render_chart, Lyrics};
pub use nashville::{chord_to_nashville, degree_for_note, Degree};
pub use text::{rewrite_text, text_to_nashville, transpose_text, ChartMode};
pub use theory::{transpose_note, Accidental, Note, KEY_CHOICES};
