//! Chord-chart text rewriting
//!
//! Chords appear in lyric text in two forms:
//!
//! - **Tags**: `[G]`, `[D/F#]`, `[Em C]` inline with the words. The tag body
//!   is split on whitespace and every chord inside it rewritten.
//! - **Standalone tokens**: chord lines such as `G   D/F#   Em` written above
//!   the lyrics. A token is a root with an optional accidental, quality,
//!   digits, alteration and slash bass, and must not touch a letter, digit,
//!   `_`, `/`, `#` or `b` on either side.
//!
//! Every chord site is rewritten exactly once. Text that is not a chord is
//! copied through byte for byte.

use super::chord::{is_no_chord, looks_like_chord, respell_chord, transpose_chord};
use super::nashville::chord_to_nashville;
use super::theory::Note;

/// How chord tokens are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// Shift by `semitones`, spelling accidentals for `display_key`
    Transpose { semitones: i32, display_key: Note },
    /// Same pitches, accidentals spelled for `display_key`
    Respell { display_key: Note },
    /// Scale degrees relative to `key`
    Nashville { key: Note },
}

impl ChartMode {
    fn rewrite_chord(&self, token: &str) -> String {
        match *self {
            ChartMode::Transpose {
                semitones,
                display_key,
            } => transpose_chord(token, semitones, display_key),
            ChartMode::Respell { display_key } => respell_chord(token, display_key),
            ChartMode::Nashville { key } => chord_to_nashville(token, key),
        }
    }

    /// Rewrite one whitespace-separated token found inside a `[...]` tag
    fn rewrite_tag_token(&self, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        if is_no_chord(token) || looks_like_chord(token) {
            self.rewrite_chord(token)
        } else {
            token.to_string()
        }
    }
}

/// Characters a standalone chord may not touch
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '/' || c == '#' || c == 'b'
}

fn boundary_after(s: &str, end: usize) -> bool {
    s[end..].chars().next().map_or(true, |c| !is_word_char(c))
}

fn accidental_ends(s: &str, at: usize) -> Vec<usize> {
    match s.as_bytes().get(at) {
        Some(b'#' | b'b') => vec![at + 1, at],
        _ => vec![at],
    }
}

fn quality_ends(s: &str, at: usize) -> Vec<usize> {
    let mut ends: Vec<usize> = ["maj", "min", "m", "dim", "aug", "sus", "add"]
        .iter()
        .filter(|word| s[at..].starts_with(**word))
        .map(|word| at + word.len())
        .collect();
    ends.push(at);
    ends
}

fn alteration_ends(s: &str, at: usize) -> Vec<usize> {
    match s[at..].chars().next() {
        Some(c @ ('#' | '+' | '-' | '°' | 'ø')) => vec![at + c.len_utf8(), at],
        _ => vec![at],
    }
}

fn bass_ends(s: &str, at: usize) -> Vec<usize> {
    let bytes = s.as_bytes();
    match (bytes.get(at), bytes.get(at + 1)) {
        (Some(b'/'), Some(b'A'..=b'G')) => {
            let mut ends = accidental_ends(s, at + 2);
            ends.push(at);
            ends
        }
        _ => vec![at],
    }
}

/// Length of the standalone chord token at the start of `s`, if any
///
/// Candidates are tried longest-first per component, so a shorter token is
/// accepted when only it is followed by a valid boundary (`C+x` yields `C`).
fn match_chord_token(s: &str) -> Option<usize> {
    if !matches!(s.as_bytes().first(), Some(b'A'..=b'G')) {
        return None;
    }
    for after_accidental in accidental_ends(s, 1) {
        for after_quality in quality_ends(s, after_accidental) {
            let digits = s[after_quality..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            for d in (0..=digits).rev() {
                let after_digits = after_quality + d;
                for after_alteration in alteration_ends(s, after_digits) {
                    for end in bass_ends(s, after_alteration) {
                        if boundary_after(s, end) {
                            return Some(end);
                        }
                    }
                }
            }
        }
    }
    None
}

/// Length of a standalone `N.C.` marker at the start of `s`, if any
fn match_no_chord(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'N') {
        return None;
    }
    let mut i = 1;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'C') {
        return None;
    }
    i += 1;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
    }
    boundary_after(s, i).then_some(i)
}

/// Split on whitespace runs, keeping an empty leading/trailing field when
/// the text starts/ends with whitespace
fn split_whitespace_runs(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    if s.starts_with(char::is_whitespace) {
        parts.push("");
    }
    parts.extend(s.split_whitespace());
    if s.ends_with(char::is_whitespace) {
        parts.push("");
    }
    parts
}

fn rewrite_tag(inside: &str, mode: &ChartMode) -> String {
    split_whitespace_runs(inside)
        .into_iter()
        .map(|token| mode.rewrite_tag_token(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrite every chord in `text` according to `mode`
pub fn rewrite_text(text: &str, mode: &ChartMode) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c == '[' {
            if let Some(close) = rest[1..].find(']').filter(|close| *close > 0) {
                out.push('[');
                out.push_str(&rewrite_tag(&rest[1..1 + close], mode));
                out.push(']');
                i += close + 2;
                prev = Some(']');
                continue;
            }
        }

        if !prev.is_some_and(is_word_char) {
            if let Some(len) = match_no_chord(rest) {
                out.push_str(&rest[..len]);
                i += len;
                prev = rest[..len].chars().last();
                continue;
            }
            if let Some(len) = match_chord_token(rest) {
                out.push_str(&mode.rewrite_chord(&rest[..len]));
                i += len;
                prev = rest[..len].chars().last();
                continue;
            }
        }

        out.push(c);
        i += c.len_utf8();
        prev = Some(c);
    }

    out
}

/// Transpose every chord in `text` by `semitones`
pub fn transpose_text(text: &str, semitones: i32, display_key: Note) -> String {
    rewrite_text(
        text,
        &ChartMode::Transpose {
            semitones,
            display_key,
        },
    )
}

/// Rewrite every chord in `text` as Nashville numbers relative to `key`
pub fn text_to_nashville(text: &str, key: Note) -> String {
    rewrite_text(text, &ChartMode::Nashville { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        Note::parse(s).unwrap()
    }

    #[test]
    fn test_inline_tags_transposed_once() {
        let out = transpose_text("[G]Amazing [D/F#]grace", 2, n("A"));
        assert_eq!(out, "[A]Amazing [E/G#]grace");
        assert_eq!(transpose_text("[C]", 2, n("D")), "[D]");
    }

    #[test]
    fn test_chord_line_transposed() {
        let out = transpose_text("G    D/F#   Em   C", 2, n("A"));
        assert_eq!(out, "A    E/G#   F#m   D");
    }

    #[test]
    fn test_lyric_words_untouched() {
        let text = "Be Thou my vision, O Lord of my heart; Abide with me";
        assert_eq!(transpose_text(text, 5, n("F")), text);
        assert_eq!(text_to_nashville(text, n("C")), text);
    }

    #[test]
    fn test_section_tags_untouched() {
        let text = "[Chorus]\n[Verse 1] [Bridge]";
        assert_eq!(transpose_text(text, 3, n("Eb")), text);
        assert_eq!(text_to_nashville(text, n("G")), text);
    }

    #[test]
    fn test_tag_whitespace_runs_collapse() {
        assert_eq!(transpose_text("[C  G]", 2, n("D")), "[D A]");
        assert_eq!(transpose_text("[ C ]", 2, n("D")), "[ D ]");
    }

    #[test]
    fn test_empty_and_unclosed_brackets() {
        assert_eq!(transpose_text("[]C", 2, n("D")), "[]D");
        assert_eq!(transpose_text("[C", 2, n("D")), "[D");
    }

    #[test]
    fn test_shorter_token_when_boundary_requires_it() {
        assert_eq!(transpose_text("C+x", 2, n("D")), "D+x");
        assert_eq!(transpose_text("Dm7b5", 2, n("E")), "Dm7b5");
    }

    #[test]
    fn test_no_chord_preserved() {
        assert_eq!(transpose_text("G N.C. D", 2, n("A")), "A N.C. E");
        assert_eq!(transpose_text("[N.C.]", 2, n("A")), "[N.C.]");
        assert_eq!(text_to_nashville("[NC]", n("A")), "[N.C.]");
    }

    #[test]
    fn test_standalone_no_chord_kept_verbatim_in_nashville() {
        assert_eq!(text_to_nashville("G NC D", n("C")), "5 NC 2");
        assert_eq!(text_to_nashville("G N.C. D", n("C")), "5 N.C. 2");
    }

    #[test]
    fn test_nashville_chart() {
        let out = text_to_nashville("[G] [D/F#] [Em7] [C]", n("G"));
        assert_eq!(out, "[1] [5/7] [6-7] [4]");
        assert_eq!(text_to_nashville("G  C/G  D", n("G")), "1  4/1  5");
    }

    #[test]
    fn test_nashville_independent_of_key_spelling_and_octave() {
        let a = text_to_nashville("[Db] [Gb] [Ab7]", n("Db"));
        let b = text_to_nashville("[C#] [F#] [G#7]", n("C#"));
        assert_eq!(a, "[1] [4] [57]");
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip_restores_spelling() {
        let original = "G D/F# Em C";
        let up = transpose_text(original, 3, n("Bb"));
        assert_eq!(up, "Bb F/A Gm Eb");
        let back = transpose_text(&up, -3, n("G"));
        assert_eq!(back, original);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let text = "[G]Holy, [C/G]holy, [D]holy\nG   Em   C   D";
        assert_eq!(transpose_text(text, 0, n("G")), text);
    }

    #[test]
    fn test_respell_mode() {
        let mode = ChartMode::Respell { display_key: n("Db") };
        assert_eq!(rewrite_text("[C#] G#m  F#/A#", &mode), "[Db] Abm  Gb/Bb");
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let text = "Señor [C]ten piedad — Kyrie C°";
        assert_eq!(transpose_text(text, 2, n("D")), "Señor [D]ten piedad — Kyrie D°");
    }
}
