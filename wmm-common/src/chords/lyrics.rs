//! Lyric documents and chart rendering
//!
//! Lyrics are stored as JSON in one of three shapes:
//!
//! - a single string (`"[G]Amazing grace..."`)
//! - an array of lines
//! - an object of named sections, each a string or an array of lines
//!
//! Older rows wrap the string as `{"raw": "..."}` or store the JSON itself
//! as an encoded string; [`Lyrics::from_json`] unwraps both.

use super::key::{key_distance, keys_equal, DisplayKey};
use super::text::{rewrite_text, ChartMode};
use super::theory::Note;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A lyric document (see module docs for accepted shapes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lyrics(Value);

impl Lyrics {
    /// Normalize a stored lyrics value
    pub fn from_json(value: Value) -> Self {
        let value = match value {
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(decoded @ (Value::String(_) | Value::Array(_) | Value::Object(_))) => decoded,
                _ => Value::String(s),
            },
            other => other,
        };
        let value = match value {
            Value::Object(mut map) if matches!(map.get("raw"), Some(Value::String(_))) => {
                map.remove("raw").unwrap_or(Value::Null)
            }
            other => other,
        };
        Lyrics(value)
    }

    /// Plain-text lyrics as entered in the song form
    pub fn from_text(text: &str) -> Self {
        Lyrics(Value::String(text.to_string()))
    }

    /// Storage form for a new song: `{"raw": "..."}`, or `None` when blank
    pub fn storage_value(text: &str) -> Option<Value> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            let mut map = Map::new();
            map.insert("raw".to_string(), Value::String(trimmed.to_string()));
            Some(Value::Object(map))
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// Whether there is anything to show
    pub fn has_content(&self) -> bool {
        match &self.0 {
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(lines) => !lines.is_empty(),
            Value::Object(sections) => !sections.is_empty(),
            _ => false,
        }
    }

    /// Rewrite every chord in the document; non-string entries pass through
    pub fn rewrite(&self, mode: &ChartMode) -> Lyrics {
        let rewrite_lines = |lines: &Vec<Value>| -> Value {
            Value::Array(
                lines
                    .iter()
                    .map(|line| match line {
                        Value::String(s) => Value::String(rewrite_text(s, mode)),
                        other => other.clone(),
                    })
                    .collect(),
            )
        };

        let value = match &self.0 {
            Value::String(s) => Value::String(rewrite_text(s, mode)),
            Value::Array(lines) => rewrite_lines(lines),
            Value::Object(sections) => Value::Object(
                sections
                    .iter()
                    .map(|(name, block)| {
                        let block = match block {
                            Value::Array(lines) => rewrite_lines(lines),
                            Value::String(s) => Value::String(rewrite_text(s, mode)),
                            other => other.clone(),
                        };
                        (name.clone(), block)
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        Lyrics(value)
    }
}

/// Chart rewrite needed to show a song written in `original_key` in `display`
///
/// `None` means the chart is shown as written.
pub fn chart_mode(original_key: Note, display: DisplayKey) -> Option<ChartMode> {
    match display {
        DisplayKey::Nashville => Some(ChartMode::Nashville { key: original_key }),
        DisplayKey::Key(target) if keys_equal(original_key, target) => None,
        DisplayKey::Key(target) => match key_distance(original_key, target.canonical()) {
            0 => Some(ChartMode::Respell {
                display_key: target,
            }),
            semitones => Some(ChartMode::Transpose {
                semitones,
                display_key: target,
            }),
        },
    }
}

/// Render `lyrics` (written in `original_key`) for the selected key
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wmm_common::chords::{render_chart, DisplayKey, Lyrics, Note};
///
/// let lyrics = Lyrics::from_json(json!({"raw": "[C]Holy [F]holy"}));
/// let c = Note::parse("C").unwrap();
///
/// let in_d = render_chart(&lyrics, c, DisplayKey::parse("D"));
/// assert_eq!(in_d.as_json(), &json!("[D]Holy [G]holy"));
///
/// let numbers = render_chart(&lyrics, c, DisplayKey::parse("NN"));
/// assert_eq!(numbers.as_json(), &json!("[1]Holy [4]holy"));
/// ```
pub fn render_chart(lyrics: &Lyrics, original_key: Note, display: DisplayKey) -> Lyrics {
    match chart_mode(original_key, display) {
        Some(mode) => lyrics.rewrite(&mode),
        None => lyrics.clone(),
    }
}
