//! wmm-chart - render a chord chart in another key from the command line
//!
//! Reads a chart from a file (or stdin) and prints it in the target key or
//! as Nashville numbers. Input that parses as JSON (a string, an array of
//! lines or an object of sections) is rendered as a lyric document and
//! printed as JSON; anything else is treated as plain chart text.
//!
//! ```text
//! wmm-chart --from G --to Bb song.txt
//! wmm-chart --from D --to NN < song.json
//! ```

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wmm_common::chords::{normalize_key, render_chart, DisplayKey, Lyrics, Note, KEY_CHOICES};

#[derive(Parser, Debug)]
#[command(name = "wmm-chart")]
#[command(about = "Transpose a chord chart or convert it to Nashville numbers")]
#[command(version)]
struct Args {
    /// Key the chart is written in
    #[arg(short, long)]
    from: String,

    /// Target key, or NN for Nashville numbers
    #[arg(short, long)]
    to: String,

    /// Chart file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Treat the input as plain text even if it parses as JSON
    #[arg(long)]
    text: bool,
}

fn parse_key_arg(name: &str, value: &str) -> Result<()> {
    let known = KEY_CHOICES.iter().any(|k| k.eq_ignore_ascii_case(value.trim()))
        || Note::parse(value).is_some();
    if !known {
        bail!(
            "Unknown {} key '{}'; expected one of {}",
            name,
            value,
            KEY_CHOICES.join(", ")
        );
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn render(input: &str, original: Note, display: DisplayKey, force_text: bool) -> Result<String> {
    let document = if force_text {
        None
    } else {
        serde_json::from_str::<Value>(input)
            .ok()
            .filter(|v| v.is_string() || v.is_array() || v.is_object())
    };

    match document {
        Some(value) => {
            debug!("Rendering JSON lyric document");
            let rendered = render_chart(&Lyrics::from_json(value), original, display);
            let mut out = serde_json::to_string_pretty(&rendered)?;
            out.push('\n');
            Ok(out)
        }
        None => {
            debug!("Rendering plain chart text");
            let rendered = render_chart(&Lyrics::from_text(input), original, display);
            Ok(rendered.as_json().as_str().unwrap_or(input).to_string())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    parse_key_arg("source", &args.from)?;
    parse_key_arg("target", &args.to)?;
    if DisplayKey::parse(&args.from).is_nashville() {
        bail!("Source key cannot be NN");
    }

    let original = normalize_key(&args.from);
    let display = DisplayKey::parse(&args.to);
    let target = &display;
    debug!("Rendering from {} to {}", original, target);

    let input = read_input(args.input.as_ref())?;
    let output = render(&input, original, display, args.text)?;

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Note {
        Note::parse(s).unwrap()
    }

    #[test]
    fn test_plain_text_round() {
        let out = render("G  C  D\n[G]Amen", n("G"), DisplayKey::parse("A"), false).unwrap();
        assert_eq!(out, "A  D  E\n[A]Amen");
    }

    #[test]
    fn test_json_document() {
        let out = render(r#"{"raw": "[C]Hi"}"#, n("C"), DisplayKey::Nashville, false).unwrap();
        assert_eq!(out, "\"[1]Hi\"\n");
    }

    #[test]
    fn test_force_text_skips_json_decoding() {
        let out = render(r#""[C]""#, n("C"), DisplayKey::parse("D"), true).unwrap();
        assert_eq!(out, r#""[D]""#);
        let out = render(r#""[C]""#, n("C"), DisplayKey::parse("D"), false).unwrap();
        assert_eq!(out, "\"[D]\"\n");
    }

    #[test]
    fn test_key_validation() {
        assert!(parse_key_arg("target", "nn").is_ok());
        assert!(parse_key_arg("target", "F#").is_ok());
        assert!(parse_key_arg("target", "H").is_err());
    }
}
