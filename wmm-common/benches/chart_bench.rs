//! Chart rewriting throughput
//!
//! A worship set is a handful of songs of a few dozen lines each; rendering
//! one chart should stay well under a millisecond.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use wmm_common::chords::{render_chart, transpose_text, DisplayKey, Lyrics, Note};

const VERSE: &str = "[G]Amazing [G7]grace, how [C]sweet the [G]sound\n\
                     G        D/F#      Em       C\n\
                     That [G]saved a [Em]wretch like [D]me\n\
                     [Chorus] I once was [G]lost, but [C]now am [G]found\n";

fn bench_transpose_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpose_text");
    let text = VERSE.repeat(20);

    for (name, semitones, key) in [("up_2_sharps", 2, "A"), ("up_3_flats", 3, "Bb"), ("zero", 0, "G")] {
        let display = Note::parse(key).unwrap_or(Note::C);
        group.bench_function(BenchmarkId::new("song", name), |b| {
            b.iter(|| black_box(transpose_text(black_box(&text), semitones, display)));
        });
    }

    group.finish();
}

fn bench_render_chart(c: &mut Criterion) {
    let lyrics = Lyrics::from_json(json!({
        "verse 1": VERSE.lines().collect::<Vec<_>>(),
        "verse 2": VERSE.lines().collect::<Vec<_>>(),
        "chorus": VERSE,
    }));
    let g = Note::parse("G").unwrap_or(Note::C);

    c.bench_function("render_chart/nashville", |b| {
        b.iter(|| black_box(render_chart(&lyrics, g, DisplayKey::Nashville)));
    });
    c.bench_function("render_chart/eb", |b| {
        b.iter(|| black_box(render_chart(&lyrics, g, DisplayKey::parse("Eb"))));
    });
}

criterion_group!(benches, bench_transpose_text, bench_render_chart);
criterion_main!(benches);
