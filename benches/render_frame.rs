//! Frame render benchmarks: truecolor grid vs glyphs only vs plain text.
//! Run: cargo bench

use asciiplay::{AsciiFrame, AsciiRenderer, Cell};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WIDTH: usize = 300;
const HEIGHT: usize = 100;
const RAMP: &[u8] = b" .:-=+*#%@";

fn colored_frame() -> AsciiFrame {
    let rows = (0..HEIGHT)
        .map(|y| {
            (0..WIDTH)
                .map(|x| {
                    let glyph = char::from(RAMP[(x + y) % RAMP.len()]);
                    Cell::new(glyph, (x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8)
                })
                .collect()
        })
        .collect();
    AsciiFrame::colored(0, 0.0, rows)
}

fn plain_frame() -> AsciiFrame {
    let text = (0..HEIGHT)
        .map(|y| {
            (0..WIDTH)
                .map(|x| char::from(RAMP[(x + y) % RAMP.len()]))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");
    AsciiFrame::plain(0, 0.0, text)
}

fn bench_render(c: &mut Criterion) {
    let renderer = AsciiRenderer::new();
    let colored = colored_frame();
    let plain = plain_frame();

    let mut group = c.benchmark_group("render_frame");
    group.sample_size(50);

    group.bench_function("truecolor_300x100", |b| {
        b.iter(|| black_box(renderer.render(black_box(&colored), true).len()));
    });
    group.bench_function("glyphs_only_300x100", |b| {
        b.iter(|| black_box(renderer.render(black_box(&colored), false).len()));
    });
    group.bench_function("plain_text_300x100", |b| {
        b.iter(|| black_box(renderer.render(black_box(&plain), true).len()));
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
