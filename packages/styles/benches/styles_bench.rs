use criterion::{black_box, criterion_group, criterion_main, Criterion};
use obojobo_styles::{ChunkStyleList, StyleRange, StyleType, StyledText};
use serde_json::json;

fn fragmented_list(count: usize) -> ChunkStyleList {
    let mut list = ChunkStyleList::new();
    for i in 0..count {
        let start = i * 3;
        list.add(StyleRange::plain(start, start + 4, StyleType::Bold));
        list.add(StyleRange::plain(start + 1, start + 2, StyleType::Italic));
        if i % 5 == 0 {
            list.add(StyleRange::new(start, start + 10, StyleType::Superscript, json!(1)));
        }
    }
    list
}

fn normalize_fragmented(c: &mut Criterion) {
    let list = fragmented_list(100);

    c.bench_function("normalize_fragmented_100", |b| {
        b.iter(|| {
            let mut list = black_box(list.clone());
            list.normalize();
            list
        })
    });
}

fn remove_from_long_range(c: &mut Criterion) {
    let mut list = ChunkStyleList::new();
    for i in 0..50 {
        list.add(StyleRange::new(i * 20, i * 20 + 15, StyleType::Link, json!({"href": "x.org"})));
    }

    c.bench_function("remove_span_across_50_links", |b| {
        b.iter(|| {
            let mut list = black_box(list.clone());
            list.remove(&StyleRange::plain(100, 700, StyleType::Link));
            list
        })
    });
}

fn typing_into_styled_text(c: &mut Criterion) {
    let mut text = StyledText::new("The quick brown fox jumps over the lazy dog. ".repeat(20));
    text.style_list = fragmented_list(100);
    text.style_list.normalize();

    c.bench_function("insert_text_100_chars", |b| {
        b.iter(|| {
            let mut text = black_box(text.clone());
            for i in 0..100 {
                text.insert_text(i * 7, "x");
            }
            text
        })
    });
}

fn runs_round_trip(c: &mut Criterion) {
    let mut text = StyledText::new("abcdefghij".repeat(50));
    text.style_list = fragmented_list(100);

    c.bench_function("runs_then_from_runs", |b| {
        b.iter(|| {
            let runs = black_box(&text).runs();
            StyledText::from_runs(&runs)
        })
    });
}

criterion_group!(
    benches,
    normalize_fragmented,
    remove_from_long_range,
    typing_into_styled_text,
    runs_round_trip
);
criterion_main!(benches);
