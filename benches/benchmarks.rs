//! Benchmarks for the pager

use book_pager::document::{Orbit, Unit, BREAKABLE_CLASS};
use book_pager::render::{fill_contents, FontLeaderMetrics};
use book_pager::{
    paginate, CompilerId, DocumentContext, Element, IndexInfo, Node, PageConfig, RawOptions,
    Sessions, StackMeasure,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn a5_options() -> RawOptions {
    RawOptions::new()
        .with("size", "A5")
        .with("right-level", 1.0)
        .with("break-level", 2.0)
}

/// `chapters` chapters of `sections` sections, each section a heading,
/// some paragraphs and one long breakable list
fn book(chapters: u32, sections: u32) -> (Vec<Element>, DocumentContext) {
    let mut lines = Vec::new();
    let mut infos = Vec::new();

    let heading = |id: &str, text: &str| {
        Element::new().with_child(
            Element::new()
                .with_id(id)
                .with_child(Node::text(text.to_string(), 32.0)),
        )
    };

    for c in 1..=chapters {
        let id = format!("ch{}", c);
        infos.push(IndexInfo::heading(id.as_str(), &[c], &format!("Chapter {}", c)));
        lines.push(heading(&id, &format!("Chapter {}", c)));

        for s in 1..=sections {
            let id = format!("ch{}s{}", c, s);
            infos.push(IndexInfo::heading(id.as_str(), &[c, s], &format!("Section {}.{}", c, s)));
            lines.push(heading(&id, &format!("Section {}.{}", c, s)));

            for p in 0..6 {
                lines.push(Element::new().with_child(Node::text(
                    format!("Paragraph {} of section {}.{} ", p, c, s),
                    24.0 * (1 + p % 4) as f32,
                )));
            }

            let list_id = format!("{}-list", id);
            let mut list = Element::new().with_id(list_id.as_str()).with_class(BREAKABLE_CLASS);
            for item in 0..40 {
                list = list.with_child(
                    Element::new().with_child(Node::text(format!("item {} ", item), 24.0)),
                );
            }
            lines.push(Element::new().with_child(list));
            infos.push(IndexInfo {
                orbit: Orbit::Other("list".to_string()),
                unit: Unit::new("ul"),
                ..IndexInfo::heading(list_id, &[], "")
            });
        }
    }

    (lines, DocumentContext::new(infos))
}

fn bench_paginate_small(c: &mut Criterion) {
    let (lines, context) = book(2, 3);
    let config = PageConfig::resolve(&a5_options());
    c.bench_function("paginate_small_book", |b| {
        b.iter(|| paginate(black_box(&lines), &config, &context, StackMeasure));
    });
}

fn bench_paginate_large(c: &mut Criterion) {
    let (lines, context) = book(20, 8);
    let config = PageConfig::resolve(&a5_options());
    c.bench_function("paginate_large_book", |b| {
        b.iter(|| paginate(black_box(&lines), &config, &context, StackMeasure));
    });
}

fn bench_session_with_contents(c: &mut Criterion) {
    let (mut lines, context) = book(10, 6);
    let mut sessions = Sessions::new();
    let id = CompilerId(1);
    sessions.register(id, &a5_options(), true);
    let toc = sessions.contents(id, &context, &RawOptions::new());
    lines.insert(0, Element::new().with_child(toc));

    let Some(env) = sessions.get(id) else {
        return;
    };
    c.bench_function("session_run_with_contents", |b| {
        b.iter(|| {
            env.run(
                black_box(&lines),
                &context,
                &StackMeasure,
                &FontLeaderMetrics::default(),
            )
        });
    });
}

fn bench_fill_contents(c: &mut Criterion) {
    let (mut lines, context) = book(10, 6);
    let mut sessions = Sessions::new();
    let id = CompilerId(1);
    sessions.register(id, &a5_options(), true);
    let toc = sessions.contents(id, &context, &RawOptions::new());
    lines.insert(0, Element::new().with_child(toc));

    let Some(env) = sessions.get(id) else {
        return;
    };
    let pagination = env.paginate(&lines, &context, StackMeasure);
    let metrics = FontLeaderMetrics::default();
    let width = env.config().main_width();

    c.bench_function("fill_contents", |b| {
        b.iter(|| {
            let mut pagination = pagination.clone();
            fill_contents(black_box(&mut pagination), "0", 1.0, &metrics, width)
        });
    });
}

criterion_group!(
    benches,
    bench_paginate_small,
    bench_paginate_large,
    bench_session_with_contents,
    bench_fill_contents,
);
criterion_main!(benches);
