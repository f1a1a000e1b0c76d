//! Benchmarks for the per-link and per-page hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use softnav::dom::DocumentSnapshot;
use softnav::links::{canonical_url, LinkAttributes, LinkClassifier};
use softnav::testing::page_html;
use url::Url;

fn classifier_benchmark(c: &mut Criterion) {
    let base = Url::parse("https://example.com/docs/intro").unwrap();
    let classifier = LinkClassifier::new(&base);
    let links = [
        LinkAttributes::with_href("/about").with_flag("wisp-navigate"),
        LinkAttributes::with_href("guide#setup").with_flag("wisp:navigate"),
        LinkAttributes::with_href("https://other.example/").with_flag("wisp-navigate"),
        LinkAttributes::with_href("mailto:team@example.com").with_flag("wisp-navigate"),
        LinkAttributes::with_href("/plain"),
    ];

    c.bench_function("classify_links", |b| {
        b.iter(|| {
            links
                .iter()
                .filter(|attrs| classifier.classify(black_box(attrs)))
                .count()
        })
    });

    c.bench_function("canonical_url", |b| {
        b.iter(|| canonical_url(&base, black_box("../guide?tab=1#install")))
    });
}

fn snapshot_benchmark(c: &mut Criterion) {
    let items: String = (0..200)
        .map(|i| format!(r#"<li><a href="/item/{i}" wisp-navigate>Item {i}</a></li>"#))
        .collect();
    let html = page_html("Catalog", &format!("<ul>{items}</ul>"));

    c.bench_function("snapshot_parse", |b| {
        b.iter(|| DocumentSnapshot::parse(black_box(&html), "app"))
    });
}

criterion_group!(benches, classifier_benchmark, snapshot_benchmark);
criterion_main!(benches);
