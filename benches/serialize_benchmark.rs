//! Benchmarks for notedown serialization performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks serialize synthetic note documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

/// Creates a synthetic document with the given number of sections.
fn create_test_doc(sections: usize) -> Value {
    let mut content = Vec::new();

    for i in 0..sections {
        content.push(json!({
            "type": "heading",
            "attrs": {"level": 2},
            "content": [{"type": "text", "text": format!("Section {}", i + 1)}]
        }));
        content.push(json!({
            "type": "paragraph",
            "content": [
                {"type": "text", "text": "Some "},
                {"type": "text", "text": "bold", "marks": [{"type": "bold"}]},
                {"type": "text", "text": " and "},
                {"type": "text", "text": "highlighted *text*", "marks": [{"type": "italic"}, {"type": "textHighlight"}]},
                {"type": "text", "text": " with a "},
                {"type": "text", "text": "link", "marks": [{"type": "link", "attrs": {"href": "https://example.com"}}]}
            ]
        }));

        // Nested list
        content.push(json!({
            "type": "list",
            "attrs": {"kind": "bullet"},
            "content": [
                {"type": "paragraph", "content": [{"type": "backlink", "attrs": {"id": "x", "label": "Linked note"}}]},
                {"type": "list", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "nested item"}]}
                ]}
            ]
        }));
    }

    json!({"type": "doc", "content": content})
}

/// Benchmark input detection.
fn bench_input_detection(c: &mut Criterion) {
    let doc = create_test_doc(1).to_string();
    let export = json!({"notes": [{"document_json": doc.clone()}]}).to_string();

    c.bench_function("detect_document", |b| {
        b.iter(|| notedown::detect_input_str(black_box(&doc)).unwrap());
    });

    c.bench_function("detect_export", |b| {
        b.iter(|| notedown::detect_input_str(black_box(&export)).unwrap());
    });
}

/// Benchmark parse plus serialize at various sizes.
fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for sections in [1, 10, 100].iter() {
        let json = create_test_doc(*sections).to_string();
        let doc = notedown::parse_str(&json).unwrap();

        group.bench_function(format!("{}_sections_parse", sections), |b| {
            b.iter(|| notedown::parse_str(black_box(&json)).unwrap());
        });

        group.bench_function(format!("{}_sections_serialize", sections), |b| {
            b.iter(|| notedown::notes_serializer().serialize(black_box(&doc)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark batch conversion, parallel against sequential.
fn bench_batch(c: &mut Criterion) {
    let doc = create_test_doc(5).to_string();
    let notes: Vec<Value> = (0..200).map(|_| json!({"document_json": doc})).collect();
    let export = notedown::NotesExport::from_value(json!({"notes": notes})).unwrap();
    let converter = notedown::Notedown::new();

    let mut group = c.benchmark_group("batch");
    group.bench_function("parallel", |b| {
        b.iter(|| converter.convert_notes(black_box(&export), &notedown::BatchOptions::new()));
    });
    group.bench_function("sequential", |b| {
        b.iter(|| {
            converter.convert_notes(
                black_box(&export),
                &notedown::BatchOptions::new().sequential(),
            )
        });
    });
    group.finish();
}

criterion_group!(benches, bench_input_detection, bench_serialization, bench_batch);
criterion_main!(benches);
