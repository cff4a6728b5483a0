//! Pipeline performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use magic_client::services::{call_shape, normalizer, request_builder};
use magic_client::{CallArgs, MagicConfig, Returns};
use serde_json::{json, Value};

/// Create a wrapped response with `n` choices
fn create_wrapped_response(n: usize) -> Value {
    let choices: Vec<Value> = (0..n)
        .map(|i| json!({"Title": format!("Title number {}", i), "_meta": {"id": format!("gen-{}", i)}}))
        .collect();
    json!({"_meta": {"approximateCost": 0.001, "tokenCount": 250}, "choices": choices})
}

/// Create a legacy flat response
fn create_legacy_response() -> Value {
    json!({
        "approximateCost": 0.001,
        "tokenCount": 250,
        "title": "A title",
        "summary": "A summary that is a little longer than the title",
        "tags": ["a", "b", "c"]
    })
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let single = Returns::from("title");

    for n in [1, 10, 100] {
        let response = create_wrapped_response(n);
        group.bench_with_input(BenchmarkId::new("wrapped_unwrap", n), &response, |b, response| {
            b.iter(|| normalizer::normalize(black_box(response.clone()), &single, false))
        });
    }

    let fields = Returns::from(vec!["title", "summary", "tags"]);
    let legacy = create_legacy_response();
    group.bench_function("legacy_fields", |b| {
        b.iter(|| normalizer::normalize(black_box(legacy.clone()), &fields, false))
    });

    group.finish();
}

fn bench_call_shape(c: &mut Criterion) {
    let predefined = MagicConfig::new().with_returns("summary");
    let bare = MagicConfig::new();
    let input = json!({"text": "Some input text", "language": "en"});

    c.bench_function("resolve_input_only", |b| {
        b.iter(|| call_shape::resolve(CallArgs::from(black_box(input.clone())), &predefined))
    });

    c.bench_function("resolve_returns_input", |b| {
        b.iter(|| {
            call_shape::resolve(
                CallArgs::from((json!(["title", "summary"]), black_box(input.clone()))),
                &bare,
            )
        })
    });
}

fn bench_request_building(c: &mut Criterion) {
    let config = MagicConfig::new()
        .with_openai_key("sk-bench")
        .with_returns("summary")
        .with_examples(vec![json!({"text": "a", "summary": "b"}); 5])
        .with_parameter("temperature", json!(0.3));
    let overlay = MagicConfig::new().with_parameter("max_tokens", json!(200));
    let returns = Returns::from("summary");
    let input = json!({"text": "Some input text"});

    c.bench_function("merge_and_build", |b| {
        b.iter(|| {
            let merged = config.merge(Some(black_box(&overlay)));
            let request = request_builder::build(&merged, &returns, &input);
            serde_json::to_value(&request.body)
        })
    });
}

criterion_group!(benches, bench_normalize, bench_call_shape, bench_request_building);
criterion_main!(benches);
