//! Hot path benchmarks.
//!
//! Covers the pure functions every command goes through and one full
//! dispatch against an in-process transport.
//!
//! Run with: cargo bench --bench hot_paths
//! Results saved to: target/criterion/

use std::hint::black_box;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;

use wire_webdriver::browser::selector::rewrite_css;
use wire_webdriver::protocol::{Envelope, Payload, unwrap_payload};
use wire_webdriver::transport::{HttpRequest, HttpResponse};
use wire_webdriver::{Driver, Result, Status, Transport};

// ============================================================================
// In-process Transport
// ============================================================================

/// Answers session creation with a fixed id and everything else with a title.
#[derive(Debug)]
struct StaticTransport;

#[async_trait]
impl Transport for StaticTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let body = if request.path.ends_with("/session") {
            json!({ "status": 0, "sessionId": "bench", "value": {} })
        } else {
            json!({ "status": 0, "value": "Title" })
        };
        Ok(HttpResponse {
            status: 200,
            location: None,
            body: serde_json::to_vec(&body)?,
        })
    }
}

// ============================================================================
// Benchmark: Unwrap Rule
// ============================================================================

fn bench_unwrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("unwrap_payload");

    let cases = [
        ("null", json!(null)),
        ("empty_map", json!({})),
        ("element", json!({ "ELEMENT": "0" })),
        ("elements", json!([{ "ELEMENT": "0" }, { "ELEMENT": "1" }, { "ELEMENT": "2" }])),
        ("scalar", json!("http://localhost/index.html")),
    ];

    for (name, value) in cases {
        group.bench_with_input(BenchmarkId::new("classify", name), &value, |b, value| {
            b.iter(|| unwrap_payload(Payload::classify(Some(black_box(value.clone())))));
        });
    }

    let body = br#"{"status":0,"sessionId":"abc123","value":{"ELEMENT":"0"}}"#;
    group.bench_function("parse_envelope", |b| {
        b.iter(|| Envelope::parse(black_box("/wd/hub/session/abc123/element"), black_box(body), None));
    });

    group.finish();
}

// ============================================================================
// Benchmark: CSS Dialect
// ============================================================================

fn bench_rewrite_css(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite_css");

    for selector in ["div.card > a", "ul li:visible", "#menu :hidden, .row:visible"] {
        group.bench_with_input(BenchmarkId::from_parameter(selector), &selector, |b, s| {
            b.iter(|| rewrite_css(black_box(s)).len());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Status Mapping
// ============================================================================

fn bench_status(c: &mut Criterion) {
    c.bench_function("status_from_code", |b| {
        b.iter(|| {
            (0..40u64)
                .map(|code| Status::from_code(black_box(code)).code())
                .sum::<u64>()
        });
    });
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let driver = Driver::builder()
        .transport(StaticTransport)
        .log_calls(false)
        .build()
        .unwrap();
    rt.block_on(driver.init()).unwrap();

    c.bench_function("dispatch_title", |b| {
        b.to_async(&rt).iter(|| async { driver.title().await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_unwrap,
    bench_rewrite_css,
    bench_status,
    bench_dispatch
);
criterion_main!(benches);
