//! Benchmarks comparing chatmark parsing vs pulldown-cmark on chat replies
//!
//! Run with: cargo bench -p chatmark-core

use chatmark_core::{format_inline, Parser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulldown_cmark::{Options, Parser as MdParser};

/// A typical assistant reply.
const REPLY_SAMPLE: &str = r#"## Summary

Here is what I changed in the **retry** logic. The old loop slept for a
fixed `500ms` between attempts, which hammered the upstream during outages.

- Added exponential backoff with *jitter*
- Capped the delay at `30s`
- Logged each retry at `debug` level
• Kept the public API unchanged

1. Run the unit tests
2. Deploy to staging
3. Watch the [dashboard](https://grafana.example.com/d/retries)

| Attempt | Delay | Jitter |
|---------|-------|--------|
| 1       | 0.5s  | ±10%   |
| 2       | 1s    | ±10%   |
| 3       | 2s    | ±10%   |

> Note: the cap only applies after the fifth attempt.
> Earlier attempts follow the curve exactly.

```rust
fn backoff(attempt: u32) -> Duration {
    let base = Duration::from_millis(500);
    (base * 2u32.pow(attempt)).min(Duration::from_secs(30))
}
```

---

Let me know if you want ~~fixed~~ configurable caps instead.
"#;

fn bench_reply_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(REPLY_SAMPLE.len() as u64));

    group.bench_function("chatmark", |b| {
        let parser = Parser::new();
        b.iter(|| {
            let doc = parser.parse(black_box(REPLY_SAMPLE));
            black_box(doc.blocks.len())
        })
    });

    group.bench_function("chatmark_diagnostics", |b| {
        let parser = Parser::new();
        b.iter(|| {
            let result = parser.parse_with_diagnostics(black_box(REPLY_SAMPLE));
            black_box(result.diagnostics.len())
        })
    });

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(REPLY_SAMPLE), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [1, 10, 50, 200].iter() {
        let content: String = REPLY_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("chatmark", size), &content, |b, content| {
            let parser = Parser::new();
            b.iter(|| {
                let doc = parser.parse(black_box(content));
                black_box(doc.blocks.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("markdown", size), &content, |b, content| {
            b.iter(|| {
                let parser = MdParser::new_ext(black_box(content), Options::all());
                let events: Vec<_> = parser.collect();
                black_box(events.len())
            })
        });
    }

    group.finish();
}

fn bench_inline_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("inline");

    let inline =
        "This has *emphasis*, **strong**, `code`, [link](https://example.com), and ~~strike~~.";

    group.bench_function("chatmark_inline", |b| {
        b.iter(|| {
            let text = format_inline(black_box(inline));
            black_box(text.runs().len())
        })
    });

    group.bench_function("markdown_inline", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(inline), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_reply_parse,
    bench_scaling,
    bench_inline_formatting
);
criterion_main!(benches);
