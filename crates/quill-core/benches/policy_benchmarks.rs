//! Benchmarks for the access-tier gate.
//!
//! The gate runs on every keystroke in the host UI, so both the decision and
//! the clamp of an over-long paste should stay well under a microsecond-scale
//! budget.

use std::hint::black_box;

use chrono::Duration;
use criterion::{criterion_group, criterion_main, Criterion};
use quill_core::policy::TierPolicy;
use quill_core::types::{AccessTier, Timestamp, UsageWindow};

fn bench_decide(c: &mut Criterion) {
    let policy = TierPolicy::default();
    let now = Timestamp::from_secs(1_750_000_000);
    let windows = [
        UsageWindow::default(),
        UsageWindow::new(Some(now - Duration::hours(3)), 4),
        UsageWindow::new(Some(now - Duration::hours(30)), 5),
    ];

    c.bench_function("decide_all_tiers", |b| {
        b.iter(|| {
            for tier in [
                AccessTier::Anonymous,
                AccessTier::Authorized,
                AccessTier::Premium,
            ] {
                for usage in &windows {
                    black_box(policy.decide(tier, black_box(120), usage, now));
                }
            }
        })
    });
}

fn bench_clamp(c: &mut Criterion) {
    let policy = TierPolicy::default();
    let ascii = "a".repeat(10_000);
    let cyrillic = "ж".repeat(10_000);

    c.bench_function("clamp_ascii_paste", |b| {
        b.iter(|| black_box(policy.clamp_text(AccessTier::Premium, black_box(&ascii))))
    });

    c.bench_function("clamp_multibyte_paste", |b| {
        b.iter(|| black_box(policy.clamp_text(AccessTier::Premium, black_box(&cyrillic))))
    });
}

criterion_group!(benches, bench_decide, bench_clamp);
criterion_main!(benches);
