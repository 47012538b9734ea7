use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dishwatch::{HistorySnapshot, SpanAnalyzer, Thresholds, TimelineReconstructor};
use dishwatch_types::Sample;

/// A day of telemetry with a repeating outage pattern: a betadown run
/// running into an obstruction, then a no-satellite gap.
fn day_of_samples(seconds: usize) -> Vec<Sample> {
    let lossy = Sample {
        pop_ping_drop_rate: 1.0,
        ..Sample::default()
    };
    (0..seconds)
        .map(|i| match i % 600 {
            0..=3 => lossy,
            4 => Sample {
                obstructed: true,
                ..lossy
            },
            5..=7 => lossy,
            100..=110 => Sample {
                scheduled: false,
                ..lossy
            },
            _ => Sample::default(),
        })
        .collect()
}

/// Benchmark one analysis pass over timelines of varying length
fn bench_analysis_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_pass");
    let thresholds = Thresholds::default();

    for (name, seconds) in [("hour", 3_600), ("day", 86_400), ("week", 604_800)] {
        let mut samples = day_of_samples(seconds);
        group.throughput(Throughput::Elements(seconds as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                black_box(SpanAnalyzer::new(&thresholds).run(&mut samples));
            });
        });
    }
    group.finish();
}

/// Benchmark merging a day of twelve-hour snapshots taken hourly
fn bench_reconstruction(c: &mut Criterion) {
    let capacity = 43_200;
    let snapshots: Vec<HistorySnapshot> = (1..=24u64)
        .map(|hour| {
            HistorySnapshot::filled(capacity as u64 + hour * 3_600, capacity, Sample::default())
        })
        .collect();

    c.bench_function("reconstruct_day", |b| {
        b.iter(|| {
            let mut reconstructor = TimelineReconstructor::new();
            for snapshot in &snapshots {
                reconstructor.ingest(snapshot, None).unwrap();
            }
            black_box(reconstructor.timeline().len());
        });
    });
}

criterion_group!(benches, bench_analysis_pass, bench_reconstruction);
criterion_main!(benches);
