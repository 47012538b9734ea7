//! Properties of reconstruction and analysis over random input.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use dishwatch::data::classify::{classify, counts_as_outage, loss_qualifies};
use dishwatch::{Category, HistorySnapshot, SpanAnalyzer, Thresholds, TimelineReconstructor};
use dishwatch_types::Sample;
use proptest::prelude::*;

fn healthy() -> Sample {
    Sample::default()
}

fn betadown() -> Sample {
    Sample {
        pop_ping_drop_rate: 1.0,
        ..Sample::default()
    }
}

fn sample_kind() -> impl Strategy<Value = Sample> {
    prop_oneof![
        4 => Just(healthy()),
        3 => Just(betadown()),
        2 => Just(Sample { obstructed: true, ..betadown() }),
        1 => Just(Sample { scheduled: false, ..betadown() }),
        1 => Just(Sample::unrecorded()),
        1 => Just(Sample { downlink_throughput_bps: 50_000.0, ..betadown() }),
        1 => Just(Sample { uplink_throughput_bps: 50_000.0, obstructed: true, ..betadown() }),
        1 => Just(Sample { pop_ping_drop_rate: 0.6, snr: 0.0, ..Sample::default() }),
    ]
}

/// Timelines built from short runs, so same-type runs and mixed outages both
/// show up often.
fn timeline() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((sample_kind(), 1usize..8), 0..40).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(sample, n)| std::iter::repeat(sample).take(n))
            .collect()
    })
}

fn thresholds() -> impl Strategy<Value = Thresholds> {
    (
        prop_oneof![Just(0.5), Just(1.0)],
        1u64..40,
        0u64..5,
        prop::array::uniform5(prop::bool::weighted(0.8)),
    )
        .prop_map(|(loss, min_sec, max_dsec, enabled)| {
            let mut t = Thresholds::default();
            t.set_min_loss_ratio(loss);
            t.set_connected_min_sec(min_sec);
            t.set_connected_max_dsec(max_dsec);
            for (category, on) in Category::ALL.into_iter().zip(enabled) {
                t.set_enabled(category, on);
            }
            t
        })
}

/// What each second ended up as after the pass.
fn final_categories(samples: &[Sample], t: &Thresholds) -> Vec<Category> {
    samples
        .iter()
        .map(|s| {
            if counts_as_outage(s, t) {
                classify(s)
            } else {
                Category::Connected
            }
        })
        .collect()
}

fn maximal_runs(categories: &[Category], category: Category) -> u64 {
    let mut runs = 0;
    let mut previous = None;
    for &c in categories {
        if c == category && previous != Some(category) {
            runs += 1;
        }
        previous = Some(c);
    }
    runs
}

proptest! {
    #[test]
    fn prop_histogram_counts_maximal_runs(mut samples in timeline(), t in thresholds()) {
        let results = SpanAnalyzer::new(&t).run(&mut samples);
        let categories = final_categories(&samples, &t);

        for category in Category::OUTAGES {
            let expected_seconds = categories.iter().filter(|&&c| c == category).count() as u64;
            let expected_runs = if t.is_enabled(category) {
                maximal_runs(&categories, category)
            } else {
                0
            };
            prop_assert_eq!(results.histogram.runs(category), expected_runs, "{}", category);
            prop_assert_eq!(results.seconds[category], expected_seconds, "{}", category);
            if t.is_enabled(category) {
                prop_assert_eq!(results.histogram.total_seconds(category), expected_seconds);
            }
        }

        let connected = categories.iter().filter(|&&c| c == Category::Connected).count() as u64;
        prop_assert_eq!(results.seconds[Category::Connected], connected);
    }

    #[test]
    fn prop_spans_sorted_and_long_enough(mut samples in timeline(), t in thresholds()) {
        let results = SpanAnalyzer::new(&t).run(&mut samples);

        for span in &results.spans {
            prop_assert!(span.len() as u64 >= t.connected_min_sec());
            prop_assert!(span.end <= samples.len());
        }
        for pair in results.spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn prop_second_pass_is_identical(mut samples in timeline(), t in thresholds()) {
        let analyzer = SpanAnalyzer::new(&t);
        let first = analyzer.run(&mut samples);
        let flags = samples.clone();
        let second = analyzer.run(&mut samples);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(flags, samples);
    }

    #[test]
    fn prop_overrules_partition_loss(mut samples in timeline(), t in thresholds()) {
        let results = SpanAnalyzer::new(&t).run(&mut samples);

        for category in Category::OUTAGES {
            let expected = if t.is_enabled(category) {
                samples
                    .iter()
                    .filter(|s| classify(s) == category && loss_qualifies(s, &t))
                    .count() as u64
            } else {
                0
            };
            let counts = results.overrules[category];
            prop_assert_eq!(counts.not_overruled + counts.either, expected, "{}", category);
            prop_assert!(counts.down <= counts.either && counts.up <= counts.either);
        }
    }

    #[test]
    fn prop_reconstruction_matches_device_history(
        (capacity, first, steps) in (5u64..40).prop_flat_map(|r| {
            (Just(r), 1..3 * r, prop::collection::vec(1..2 * r, 0..8))
        }),
        timestamped in any::<bool>(),
    ) {
        let base: NaiveDateTime = NaiveDate::from_ymd_opt(2021, 3, 14)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let captures: Vec<u64> = std::iter::once(first)
            .chain(steps.iter().scan(first, |u, step| {
                *u += step;
                Some(*u)
            }))
            .collect();

        let mut reconstructor = TimelineReconstructor::new();
        for &uptime in &captures {
            // Second k of uptime carries downlink throughput k.
            let mut snapshot = HistorySnapshot::filled(uptime, capacity as usize, healthy());
            for k in uptime.saturating_sub(capacity)..uptime {
                snapshot.downlink_throughput_bps[(k % capacity) as usize] = k as f64;
            }
            let timestamp = timestamped.then(|| base + TimeDelta::seconds(uptime as i64));
            reconstructor.ingest(&snapshot, timestamp).unwrap();
        }

        let start = first.saturating_sub(capacity);
        let end = captures[captures.len() - 1];
        let expected: Vec<Option<u64>> = (start..end)
            .map(|k| {
                captures
                    .iter()
                    .any(|&u| u.saturating_sub(capacity) <= k && k < u)
                    .then_some(k)
            })
            .collect();
        // With timestamps a gap is only filled when it outlasts the new
        // uptime too, which never happens without a reboot.
        let expected: Vec<Option<u64>> = if timestamped {
            expected.into_iter().filter(Option::is_some).collect()
        } else {
            expected
        };
        let actual: Vec<Option<u64>> = reconstructor
            .timeline()
            .samples()
            .iter()
            .map(|s| (!s.unrecorded).then_some(s.downlink_throughput_bps as u64))
            .collect();

        prop_assert_eq!(actual, expected);
    }
}
