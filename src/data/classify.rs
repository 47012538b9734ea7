//! Per-second outage classification.
//!
//! These are pure functions of one sample and the thresholds; the span
//! analyzer calls them once per second and layers the run accounting on top.

use dishwatch_types::{Category, Sample};

use super::thresholds::Thresholds;

/// Which throughput thresholds overruled a ping-loss outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrule {
    /// Relaxing only the downlink threshold would have made it an outage.
    pub down: bool,
    /// Relaxing only the uplink threshold would have made it an outage.
    pub up: bool,
}

/// Base outage type of a second, before thresholds are applied.
///
/// Never returns [`Category::Connected`]; whether the second is an outage at
/// all is [`qualifies_as_outage`]'s call.
pub fn classify(sample: &Sample) -> Category {
    if sample.unrecorded {
        Category::Unrecorded
    } else if !sample.scheduled {
        Category::NoSatellite
    } else if sample.obstructed || sample.adjacent_obstructed {
        Category::Obstructed
    } else {
        Category::Betadown
    }
}

/// Loss met the ratio and throughput stayed below both floors.
pub fn qualifies_as_outage(sample: &Sample, thresholds: &Thresholds) -> bool {
    loss_qualifies(sample, thresholds)
        && sample.downlink_throughput_bps < thresholds.min_down_bps()
        && sample.uplink_throughput_bps < thresholds.min_up_bps()
}

/// Qualifies, and its base type is enabled.
///
/// This is the notion of "outage" all run accounting uses: a qualifying
/// second of a disabled type counts as connected.
pub fn counts_as_outage(sample: &Sample, thresholds: &Thresholds) -> bool {
    thresholds.is_enabled(classify(sample)) && qualifies_as_outage(sample, thresholds)
}

/// Ping loss alone meets the ratio, ignoring throughput.
pub fn loss_qualifies(sample: &Sample, thresholds: &Thresholds) -> bool {
    sample.pop_ping_drop_rate >= thresholds.min_loss_ratio()
}

/// For a second that ping loss alone would call an outage but throughput
/// overruled, report which threshold did it. `None` when ping loss does not
/// qualify or when the second qualifies outright.
pub fn overrule(sample: &Sample, thresholds: &Thresholds) -> Option<Overrule> {
    if !loss_qualifies(sample, thresholds) || qualifies_as_outage(sample, thresholds) {
        return None;
    }
    Some(Overrule {
        down: qualifies_as_outage(sample, &thresholds.without_down()),
        up: qualifies_as_outage(sample, &thresholds.without_up()),
    })
}

/// Signal at or below the configured SNR ceiling.
pub fn is_low_snr(sample: &Sample, thresholds: &Thresholds) -> bool {
    sample.snr <= thresholds.max_snr()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossy() -> Sample {
        Sample {
            pop_ping_drop_rate: 1.0,
            ..Sample::default()
        }
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify(&Sample::unrecorded()), Category::Unrecorded);

        let no_sat = Sample {
            scheduled: false,
            obstructed: true,
            ..lossy()
        };
        assert_eq!(classify(&no_sat), Category::NoSatellite);

        let obstructed = Sample {
            obstructed: true,
            ..lossy()
        };
        assert_eq!(classify(&obstructed), Category::Obstructed);

        let adjacent = Sample {
            adjacent_obstructed: true,
            ..lossy()
        };
        assert_eq!(classify(&adjacent), Category::Obstructed);
        assert_eq!(classify(&lossy()), Category::Betadown);
    }

    #[test]
    fn test_qualification() {
        let t = Thresholds::default();
        assert!(qualifies_as_outage(&lossy(), &t));

        let partial = Sample {
            pop_ping_drop_rate: 0.5,
            ..Sample::default()
        };
        assert!(!qualifies_as_outage(&partial, &t));
        assert!(overrule(&partial, &t).is_none());
    }

    #[test]
    fn test_downlink_overrule() {
        let t = Thresholds::default();
        let sample = Sample {
            downlink_throughput_bps: 1_000_000.0,
            ..lossy()
        };

        assert!(!qualifies_as_outage(&sample, &t));
        assert_eq!(
            overrule(&sample, &t),
            Some(Overrule {
                down: true,
                up: false
            })
        );
    }

    #[test]
    fn test_both_directions_overrule() {
        let t = Thresholds::default();
        let sample = Sample {
            downlink_throughput_bps: 1_000_000.0,
            uplink_throughput_bps: 1_000_000.0,
            ..lossy()
        };

        // Neither relaxation alone is enough.
        assert_eq!(
            overrule(&sample, &t),
            Some(Overrule {
                down: false,
                up: false
            })
        );
    }

    #[test]
    fn test_disabled_category_does_not_count() {
        let mut t = Thresholds::default();
        t.set_enabled(Category::Betadown, false);

        assert!(qualifies_as_outage(&lossy(), &t));
        assert!(!counts_as_outage(&lossy(), &t));
    }

    #[test]
    fn test_low_snr() {
        let mut t = Thresholds::default();
        let weak = Sample {
            snr: 0.0,
            ..Sample::default()
        };
        assert!(is_low_snr(&weak, &t));
        assert!(!is_low_snr(&Sample::default(), &t));

        t.set_max_snr(9.0);
        assert!(is_low_snr(&Sample::default(), &t));
    }
}
