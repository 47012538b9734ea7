//! Sample - one second of reconstructed terminal telemetry.

/// Highest signal-to-noise value the terminal reports.
pub const MAX_SNR: f64 = 9.0;

/// One second of telemetry on the reconstructed timeline.
///
/// The index of a sample in its timeline is the number of seconds since the
/// timeline started.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Sample {
    /// Downlink throughput in bits per second.
    pub downlink_throughput_bps: f64,

    /// Uplink throughput in bits per second.
    pub uplink_throughput_bps: f64,

    /// Fraction of pings to the point of presence that were lost, in `[0, 1]`.
    pub pop_ping_drop_rate: f64,

    /// The terminal reported its view of the sky as obstructed.
    pub obstructed: bool,

    /// A satellite was scheduled. `false` means no satellite was in view.
    pub scheduled: bool,

    /// Signal-to-noise ratio, in `[0, 9]`.
    pub snr: f64,

    /// Synthetic filler for a second that was never captured.
    pub unrecorded: bool,

    /// Set by the span analyzer when this second borders an obstruction and
    /// was reclassified as obstructed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub adjacent_obstructed: bool,
}

impl Sample {
    /// Filler for a second that was lost between captures.
    ///
    /// Worst case for loss (every ping dropped, no throughput) but no
    /// assumed cause: unobstructed, scheduled and at full signal.
    pub const fn unrecorded() -> Self {
        Self {
            downlink_throughput_bps: 0.0,
            uplink_throughput_bps: 0.0,
            pop_ping_drop_rate: 1.0,
            obstructed: false,
            scheduled: true,
            snr: MAX_SNR,
            unrecorded: true,
            adjacent_obstructed: false,
        }
    }
}

impl Default for Sample {
    /// A healthy second: no loss, satellite in view, full signal.
    fn default() -> Self {
        Self {
            downlink_throughput_bps: 0.0,
            uplink_throughput_bps: 0.0,
            pop_ping_drop_rate: 0.0,
            obstructed: false,
            scheduled: true,
            snr: MAX_SNR,
            unrecorded: false,
            adjacent_obstructed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecorded_filler() {
        let filler = Sample::unrecorded();
        assert!(filler.unrecorded);
        assert!(filler.scheduled);
        assert!(!filler.obstructed);
        assert_eq!(filler.pop_ping_drop_rate, 1.0);
        assert_eq!(filler.downlink_throughput_bps, 0.0);
        assert_eq!(filler.snr, MAX_SNR);
    }
}
