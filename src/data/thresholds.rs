//! Classification thresholds.
//!
//! Every setter clamps to the documented range instead of failing; out of
//! range input is a user nudging a control too far, not an error.

use dishwatch_types::{Category, CategoryMap, MAX_SNR};

/// Default seconds of connectivity needed to count as a connected span.
pub const DEFAULT_CONNECTED_MIN_SEC: u64 = 1800;
/// Default seconds of outage tolerated inside a connected span.
pub const DEFAULT_CONNECTED_MAX_DSEC: u64 = 2;
/// Default throughput (bits per second) at or above which loss is overruled.
pub const DEFAULT_MIN_THROUGHPUT_BPS: f64 = 8_000.0;

/// Thresholds that decide what counts as an outage, plus the enabled
/// category filter.
///
/// Disabled categories are not merely hidden: their seconds count as
/// connected and their runs are left out of the histogram and adjacency
/// accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    min_loss_ratio: f64,
    min_down_bps: f64,
    min_up_bps: f64,
    max_snr: f64,
    connected_min_sec: u64,
    connected_max_dsec: u64,
    enabled: CategoryMap<bool>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_loss_ratio: 1.0,
            min_down_bps: DEFAULT_MIN_THROUGHPUT_BPS,
            min_up_bps: DEFAULT_MIN_THROUGHPUT_BPS,
            max_snr: 0.0,
            connected_min_sec: DEFAULT_CONNECTED_MIN_SEC,
            connected_max_dsec: DEFAULT_CONNECTED_MAX_DSEC,
            enabled: CategoryMap::filled(true),
        }
    }
}

impl Thresholds {
    /// Minimum ping-drop ratio for a second to count as an outage.
    pub fn min_loss_ratio(&self) -> f64 {
        self.min_loss_ratio
    }

    /// Downlink throughput at or above which loss is overruled.
    pub fn min_down_bps(&self) -> f64 {
        self.min_down_bps
    }

    /// Uplink throughput at or above which loss is overruled.
    pub fn min_up_bps(&self) -> f64 {
        self.min_up_bps
    }

    /// SNR at or below which a second counts as low signal.
    pub fn max_snr(&self) -> f64 {
        self.max_snr
    }

    /// Shortest run (seconds) reported as a connected span.
    pub fn connected_min_sec(&self) -> u64 {
        self.connected_min_sec
    }

    /// Longest outage (seconds) that does not break a connected span.
    pub fn connected_max_dsec(&self) -> u64 {
        self.connected_max_dsec
    }

    /// Whether a category takes part in the accounting.
    pub fn is_enabled(&self, category: Category) -> bool {
        self.enabled[category]
    }

    /// The full enabled-category filter.
    pub fn enabled(&self) -> &CategoryMap<bool> {
        &self.enabled
    }

    pub fn set_min_loss_ratio(&mut self, value: f64) {
        self.min_loss_ratio = clamp_f64(value, 0.0, 1.0);
    }

    pub fn set_min_down_bps(&mut self, value: f64) {
        self.min_down_bps = clamp_f64(value, 0.0, f64::INFINITY);
    }

    pub fn set_min_up_bps(&mut self, value: f64) {
        self.min_up_bps = clamp_f64(value, 0.0, f64::INFINITY);
    }

    pub fn set_max_snr(&mut self, value: f64) {
        self.max_snr = clamp_f64(value, 0.0, MAX_SNR);
    }

    pub fn set_connected_min_sec(&mut self, value: u64) {
        self.connected_min_sec = value.max(1);
    }

    pub fn set_connected_max_dsec(&mut self, value: u64) {
        self.connected_max_dsec = value;
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) {
        self.enabled[category] = enabled;
    }

    /// Copy with `min_down_bps` relaxed to infinity.
    pub(crate) fn without_down(&self) -> Self {
        Self {
            min_down_bps: f64::INFINITY,
            ..self.clone()
        }
    }

    /// Copy with `min_up_bps` relaxed to infinity.
    pub(crate) fn without_up(&self) -> Self {
        Self {
            min_up_bps: f64::INFINITY,
            ..self.clone()
        }
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.min_loss_ratio(), 1.0);
        assert_eq!(t.connected_min_sec(), 1800);
        assert_eq!(t.connected_max_dsec(), 2);
        assert!(Category::ALL.iter().all(|c| t.is_enabled(*c)));
    }

    #[test]
    fn test_setters_clamp() {
        let mut t = Thresholds::default();
        t.set_min_loss_ratio(1.5);
        assert_eq!(t.min_loss_ratio(), 1.0);
        t.set_min_loss_ratio(-0.2);
        assert_eq!(t.min_loss_ratio(), 0.0);
        t.set_min_loss_ratio(f64::NAN);
        assert_eq!(t.min_loss_ratio(), 0.0);

        t.set_max_snr(12.0);
        assert_eq!(t.max_snr(), 9.0);
        t.set_min_down_bps(-100.0);
        assert_eq!(t.min_down_bps(), 0.0);
        t.set_connected_min_sec(0);
        assert_eq!(t.connected_min_sec(), 1);
    }
}
