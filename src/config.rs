//! Settings loaded from an optional config file and the environment.
//!
//! ```toml
//! [thresholds]
//! min_loss_ratio = 0.5
//! connected_min_sec = 600
//!
//! [enabled]
//! betadown = false
//! ```
//!
//! Every key can also be set from the environment with the `DISHWATCH_`
//! prefix and `__` between sections, e.g.
//! `DISHWATCH_THRESHOLDS__MAX_SNR=3`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use tracing::warn;

use crate::data::thresholds::{
    Thresholds, DEFAULT_CONNECTED_MAX_DSEC, DEFAULT_CONNECTED_MIN_SEC, DEFAULT_MIN_THROUGHPUT_BPS,
};
use dishwatch_types::Category;

const ENV_PREFIX: &str = "DISHWATCH";

/// Raw threshold values as configured, before clamping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub min_loss_ratio: f64,
    pub min_down_bps: f64,
    pub min_up_bps: f64,
    pub max_snr: f64,
    pub connected_min_sec: i64,
    pub connected_max_dsec: i64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            min_loss_ratio: 1.0,
            min_down_bps: DEFAULT_MIN_THROUGHPUT_BPS,
            min_up_bps: DEFAULT_MIN_THROUGHPUT_BPS,
            max_snr: 0.0,
            connected_min_sec: DEFAULT_CONNECTED_MIN_SEC as i64,
            connected_max_dsec: DEFAULT_CONNECTED_MAX_DSEC as i64,
        }
    }
}

/// Everything the engine can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub thresholds: ThresholdSettings,
    /// Per-category switches; categories not listed stay enabled.
    pub enabled: BTreeMap<Category, bool>,
}

impl Settings {
    /// Load settings from `path` (if given) and `DISHWATCH_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Convert to [`Thresholds`], clamping out-of-range values.
    pub fn thresholds(&self) -> Thresholds {
        let raw = &self.thresholds;
        let mut t = Thresholds::default();

        t.set_min_loss_ratio(raw.min_loss_ratio);
        check_clamped("min_loss_ratio", raw.min_loss_ratio, t.min_loss_ratio());
        t.set_min_down_bps(raw.min_down_bps);
        check_clamped("min_down_bps", raw.min_down_bps, t.min_down_bps());
        t.set_min_up_bps(raw.min_up_bps);
        check_clamped("min_up_bps", raw.min_up_bps, t.min_up_bps());
        t.set_max_snr(raw.max_snr);
        check_clamped("max_snr", raw.max_snr, t.max_snr());

        let min_sec = non_negative("connected_min_sec", raw.connected_min_sec);
        t.set_connected_min_sec(min_sec);
        check_clamped("connected_min_sec", min_sec as f64, t.connected_min_sec() as f64);
        t.set_connected_max_dsec(non_negative("connected_max_dsec", raw.connected_max_dsec));

        for (&category, &enabled) in &self.enabled {
            t.set_enabled(category, enabled);
        }
        t
    }
}

fn non_negative(key: &str, value: i64) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        warn!("{} = {} is negative, using 0", key, value);
        0
    })
}

fn check_clamped(key: &str, configured: f64, effective: f64) {
    if configured != effective {
        warn!("{} = {} is out of range, using {}", key, configured, effective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn no_env() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load_with_env(None, no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.thresholds(), Thresholds::default());
    }

    #[test]
    fn test_load_file() {
        let file = toml_file(
            r#"
            [thresholds]
            min_loss_ratio = 0.5
            connected_min_sec = 600

            [enabled]
            betadown = false
            nosatellite = true
            "#,
        );

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        let t = settings.thresholds();

        assert_eq!(t.min_loss_ratio(), 0.5);
        assert_eq!(t.connected_min_sec(), 600);
        assert_eq!(t.min_down_bps(), DEFAULT_MIN_THROUGHPUT_BPS);
        assert!(!t.is_enabled(Category::Betadown));
        assert!(t.is_enabled(Category::NoSatellite));
        assert!(t.is_enabled(Category::Obstructed));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let file = toml_file(
            r#"
            [thresholds]
            min_loss_ratio = 3.0
            max_snr = 12.0
            min_up_bps = -5.0
            connected_min_sec = 0
            connected_max_dsec = -4
            "#,
        );

        let t = Settings::load_with_env(Some(file.path()), no_env())
            .unwrap()
            .thresholds();

        assert_eq!(t.min_loss_ratio(), 1.0);
        assert_eq!(t.max_snr(), 9.0);
        assert_eq!(t.min_up_bps(), 0.0);
        assert_eq!(t.connected_min_sec(), 1);
        assert_eq!(t.connected_max_dsec(), 0);
    }

    #[test]
    fn test_negative_min_span_clamps_to_one() {
        let file = toml_file("[thresholds]\nconnected_min_sec = -7\n");

        let t = Settings::load_with_env(Some(file.path()), no_env())
            .unwrap()
            .thresholds();

        assert_eq!(t.connected_min_sec(), 1);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("[thresholds]\nmax_snr = 2.0\n");
        let env = Map::from([
            ("DISHWATCH_THRESHOLDS__MAX_SNR".to_string(), "4".to_string()),
            ("DISHWATCH_ENABLED__OBSTRUCTED".to_string(), "false".to_string()),
        ]);

        let t = Settings::load_with_env(Some(file.path()), Some(env))
            .unwrap()
            .thresholds();

        assert_eq!(t.max_snr(), 4.0);
        assert!(!t.is_enabled(Category::Obstructed));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/dishwatch.toml");
        let result = Settings::load_with_env(Some(path), no_env());
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let file = toml_file("[enabled]\nsunshine = false\n");
        assert!(Settings::load_with_env(Some(file.path()), no_env()).is_err());
    }
}
