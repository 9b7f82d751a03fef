//! Controller configuration and its `KEY=VALUE` file loader.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

const MIB: u64 = 1 << 20;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} out of range: {detail}")]
    OutOfRange { key: &'static str, detail: String },
}

/// Immutable knobs for one controller run.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    // =========================
    // Pressure estimation
    // =========================
    /// Target upper bound for the short-window "some" pressure, in the
    /// same unit the pressure file reports (percent of wall time).
    ///
    /// At or above this value the controller does not reclaim at all.
    pub psi_threshold: f64,

    /// Fraction of current usage proposed for reclaim when pressure is
    /// zero. The proposal shrinks linearly to zero as pressure approaches
    /// `psi_threshold`.
    pub reclaim_ratio: f64,

    // =========================
    // Refault dampening
    // =========================
    /// Minimum acceptable `1 - refault/steal`.
    ///
    /// Also the scale factor applied when a tick observed no reclaim
    /// activity at all.
    pub reclaim_accuracy_target: f64,

    /// Minimum acceptable `steal/scan`.
    pub scan_efficiency_target: f64,

    // =========================
    // Sizing
    // =========================
    /// Below this usage (bytes) the domain is left alone.
    pub min_size: u64,

    /// Reclaim requests smaller than this (bytes) are dropped.
    pub iterate_min_size: u64,

    /// Hard cap (bytes) on a single reclaim request.
    pub iterate_max_size: u64,

    /// Sampling period.
    pub interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            psi_threshold: 0.1,
            reclaim_ratio: 0.01,
            reclaim_accuracy_target: 0.5,
            scan_efficiency_target: 0.1,
            min_size: 100 * MIB,
            iterate_min_size: MIB,
            iterate_max_size: 100 * MIB,
            interval: Duration::from_secs(6),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.psi_threshold.is_finite() || self.psi_threshold < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "PSI_THRESHOLD",
                detail: format!("{} is not a finite value >= 0", self.psi_threshold),
            });
        }

        for (key, value) in [
            ("RECLAIM_RATIO", self.reclaim_ratio),
            ("RECLAIM_ACCURACY", self.reclaim_accuracy_target),
            ("SCAN_EFFICIENCY", self.scan_efficiency_target),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key,
                    detail: format!("{value} is not within [0, 1]"),
                });
            }
        }

        if self.iterate_min_size > self.iterate_max_size {
            return Err(ConfigError::OutOfRange {
                key: "ITERATE_MIN_SIZE",
                detail: format!(
                    "{} exceeds ITERATE_MAX_SIZE {}",
                    self.iterate_min_size, self.iterate_max_size
                ),
            });
        }

        if self.interval.is_zero() {
            return Err(ConfigError::OutOfRange {
                key: "INTERVAL",
                detail: "must be at least one second".into(),
            });
        }

        Ok(())
    }
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cfg = parse_config(&content)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse `KEY=VALUE` lines on top of the defaults.
///
/// Blank lines and `#` comments are skipped. Lines without `=` and
/// unknown keys are reported and skipped. A known key with an unparseable
/// value is an error.
pub fn parse_config(content: &str) -> Result<ControllerConfig, ConfigError> {
    let mut cfg = ControllerConfig::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            debug!(line = %line, "config line has no '=', skipped");
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "PSI_THRESHOLD" => cfg.psi_threshold = parse_value("PSI_THRESHOLD", value)?,
            "RECLAIM_RATIO" => cfg.reclaim_ratio = parse_value("RECLAIM_RATIO", value)?,
            "RECLAIM_ACCURACY" => {
                cfg.reclaim_accuracy_target = parse_value("RECLAIM_ACCURACY", value)?
            }
            "SCAN_EFFICIENCY" => {
                cfg.scan_efficiency_target = parse_value("SCAN_EFFICIENCY", value)?
            }
            "MIN_SIZE" => cfg.min_size = parse_value("MIN_SIZE", value)?,
            "ITERATE_MIN_SIZE" => cfg.iterate_min_size = parse_value("ITERATE_MIN_SIZE", value)?,
            "ITERATE_MAX_SIZE" => cfg.iterate_max_size = parse_value("ITERATE_MAX_SIZE", value)?,
            "INTERVAL" => cfg.interval = Duration::from_secs(parse_value("INTERVAL", value)?),
            other => warn!(key = %other, "unknown configuration item ignored"),
        }
    }

    Ok(cfg)
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
