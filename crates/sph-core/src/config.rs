use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SphError;

/// Minimum average body percentage per candle for a run to count as panic.
pub const MIN_PANIC_PERCENTAGE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Half-width of the stability band around the pre-panic price, in percent.
pub const STABILITY_BAND_PERCENTAGE: Decimal = Decimal::from_parts(35, 0, 0, false, 1);
/// Contiguous stable candles required before the panic.
pub const MIN_STABILITY_CANDLES: usize = 4;
/// The retracement window is this many times the panic length.
pub const RETRACEMENT_FACTOR: usize = 2;

/// Thresholds used by [`crate::detector::PatternDetector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_panic_percentage: Decimal,
    pub stability_band_percentage: Decimal,
    pub min_stability_candles: usize,
    pub retracement_factor: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_panic_percentage: MIN_PANIC_PERCENTAGE,
            stability_band_percentage: STABILITY_BAND_PERCENTAGE,
            min_stability_candles: MIN_STABILITY_CANDLES,
            retracement_factor: RETRACEMENT_FACTOR,
        }
    }
}

impl DetectorConfig {
    /// Build from `SPH_MIN_PANIC_PERCENTAGE`, `SPH_STABILITY_BAND_PERCENTAGE`,
    /// `SPH_MIN_STABILITY_CANDLES` and `SPH_RETRACEMENT_FACTOR`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, SphError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SphError> {
        let defaults = Self::default();
        let config = Self {
            min_panic_percentage: parse_var(
                &lookup,
                "SPH_MIN_PANIC_PERCENTAGE",
                defaults.min_panic_percentage,
            )?,
            stability_band_percentage: parse_var(
                &lookup,
                "SPH_STABILITY_BAND_PERCENTAGE",
                defaults.stability_band_percentage,
            )?,
            min_stability_candles: parse_var(
                &lookup,
                "SPH_MIN_STABILITY_CANDLES",
                defaults.min_stability_candles,
            )?,
            retracement_factor: parse_var(
                &lookup,
                "SPH_RETRACEMENT_FACTOR",
                defaults.retracement_factor,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SphError> {
        if self.min_panic_percentage <= Decimal::ZERO {
            return Err(SphError::InvalidConfig {
                field: "min_panic_percentage",
                reason: format!("must be positive, got {}", self.min_panic_percentage),
            });
        }
        if self.stability_band_percentage <= Decimal::ZERO
            || self.stability_band_percentage >= Decimal::ONE_HUNDRED
        {
            return Err(SphError::InvalidConfig {
                field: "stability_band_percentage",
                reason: format!(
                    "must be between 0 and 100 exclusive, got {}",
                    self.stability_band_percentage
                ),
            });
        }
        if self.min_stability_candles == 0 {
            return Err(SphError::InvalidConfig {
                field: "min_stability_candles",
                reason: "must be at least 1".into(),
            });
        }
        if self.retracement_factor == 0 {
            return Err(SphError::InvalidConfig {
                field: "retracement_factor",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, SphError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SphError::Config(format!("{key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}
