//! Detection of stability-panic-retracement patterns in price candles.
//!
//! A quiet stretch of candles, a sharp red sell-off, then a quick climb back
//! to the pre-panic price that never breaks the panic low afterwards.

pub mod candle;
pub mod config;
pub mod detector;
pub mod error;
pub mod pattern;

pub use candle::Candle;
pub use config::DetectorConfig;
pub use detector::PatternDetector;
pub use error::SphError;
pub use pattern::PatternMatch;

/// Scan one symbol's candles (oldest first) with the default thresholds.
pub fn find(symbol: &str, candles: &[Candle]) -> Vec<PatternMatch> {
    PatternDetector::default().find(symbol, candles)
}
