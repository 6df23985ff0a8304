use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp layout used when reporting a match.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One detected stability-panic-retracement occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub symbol: String,
    /// Timestamp of the last panic candle.
    pub timestamp: DateTime<Utc>,
    /// Close of the last panic candle.
    pub price: Decimal,
    /// Contiguous stable candles found before the panic.
    pub stability_candles: usize,
}

impl PatternMatch {
    pub fn date(&self) -> String {
        self.timestamp.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SPH: {}   {:>15}  stability: {:>2} candles  price: {}",
            self.date(),
            self.symbol,
            self.stability_candles,
            self.price
        )
    }
}
