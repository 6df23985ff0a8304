use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::SphError;

/// Decimal places kept for a candle's body percentage.
pub const BODY_PERCENTAGE_SCALE: u32 = 8;

/// A single price candle for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
}

impl Candle {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            close,
        }
    }

    /// True when the candle closed below its open.
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }

    /// Body move as a percentage of the open price, rounded half away from zero.
    /// A zero open price yields zero.
    pub fn body_percentage(&self) -> Decimal {
        if self.open.is_zero() {
            return Decimal::ZERO;
        }
        ((self.close - self.open).abs() / self.open * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(BODY_PERCENTAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Lower edge of the candle body.
    pub fn body_low(&self) -> Decimal {
        self.open.min(self.close)
    }

    /// Upper edge of the candle body.
    pub fn body_high(&self) -> Decimal {
        self.open.max(self.close)
    }
}

/// Check that timestamps are strictly ascending.
/// Returns the first offending index on failure.
pub fn ensure_chronological(candles: &[Candle]) -> Result<(), SphError> {
    match candles
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        Some(i) => Err(SphError::OutOfOrder { index: i + 1 }),
        None => Ok(()),
    }
}
