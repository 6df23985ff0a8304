use rust_decimal::Decimal;
use tracing::{debug, debug_span, trace};

use crate::candle::Candle;
use crate::config::DetectorConfig;
use crate::error::SphError;
use crate::pattern::PatternMatch;

/// Scans one symbol's candles for stability-panic-retracement patterns.
///
/// A match needs, in order:
/// 1. a run of red candles whose average body percentage reaches the panic threshold,
/// 2. enough contiguous candles before the run whose bodies sit inside a band
///    around the run's opening price,
/// 3. a close at or above that opening price within `retracement_factor` times
///    the run length,
/// 4. no later candle body dipping below the run's closing price.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: DetectorConfig,
}

/// A red run that passed the panic-intensity gate.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PanicRun {
    start: usize,
    end: usize,
    candle_count: usize,
    per_candle: Decimal,
}

impl PatternDetector {
    /// Create a detector with custom thresholds.
    pub fn new(config: DetectorConfig) -> Result<Self, SphError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Find all matches in `candles` (oldest first).
    ///
    /// Matches come back most recent first. Every ending index is tried, so
    /// candidate windows may overlap. Inputs shorter than two candles yield nothing.
    pub fn find(&self, symbol: &str, candles: &[Candle]) -> Vec<PatternMatch> {
        let span = debug_span!("find", symbol, candles = candles.len());
        let _guard = span.enter();

        let matches: Vec<PatternMatch> = (1..candles.len())
            .rev()
            .filter_map(|end| self.evaluate(candles, end))
            .collect();

        debug!(matches = matches.len(), "scan complete");
        matches
    }

    fn evaluate(&self, candles: &[Candle], end: usize) -> Option<PatternMatch> {
        let run = self.panic_run(candles, end)?;
        let start_price = candles[run.start].open;
        let panic_price = candles[run.end].close;
        debug!(
            start = run.start,
            end = run.end,
            per_candle = %run.per_candle,
            "panic run found"
        );

        let stable = self.stability_count(candles, run.start, start_price);
        if stable < self.config.min_stability_candles {
            trace!(end, stable, "not enough stability before panic");
            return None;
        }

        let window = run.candle_count.saturating_mul(self.config.retracement_factor);
        if !price_retraces_to(candles, start_price, run.end + 1, window) {
            trace!(end, window, "no retracement within window");
            return None;
        }

        if price_went_below(candles, panic_price, run.end) {
            trace!(end, %panic_price, "invalidated by later dip");
            return None;
        }

        let found = PatternMatch {
            symbol: candles[run.start].symbol.clone(),
            timestamp: candles[run.end].timestamp,
            price: panic_price,
            stability_candles: stable,
        };
        debug!(date = %found.date(), price = %found.price, stable, "pattern matched");
        Some(found)
    }

    /// Walk back from `end` over red candles. Index 0 is never part of a run.
    fn panic_run(&self, candles: &[Candle], end: usize) -> Option<PanicRun> {
        let threshold = self.config.min_panic_percentage;

        let mut index = end;
        let mut total = Decimal::ZERO;
        let mut candle_count = 0usize;
        while index > 0 {
            let candle = &candles[index];
            if !candle.is_red() {
                break;
            }
            total += candle.body_percentage();
            index -= 1;
            candle_count += 1;
        }

        if candle_count == 0 {
            return None;
        }

        let mut per_candle = total / Decimal::from(candle_count);
        if per_candle < threshold && candle_count > 1 {
            // The earliest red candle may still belong to the stability phase.
            candle_count -= 1;
            let earliest = candles[end - candle_count].body_percentage();
            if earliest < threshold {
                total -= earliest;
                per_candle = total / Decimal::from(candle_count);
            }
        }

        if per_candle < threshold {
            trace!(end, %per_candle, "red run below panic threshold");
            return None;
        }

        Some(PanicRun {
            start: end + 1 - candle_count,
            end,
            candle_count,
            per_candle,
        })
    }

    /// Count contiguous candles before `start` whose bodies stay inside the band
    /// around `anchor`.
    fn stability_count(&self, candles: &[Candle], start: usize, anchor: Decimal) -> usize {
        let band = self.config.stability_band_percentage;
        let unit = anchor / Decimal::ONE_HUNDRED;
        let low = unit * (Decimal::ONE_HUNDRED - band);
        let high = unit * (Decimal::ONE_HUNDRED + band);

        candles[..start.min(candles.len())]
            .iter()
            .rev()
            .take_while(|c| c.body_low() >= low && c.body_high() <= high)
            .count()
    }
}

/// True if any close in `[from, from + max_candles]` reaches `price`.
/// The window is clamped to the last candle.
fn price_retraces_to(candles: &[Candle], price: Decimal, from: usize, max_candles: usize) -> bool {
    if from >= candles.len() {
        return false;
    }
    let last = from.saturating_add(max_candles).min(candles.len() - 1);
    candles[from..=last].iter().any(|c| c.close >= price)
}

/// True if any candle after `after` has a body low strictly below `price`.
fn price_went_below(candles: &[Candle], price: Decimal, after: usize) -> bool {
    candles
        .iter()
        .skip(after + 1)
        .any(|c| c.body_low() < price)
}
