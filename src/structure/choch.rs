// src/structure/choch.rs
// Change of Character: price breaking structure against the prevailing
// trend, the earliest objective sign of a possible reversal

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::StructureError;
use crate::structure::analyzer::TrendState;
use crate::structure::bos::most_recent_eligible;
use crate::structure::swings::{SwingKind, SwingPoint};
use crate::types::{ensure_time_ordered, PriceBar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChochType {
    BullishToBearish,
    BearishToBullish,
}

impl ChochType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChochType::BullishToBearish => "bullish_to_bearish",
            ChochType::BearishToBullish => "bearish_to_bullish",
        }
    }
}

/// A counter-trend structural break. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChochEvent {
    pub choch_type: ChochType,
    pub broken_swing: SwingPoint,
    pub break_price: Decimal,
    pub break_bar: PriceBar,
    /// Trend that was in force before the break.
    pub prior_trend: TrendState,
    pub timestamp: DateTime<Utc>,
}

/// Detects Change of Character events.
///
/// CHoCH only exists once a directional trend does: in an uptrend a break
/// below the most recent unbroken swing low, in a downtrend a break above
/// the most recent unbroken swing high. The trend is a single fixed value
/// for the whole scan; callers wanting time-varying trend context re-invoke
/// per trend-state change.
pub struct ChochDetector {
    use_body: bool,
}

impl ChochDetector {
    /// `use_body = true` compares against the bar close, `false` against
    /// the wick (high/low).
    pub fn new(use_body: bool) -> Self {
        Self { use_body }
    }

    pub fn use_body(&self) -> bool {
        self.use_body
    }

    pub fn detect_choch(
        &self,
        bars: &[PriceBar],
        swings: &[SwingPoint],
        trend_state: TrendState,
    ) -> Result<Vec<ChochEvent>, StructureError> {
        // Without an established trend there is nothing to change character from.
        if trend_state == TrendState::Ranging || trend_state == TrendState::Unknown {
            return Ok(Vec::new());
        }

        ensure_time_ordered(bars)?;

        let mut events = Vec::new();
        // Tracked independently of the BOS detector: the two never share state.
        let mut broken: HashSet<usize> = HashSet::new();

        for (i, bar) in bars.iter().enumerate() {
            if trend_state == TrendState::Bullish {
                if let Some(swing) = most_recent_eligible(swings, SwingKind::Low, i, &broken) {
                    let break_price = if self.use_body { bar.close } else { bar.low };
                    if break_price < swing.price {
                        info!(
                            "CHoCH detected (bullish -> bearish): {} broke low at {}",
                            break_price, swing.price
                        );
                        broken.insert(swing.index);
                        events.push(ChochEvent {
                            choch_type: ChochType::BullishToBearish,
                            broken_swing: *swing,
                            break_price,
                            break_bar: bar.clone(),
                            prior_trend: trend_state,
                            timestamp: bar.timestamp,
                        });
                    }
                }
            } else if let Some(swing) = most_recent_eligible(swings, SwingKind::High, i, &broken) {
                let break_price = if self.use_body { bar.close } else { bar.high };
                if break_price > swing.price {
                    info!(
                        "CHoCH detected (bearish -> bullish): {} broke high at {}",
                        break_price, swing.price
                    );
                    broken.insert(swing.index);
                    events.push(ChochEvent {
                        choch_type: ChochType::BearishToBullish,
                        broken_swing: *swing,
                        break_price,
                        break_bar: bar.clone(),
                        prior_trend: trend_state,
                        timestamp: bar.timestamp,
                    });
                }
            }
        }

        Ok(events)
    }
}
