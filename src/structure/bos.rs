// src/structure/bos.rs
// Break of Structure: price trading through a prior swing in the
// direction that swing implies

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::StructureError;
use crate::structure::swings::{SwingKind, SwingPoint};
use crate::types::{ensure_time_ordered, PriceBar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BosDirection {
    Bullish,
    Bearish,
}

impl BosDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BosDirection::Bullish => "bullish",
            BosDirection::Bearish => "bearish",
        }
    }
}

/// A confirmed structural break. Created once when detected, never
/// mutated or retracted; owns copies of the swing and bar it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BosEvent {
    pub direction: BosDirection,
    pub broken_swing: SwingPoint,
    pub break_price: Decimal,
    pub break_bar: PriceBar,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for BosEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BOS({}) @ {} broke {} at {}",
            self.direction.as_str(),
            self.break_price,
            self.broken_swing.kind.as_str(),
            self.broken_swing.price
        )
    }
}

/// Detects Break of Structure events.
///
/// A bullish BOS is the break price exceeding the most recently formed
/// unbroken swing high; a bearish BOS is the symmetric break below the
/// most recent unbroken swing low. Each swing is broken at most once per
/// run, and older never-broken swings are intentionally skipped once a
/// newer swing of the same kind exists: structure only cares about the
/// latest reference point.
pub struct BosDetector {
    use_body: bool,
}

impl BosDetector {
    /// `use_body = true` compares against the bar close, `false` against
    /// the wick (high/low).
    pub fn new(use_body: bool) -> Self {
        Self { use_body }
    }

    pub fn use_body(&self) -> bool {
        self.use_body
    }

    pub fn detect_bos(
        &self,
        bars: &[PriceBar],
        swings: &[SwingPoint],
    ) -> Result<Vec<BosEvent>, StructureError> {
        ensure_time_ordered(bars)?;

        if swings.is_empty() || bars.len() < 2 {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        // Broken swings are tracked by bar index, local to this run.
        let mut broken: HashSet<usize> = HashSet::new();

        for (i, bar) in bars.iter().enumerate() {
            // Both reference swings are resolved before either direction is
            // evaluated, so a bullish break on this bar cannot hide the
            // bearish candidate on the same bar.
            let last_high = most_recent_eligible(swings, SwingKind::High, i, &broken);
            let last_low = most_recent_eligible(swings, SwingKind::Low, i, &broken);

            if let Some(swing) = last_high {
                let break_price = if self.use_body { bar.close } else { bar.high };
                if break_price > swing.price {
                    let event = BosEvent {
                        direction: BosDirection::Bullish,
                        broken_swing: *swing,
                        break_price,
                        break_bar: bar.clone(),
                        timestamp: bar.timestamp,
                    };
                    info!("Bullish BOS detected: {}", event);
                    broken.insert(swing.index);
                    events.push(event);
                }
            }

            if let Some(swing) = last_low {
                let break_price = if self.use_body { bar.close } else { bar.low };
                if break_price < swing.price {
                    let event = BosEvent {
                        direction: BosDirection::Bearish,
                        broken_swing: *swing,
                        break_price,
                        break_bar: bar.clone(),
                        timestamp: bar.timestamp,
                    };
                    info!("Bearish BOS detected: {}", event);
                    broken.insert(swing.index);
                    events.push(event);
                }
            }
        }

        Ok(events)
    }
}

/// Most recently formed swing of the given kind that precedes bar `i` and
/// has not been broken yet. Last in time order, not the most extreme price.
pub(crate) fn most_recent_eligible<'a>(
    swings: &'a [SwingPoint],
    kind: SwingKind,
    bar_index: usize,
    broken: &HashSet<usize>,
) -> Option<&'a SwingPoint> {
    swings
        .iter()
        .rev()
        .find(|s| s.kind == kind && s.index < bar_index && !broken.contains(&s.index))
}
