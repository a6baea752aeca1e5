// src/structure/swings.rs
// Objective swing high/low detection with a symmetric lookback window

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::StructureError;
use crate::types::{ensure_time_ordered, PriceBar};

pub const DEFAULT_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwingKind::High => "high",
            SwingKind::Low => "low",
        }
    }
}

/// A confirmed local price extremum.
///
/// Created once by the [`SwingDetector`] from a fully closed bar window and
/// never mutated afterwards. Downstream detectors consume these read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub kind: SwingKind,
    /// Position of the swing bar within the input bar sequence.
    pub index: usize,
    /// Window size used to confirm this swing.
    pub lookback: usize,
    /// Count of neighboring bars whose extreme is strictly worse than the
    /// swing price. Higher strength = more bars respect the level.
    pub strength: usize,
}

impl SwingPoint {
    pub fn new(
        timestamp: DateTime<Utc>,
        price: Decimal,
        kind: SwingKind,
        index: usize,
        lookback: usize,
        strength: usize,
    ) -> Result<Self, StructureError> {
        if price <= Decimal::ZERO {
            return Err(StructureError::InvalidParameter(format!(
                "swing price must be positive, got {}",
                price
            )));
        }
        if lookback < 1 {
            return Err(StructureError::InvalidParameter(format!(
                "lookback must be >= 1, got {}",
                lookback
            )));
        }

        Ok(Self {
            timestamp,
            price,
            kind,
            index,
            lookback,
            strength,
        })
    }
}

/// Per-run detection statistics. Diagnostic only, not part of the
/// functional contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwingStats {
    pub lookback: usize,
    pub total_swings: usize,
    pub highs: usize,
    pub lows: usize,
}

/// Detects swing highs and lows in price data.
///
/// Deterministic and free of lookahead: only bars with a full `lookback`
/// window of confirmed bars on both sides are eligible, so the most recent
/// `lookback` bars never produce a swing (no repainting).
pub struct SwingDetector {
    lookback: usize,
    stats: SwingStats,
}

impl SwingDetector {
    /// Build a detector with the given symmetric window size.
    ///
    /// `lookback` is the number of bars required on each side of a swing
    /// bar (5 = 5 left + swing bar + 5 right = 11 bar window).
    pub fn new(lookback: usize) -> Result<Self, StructureError> {
        if lookback < 1 {
            return Err(StructureError::InvalidParameter(format!(
                "lookback must be >= 1, got {}",
                lookback
            )));
        }

        Ok(Self {
            lookback,
            stats: SwingStats {
                lookback,
                ..SwingStats::default()
            },
        })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Statistics from the most recent [`detect_swings`](Self::detect_swings) run.
    pub fn statistics(&self) -> SwingStats {
        self.stats
    }

    /// Detect all swing points in a time-ordered bar sequence.
    ///
    /// Fewer than `2 * lookback + 1` bars is a quiet outcome (empty result,
    /// not an error). Non-monotonic timestamps fail the whole call.
    pub fn detect_swings(&mut self, bars: &[PriceBar]) -> Result<Vec<SwingPoint>, StructureError> {
        // Statistics are scoped to a single run, never carried across scans.
        self.stats = SwingStats {
            lookback: self.lookback,
            ..SwingStats::default()
        };

        if bars.is_empty() {
            return Ok(Vec::new());
        }

        ensure_time_ordered(bars)?;

        let min_bars = self.lookback * 2 + 1;
        if bars.len() < min_bars {
            debug!(
                "[SwingDetector] {} bars < {} required, nothing to scan",
                bars.len(),
                min_bars
            );
            return Ok(Vec::new());
        }

        let mut swings = Vec::new();

        // The last `lookback` bars are not yet confirmed and never evaluated.
        for i in self.lookback..bars.len() - self.lookback {
            if self.is_swing_high(bars, i) {
                let swing = SwingPoint::new(
                    bars[i].timestamp,
                    bars[i].high,
                    SwingKind::High,
                    i,
                    self.lookback,
                    self.strength(bars, i, SwingKind::High),
                )?;
                swings.push(swing);
                self.stats.total_swings += 1;
                self.stats.highs += 1;
            }

            if self.is_swing_low(bars, i) {
                let swing = SwingPoint::new(
                    bars[i].timestamp,
                    bars[i].low,
                    SwingKind::Low,
                    i,
                    self.lookback,
                    self.strength(bars, i, SwingKind::Low),
                )?;
                swings.push(swing);
                self.stats.total_swings += 1;
                self.stats.lows += 1;
            }
        }

        // Already monotonic from the scan order; the contract still requires
        // an explicit sort so a future batched scan stays correct.
        swings.sort_by_key(|s| s.timestamp);

        debug!(
            "[SwingDetector] {} swings over {} bars ({} highs, {} lows)",
            swings.len(),
            bars.len(),
            self.stats.highs,
            self.stats.lows
        );

        Ok(swings)
    }

    /// Swing high: strictly above every high on the left, at or above every
    /// high on the right (ties on the right do not disqualify).
    fn is_swing_high(&self, bars: &[PriceBar], index: usize) -> bool {
        let center = bars[index].high;

        for i in index - self.lookback..index {
            if bars[i].high >= center {
                return false;
            }
        }

        for i in index + 1..=index + self.lookback {
            if bars[i].high > center {
                return false;
            }
        }

        true
    }

    /// Swing low: strictly below every low on the left, at or below every
    /// low on the right.
    fn is_swing_low(&self, bars: &[PriceBar], index: usize) -> bool {
        let center = bars[index].low;

        for i in index - self.lookback..index {
            if bars[i].low <= center {
                return false;
            }
        }

        for i in index + 1..=index + self.lookback {
            if bars[i].low < center {
                return false;
            }
        }

        true
    }

    fn strength(&self, bars: &[PriceBar], index: usize, kind: SwingKind) -> usize {
        let mut strength = 0;

        for i in index - self.lookback..=index + self.lookback {
            if i == index {
                continue;
            }
            let respects = match kind {
                SwingKind::High => bars[i].high < bars[index].high,
                SwingKind::Low => bars[i].low > bars[index].low,
            };
            if respects {
                strength += 1;
            }
        }

        strength
    }
}

impl Default for SwingDetector {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            stats: SwingStats {
                lookback: DEFAULT_LOOKBACK,
                ..SwingStats::default()
            },
        }
    }
}

/// Most recent swing high in a time-ordered swing sequence.
pub fn last_swing_high(swings: &[SwingPoint]) -> Option<&SwingPoint> {
    swings.iter().rev().find(|s| s.kind == SwingKind::High)
}

/// Most recent swing low in a time-ordered swing sequence.
pub fn last_swing_low(swings: &[SwingPoint]) -> Option<&SwingPoint> {
    swings.iter().rev().find(|s| s.kind == SwingKind::Low)
}
