// src/structure/analyzer.rs
// Trend classification from swing point progression

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StructureError;
use crate::structure::swings::{SwingKind, SwingPoint};

pub const DEFAULT_MIN_SWINGS_FOR_TREND: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    Bullish,
    Bearish,
    Ranging,
    Unknown,
}

impl TrendState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendState::Bullish => "bullish",
            TrendState::Bearish => "bearish",
            TrendState::Ranging => "ranging",
            TrendState::Unknown => "unknown",
        }
    }
}

/// Snapshot of the market structure as of the latest swing.
///
/// Produced fresh on each [`StructureAnalyzer::analyze`] call; the trend is
/// always recomputed from the swing set, never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureState {
    pub trend: TrendState,
    pub last_swing_high: Option<SwingPoint>,
    pub last_swing_low: Option<SwingPoint>,
    /// Current streak of consecutive higher highs (resets on any break).
    pub higher_highs: usize,
    /// Current streak of consecutive lower lows (resets on any break).
    pub lower_lows: usize,
    /// Timestamp of the most recent contributing swing.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Classifies the prevailing trend from swing progression.
///
/// Rules:
/// - Bullish: higher highs AND a higher low confirming the structure
/// - Bearish: lower lows AND a lower high confirming the structure
/// - Ranging: mixed or no clear direction
/// - Unknown: not enough swings on either side
pub struct StructureAnalyzer {
    min_swings_for_trend: usize,
}

impl StructureAnalyzer {
    pub fn new(min_swings_for_trend: usize) -> Result<Self, StructureError> {
        if min_swings_for_trend < 1 {
            return Err(StructureError::InvalidParameter(format!(
                "min_swings_for_trend must be >= 1, got {}",
                min_swings_for_trend
            )));
        }

        Ok(Self {
            min_swings_for_trend,
        })
    }

    pub fn min_swings_for_trend(&self) -> usize {
        self.min_swings_for_trend
    }

    /// Analyze structure from a time-ordered swing sequence.
    pub fn analyze(&self, swings: &[SwingPoint]) -> StructureState {
        if swings.is_empty() {
            return StructureState {
                trend: TrendState::Unknown,
                last_swing_high: None,
                last_swing_low: None,
                higher_highs: 0,
                lower_lows: 0,
                timestamp: None,
            };
        }

        let highs: Vec<SwingPoint> = swings
            .iter()
            .copied()
            .filter(|s| s.kind == SwingKind::High)
            .collect();
        let lows: Vec<SwingPoint> = swings
            .iter()
            .copied()
            .filter(|s| s.kind == SwingKind::Low)
            .collect();

        // Current streaks, not historical maxima: any non-increase (or
        // non-decrease for lows) resets the counter to zero.
        let mut higher_highs = 0;
        for i in 1..highs.len() {
            if highs[i].price > highs[i - 1].price {
                higher_highs += 1;
            } else {
                higher_highs = 0;
            }
        }

        let mut lower_lows = 0;
        for i in 1..lows.len() {
            if lows[i].price < lows[i - 1].price {
                lower_lows += 1;
            } else {
                lower_lows = 0;
            }
        }

        let trend = self.determine_trend(&highs, &lows, higher_highs, lower_lows);

        StructureState {
            trend,
            last_swing_high: highs.last().copied(),
            last_swing_low: lows.last().copied(),
            higher_highs,
            lower_lows,
            timestamp: swings.last().map(|s| s.timestamp),
        }
    }

    fn determine_trend(
        &self,
        highs: &[SwingPoint],
        lows: &[SwingPoint],
        higher_highs: usize,
        lower_lows: usize,
    ) -> TrendState {
        if highs.len() < self.min_swings_for_trend || lows.len() < self.min_swings_for_trend {
            return TrendState::Unknown;
        }

        // The bullish branch is evaluated first: were both structures ever
        // to qualify at once, bullish wins the tie.
        if higher_highs >= self.min_swings_for_trend - 1
            && lows.len() >= 2
            && lows[lows.len() - 1].price > lows[lows.len() - 2].price
        {
            return TrendState::Bullish;
        }

        if lower_lows >= self.min_swings_for_trend - 1
            && highs.len() >= 2
            && highs[highs.len() - 1].price < highs[highs.len() - 2].price
        {
            return TrendState::Bearish;
        }

        TrendState::Ranging
    }
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self {
            min_swings_for_trend: DEFAULT_MIN_SWINGS_FOR_TREND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn swing(minute: i64, price: Decimal, kind: SwingKind) -> SwingPoint {
        let ts = Utc.timestamp_opt(minute * 60, 0).unwrap();
        SwingPoint::new(ts, price, kind, minute as usize, 2, 4).unwrap()
    }

    /// Alternating high/low swings from parallel price tracks.
    fn alternating(highs: &[Decimal], lows: &[Decimal]) -> Vec<SwingPoint> {
        let mut swings = Vec::new();
        for i in 0..highs.len().max(lows.len()) {
            if i < highs.len() {
                swings.push(swing(2 * i as i64, highs[i], SwingKind::High));
            }
            if i < lows.len() {
                swings.push(swing(2 * i as i64 + 1, lows[i], SwingKind::Low));
            }
        }
        swings
    }

    #[test]
    fn test_min_swings_zero_rejected() {
        assert!(matches!(
            StructureAnalyzer::new(0),
            Err(StructureError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_swings_yield_unknown() {
        let analyzer = StructureAnalyzer::default();
        let state = analyzer.analyze(&[]);

        assert_eq!(state.trend, TrendState::Unknown);
        assert!(state.last_swing_high.is_none());
        assert!(state.last_swing_low.is_none());
        assert_eq!(state.higher_highs, 0);
        assert_eq!(state.lower_lows, 0);
        assert!(state.timestamp.is_none());
    }

    #[test]
    fn test_too_few_swings_yield_unknown() {
        let swings = alternating(&[dec!(1.10)], &[dec!(1.05)]);
        let analyzer = StructureAnalyzer::default();

        assert_eq!(analyzer.analyze(&swings).trend, TrendState::Unknown);
    }

    #[test]
    fn test_rising_swings_yield_bullish() {
        // Four rising highs and four rising lows.
        let swings = alternating(
            &[dec!(1.10), dec!(1.11), dec!(1.12), dec!(1.13)],
            &[dec!(1.05), dec!(1.06), dec!(1.07), dec!(1.08)],
        );
        let analyzer = StructureAnalyzer::default();
        let state = analyzer.analyze(&swings);

        assert_eq!(state.trend, TrendState::Bullish);
        assert!(state.higher_highs >= 1);
        assert_eq!(state.higher_highs, 3);
        assert_eq!(state.lower_lows, 0);
        assert_eq!(state.last_swing_high.unwrap().price, dec!(1.13));
        assert_eq!(state.last_swing_low.unwrap().price, dec!(1.08));
        // State timestamp is the latest contributing swing's, not "now".
        assert_eq!(state.timestamp, Some(swings.last().unwrap().timestamp));
    }

    #[test]
    fn test_falling_swings_yield_bearish() {
        let swings = alternating(
            &[dec!(1.13), dec!(1.12), dec!(1.11), dec!(1.10)],
            &[dec!(1.08), dec!(1.07), dec!(1.06), dec!(1.05)],
        );
        let analyzer = StructureAnalyzer::default();
        let state = analyzer.analyze(&swings);

        assert_eq!(state.trend, TrendState::Bearish);
        assert_eq!(state.lower_lows, 3);
        assert_eq!(state.higher_highs, 0);
    }

    #[test]
    fn test_streak_resets_on_break() {
        // 1.11 > 1.10 starts a streak, 1.105 breaks it, 1.12 restarts it.
        let swings = alternating(
            &[dec!(1.10), dec!(1.11), dec!(1.105), dec!(1.12)],
            &[dec!(1.05), dec!(1.05), dec!(1.05), dec!(1.05)],
        );
        let analyzer = StructureAnalyzer::default();
        let state = analyzer.analyze(&swings);

        assert_eq!(state.higher_highs, 1);
        assert_eq!(state.lower_lows, 0);
        // Flat lows leave the structure unconfirmed either way.
        assert_eq!(state.trend, TrendState::Ranging);
    }

    #[test]
    fn test_mixed_swings_yield_ranging() {
        let swings = alternating(
            &[dec!(1.10), dec!(1.12), dec!(1.09)],
            &[dec!(1.05), dec!(1.03), dec!(1.06)],
        );
        let analyzer = StructureAnalyzer::default();

        assert_eq!(analyzer.analyze(&swings).trend, TrendState::Ranging);
    }

    #[test]
    fn test_higher_highs_without_higher_low_is_not_bullish() {
        // Highs rise but the latest low undercuts its predecessor.
        let swings = alternating(
            &[dec!(1.10), dec!(1.11), dec!(1.12)],
            &[dec!(1.05), dec!(1.06), dec!(1.04)],
        );
        let analyzer = StructureAnalyzer::default();

        assert_ne!(analyzer.analyze(&swings).trend, TrendState::Bullish);
    }
}
