// src/types.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::StructureError;

/// A single closed OHLC bar for one symbol/timeframe.
///
/// Invariants (checked in [`PriceBar::new`], so downstream analysis can
/// assume them): `low <= open <= high`, `low <= close <= high`, all prices
/// positive. Timestamps are UTC by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub timeframe: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub tick_volume: u64,
    pub real_volume: u64,
}

impl PriceBar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: String,
        timeframe: String,
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        tick_volume: u64,
        real_volume: u64,
    ) -> Result<Self, StructureError> {
        if open <= Decimal::ZERO
            || high <= Decimal::ZERO
            || low <= Decimal::ZERO
            || close <= Decimal::ZERO
        {
            return Err(StructureError::InvalidBar(format!(
                "all prices must be positive, got O:{} H:{} L:{} C:{}",
                open, high, low, close
            )));
        }

        if !(low <= open && open <= high) {
            return Err(StructureError::InvalidBar(format!(
                "low ({}) <= open ({}) <= high ({}) violated for {} at {}",
                low, open, high, symbol, timestamp
            )));
        }

        if !(low <= close && close <= high) {
            return Err(StructureError::InvalidBar(format!(
                "low ({}) <= close ({}) <= high ({}) violated for {} at {}",
                low, close, high, symbol, timestamp
            )));
        }

        Ok(Self {
            symbol,
            timeframe,
            timestamp,
            open,
            high,
            low,
            close,
            tick_volume,
            real_volume,
        })
    }
}

/// Reject bar sequences that are not strictly time-ordered.
///
/// Every component that consumes bars calls this on entry; a duplicate or
/// out-of-order timestamp fails the whole call rather than producing a
/// partially wrong scan.
pub fn ensure_time_ordered(bars: &[PriceBar]) -> Result<(), StructureError> {
    for i in 0..bars.len().saturating_sub(1) {
        if bars[i].timestamp >= bars[i + 1].timestamp {
            return Err(StructureError::Sequencing(format!(
                "bars must be time-ordered: bar {} ({}) >= bar {} ({})",
                i,
                bars[i].timestamp,
                i + 1,
                bars[i + 1].timestamp
            )));
        }
    }
    Ok(())
}
