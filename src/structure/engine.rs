// src/structure/engine.rs
// Combined market-structure pipeline: bars -> swings -> trend -> breaks

use log::debug;
use serde_json::{json, Value};

use crate::errors::StructureError;
use crate::structure::analyzer::{StructureAnalyzer, StructureState};
use crate::structure::bos::{BosDetector, BosEvent};
use crate::structure::choch::{ChochDetector, ChochEvent};
use crate::structure::swings::{SwingDetector, SwingPoint, SwingStats};
use crate::types::PriceBar;

// ==================== STRUCTURE ANALYSIS REQUEST ====================

#[derive(Debug, Clone)]
pub struct StructureRequest {
    pub symbol: String,
    pub timeframe: String,
    pub bars: Vec<PriceBar>,
    pub lookback: usize,
    pub min_swings_for_trend: usize,
    pub use_body: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureResult {
    pub symbol: String,
    pub timeframe: String,
    pub swings: Vec<SwingPoint>,
    pub structure: StructureState,
    pub bos_events: Vec<BosEvent>,
    pub choch_events: Vec<ChochEvent>,
    pub bars_analyzed: usize,
    pub swing_stats: SwingStats,
}

impl StructureResult {
    /// Observability summary of one analysis run.
    pub fn summary(&self) -> Value {
        json!({
            "pattern": "market_structure",
            "symbol": self.symbol,
            "timeframe": self.timeframe,
            "total_bars": self.bars_analyzed,
            "total_detected": self.swings.len() + self.bos_events.len() + self.choch_events.len(),
            "trend": self.structure.trend.as_str(),
            "data": {
                "swings": {
                    "total": self.swings.len(),
                    "highs": self.swing_stats.highs,
                    "lows": self.swing_stats.lows,
                },
                "bos_events": self.bos_events.len(),
                "choch_events": self.choch_events.len(),
            },
        })
    }
}

// ==================== CORE STRUCTURE ENGINE ====================

/// Runs the four analysis components in dependency order over one request.
///
/// The engine adds no semantics of its own: fresh detectors are built per
/// call, so no state leaks between scans and concurrent calls over
/// different inputs are safe.
#[derive(Debug, Clone, Default)]
pub struct StructureEngine;

impl StructureEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, request: StructureRequest) -> Result<StructureResult, StructureError> {
        debug!(
            "[StructureEngine] Analyzing {}/{} with {} bars (lookback {})",
            request.symbol,
            request.timeframe,
            request.bars.len(),
            request.lookback
        );

        let mut swing_detector = SwingDetector::new(request.lookback)?;
        let analyzer = StructureAnalyzer::new(request.min_swings_for_trend)?;
        let bos_detector = BosDetector::new(request.use_body);
        let choch_detector = ChochDetector::new(request.use_body);

        let swings = swing_detector.detect_swings(&request.bars)?;
        let structure = analyzer.analyze(&swings);
        let bos_events = bos_detector.detect_bos(&request.bars, &swings)?;
        let choch_events =
            choch_detector.detect_choch(&request.bars, &swings, structure.trend)?;

        debug!(
            "[StructureEngine] Completed {}/{}: {} swings, trend {}, {} BOS, {} CHoCH",
            request.symbol,
            request.timeframe,
            swings.len(),
            structure.trend.as_str(),
            bos_events.len(),
            choch_events.len()
        );

        Ok(StructureResult {
            symbol: request.symbol,
            timeframe: request.timeframe,
            bars_analyzed: request.bars.len(),
            swing_stats: swing_detector.statistics(),
            swings,
            structure,
            bos_events,
            choch_events,
        })
    }
}
