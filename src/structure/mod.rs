// src/structure/mod.rs

// Declare submodules
pub mod analyzer;
pub mod bos;
pub mod choch;
pub mod engine;
pub mod swings;

// Export the analysis components
pub use analyzer::{StructureAnalyzer, StructureState, TrendState, DEFAULT_MIN_SWINGS_FOR_TREND};
pub use bos::{BosDetector, BosDirection, BosEvent};
pub use choch::{ChochDetector, ChochEvent, ChochType};
pub use engine::{StructureEngine, StructureRequest, StructureResult};
pub use swings::{
    last_swing_high, last_swing_low, SwingDetector, SwingKind, SwingPoint, SwingStats,
    DEFAULT_LOOKBACK,
};
