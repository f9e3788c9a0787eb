//! # LotMap Analytics
//!
//! Derived views over the lot, sublot, and crop collections: map layers,
//! fit-to-data points, coverage summaries, and the top-by-area ranking
//! filtered by normalized crop type.

pub mod aggregator;
pub mod crop_type;

pub use aggregator::{
    rank_by_area, LotLayer, MapDataAggregator, MapSummary, RankedLot, SublotLayer,
    DEFAULT_TOP_N,
};
pub use crop_type::{normalize_crop_type, CropCategory};
