//! Change detection and timeline aggregation over capture sequences.

pub mod aggregator;
pub mod analysis;
pub mod changes;
pub mod export;
pub mod summary;
pub mod table;
