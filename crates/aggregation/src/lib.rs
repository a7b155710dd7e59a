//! Hermes Bar Aggregation
//!
//! Stateful aggregators that fold the tick stream into bars, one
//! aggregator per [`market_data::BarType`]. Tick, volume and value
//! aggregation close on a running counter; time aggregation closes at the
//! first tick past the window boundary. Aggregators only ever emit
//! `INTERNAL` bars.

mod aggregator;
mod builder;
mod error;

pub use aggregator::{
    aggregator_for, BarAggregator, TickBarAggregator, TimeBarAggregator, ValueBarAggregator,
    VolumeBarAggregator,
};
pub use builder::BarBuilder;
pub use error::{AggregationError, AggregationResult};
