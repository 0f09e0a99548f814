//! @ai:module:intent Result aggregation and summary statistics
//! @ai:module:layer application
//! @ai:module:public_api ResultAggregator, AggregateSummary, CategoryStat, BenchmarkView

pub mod aggregator;
pub mod types;

pub use aggregator::{ResultAggregator, ResultAggregatorTrait};
pub use types::{
    percentage, AggregateSummary, BenchmarkView, CategoryRow, CategoryStat, Headline,
    ReportedTotals, TotalSource,
};
