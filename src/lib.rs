//! @ai:module:intent Memora benchmark results viewer library
//! @ai:module:layer application
//! @ai:module:public_api config, error, fetch, metrics, report, results, session

pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod report;
pub mod results;
pub mod session;

pub use config::{BenchmarkSpec, ViewerConfig};
pub use error::{Result, ViewerError};
pub use fetch::{HttpResultsSource, LocalResultsSource, ResultsSourceTrait};
pub use metrics::{AggregateSummary, BenchmarkView, CategoryStat, ResultAggregator};
pub use report::{RenderOptions, ReportGenerator};
pub use results::{Category, CategoryNaming, ItemResult, NamingScheme, QuestionResult, ResultFilter};
pub use session::{LoadedBenchmark, PanelState, ViewerSession};
