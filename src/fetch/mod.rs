//! @ai:module:intent Sources of raw benchmark result documents
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultsSourceTrait, HttpResultsSource, LocalResultsSource, MockResultsSource

pub mod client;
pub mod local;

pub use client::{
    display_name, failure_from_response, HttpResultsSource, MockResponse, MockResultsSource,
    ResultsSourceTrait,
};
pub use local::{LocalResultFile, LocalResultsSource};
