//! @ai:module:intent Benchmark result data model, normalization and filtering
//! @ai:module:layer domain
//! @ai:module:public_api QuestionResult, ItemResult, Category, CategoryNaming, ResultDocument, ResultFilter

pub mod category;
pub mod document;
pub mod filter;
pub mod model;

pub use category::{Category, CategoryNaming, NamingScheme};
pub use document::{normalize, ResultDocument};
pub use filter::ResultFilter;
pub use model::{FactType, ItemResult, QuestionResult, RetrievedMemory};
