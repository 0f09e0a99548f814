//! @ai:module:intent Summary types produced by result aggregation
//! @ai:module:layer domain
//! @ai:module:public_api CategoryStat, AggregateSummary, ReportedTotals, Headline, CategoryRow, BenchmarkView
//! @ai:module:stateless true

use crate::results::Category;
use serde::{Deserialize, Serialize};

/// @ai:intent Per-category accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: Category,
    pub correct: u32,
    /// All questions in the category, invalid ones included
    pub total: u32,
    pub invalid: u32,
}

impl CategoryStat {
    /// @ai:intent Create an empty accumulator for a category
    /// @ai:effects pure
    pub fn new(category: Category) -> Self {
        Self {
            category,
            correct: 0,
            total: 0,
            invalid: 0,
        }
    }

    /// @ai:effects pure
    pub fn valid_total(&self) -> u32 {
        self.total.saturating_sub(self.invalid)
    }

    /// @ai:intent Accuracy percentage over valid questions
    /// @ai:post 0.0 when the category has no valid questions
    /// @ai:effects pure
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct, self.valid_total())
    }
}

/// @ai:intent Top-level aggregation output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Accuracy over valid questions only
    pub overall_accuracy: f64,
    pub total_correct: u32,
    /// Valid and invalid questions
    pub total_questions: u32,
    pub total_valid: u32,
    pub total_invalid: u32,
    pub item_count: u32,
    /// First-seen order
    pub category_stats: Vec<CategoryStat>,
}

impl AggregateSummary {
    /// @ai:intent Look up the stats of one category
    /// @ai:effects pure
    pub fn category(&self, category: &Category) -> Option<&CategoryStat> {
        self.category_stats.iter().find(|s| &s.category == category)
    }
}

/// @ai:intent Headline numbers a result document supplies about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedTotals {
    pub overall_accuracy: Option<f64>,
    pub total_correct: Option<u32>,
    pub total_questions: Option<u32>,
    pub total_valid: Option<u32>,
    pub num_items: Option<u32>,
}

/// @ai:intent Where a headline value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSource {
    Supplied,
    Computed,
}

/// @ai:intent Numbers shown at the top of a result view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub overall_accuracy: f64,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_valid: u32,
    pub total_valid_source: TotalSource,
    pub total_invalid: u32,
    pub item_count: u32,
}

/// @ai:intent One rendered row of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: Category,
    pub label: String,
    pub correct: u32,
    pub total: u32,
    pub invalid: u32,
    pub valid_total: u32,
    pub accuracy: f64,
}

/// @ai:intent Everything needed to present one loaded benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkView {
    pub benchmark: String,
    pub mode: Option<String>,
    pub generated_at: String,
    pub headline: Headline,
    pub categories: Vec<CategoryRow>,
    pub summary: AggregateSummary,
}

/// @ai:intent Percentage of part over whole
/// @ai:post 0.0 when whole is 0
/// @ai:effects pure
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
