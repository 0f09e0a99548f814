//! @ai:module:intent Aggregate per-question outcomes into summary statistics
//! @ai:module:layer application
//! @ai:module:public_api ResultAggregator, ResultAggregatorTrait
//! @ai:module:stateless true

use crate::metrics::types::{
    percentage, AggregateSummary, BenchmarkView, CategoryRow, CategoryStat, Headline,
    ReportedTotals, TotalSource,
};
use crate::results::{Category, CategoryNaming, ItemResult, NamingScheme, ResultDocument};

/// @ai:intent Trait for result aggregation
pub trait ResultAggregatorTrait: Send + Sync {
    /// @ai:intent Aggregate item results into a summary
    fn aggregate(&self, items: &[ItemResult]) -> AggregateSummary;
}

/// @ai:intent Aggregates item results, parameterized by a category naming strategy
pub struct ResultAggregator<N: CategoryNaming = NamingScheme> {
    naming: N,
}

impl<N: CategoryNaming> ResultAggregator<N> {
    /// @ai:intent Create an aggregator using the given naming strategy
    /// @ai:effects pure
    pub fn new(naming: N) -> Self {
        Self { naming }
    }

    /// @ai:effects pure
    pub fn naming(&self) -> &N {
        &self.naming
    }

    /// @ai:intent Build display rows for the category breakdown
    /// @ai:effects pure
    pub fn category_rows(&self, summary: &AggregateSummary) -> Vec<CategoryRow> {
        summary
            .category_stats
            .iter()
            .map(|stat| CategoryRow {
                category: stat.category.clone(),
                label: self.naming.display_name(&stat.category),
                correct: stat.correct,
                total: stat.total,
                invalid: stat.invalid,
                valid_total: stat.valid_total(),
                accuracy: stat.accuracy(),
            })
            .collect()
    }

    /// @ai:intent Resolve headline numbers, preferring values the document supplied
    /// @ai:effects log
    pub fn headline(&self, summary: &AggregateSummary, reported: &ReportedTotals) -> Headline {
        let (total_valid, total_valid_source) = match reported.total_valid {
            Some(supplied) => {
                warn_on_disagreement("total_valid", supplied, summary.total_valid);
                (supplied, TotalSource::Supplied)
            }
            None => (summary.total_valid, TotalSource::Computed),
        };

        let overall_accuracy = match reported.overall_accuracy {
            Some(supplied) => {
                if (supplied - summary.overall_accuracy).abs() > 0.01 {
                    tracing::warn!(
                        "Supplied overall_accuracy {:.2} disagrees with computed {:.2}",
                        supplied,
                        summary.overall_accuracy
                    );
                }
                supplied
            }
            None => summary.overall_accuracy,
        };

        Headline {
            overall_accuracy,
            total_correct: prefer_supplied("total_correct", reported.total_correct, summary.total_correct),
            total_questions: prefer_supplied(
                "total_questions",
                reported.total_questions,
                summary.total_questions,
            ),
            total_valid,
            total_valid_source,
            total_invalid: summary.total_invalid,
            item_count: prefer_supplied("num_items", reported.num_items, summary.item_count),
        }
    }

    /// @ai:intent Aggregate a normalized document into a presentable view
    /// @ai:effects pure, log
    pub fn view(&self, benchmark: &str, mode: Option<&str>, document: &ResultDocument) -> BenchmarkView {
        let summary = self.aggregate(&document.items);
        let headline = self.headline(&summary, &document.reported);
        let categories = self.category_rows(&summary);

        BenchmarkView {
            benchmark: benchmark.to_string(),
            mode: mode.map(str::to_string),
            generated_at: chrono::Utc::now().to_rfc3339(),
            headline,
            categories,
            summary,
        }
    }
}

impl Default for ResultAggregator<NamingScheme> {
    fn default() -> Self {
        Self::new(NamingScheme::default())
    }
}

impl<N: CategoryNaming> ResultAggregatorTrait for ResultAggregator<N> {
    /// @ai:intent Count correct, invalid and total questions per category
    /// @ai:post correct <= total - invalid for every category
    /// @ai:effects pure
    fn aggregate(&self, items: &[ItemResult]) -> AggregateSummary {
        let mut category_stats: Vec<CategoryStat> = Vec::new();
        let mut total_invalid = 0u32;

        for item in items {
            if item.question_results.is_empty() && !item.precomputed_categories.is_empty() {
                total_invalid = total_invalid.saturating_add(merge_precomputed(&mut category_stats, item));
                continue;
            }

            for result in &item.question_results {
                let stat = stat_for(&mut category_stats, &result.category);
                stat.total = stat.total.saturating_add(1);

                if result.is_invalid {
                    stat.invalid = stat.invalid.saturating_add(1);
                    total_invalid = total_invalid.saturating_add(1);
                } else if result.is_correct {
                    stat.correct = stat.correct.saturating_add(1);
                }
            }
        }

        let total_questions = category_stats
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.total));
        let total_correct = category_stats
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.correct));
        let total_invalid = total_invalid.min(total_questions);
        let total_valid = total_questions - total_invalid;
        // only reachable once the sums saturate
        let total_correct = total_correct.min(total_valid);

        AggregateSummary {
            overall_accuracy: percentage(total_correct, total_valid),
            total_correct,
            total_questions,
            total_valid,
            total_invalid,
            item_count: items.len() as u32,
            category_stats,
        }
    }
}

/// @ai:intent Find the accumulator for a category, appending a fresh one on first sight
/// @ai:effects state:write
fn stat_for<'a>(stats: &'a mut Vec<CategoryStat>, category: &Category) -> &'a mut CategoryStat {
    let index = match stats.iter().position(|s| &s.category == category) {
        Some(index) => index,
        None => {
            stats.push(CategoryStat::new(category.clone()));
            stats.len() - 1
        }
    };

    &mut stats[index]
}

/// @ai:intent Fold an item's supplied per-category stats into the accumulators
/// @ai:post returns the number of invalid questions added; counts saturate at u32::MAX
/// @ai:effects state:write, log
fn merge_precomputed(stats: &mut Vec<CategoryStat>, item: &ItemResult) -> u32 {
    let mut invalid_added = 0u32;

    for supplied in &item.precomputed_categories {
        let clean = clamp_supplied(supplied, &item.item_id);
        let stat = stat_for(stats, &clean.category);
        let before = stat.invalid;

        stat.total = stat.total.saturating_add(clean.total);
        stat.invalid = stat.invalid.saturating_add(clean.invalid).min(stat.total);
        stat.correct = stat
            .correct
            .saturating_add(clean.correct)
            .min(stat.total - stat.invalid);
        invalid_added = invalid_added.saturating_add(stat.invalid - before);
    }

    invalid_added
}

/// @ai:intent Clamp supplied stats so that invalid <= total and correct <= total - invalid
/// @ai:effects log
fn clamp_supplied(supplied: &CategoryStat, item_id: &str) -> CategoryStat {
    let invalid = supplied.invalid.min(supplied.total);
    let correct = supplied.correct.min(supplied.total - invalid);

    if invalid != supplied.invalid || correct != supplied.correct {
        tracing::warn!(
            "Item {} category {} has inconsistent supplied stats (correct={}, total={}, invalid={}); clamping",
            item_id,
            supplied.category,
            supplied.correct,
            supplied.total,
            supplied.invalid
        );
    }

    CategoryStat {
        category: supplied.category.clone(),
        correct,
        total: supplied.total,
        invalid,
    }
}

/// @ai:intent Pick the supplied count when present
/// @ai:effects log
fn prefer_supplied(field: &str, supplied: Option<u32>, computed: u32) -> u32 {
    match supplied {
        Some(value) => {
            warn_on_disagreement(field, value, computed);
            value
        }
        None => computed,
    }
}

fn warn_on_disagreement(field: &str, supplied: u32, computed: u32) {
    if supplied != computed {
        tracing::warn!(
            "Supplied {} ({}) disagrees with computed value ({})",
            field,
            supplied,
            computed
        );
    }
}
