//! @ai:module:intent Question filters for narrowing a result view
//! @ai:module:layer domain
//! @ai:module:public_api ResultFilter
//! @ai:module:stateless true

use crate::results::model::{ItemResult, QuestionResult};
use serde::{Deserialize, Serialize};

/// @ai:intent Which questions to show
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultFilter {
    #[default]
    All,
    /// Valid and judged correct
    Correct,
    /// Valid and judged incorrect
    Incorrect,
    /// Excluded because of a processing error
    Invalid,
}

impl ResultFilter {
    /// @ai:intent Whether a question passes the filter
    /// @ai:post Correct, Incorrect and Invalid are mutually exclusive
    /// @ai:effects pure
    pub fn matches(&self, result: &QuestionResult) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Correct => !result.is_invalid && result.is_correct,
            ResultFilter::Incorrect => !result.is_invalid && !result.is_correct,
            ResultFilter::Invalid => result.is_invalid,
        }
    }

    /// @ai:intent Select matching questions per item
    /// @ai:post items without a match are dropped unless the filter is All
    /// @ai:effects pure
    pub fn apply<'a>(&self, items: &'a [ItemResult]) -> Vec<(&'a ItemResult, Vec<&'a QuestionResult>)> {
        items
            .iter()
            .map(|item| {
                let matching: Vec<_> = item
                    .question_results
                    .iter()
                    .filter(|r| self.matches(r))
                    .collect();
                (item, matching)
            })
            .filter(|(_, matching)| *self == ResultFilter::All || !matching.is_empty())
            .collect()
    }

    /// @ai:intent Convert filter to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFilter::All => "all",
            ResultFilter::Correct => "correct",
            ResultFilter::Incorrect => "incorrect",
            ResultFilter::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::model::fixtures::question;
    use crate::results::Category;

    #[test]
    fn test_filters_are_mutually_exclusive() {
        let exclusive = [ResultFilter::Correct, ResultFilter::Incorrect, ResultFilter::Invalid];

        for (is_correct, is_invalid) in [(true, false), (false, false), (true, true), (false, true)] {
            let q = question(Category::Code(1), is_correct, is_invalid);
            let hits = exclusive.iter().filter(|f| f.matches(&q)).count();
            assert_eq!(hits, 1);
            assert!(ResultFilter::All.matches(&q));
        }
    }

    #[test]
    fn test_invalid_correct_is_not_correct() {
        let q = question(Category::Code(2), true, true);
        assert!(!ResultFilter::Correct.matches(&q));
        assert!(ResultFilter::Invalid.matches(&q));
    }

    #[test]
    fn test_apply_drops_items_without_matches() {
        let items = vec![
            ItemResult::new("conv-1", vec![question(Category::Code(1), true, false)]),
            ItemResult::new(
                "conv-2",
                vec![
                    question(Category::Code(1), false, false),
                    question(Category::Code(3), true, false),
                ],
            ),
            ItemResult::new("conv-3", vec![]),
        ];

        let incorrect = ResultFilter::Incorrect.apply(&items);
        assert_eq!(incorrect.len(), 1);
        assert_eq!(incorrect[0].0.item_id, "conv-2");
        assert_eq!(incorrect[0].1.len(), 1);

        let all = ResultFilter::All.apply(&items);
        assert_eq!(all.len(), 3);
    }
}
