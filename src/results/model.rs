//! @ai:module:intent Canonical data model for evaluated benchmark questions
//! @ai:module:layer domain
//! @ai:module:public_api QuestionResult, RetrievedMemory, FactType, ItemResult
//! @ai:module:stateless true

use crate::metrics::CategoryStat;
use crate::results::category::Category;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// @ai:intent Classification of a retrieved memory
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactType {
    World,
    #[serde(alias = "assistant", alias = "experience")]
    Agent,
    Opinion,
    #[serde(other)]
    Other,
}

impl FactType {
    /// @ai:intent Convert fact type to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            FactType::World => "world",
            FactType::Agent => "agent",
            FactType::Opinion => "opinion",
            FactType::Other => "other",
        }
    }
}

impl std::fmt::Display for FactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A piece of context the evaluated system retrieved to answer a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMemory {
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
    /// Timestamp as supplied by the document
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub fact_type: Option<FactType>,
}

impl RetrievedMemory {
    /// @ai:intent Parse the event date as a UTC timestamp
    /// @ai:post None when absent or in an unrecognized format
    /// @ai:effects pure
    pub fn parsed_event_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.event_date.as_deref()?.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// @ai:intent Event date formatted for display, falling back to the raw text
    /// @ai:effects pure
    pub fn display_event_date(&self) -> Option<String> {
        match self.parsed_event_date() {
            Some(dt) => Some(dt.format("%Y-%m-%d %H:%M").to_string()),
            None => self.event_date.clone(),
        }
    }

    /// @ai:intent Score, classification and date, in that order, for whichever are present
    /// @ai:effects pure
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(score) = self.score {
            tags.push(format!("{:.3}", score));
        }
        if let Some(fact_type) = self.fact_type {
            tags.push(fact_type.to_string());
        }
        if let Some(date) = self.display_event_date() {
            tags.push(date);
        }
        tags
    }
}

/// @ai:intent One evaluated question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub correct_answer: String,
    pub predicted_answer: String,
    pub category: Category,
    pub is_correct: bool,
    /// Excluded from accuracy because of an upstream processing error
    #[serde(default)]
    pub is_invalid: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub correctness_reasoning: Option<String>,
    #[serde(default)]
    pub retrieved_memories: Vec<RetrievedMemory>,
}

impl QuestionResult {
    /// @ai:intent Whether the question counts as correct for accuracy purposes
    /// @ai:post false for every invalid question
    /// @ai:effects pure
    pub fn counts_as_correct(&self) -> bool {
        !self.is_invalid && self.is_correct
    }
}

/// @ai:intent One evaluated conversation or session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: String,
    pub question_results: Vec<QuestionResult>,
    /// Per-category stats supplied by the document instead of detailed results
    #[serde(default)]
    pub precomputed_categories: Vec<CategoryStat>,
}

impl ItemResult {
    /// @ai:intent Create an item from its question results
    /// @ai:effects pure
    pub fn new(item_id: impl Into<String>, question_results: Vec<QuestionResult>) -> Self {
        Self {
            item_id: item_id.into(),
            question_results,
            precomputed_categories: Vec::new(),
        }
    }

    /// @ai:effects pure
    pub fn correct_count(&self) -> u32 {
        self.question_results
            .iter()
            .filter(|r| r.counts_as_correct())
            .count() as u32
    }

    /// @ai:effects pure
    pub fn total_count(&self) -> u32 {
        self.question_results.len() as u32
    }

    /// @ai:effects pure
    pub fn valid_count(&self) -> u32 {
        self.question_results
            .iter()
            .filter(|r| !r.is_invalid)
            .count() as u32
    }

    /// @ai:intent Accuracy percentage over valid questions
    /// @ai:post 0.0 when the item has no valid questions
    /// @ai:effects pure
    pub fn accuracy(&self) -> f64 {
        let valid = self.valid_count();

        if valid == 0 {
            0.0
        } else {
            self.correct_count() as f64 / valid as f64 * 100.0
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn question(category: Category, is_correct: bool, is_invalid: bool) -> QuestionResult {
        QuestionResult {
            question: "When did Caroline go to the LGBTQ support group?".to_string(),
            correct_answer: "7 May 2023".to_string(),
            predicted_answer: "May 7th, 2023".to_string(),
            category,
            is_correct,
            is_invalid,
            error_message: is_invalid.then(|| "judge timed out".to_string()),
            reasoning: None,
            correctness_reasoning: None,
            retrieved_memories: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::question;
    use super::*;

    #[test]
    fn test_invalid_never_counts_as_correct() {
        let q = question(Category::Code(1), true, true);
        assert!(!q.counts_as_correct());
    }

    #[test]
    fn test_item_derived_counts() {
        let item = ItemResult::new(
            "conv-26",
            vec![
                question(Category::Code(1), true, false),
                question(Category::Code(1), false, false),
                question(Category::Code(2), true, true),
            ],
        );

        assert_eq!(item.total_count(), 3);
        assert_eq!(item.valid_count(), 2);
        assert_eq!(item.correct_count(), 1);
        assert!((item.accuracy() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_item_accuracy_is_zero() {
        let item = ItemResult::new("conv-30", vec![]);
        assert_eq!(item.total_count(), 0);
        assert_eq!(item.accuracy(), 0.0);
    }

    #[test]
    fn test_fact_type_aliases() {
        let parsed: FactType = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, FactType::Agent);

        let parsed: FactType = serde_json::from_str("\"experience\"").unwrap();
        assert_eq!(parsed, FactType::Agent);

        let parsed: FactType = serde_json::from_str("\"observation\"").unwrap();
        assert_eq!(parsed, FactType::Other);
    }

    #[test]
    fn test_event_date_parsing() {
        let memory = |date: &str| RetrievedMemory {
            text: "Caroline attended a support group".to_string(),
            score: Some(0.82),
            event_date: Some(date.to_string()),
            fact_type: Some(FactType::World),
        };

        assert!(memory("2023-05-07T13:56:00+00:00").parsed_event_date().is_some());
        assert!(memory("2023-05-07T13:56:00").parsed_event_date().is_some());
        assert!(memory("2023-05-07").parsed_event_date().is_some());
        assert!(memory("1:56 pm on 8 May, 2023").parsed_event_date().is_none());
        assert_eq!(
            memory("1:56 pm on 8 May, 2023").display_event_date().as_deref(),
            Some("1:56 pm on 8 May, 2023")
        );
        assert_eq!(
            memory("2023-05-07T13:56:00Z").display_event_date().as_deref(),
            Some("2023-05-07 13:56")
        );
    }

    #[test]
    fn test_memory_tags() {
        let full = RetrievedMemory {
            text: "Melanie signed up for a pottery class".to_string(),
            score: Some(0.8765),
            event_date: Some("2023-07-02T09:15:00Z".to_string()),
            fact_type: Some(FactType::Agent),
        };
        assert_eq!(full.tags(), vec!["0.877", "agent", "2023-07-02 09:15"]);

        let bare = RetrievedMemory {
            text: "no metadata".to_string(),
            score: None,
            event_date: None,
            fact_type: None,
        };
        assert!(bare.tags().is_empty());
    }
}
