//! @ai:module:intent Normalize raw result JSON onto the canonical data model
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultDocument, normalize
//! @ai:module:stateless true

use crate::error::{Result, ViewerError};
use crate::metrics::{CategoryStat, ReportedTotals};
use crate::results::category::CategoryNaming;
use crate::results::model::{FactType, ItemResult, QuestionResult, RetrievedMemory};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// @ai:intent A normalized result document: items plus the totals it reports about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub items: Vec<ItemResult>,
    pub reported: ReportedTotals,
}

impl ResultDocument {
    /// @ai:intent Parse and normalize a JSON string
    /// @ai:effects pure
    pub fn from_json_str<N: CategoryNaming>(json: &str, naming: &N) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| ViewerError::MalformedDocument(format!("invalid JSON: {}", e)))?;
        normalize(&raw, naming)
    }

    /// @ai:effects pure
    pub fn question_count(&self) -> usize {
        self.items.iter().map(|i| i.question_results.len()).sum()
    }
}

/// @ai:intent Raw document envelope as served by the results API
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    overall_accuracy: Option<Value>,
    #[serde(default)]
    total_correct: Option<Value>,
    #[serde(default)]
    total_questions: Option<Value>,
    #[serde(default)]
    total_valid: Option<Value>,
    #[serde(default, alias = "num_samples")]
    num_items: Option<Value>,
    #[serde(default, alias = "sample_results")]
    item_results: Option<Vec<RawItem>>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default, alias = "sample_id", alias = "id")]
    item_id: Option<Value>,
    #[serde(default)]
    metrics: Option<RawMetrics>,
}

#[derive(Debug, Deserialize)]
struct RawMetrics {
    #[serde(default)]
    detailed_results: Option<Vec<RawQuestion>>,
    #[serde(default)]
    category_stats: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: Option<Value>,
    #[serde(default, alias = "answer")]
    correct_answer: Option<Value>,
    #[serde(default, alias = "predicted")]
    predicted_answer: Option<Value>,
    #[serde(default)]
    category: Option<Value>,
    #[serde(default)]
    is_correct: Option<Value>,
    #[serde(default)]
    is_invalid: Option<Value>,
    #[serde(default, alias = "error_message")]
    error: Option<Value>,
    #[serde(default)]
    reasoning: Option<Value>,
    #[serde(default)]
    correctness_reasoning: Option<Value>,
    #[serde(default)]
    retrieved_memories: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMemory {
    #[serde(default, alias = "content")]
    text: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    event_date: Option<Value>,
    #[serde(default)]
    fact_type: Option<Value>,
}

/// @ai:intent Tracks which optional fields were unusable, so each is reported once
#[derive(Debug, Default)]
struct FieldWarnings {
    seen: BTreeSet<&'static str>,
}

impl FieldWarnings {
    /// @ai:effects log
    fn unusable(&mut self, field: &'static str, value: &Value) {
        if self.seen.insert(field) {
            tracing::warn!(
                "Ignoring unusable {} value {}; treating it as absent",
                field,
                value
            );
        }
    }

    /// @ai:intent Read an optional text field, accepting scalars
    /// @ai:effects log
    fn text(&mut self, field: &'static str, value: Option<&Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => {
                self.unusable(field, other);
                None
            }
        }
    }

    /// @ai:intent Read an optional flag, accepting booleans, 0/1 and "true"/"false"
    /// @ai:effects log
    fn flag(&mut self, field: &'static str, value: Option<&Value>) -> Option<bool> {
        let value = value?;
        let flag = match value {
            Value::Null => return None,
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 => Some(false),
                Some(f) if f == 1.0 => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        };

        if flag.is_none() {
            self.unusable(field, value);
        }
        flag
    }

    /// @ai:intent Read an event date, converting Unix timestamps to RFC 3339
    /// @ai:effects log
    fn event_date(&mut self, value: Option<&Value>) -> Option<String> {
        let value = value?;
        match value {
            Value::Number(n) => {
                let converted = n
                    .as_i64()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .map(|dt| dt.to_rfc3339());
                if converted.is_none() {
                    self.unusable("event_date", value);
                }
                converted
            }
            other => self.text("event_date", Some(other)),
        }
    }

    /// @ai:effects log
    fn fact_type(&mut self, value: Option<&Value>) -> Option<FactType> {
        match value? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            text @ Value::String(_) => serde_json::from_value(text.clone()).ok(),
            other => {
                self.unusable("fact_type", other);
                None
            }
        }
    }

    /// @ai:intent Read retrieved memories, skipping entries that are not objects
    /// @ai:effects log
    fn memories(&mut self, value: Option<&Value>) -> Vec<RetrievedMemory> {
        let entries = match value {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                self.unusable("retrieved_memories", other);
                return Vec::new();
            }
        };

        let mut memories = Vec::with_capacity(entries.len());

        for entry in entries {
            let Ok(m) = serde_json::from_value::<RawMemory>(entry.clone()) else {
                self.unusable("retrieved_memories entry", entry);
                continue;
            };

            memories.push(RetrievedMemory {
                text: self.text("memory text", m.text.as_ref()).unwrap_or_default(),
                score: m.score.as_ref().and_then(Value::as_f64),
                event_date: self.event_date(m.event_date.as_ref()),
                fact_type: self.fact_type(m.fact_type.as_ref()),
            });
        }

        memories
    }
}

/// @ai:intent Map a raw result document onto the canonical model
/// @ai:pre raw is the parsed response body of a results endpoint
/// @ai:post Err(MalformedDocument) only when no viable mapping exists
/// @ai:effects pure, log
pub fn normalize<N: CategoryNaming>(raw: &Value, naming: &N) -> Result<ResultDocument> {
    if !raw.is_object() {
        return Err(ViewerError::MalformedDocument(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let document: RawDocument = serde_json::from_value(raw.clone())
        .map_err(|e| ViewerError::MalformedDocument(e.to_string()))?;

    let raw_items = document.item_results.ok_or_else(|| {
        ViewerError::MalformedDocument("missing item_results".to_string())
    })?;

    let mut items = Vec::with_capacity(raw_items.len());
    let mut warnings = FieldWarnings::default();

    for (index, raw_item) in raw_items.into_iter().enumerate() {
        items.push(normalize_item(index, raw_item, naming, &mut warnings)?);
    }

    let reported = ReportedTotals {
        overall_accuracy: document.overall_accuracy.as_ref().and_then(Value::as_f64),
        total_correct: document.total_correct.as_ref().and_then(as_count),
        total_questions: document.total_questions.as_ref().and_then(as_count),
        total_valid: document.total_valid.as_ref().and_then(as_count),
        num_items: document.num_items.as_ref().and_then(as_count),
    };

    tracing::debug!(
        "Normalized {} items with {} questions",
        items.len(),
        items.iter().map(|i| i.question_results.len()).sum::<usize>()
    );

    Ok(ResultDocument { items, reported })
}

/// @ai:intent Normalize one item, degrading when its identifier or metrics are absent
/// @ai:effects pure, log
fn normalize_item<N: CategoryNaming>(
    index: usize,
    raw: RawItem,
    naming: &N,
    warnings: &mut FieldWarnings,
) -> Result<ItemResult> {
    let item_id = match raw.item_id.as_ref().and_then(text_of) {
        Some(id) if !id.is_empty() => id,
        _ => {
            let fallback = format!("item-{}", index + 1);
            tracing::warn!("Item at position {} has no identifier; using {}", index, fallback);
            fallback
        }
    };

    let Some(metrics) = raw.metrics else {
        tracing::warn!("Item {} has no metrics; showing it without questions", item_id);
        return Ok(ItemResult::new(item_id, Vec::new()));
    };

    let mut question_results = Vec::new();

    for (position, question) in metrics.detailed_results.unwrap_or_default().into_iter().enumerate() {
        question_results.push(normalize_question(&item_id, position, question, naming, warnings)?);
    }

    let precomputed_categories = match metrics.category_stats {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(stats)) => normalize_category_stats(&item_id, &stats, naming),
        Some(other) => {
            warnings.unusable("category_stats", &other);
            Vec::new()
        }
    };

    Ok(ItemResult {
        item_id,
        question_results,
        precomputed_categories,
    })
}

/// @ai:intent Normalize one question record
/// @ai:post Err(MalformedDocument) when the category is absent or unusable
/// @ai:effects pure
fn normalize_question<N: CategoryNaming>(
    item_id: &str,
    position: usize,
    raw: RawQuestion,
    naming: &N,
    warnings: &mut FieldWarnings,
) -> Result<QuestionResult> {
    let category = raw
        .category
        .as_ref()
        .and_then(|value| naming.classify(value))
        .ok_or_else(|| {
            ViewerError::MalformedDocument(format!(
                "question {} of item {} has no usable category",
                position + 1,
                item_id
            ))
        })?;

    let is_invalid = warnings
        .flag("is_invalid", raw.is_invalid.as_ref())
        .unwrap_or(false);
    let is_correct = warnings
        .flag("is_correct", raw.is_correct.as_ref())
        .unwrap_or(false);
    let retrieved_memories = warnings.memories(raw.retrieved_memories.as_ref());

    Ok(QuestionResult {
        question: raw.question.as_ref().and_then(text_of).unwrap_or_default(),
        correct_answer: raw.correct_answer.as_ref().and_then(text_of).unwrap_or_default(),
        predicted_answer: raw.predicted_answer.as_ref().and_then(text_of).unwrap_or_default(),
        category,
        is_correct,
        is_invalid,
        error_message: warnings.text("error", raw.error.as_ref()),
        reasoning: warnings.text("reasoning", raw.reasoning.as_ref()),
        correctness_reasoning: warnings.text("correctness_reasoning", raw.correctness_reasoning.as_ref()),
        retrieved_memories,
    })
}

/// @ai:intent Convert a supplied category -> {correct, total, invalid} mapping
/// @ai:effects pure, log
fn normalize_category_stats<N: CategoryNaming>(
    item_id: &str,
    stats: &Map<String, Value>,
    naming: &N,
) -> Vec<CategoryStat> {
    stats
        .iter()
        .filter_map(|(key, value)| {
            let category = naming.classify(&Value::String(key.clone()))?;
            let count = |field: &str| value.get(field).and_then(as_count).unwrap_or(0);

            if !value.is_object() {
                tracing::warn!("Item {} category {} stats are not an object; skipping", item_id, key);
                return None;
            }

            Some(CategoryStat {
                category,
                correct: count("correct"),
                total: count("total"),
                invalid: count("invalid"),
            })
        })
        .collect()
}

/// @ai:intent Read a non-negative integer count, tolerating integral floats
/// @ai:effects pure
fn as_count(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
        .and_then(|n| u32::try_from(n).ok())
}

/// @ai:intent Render a scalar JSON value as text
/// @ai:effects pure
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
