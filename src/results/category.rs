//! @ai:module:intent Question categories and the naming strategies for each benchmark family
//! @ai:module:layer domain
//! @ai:module:public_api Category, CategoryNaming, NamingScheme
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// @ai:intent Category identifier of a question: a numeric code or a free-form label
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Code(i64),
    Label(String),
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Code(code) => write!(f, "{}", code),
            Category::Label(label) => write!(f, "{}", label),
        }
    }
}

/// @ai:intent Strategy for classifying raw category values and naming them for display
pub trait CategoryNaming: Send + Sync {
    /// @ai:intent Map a raw JSON category value onto a Category
    /// @ai:post None only when the value carries no usable identifier
    fn classify(&self, raw: &Value) -> Option<Category>;

    /// @ai:intent Human-readable label for a category
    fn display_name(&self, category: &Category) -> String;
}

/// @ai:intent Built-in naming strategies, selectable from configuration
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// Closed set of integer codes 1-4 with fixed names
    #[default]
    Coded,
    /// Open set of string labels shown verbatim
    Freeform,
}

impl NamingScheme {
    /// @ai:intent Convert scheme to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingScheme::Coded => "coded",
            NamingScheme::Freeform => "freeform",
        }
    }
}

impl std::fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Fixed display name for a known category code
/// @ai:effects pure
fn coded_name(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Multi-hop"),
        2 => Some("Single-hop"),
        3 => Some("Temporal"),
        4 => Some("Open-domain"),
        _ => None,
    }
}

impl CategoryNaming for NamingScheme {
    /// @ai:effects pure
    fn classify(&self, raw: &Value) -> Option<Category> {
        match (self, raw) {
            (NamingScheme::Coded, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Category::Code)
                .or_else(|| Some(Category::Label(n.to_string()))),
            (NamingScheme::Coded, Value::String(s)) => {
                let trimmed = s.trim();

                if trimmed.is_empty() {
                    return None;
                }

                Some(
                    trimmed
                        .parse::<i64>()
                        .map(Category::Code)
                        .unwrap_or_else(|_| Category::Label(trimmed.to_string())),
                )
            }
            (NamingScheme::Freeform, Value::String(s)) if !s.trim().is_empty() => {
                Some(Category::Label(s.trim().to_string()))
            }
            (NamingScheme::Freeform, Value::Number(n)) => Some(Category::Label(n.to_string())),
            _ => None,
        }
    }

    /// @ai:effects pure
    fn display_name(&self, category: &Category) -> String {
        match (self, category) {
            (NamingScheme::Coded, Category::Code(code)) => coded_name(*code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Category {}", code)),
            (_, other) => other.to_string(),
        }
    }
}
