// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::filter::ast::FilterExpression;

/// A scalar metadata value.
///
/// Integers and floats are distinct so that translators can render `2020`
/// without it degrading to `2020.0`; both satisfy a `Number` schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarValue {
    /// Type name used in validation error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Text(_) => "Text",
            ScalarValue::Int(_) | ScalarValue::Float(_) => "Number",
            ScalarValue::Bool(_) => "Boolean",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ScalarValue::Int(_) | ScalarValue::Float(_))
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Int(n)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Int(n as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Float(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

/// Renders the value as a portable filter literal that the parser re-accepts.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Text(s) => {
                write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            ScalarValue::Int(n) => write!(f, "{}", n),
            ScalarValue::Float(n) => {
                // Integral floats keep a decimal point so they stay floats
                // through a parse round-trip.
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            ScalarValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A text document with metadata and an optional precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Generated at `add` time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, ScalarValue>,
    /// Computed from `content` at `add` time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: HashMap::new(),
            embedding: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Filter input for a search: portable text or a pre-built expression.
///
/// Both routes produce the same AST and compile identically.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSource {
    Text(String),
    Expression(FilterExpression),
}

/// A similarity search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    /// Minimum similarity score in `[0, 1]`; hits below it are dropped.
    pub threshold: Option<f32>,
    pub filter: Option<FilterSource>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            threshold: None,
            filter: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_filter_text(mut self, text: impl Into<String>) -> Self {
        self.filter = Some(FilterSource::Text(text.into()));
        self
    }

    pub fn with_filter(mut self, expression: FilterExpression) -> Self {
        self.filter = Some(FilterSource::Expression(expression));
        self
    }
}

/// One search hit: the stored document and its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_names() {
        assert_eq!(ScalarValue::from("x").type_name(), "Text");
        assert_eq!(ScalarValue::from(1i64).type_name(), "Number");
        assert_eq!(ScalarValue::from(1.5).type_name(), "Number");
        assert_eq!(ScalarValue::from(true).type_name(), "Boolean");
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(ScalarValue::from("UK").to_string(), "'UK'");
        assert_eq!(ScalarValue::from("it's").to_string(), "'it\\'s'");
        assert_eq!(ScalarValue::from(2020i64).to_string(), "2020");
        assert_eq!(ScalarValue::from(2.0).to_string(), "2.0");
        assert_eq!(ScalarValue::from(2.5).to_string(), "2.5");
        assert_eq!(ScalarValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_scalar_untagged_serde() {
        let v: ScalarValue = serde_json::from_str("2020").unwrap();
        assert_eq!(v, ScalarValue::Int(2020));
        let v: ScalarValue = serde_json::from_str("20.5").unwrap();
        assert_eq!(v, ScalarValue::Float(20.5));
        let v: ScalarValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ScalarValue::Bool(true));
        let v: ScalarValue = serde_json::from_str("\"UK\"").unwrap();
        assert_eq!(v, ScalarValue::Text("UK".to_string()));
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::new("hello")
            .with_id("doc-1")
            .with_metadata("country", "UK")
            .with_metadata("year", 2020i64);

        assert_eq!(doc.id.as_deref(), Some("doc-1"));
        assert_eq!(doc.metadata.len(), 2);
        assert!(doc.embedding.is_none());
    }
}
