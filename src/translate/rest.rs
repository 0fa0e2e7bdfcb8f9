// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! REST JSON filter translation (Pinecone family)
//!
//! Leaves become `{"meta_<field>": {"$op": value}}` objects and logical
//! nodes become `{"$and": [...]}` / `{"$or": [...]}`. `IN` maps to the
//! native `$in` list. The dialect has no `$not`, so `NOT` is rejected.

use serde_json::{json, Value};

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};
use crate::filter::ValidatedFilter;
use crate::translate::{BackendKind, FilterTranslator, NativeFilter, TranslateError};

const FIELD_PREFIX: &str = "meta_";

pub struct RestTranslator;

impl FilterTranslator for RestTranslator {
    fn backend(&self) -> BackendKind {
        BackendKind::Pinecone
    }

    fn translate(&self, filter: &ValidatedFilter) -> Result<NativeFilter, TranslateError> {
        lower(filter.expression()).map(NativeFilter::Rest)
    }
}

fn lower(expr: &FilterExpression) -> Result<Value, TranslateError> {
    match expr {
        FilterExpression::Comparison { field, op, value } => {
            let operator = match op {
                CompareOp::Eq => "$eq",
                CompareOp::Ne => "$ne",
                CompareOp::Gt => "$gt",
                CompareOp::Gte => "$gte",
                CompareOp::Lt => "$lt",
                CompareOp::Lte => "$lte",
            };
            let key = prefixed(field);
            Ok(json!({ key: { operator: scalar(value) } }))
        }

        FilterExpression::In { field, values } => {
            let key = prefixed(field);
            let values: Vec<Value> = values.iter().map(scalar).collect();
            Ok(json!({ key: { "$in": values } }))
        }

        FilterExpression::Logical { op, children } => {
            let operator = match op {
                LogicalOp::And => "$and",
                LogicalOp::Or => "$or",
            };
            let operands = children.iter().map(lower).collect::<Result<Vec<_>, _>>()?;
            Ok(json!({ operator: operands }))
        }

        FilterExpression::Not { .. } => Err(TranslateError::UnsupportedFeature {
            backend: BackendKind::Pinecone,
            construct: "NOT (negation)".to_string(),
        }),
    }
}

fn prefixed(field: &str) -> String {
    format!("{}{}", FIELD_PREFIX, field)
}

fn scalar(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Text(s) => json!(s),
        ScalarValue::Int(n) => json!(n),
        ScalarValue::Float(n) => json!(n),
        ScalarValue::Bool(b) => json!(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{FieldType, SchemaRegistry};
    use crate::filter::{parse, validate};
    use serde_json::json;

    fn compile(text: &str) -> Result<NativeFilter, TranslateError> {
        let schema = SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .field("year", FieldType::Number)
            .field("active", FieldType::Boolean)
            .build()
            .unwrap();
        let validated = validate(&parse(text).unwrap(), &schema).unwrap();
        RestTranslator.translate(&validated)
    }

    #[test]
    fn test_comparison_leaf() {
        assert_eq!(
            compile("active = true").unwrap(),
            NativeFilter::Rest(json!({ "meta_active": { "$eq": true } }))
        );
    }

    #[test]
    fn test_in_uses_native_list() {
        assert_eq!(
            compile("country in ['UK', 'NL']").unwrap(),
            NativeFilter::Rest(json!({ "meta_country": { "$in": ["UK", "NL"] } }))
        );
    }

    #[test]
    fn test_worked_example() {
        assert_eq!(
            compile("country in ['UK', 'NL'] && year >= 2020").unwrap(),
            NativeFilter::Rest(json!({
                "$and": [
                    { "meta_country": { "$in": ["UK", "NL"] } },
                    { "meta_year": { "$gte": 2020 } },
                ],
            }))
        );
    }

    #[test]
    fn test_or_grouping_preserved() {
        assert_eq!(
            compile("(country = 'UK' || country = 'NL') && year < 2030").unwrap(),
            NativeFilter::Rest(json!({
                "$and": [
                    {
                        "$or": [
                            { "meta_country": { "$eq": "UK" } },
                            { "meta_country": { "$eq": "NL" } },
                        ],
                    },
                    { "meta_year": { "$lt": 2030 } },
                ],
            }))
        );
    }

    #[test]
    fn test_not_rejected() {
        assert_eq!(
            compile("NOT country = 'UK'").unwrap_err(),
            TranslateError::UnsupportedFeature {
                backend: BackendKind::Pinecone,
                construct: "NOT (negation)".to_string(),
            }
        );
    }
}
