// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GraphQL `where` clause translation (Weaviate family)
//!
//! Leaves become `{path, operator, value*}` objects and logical nodes become
//! `{operator: "And"|"Or", operands: [...]}`. `IN` lowers to an `Or` of
//! `Equal` operands. The dialect has no negation operator, so `NOT` is
//! rejected rather than rewritten.

use serde_json::{json, Value};

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};
use crate::filter::ValidatedFilter;
use crate::translate::{BackendKind, FilterTranslator, NativeFilter, TranslateError};

/// Prefix keeping metadata fields clear of reserved document attributes.
const FIELD_PREFIX: &str = "meta_";

pub struct GraphQlTranslator;

impl FilterTranslator for GraphQlTranslator {
    fn backend(&self) -> BackendKind {
        BackendKind::Weaviate
    }

    fn translate(&self, filter: &ValidatedFilter) -> Result<NativeFilter, TranslateError> {
        lower(filter.expression()).map(NativeFilter::GraphQl)
    }
}

fn lower(expr: &FilterExpression) -> Result<Value, TranslateError> {
    match expr {
        FilterExpression::Comparison { field, op, value } => {
            Ok(leaf(field, operator_token(*op), value))
        }

        FilterExpression::In { field, values } => {
            let operands: Vec<Value> = values.iter().map(|v| leaf(field, "Equal", v)).collect();
            Ok(json!({ "operator": "Or", "operands": operands }))
        }

        FilterExpression::Logical { op, children } => {
            let operator = match op {
                LogicalOp::And => "And",
                LogicalOp::Or => "Or",
            };
            let operands = children.iter().map(lower).collect::<Result<Vec<_>, _>>()?;
            Ok(json!({ "operator": operator, "operands": operands }))
        }

        FilterExpression::Not { .. } => Err(TranslateError::UnsupportedFeature {
            backend: BackendKind::Weaviate,
            construct: "NOT (negation)".to_string(),
        }),
    }
}

fn operator_token(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "Equal",
        CompareOp::Ne => "NotEqual",
        CompareOp::Gt => "GreaterThan",
        CompareOp::Gte => "GreaterThanEqual",
        CompareOp::Lt => "LessThan",
        CompareOp::Lte => "LessThanEqual",
    }
}

fn leaf(field: &str, operator: &str, value: &ScalarValue) -> Value {
    let path = format!("{}{}", FIELD_PREFIX, field);
    let (key, value) = match value {
        ScalarValue::Text(s) => ("valueText", json!(s)),
        ScalarValue::Int(n) => ("valueInt", json!(n)),
        ScalarValue::Float(n) => ("valueNumber", json!(n)),
        ScalarValue::Bool(b) => ("valueBoolean", json!(b)),
    };
    json!({ "path": [path], "operator": operator, key: value })
}
