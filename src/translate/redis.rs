// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Query-string translation (RediSearch family)
//!
//! Text and boolean fields are TAG fields (`@meta_country:{UK}`), numbers
//! are NUMERIC ranges (`@meta_year:[2020 +inf]`, `(` marks an exclusive
//! bound). AND is juxtaposition, OR is `|`, NOT is a leading `-`. Numeric
//! `IN` lowers to an OR of single-point ranges, the native way to express
//! exact numeric membership.

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};
use crate::filter::ValidatedFilter;
use crate::translate::{BackendKind, FilterTranslator, NativeFilter, TranslateError};

const FIELD_PREFIX: &str = "meta_";

pub struct RedisTranslator;

impl FilterTranslator for RedisTranslator {
    fn backend(&self) -> BackendKind {
        BackendKind::Redis
    }

    fn translate(&self, filter: &ValidatedFilter) -> Result<NativeFilter, TranslateError> {
        lower(filter.expression()).map(NativeFilter::Query)
    }
}

fn lower(expr: &FilterExpression) -> Result<String, TranslateError> {
    match expr {
        FilterExpression::Comparison { field, op, value } => Ok(comparison(field, *op, value)),

        FilterExpression::In { field, values } => Ok(in_clause(field, values)),

        FilterExpression::Logical { op, children } => {
            let joiner = match op {
                LogicalOp::And => " ",
                LogicalOp::Or => " | ",
            };
            let operands = children
                .iter()
                .map(|child| Ok(format!("({})", lower(child)?)))
                .collect::<Result<Vec<_>, TranslateError>>()?;
            Ok(operands.join(joiner))
        }

        FilterExpression::Not { child } => Ok(format!("-({})", lower(child)?)),
    }
}

fn comparison(field: &str, op: CompareOp, value: &ScalarValue) -> String {
    let attr = format!("@{}{}", FIELD_PREFIX, field);
    match op {
        CompareOp::Eq => equality(&attr, value),
        CompareOp::Ne => format!("-{}", equality(&attr, value)),
        // Validation guarantees ordering operands are numeric.
        CompareOp::Gt => format!("{}:[({} +inf]", attr, number(value)),
        CompareOp::Gte => format!("{}:[{} +inf]", attr, number(value)),
        CompareOp::Lt => format!("{}:[-inf ({}]", attr, number(value)),
        CompareOp::Lte => format!("{}:[-inf {}]", attr, number(value)),
    }
}

fn equality(attr: &str, value: &ScalarValue) -> String {
    match value {
        ScalarValue::Text(s) => format!("{}:{{{}}}", attr, escape_tag(s)),
        ScalarValue::Bool(b) => format!("{}:{{{}}}", attr, b),
        ScalarValue::Int(_) | ScalarValue::Float(_) => {
            let n = number(value);
            format!("{}:[{} {}]", attr, n, n)
        }
    }
}

fn in_clause(field: &str, values: &[ScalarValue]) -> String {
    let attr = format!("@{}{}", FIELD_PREFIX, field);
    // Validation guarantees a non-empty, type-consistent list on a Text or
    // Number field.
    if values.iter().all(ScalarValue::is_number) {
        let points: Vec<String> = values
            .iter()
            .map(|v| {
                let n = number(v);
                format!("{}:[{} {}]", attr, n, n)
            })
            .collect();
        if points.len() == 1 {
            points.into_iter().next().unwrap_or_default()
        } else {
            let points: Vec<String> = points.into_iter().map(|p| format!("({})", p)).collect();
            points.join(" | ")
        }
    } else {
        let tags: Vec<String> = values
            .iter()
            .map(|v| match v {
                ScalarValue::Text(s) => escape_tag(s),
                other => other.to_string(),
            })
            .collect();
        format!("{}:{{{}}}", attr, tags.join("|"))
    }
}

fn number(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Int(n) => n.to_string(),
        ScalarValue::Float(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{:.1}", n)
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// Escape RediSearch TAG special characters with a backslash.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
