// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! SQL WHERE clause translation (PGVector family)
//!
//! Field names are prefixed with `metadata_`, string literals are
//! single-quoted with `''` escaping, and every operand of a combinator is
//! parenthesized so the emitted text matches the parsed grouping exactly.
//! Bind parameters are the backend client's concern; this emits literal
//! WHERE text.

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};
use crate::filter::ValidatedFilter;
use crate::translate::{BackendKind, FilterTranslator, NativeFilter, TranslateError};

const FIELD_PREFIX: &str = "metadata_";

pub struct SqlTranslator;

impl FilterTranslator for SqlTranslator {
    fn backend(&self) -> BackendKind {
        BackendKind::PgVector
    }

    fn translate(&self, filter: &ValidatedFilter) -> Result<NativeFilter, TranslateError> {
        lower(filter.expression()).map(NativeFilter::Sql)
    }
}

fn lower(expr: &FilterExpression) -> Result<String, TranslateError> {
    match expr {
        FilterExpression::Comparison { field, op, value } => {
            let operator = match op {
                CompareOp::Eq => "=",
                CompareOp::Ne => "<>",
                CompareOp::Gt => ">",
                CompareOp::Gte => ">=",
                CompareOp::Lt => "<",
                CompareOp::Lte => "<=",
            };
            Ok(format!(
                "{}{} {} {}",
                FIELD_PREFIX,
                field,
                operator,
                literal(value)
            ))
        }

        FilterExpression::In { field, values } => {
            let values: Vec<String> = values.iter().map(literal).collect();
            Ok(format!(
                "{}{} IN ({})",
                FIELD_PREFIX,
                field,
                values.join(",")
            ))
        }

        FilterExpression::Logical { op, children } => {
            let joiner = match op {
                LogicalOp::And => " AND ",
                LogicalOp::Or => " OR ",
            };
            let operands = children
                .iter()
                .map(|child| Ok(format!("({})", lower(child)?)))
                .collect::<Result<Vec<_>, TranslateError>>()?;
            Ok(operands.join(joiner))
        }

        FilterExpression::Not { child } => Ok(format!("NOT ({})", lower(child)?)),
    }
}

fn literal(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        ScalarValue::Int(n) => n.to_string(),
        ScalarValue::Float(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{:.1}", n)
            } else {
                n.to_string()
            }
        }
        ScalarValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{FieldType, SchemaRegistry};
    use crate::filter::{parse, validate};

    fn compile(text: &str) -> String {
        let schema = SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .field("year", FieldType::Number)
            .field("active", FieldType::Boolean)
            .build()
            .unwrap();
        let validated = validate(&parse(text).unwrap(), &schema).unwrap();
        match SqlTranslator.translate(&validated).unwrap() {
            NativeFilter::Sql(sql) => sql,
            other => panic!("expected SQL filter, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_leaf() {
        assert_eq!(compile("year >= 2020"), "metadata_year >= 2020");
        assert_eq!(compile("country != 'UK'"), "metadata_country <> 'UK'");
        assert_eq!(compile("active = true"), "metadata_active = TRUE");
    }

    #[test]
    fn test_worked_example() {
        assert_eq!(
            compile("country in ['UK', 'NL'] && year >= 2020"),
            "(metadata_country IN ('UK','NL')) AND (metadata_year >= 2020)"
        );
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(compile(r"country = 'it\'s'"), "metadata_country = 'it''s'");
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(compile("year < 2020.0"), "metadata_year < 2020.0");
        assert_eq!(compile("year < 2020.5"), "metadata_year < 2020.5");
    }

    #[test]
    fn test_not_and_grouping() {
        assert_eq!(
            compile("NOT (country = 'UK' || year > 2000)"),
            "NOT ((metadata_country = 'UK') OR (metadata_year > 2000))"
        );
    }

    #[test]
    fn test_nested_grouping_preserved() {
        assert_eq!(
            compile("(country = 'UK' || country = 'NL') && year >= 2020"),
            "((metadata_country = 'UK') OR (metadata_country = 'NL')) AND (metadata_year >= 2020)"
        );
    }

    #[test]
    fn test_numeric_in_list() {
        assert_eq!(
            compile("year in [2020, 2021]"),
            "metadata_year IN (2020,2021)"
        );
    }
}
