// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Filter validation against the schema registry
//!
//! Pure structural walk: every leaf must reference a declared field with a
//! type-compatible operand. Translators only accept a [`ValidatedFilter`],
//! so an unvalidated AST can never reach a backend.

use thiserror::Error;

use crate::core::schema::{FieldType, SchemaRegistry};
use crate::core::types::ScalarValue;
use crate::filter::ast::FilterExpression;

/// Schema mismatch found while validating a filter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown field in filter: {field}")]
    UnknownField { field: String },

    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Operator {operator} is not supported on {field_type} field '{field}'")]
    UnsupportedOperator {
        field: String,
        field_type: &'static str,
        operator: String,
    },

    #[error("IN list for field '{field}' has no values")]
    EmptyValueList { field: String },

    #[error("Non-finite number for field '{field}' cannot be used in a filter")]
    NonFiniteNumber { field: String },
}

/// A filter expression that passed schema validation.
///
/// Only obtainable through [`validate`]; this is the sole input type the
/// backend translators accept.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFilter {
    expr: FilterExpression,
}

impl ValidatedFilter {
    pub fn expression(&self) -> &FilterExpression {
        &self.expr
    }

    pub fn into_expression(self) -> FilterExpression {
        self.expr
    }
}

/// Validate a filter expression against the schema registry.
///
/// Pure and reentrant; neither the expression nor the schema is mutated.
pub fn validate(
    expr: &FilterExpression,
    schema: &SchemaRegistry,
) -> Result<ValidatedFilter, ValidationError> {
    check(expr, schema)?;
    Ok(ValidatedFilter { expr: expr.clone() })
}

fn check(expr: &FilterExpression, schema: &SchemaRegistry) -> Result<(), ValidationError> {
    match expr {
        FilterExpression::Comparison { field, op, value } => {
            let field_type = lookup(schema, field)?;
            // Ordering needs a defined order: only Number qualifies. Text
            // ordering is collation-dependent across backends and Boolean
            // ordering is meaningless.
            if op.is_ordering() && field_type != FieldType::Number {
                return Err(ValidationError::UnsupportedOperator {
                    field: field.clone(),
                    field_type: field_type.type_name(),
                    operator: op.symbol().to_string(),
                });
            }
            check_value(field, field_type, value)
        }

        FilterExpression::In { field, values } => {
            let field_type = lookup(schema, field)?;
            if field_type == FieldType::Boolean {
                return Err(ValidationError::UnsupportedOperator {
                    field: field.clone(),
                    field_type: field_type.type_name(),
                    operator: "IN".to_string(),
                });
            }
            if values.is_empty() {
                return Err(ValidationError::EmptyValueList {
                    field: field.clone(),
                });
            }
            for value in values {
                check_value(field, field_type, value)?;
            }
            Ok(())
        }

        FilterExpression::Logical { children, .. } => {
            for child in children {
                check(child, schema)?;
            }
            Ok(())
        }

        FilterExpression::Not { child } => check(child, schema),
    }
}

fn lookup(schema: &SchemaRegistry, field: &str) -> Result<FieldType, ValidationError> {
    schema
        .field_type(field)
        .ok_or_else(|| ValidationError::UnknownField {
            field: field.to_string(),
        })
}

fn check_value(
    field: &str,
    field_type: FieldType,
    value: &ScalarValue,
) -> Result<(), ValidationError> {
    // NaN/infinity only arise through the builder's `From<f64>`; no backend
    // accepts them as literals, so they fail here to keep translators total.
    if let ScalarValue::Float(n) = value {
        if !n.is_finite() {
            return Err(ValidationError::NonFiniteNumber {
                field: field.to_string(),
            });
        }
    }
    let compatible = match field_type {
        FieldType::Text => matches!(value, ScalarValue::Text(_)),
        // Int and Float are interchangeable for Number fields.
        FieldType::Number => value.is_number(),
        FieldType::Boolean => matches!(value, ScalarValue::Bool(_)),
    };
    if compatible {
        Ok(())
    } else {
        // A bare numeral against a Text field lands here: mismatch, never
        // silent coercion.
        Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: field_type.type_name(),
            actual: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{FieldType, SchemaRegistry};
    use crate::filter::builder::{and, eq, gte, in_list, not, or};
    use crate::filter::parser::parse;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .field("year", FieldType::Number)
            .field("active", FieldType::Boolean)
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_filter_passes() {
        let expr = parse("country in ['UK', 'NL'] && year >= 2020").unwrap();
        let validated = validate(&expr, &schema()).unwrap();
        assert_eq!(validated.expression(), &expr);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let expr = eq("region", "EU");
        assert_eq!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::UnknownField {
                field: "region".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_field_rejected_in_nested_expression() {
        let expr = and([eq("country", "UK"), not(or([eq("missing", 1i64)]))]);
        assert!(matches!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::UnknownField { field } if field == "missing"
        ));
    }

    #[test]
    fn test_bare_numeral_on_text_field_is_mismatch() {
        // No silent coercion of numbers into text fields.
        let expr = eq("country", 2020i64);
        assert_eq!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::TypeMismatch {
                field: "country".to_string(),
                expected: "Text",
                actual: "Number",
            }
        );
    }

    #[test]
    fn test_number_field_accepts_int_and_float() {
        assert!(validate(&gte("year", 2020i64), &schema()).is_ok());
        assert!(validate(&gte("year", 2020.5), &schema()).is_ok());
    }

    #[test]
    fn test_boolean_field_accepts_only_bool() {
        assert!(validate(&eq("active", true), &schema()).is_ok());
        assert!(matches!(
            validate(&eq("active", "true"), &schema()).unwrap_err(),
            ValidationError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_in_rejected_on_boolean_field() {
        let expr = in_list("active", [true, false]);
        assert!(matches!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::UnsupportedOperator { operator, .. } if operator == "IN"
        ));
    }

    #[test]
    fn test_in_value_types_checked() {
        let expr = in_list("year", ["2020", "2021"]);
        assert!(matches!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_ordering_rejected_on_text_and_boolean_fields() {
        assert!(matches!(
            validate(&gte("country", "UK"), &schema()).unwrap_err(),
            ValidationError::UnsupportedOperator { .. }
        ));
        assert!(matches!(
            validate(&parse("active > false").unwrap(), &schema()).unwrap_err(),
            ValidationError::UnsupportedOperator { .. }
        ));
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                validate(&gte("year", bad), &schema()).unwrap_err(),
                ValidationError::NonFiniteNumber {
                    field: "year".to_string()
                }
            );
        }
        assert_eq!(
            validate(&in_list("year", [2020.0, f64::NAN]), &schema()).unwrap_err(),
            ValidationError::NonFiniteNumber {
                field: "year".to_string()
            }
        );
    }

    #[test]
    fn test_builder_made_empty_in_list_rejected() {
        let expr = in_list("year", Vec::<ScalarValue>::new());
        assert_eq!(
            validate(&expr, &schema()).unwrap_err(),
            ValidationError::EmptyValueList {
                field: "year".to_string()
            }
        );
    }

    #[test]
    fn test_validation_does_not_mutate_inputs() {
        let expr = parse("year >= 2020").unwrap();
        let before = expr.clone();
        let schema = schema();
        let _ = validate(&expr, &schema);
        assert_eq!(expr, before);
        assert_eq!(schema.len(), 3);
    }
}
