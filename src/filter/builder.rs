// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Programmatic filter construction
//!
//! Builds the same AST nodes the text parser produces, so
//! `parse("year >= 2020")` and `gte("year", 2020)` are interchangeable
//! everywhere a filter is accepted. No validation happens here; the
//! validator checks the result against the schema.

use crate::core::types::ScalarValue;
use crate::filter::ast::{CompareOp, FilterExpression, LogicalOp};

fn comparison(
    field: impl Into<String>,
    op: CompareOp,
    value: impl Into<ScalarValue>,
) -> FilterExpression {
    FilterExpression::Comparison {
        field: field.into(),
        op,
        value: value.into(),
    }
}

pub fn eq(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Eq, value)
}

pub fn ne(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Ne, value)
}

pub fn gt(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Gt, value)
}

pub fn gte(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Gte, value)
}

pub fn lt(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Lt, value)
}

pub fn lte(field: impl Into<String>, value: impl Into<ScalarValue>) -> FilterExpression {
    comparison(field, CompareOp::Lte, value)
}

pub fn in_list<V: Into<ScalarValue>>(
    field: impl Into<String>,
    values: impl IntoIterator<Item = V>,
) -> FilterExpression {
    FilterExpression::In {
        field: field.into(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

pub fn and(children: impl IntoIterator<Item = FilterExpression>) -> FilterExpression {
    FilterExpression::Logical {
        op: LogicalOp::And,
        children: children.into_iter().collect(),
    }
}

pub fn or(children: impl IntoIterator<Item = FilterExpression>) -> FilterExpression {
    FilterExpression::Logical {
        op: LogicalOp::Or,
        children: children.into_iter().collect(),
    }
}

pub fn not(child: FilterExpression) -> FilterExpression {
    FilterExpression::Not {
        child: Box::new(child),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parser::parse;

    #[test]
    fn test_builder_matches_parser_for_worked_example() {
        let built = and([in_list("country", ["UK", "NL"]), gte("year", 2020i64)]);
        let parsed = parse("country in ['UK', 'NL'] && year >= 2020").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_builder_matches_parser_for_nested_expression() {
        let built = or([
            and([eq("category", "tech"), ne("archived", true)]),
            not(lt("score", 0.5)),
        ]);
        let parsed =
            parse("(category = 'tech' && archived != true) || NOT score < 0.5").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_all_comparison_operators() {
        assert_eq!(eq("f", 1i64), parse("f = 1").unwrap());
        assert_eq!(ne("f", 1i64), parse("f != 1").unwrap());
        assert_eq!(gt("f", 1i64), parse("f > 1").unwrap());
        assert_eq!(gte("f", 1i64), parse("f >= 1").unwrap());
        assert_eq!(lt("f", 1i64), parse("f < 1").unwrap());
        assert_eq!(lte("f", 1i64), parse("f <= 1").unwrap());
    }

    #[test]
    fn test_numeric_in_list() {
        assert_eq!(
            in_list("year", [2020i64, 2021i64]),
            parse("year in [2020, 2021]").unwrap()
        );
    }
}
