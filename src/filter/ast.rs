// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Filter expression AST
//!
//! The structural representation of a portable filter, produced by the text
//! parser and the programmatic builder alike. Translation consumes it after
//! validation; grouping in the tree is preserved exactly by every translator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::ScalarValue;

/// Comparison operator of a filter leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Portable text token for this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Ordering operators require a Number field.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte
        )
    }
}

/// Boolean combinator of a logical node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

/// A portable filter expression.
///
/// `Logical` nodes are n-ary: `a && b && c` parses to one `And` node with
/// three children, and translators keep that grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterExpression {
    Comparison {
        field: String,
        op: CompareOp,
        value: ScalarValue,
    },

    In {
        field: String,
        values: Vec<ScalarValue>,
    },

    Logical {
        op: LogicalOp,
        children: Vec<FilterExpression>,
    },

    Not {
        child: Box<FilterExpression>,
    },
}

impl FilterExpression {
    /// Write a child of a logical/NOT node, parenthesizing nested logical
    /// nodes so the rendered text re-parses to an identical tree.
    fn fmt_operand(child: &FilterExpression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(child, FilterExpression::Logical { .. }) {
            write!(f, "(")?;
            write!(f, "{}", child)?;
            write!(f, ")")
        } else {
            write!(f, "{}", child)
        }
    }
}

/// Renders canonical portable filter text accepted by [`crate::filter::parse`].
impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Comparison { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            FilterExpression::In { field, values } => {
                write!(f, "{} in [", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            FilterExpression::Logical { op, children } => {
                let joiner = match op {
                    LogicalOp::And => " && ",
                    LogicalOp::Or => " || ",
                };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", joiner)?;
                    }
                    Self::fmt_operand(child, f)?;
                }
                Ok(())
            }
            FilterExpression::Not { child } => {
                write!(f, "NOT ")?;
                Self::fmt_operand(child, f)
            }
        }
    }
}
