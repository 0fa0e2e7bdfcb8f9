// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod ast;
pub mod builder;
pub mod parser;
pub mod validator;

pub use ast::{CompareOp, FilterExpression, LogicalOp};
pub use parser::{parse, ParseError};
pub use validator::{validate, ValidatedFilter, ValidationError};
