// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod schema;
pub mod types;

pub use schema::{FieldType, MetadataField, SchemaBuilder, SchemaError, SchemaRegistry};
pub use types::{Document, FilterSource, ScalarValue, ScoredDocument, SearchRequest};
