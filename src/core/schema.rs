// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Metadata schema registry
//!
//! Declares which metadata fields may appear in filter expressions, and with
//! what type. The registry is built once at store configuration time and is
//! immutable afterwards; filtering on an undeclared field fails validation
//! even though storing it succeeds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate field in schema: {0}")]
    DuplicateField(String),

    #[error("Field name cannot be empty")]
    EmptyFieldName,
}

/// Type of a filterable metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String values
    Text,

    /// Integer or float values
    Number,

    /// true/false values
    Boolean,
}

impl FieldType {
    /// Get type name as string for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
        }
    }
}

/// A declared `(name, type)` pair, the persisted form of a schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Immutable registry of filterable metadata fields.
///
/// Cloning shares the underlying snapshot, so in-flight validations always
/// observe a consistent field set.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    fields: Arc<HashMap<String, FieldType>>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Rebuild a registry from its persisted field list.
    pub fn from_fields(fields: Vec<MetadataField>) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();
        for field in fields {
            builder = builder.field(field.name, field.field_type);
        }
        builder.build()
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared fields, sorted by name for deterministic output.
    pub fn fields(&self) -> Vec<MetadataField> {
        let mut fields: Vec<MetadataField> = self
            .fields
            .iter()
            .map(|(name, field_type)| MetadataField {
                name: name.clone(),
                field_type: *field_type,
            })
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields
    }
}

/// Builder for [`SchemaRegistry`]; duplicate or empty names fail at `build`.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldType)>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut map = HashMap::with_capacity(self.fields.len());
        for (name, field_type) in self.fields {
            if name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if map.insert(name.clone(), field_type).is_some() {
                return Err(SchemaError::DuplicateField(name));
            }
        }
        Ok(SchemaRegistry {
            fields: Arc::new(map),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_name() {
        assert_eq!(FieldType::Text.type_name(), "Text");
        assert_eq!(FieldType::Number.type_name(), "Number");
        assert_eq!(FieldType::Boolean.type_name(), "Boolean");
    }

    #[test]
    fn test_schema_builder() {
        let schema = SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .field("year", FieldType::Number)
            .field("active", FieldType::Boolean)
            .build()
            .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field_type("country"), Some(FieldType::Text));
        assert_eq!(schema.field_type("year"), Some(FieldType::Number));
        assert!(!schema.contains("missing"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .field("country", FieldType::Number)
            .build();

        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateField("country".to_string())
        );
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let result = SchemaRegistry::builder().field("", FieldType::Text).build();
        assert_eq!(result.unwrap_err(), SchemaError::EmptyFieldName);
    }

    #[test]
    fn test_fields_round_trip() {
        let schema = SchemaRegistry::builder()
            .field("year", FieldType::Number)
            .field("country", FieldType::Text)
            .build()
            .unwrap();

        let fields = schema.fields();
        assert_eq!(fields[0].name, "country");
        assert_eq!(fields[1].name, "year");

        let rebuilt = SchemaRegistry::from_fields(fields).unwrap();
        assert_eq!(rebuilt.field_type("year"), Some(FieldType::Number));
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let schema = SchemaRegistry::builder()
            .field("country", FieldType::Text)
            .build()
            .unwrap();
        let clone = schema.clone();
        assert_eq!(clone.field_type("country"), Some(FieldType::Text));
    }
}
