// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Backend filter translators
//!
//! Each backend family gets one independent [`FilterTranslator`]
//! implementation, selected by [`BackendKind`] tag at configuration time.
//! A translator either expresses the whole validated filter in its native
//! representation or fails with [`TranslateError::UnsupportedFeature`];
//! it never drops or approximates a construct, and it never re-associates
//! the operand grouping the parser produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::filter::ValidatedFilter;

pub mod graphql;
pub mod redis;
pub mod rest;
pub mod sql;

pub use graphql::GraphQlTranslator;
pub use redis::RedisTranslator;
pub use rest::RestTranslator;
pub use sql::SqlTranslator;

/// Backend family tag used to select a translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GraphQL `where` objects (Weaviate family)
    Weaviate,
    /// REST JSON filter objects (Pinecone family)
    Pinecone,
    /// SQL WHERE clauses (PGVector family)
    PgVector,
    /// Query-string syntax (RediSearch family)
    Redis,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Weaviate => "weaviate",
            BackendKind::Pinecone => "pinecone",
            BackendKind::PgVector => "pgvector",
            BackendKind::Redis => "redis",
        };
        write!(f, "{}", name)
    }
}

/// A backend-native filter representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", content = "filter", rename_all = "snake_case")]
pub enum NativeFilter {
    /// GraphQL `where` clause object
    GraphQl(serde_json::Value),
    /// REST filter object
    Rest(serde_json::Value),
    /// SQL WHERE clause text
    Sql(String),
    /// Backend query-string syntax
    Query(String),
}

/// Backend capability gap: the filter is valid but this backend cannot run it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("Backend '{backend}' cannot express {construct}")]
    UnsupportedFeature {
        backend: BackendKind,
        construct: String,
    },
}

/// One backend family's filter compiler.
///
/// Implementations are stateless and reentrant; `translate` is total over
/// the constructs the backend supports and fails fast on the rest.
pub trait FilterTranslator: Send + Sync {
    fn backend(&self) -> BackendKind;

    fn translate(&self, filter: &ValidatedFilter) -> Result<NativeFilter, TranslateError>;
}

/// Select the translator for a backend family.
pub fn translator_for(kind: BackendKind) -> Box<dyn FilterTranslator> {
    match kind {
        BackendKind::Weaviate => Box::new(GraphQlTranslator),
        BackendKind::Pinecone => Box::new(RestTranslator),
        BackendKind::PgVector => Box::new(SqlTranslator),
        BackendKind::Redis => Box::new(RedisTranslator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_dispatch_matches_kind() {
        for kind in [
            BackendKind::Weaviate,
            BackendKind::Pinecone,
            BackendKind::PgVector,
            BackendKind::Redis,
        ] {
            assert_eq!(translator_for(kind).backend(), kind);
        }
    }

    #[test]
    fn test_backend_kind_serde_round_trip() {
        let json = serde_json::to_string(&BackendKind::PgVector).unwrap();
        assert_eq!(json, "\"pgvector\"");
        let kind: BackendKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, BackendKind::PgVector);
    }
}
