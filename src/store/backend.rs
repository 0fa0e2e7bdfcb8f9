// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Backend client seam
//!
//! One implementation per backend database. Connection and auth setup are
//! out of scope; the client receives already-compiled native filters plus
//! the query vector and returns raw scored hits. Timeouts and cancellation
//! are the implementor's pass-through concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::schema::MetadataField;
use crate::core::types::ScalarValue;
use crate::translate::{BackendKind, NativeFilter};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend network error: {0}")]
    Network(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Backend provisioning failed: {0}")]
    Provisioning(String),
}

/// One stored record: content, metadata, and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRecord {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, ScalarValue>,
    pub embedding: Vec<f32>,
}

/// A compiled similarity query ready for one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub threshold: Option<f32>,
    pub filter: Option<NativeFilter>,
}

/// A raw hit as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendHit {
    pub id: String,
    pub score: f32,
    pub content: String,
    pub metadata: HashMap<String, ScalarValue>,
}

/// Client for one backend vector database.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Backend family tag; selects the filter translator.
    fn kind(&self) -> BackendKind;

    /// Idempotent provisioning of the declared metadata fields. Invoked
    /// once at store construction, never implicitly inside other calls.
    async fn provision(&self, fields: &[MetadataField]) -> Result<(), BackendError>;

    async fn upsert(&self, records: Vec<BackendRecord>) -> Result<(), BackendError>;

    async fn query(&self, query: BackendQuery) -> Result<Vec<BackendHit>, BackendError>;
}
