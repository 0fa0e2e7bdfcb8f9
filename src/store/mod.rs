// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vector store facade
//!
//! Orchestrates embedding lookup, filter compilation, and result mapping
//! over a pluggable backend. The compilation pipeline (parse, validate,
//! translate) is in-memory and reentrant; only `add`/`similarity_search`
//! touch the network, through the injected collaborators.

pub mod backend;
pub mod embedding;

pub use backend::{BackendClient, BackendError, BackendHit, BackendQuery, BackendRecord};
pub use embedding::{EmbeddingError, EmbeddingProvider};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::schema::SchemaRegistry;
use crate::core::types::{Document, FilterSource, ScoredDocument, SearchRequest};
use crate::filter::{parse, validate, ParseError, ValidationError};
use crate::translate::{
    translator_for, BackendKind, FilterTranslator, NativeFilter, TranslateError,
};

/// Any failure of an `add` or `similarity_search` call.
///
/// Every variant aborts the whole call; no partial write or partial filter
/// is ever applied.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Uniform store over heterogeneous vector databases.
pub struct VectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn BackendClient>,
    schema: SchemaRegistry,
    translator: Box<dyn FilterTranslator>,
}

impl VectorStore {
    /// Connect a store: provisions the declared metadata fields on the
    /// backend (idempotent, explicit) and selects the filter translator
    /// for the backend family.
    pub async fn connect(
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn BackendClient>,
        schema: SchemaRegistry,
    ) -> Result<Self, StoreError> {
        backend.provision(&schema.fields()).await?;
        let translator = translator_for(backend.kind());
        info!(
            backend = %backend.kind(),
            fields = schema.len(),
            "vector store connected"
        );
        Ok(Self {
            embedder,
            backend,
            schema,
            translator,
        })
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Store documents, computing missing embeddings and generating missing
    /// ids. Returns the ids in input order.
    ///
    /// Metadata keys absent from the schema are stored as-is; they just
    /// cannot be filtered on. The whole embedding phase completes before
    /// the backend write, so a provider failure never leaves a partial
    /// batch behind.
    pub async fn add(&self, documents: Vec<Document>) -> Result<Vec<String>, StoreError> {
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let embedding = match document.embedding {
                Some(embedding) => {
                    self.check_dimension(embedding.len())?;
                    embedding
                }
                None => {
                    let embedding = self.embedder.embed(&document.content).await?;
                    self.check_dimension(embedding.len())?;
                    embedding
                }
            };
            let id = document
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            records.push(BackendRecord {
                id,
                content: document.content,
                metadata: document.metadata,
                embedding,
            });
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        self.backend.upsert(records).await?;
        debug!(count = ids.len(), "documents upserted");
        Ok(ids)
    }

    /// Similarity search with an optional portable filter.
    ///
    /// The filter compiles before any network I/O, so a bad filter fails
    /// without paying for an embedding call. Results come back sorted
    /// descending by score, cut at the threshold, truncated to `top_k`.
    pub async fn similarity_search(
        &self,
        request: SearchRequest,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        if request.top_k == 0 {
            return Err(StoreError::InvalidRequest(
                "top_k must be positive".to_string(),
            ));
        }
        if let Some(threshold) = request.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(StoreError::InvalidRequest(format!(
                    "similarity threshold must be in [0, 1], got {}",
                    threshold
                )));
            }
        }

        let native_filter = match &request.filter {
            Some(source) => Some(self.compile_filter(source)?),
            None => None,
        };

        let vector = self.embedder.embed(&request.query).await?;
        self.check_dimension(vector.len())?;

        let hits = self
            .backend
            .query(BackendQuery {
                vector,
                top_k: request.top_k,
                threshold: request.threshold,
                filter: native_filter,
            })
            .await?;
        debug!(hits = hits.len(), top_k = request.top_k, "backend responded");

        let mut results: Vec<ScoredDocument> = hits
            .into_iter()
            .map(|hit| ScoredDocument {
                document: Document {
                    id: Some(hit.id),
                    content: hit.content,
                    metadata: hit.metadata,
                    embedding: None,
                },
                score: hit.score,
            })
            .collect();

        // Backends are trusted for recall, not for contract enforcement:
        // re-apply ordering, threshold, and top_k here.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(threshold) = request.threshold {
            results.retain(|r| r.score >= threshold);
        }
        results.truncate(request.top_k);
        Ok(results)
    }

    /// Compile a filter source: parse (text route), validate, translate.
    fn compile_filter(&self, source: &FilterSource) -> Result<NativeFilter, StoreError> {
        let expression = match source {
            FilterSource::Text(text) => parse(text)?,
            FilterSource::Expression(expression) => expression.clone(),
        };
        let validated = validate(&expression, &self.schema)?;
        Ok(self.translator.translate(&validated)?)
    }

    fn check_dimension(&self, actual: usize) -> Result<(), StoreError> {
        let expected = self.embedder.dimension();
        if actual != expected {
            return Err(StoreError::Embedding(EmbeddingError::DimensionMismatch {
                expected,
                actual,
            }));
        }
        Ok(())
    }
}
