// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding provider seam
//!
//! Embedding computation is external; the store only needs a way to turn
//! text into a fixed-dimension vector.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Embedding provider failed: {0}")]
    Provider(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Turns text into embedding vectors of a fixed dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality of every vector this provider produces.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
