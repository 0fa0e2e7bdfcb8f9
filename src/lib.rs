// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Portable vector-store abstraction layer
//!
//! Stores text documents with embeddings and typed metadata across
//! heterogeneous vector databases behind one interface. The portable filter
//! language (`filter`) compiles to each backend's native query representation
//! (`translate`), and the `store` facade orchestrates embedding lookup,
//! filter compilation, and result mapping.

pub mod core;
pub mod filter;
pub mod store;
pub mod translate;
