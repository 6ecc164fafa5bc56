//! Core traits
//!
//! This module defines the seams that let the pipeline run against the real
//! catalog service, a local file, or a deterministic in-memory fake.

use crate::core::catalog::CatalogSnapshot;
use crate::types::CatalogError;
use async_trait::async_trait;

/// Capability to retrieve the complete product catalog
///
/// Implementations must return either the full catalog or an error, never
/// a partial one. Pagination, retries and timeouts are internal details of
/// each implementation.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every product and build the run-scoped lookup
    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError>;

    /// Short description used in logs
    fn describe(&self) -> String;
}
