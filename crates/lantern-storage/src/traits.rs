//! Storage traits for the document store abstraction layer.
//!
//! This module defines the contract every storage backend must implement.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::filter::Filter;

/// The document store adapter consumed by the resource controller.
///
/// Backends expose uniform find/insert/update/remove operations over named
/// collections with a simple equality filter and a result-size limit.
/// Implementations must be thread-safe (`Send + Sync`). Atomicity is only
/// guaranteed per single-document operation; there is no cross-document
/// transaction in this contract.
///
/// # Example
///
/// ```ignore
/// use lantern_storage::{DocumentStore, Filter, StorageError};
///
/// async fn load(store: &dyn DocumentStore, id: &str) -> Result<serde_json::Value, StorageError> {
///     store
///         .find_one("goals", &Filter::by_id(id))
///         .await?
///         .ok_or_else(|| StorageError::not_found("goals", id))
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Finds up to `limit` documents matching the filter.
    ///
    /// An empty filter is an unfiltered scan. Result order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, never for an empty
    /// result set.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Value>, StorageError>;

    /// Finds a single document matching the filter.
    ///
    /// Returns `None` if nothing matches.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StorageError>;

    /// Inserts a document into the collection.
    ///
    /// The document's identity is whatever its `id` field says; the caller
    /// is responsible for having assigned one.
    async fn insert(&self, collection: &str, document: &Value) -> Result<(), StorageError>;

    /// Replaces every document matching the filter with `document`, wholesale.
    ///
    /// Returns the number of documents replaced. Zero is not an error; the
    /// caller decides whether a no-match update is a failure.
    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        document: &Value,
    ) -> Result<u64, StorageError>;

    /// Removes every document matching the filter.
    ///
    /// Returns the number of documents removed; zero is not an error.
    async fn remove(&self, collection: &str, filter: &Filter) -> Result<u64, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
