//! Named documents shared between tasks.
//!
//! [`DocumentStore`] hands out documents as `Arc<Document>` snapshots. Slicing never mutates
//! a stored document: a private copy is sliced, then swapped in under the write lock,
//! so readers observe either the previous document or the sliced one.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{Criteria, Document, SliceError, SliceReport, slice};

/// Errors that can occur when using a [`DocumentStore`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum StoreError {
    /// No document is stored under this name.
    #[display("Unknown document '{name}'")]
    #[from(skip)]
    UnknownDocument {
        /// The requested name.
        name: String,
    },

    /// The document was replaced while it was being sliced.
    ///
    /// The sliced copy is discarded, the newer document is kept.
    #[display("Document '{name}' was modified while being sliced")]
    #[from(skip)]
    ConcurrentUpdate {
        /// The document name.
        name: String,
    },

    /// Slicing failed.
    Slice(SliceError),
}

/// A set of named documents, safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<IndexMap<String, Arc<Document>>>>,
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document, returning the one previously stored under the same name.
    pub async fn insert(&self, name: impl Into<String>, document: Document) -> Option<Arc<Document>> {
        let name = name.into();
        debug!(%name, operations = document.operation_count(), "document stored");
        let mut documents = self.documents.write().await;
        documents.insert(name, Arc::new(document))
    }

    /// Returns a snapshot of the named document.
    pub async fn get(&self, name: &str) -> Option<Arc<Document>> {
        let documents = self.documents.read().await;
        documents.get(name).cloned()
    }

    /// Names of the stored documents, in insertion order.
    pub async fn names(&self) -> Vec<String> {
        let documents = self.documents.read().await;
        documents.keys().cloned().collect()
    }

    /// Removes the named document.
    pub async fn remove(&self, name: &str) -> Option<Arc<Document>> {
        let mut documents = self.documents.write().await;
        documents.shift_remove(name)
    }

    /// Slices the `source` document and stores the result under `target`.
    ///
    /// The `source` document is left untouched. `target` may be the same name as `source`,
    /// see [`Self::slice_in_place`] for a variant detecting concurrent updates.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownDocument`] if `source` is not stored,
    /// or [`StoreError::Slice`] if slicing fails.
    pub async fn slice_as(
        &self,
        source: &str,
        target: impl Into<String>,
        criteria: &Criteria,
    ) -> Result<SliceReport, StoreError> {
        let snapshot = self.snapshot(source).await?;
        let mut document = Document::clone(&snapshot);
        let report = slice(&mut document, criteria)?;

        let target = target.into();
        let mut documents = self.documents.write().await;
        documents.insert(target.clone(), Arc::new(document));
        info!(%source, %target, %report, "sliced document stored");

        Ok(report)
    }

    /// Slices the named document and replaces it with the result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownDocument`] if `name` is not stored,
    /// [`StoreError::Slice`] if slicing fails, and [`StoreError::ConcurrentUpdate`]
    /// if the document was replaced or removed while being sliced.
    pub async fn slice_in_place(&self, name: &str, criteria: &Criteria) -> Result<SliceReport, StoreError> {
        let snapshot = self.snapshot(name).await?;
        let mut document = Document::clone(&snapshot);
        let report = slice(&mut document, criteria)?;

        let mut documents = self.documents.write().await;
        let Some(current) = documents.get_mut(name) else {
            return Err(StoreError::ConcurrentUpdate { name: name.to_string() });
        };
        if !Arc::ptr_eq(current, &snapshot) {
            return Err(StoreError::ConcurrentUpdate { name: name.to_string() });
        }
        *current = Arc::new(document);
        info!(%name, %report, "document sliced in place");

        Ok(report)
    }

    async fn snapshot(&self, name: &str) -> Result<Arc<Document>, StoreError> {
        self.get(name).await.ok_or_else(|| StoreError::UnknownDocument {
            name: name.to_string(),
        })
    }
}
