//! Opaque document payloads

use std::sync::Arc;

/// An opaque document payload handed to the engine
///
/// The bytes are shared, so cloning a document (or an operation holding
/// several) never copies the payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    data: Arc<[u8]>,
}

impl Document {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: Arc::from(data.into()),
        }
    }

    /// Display name (usually the source file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Result payload of a successful operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOutput {
    pub documents: Vec<Document>,
}

impl OperationOutput {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn single(document: Document) -> Self {
        Self {
            documents: vec![document],
        }
    }

    /// Total payload size across all output documents
    pub fn total_bytes(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }
}
