//! Collaborator interfaces to the host content-management system.
//!
//! The importer owns ordering, selection, and rewriting; everything durable
//! (documents, media, the pending-import manifest) belongs to the host
//! behind these traits. [`memory`] provides in-memory implementations used
//! by the tests and by hosts that do not need persistence.

pub mod memory;

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use url::Url;

use crate::error::Result;
use crate::manifest::Manifest;
use crate::record::{DocumentStatus, PostType};

/// Unique identifier for a document in the host store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// Unique identifier for a stored media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub u64);

/// Fields for a document about to be created.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Plain-text title (tags already stripped).
    pub title: String,
    pub doc_type: PostType,
    pub status: DocumentStatus,
    /// Body markup; `None` for structural containers.
    pub content: Option<String>,
    /// Structural parent, set for chapters.
    pub parent: Option<DocumentId>,
}

/// A document as read back from the host store.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub doc_type: PostType,
    pub status: DocumentStatus,
    pub content: Option<String>,
    pub parent: Option<DocumentId>,
    /// Metadata written onto the document, in write order.
    pub metadata: Vec<(String, String)>,
}

/// Host storage for imported documents and their metadata.
pub trait DocumentStore {
    fn create_document(&mut self, doc: NewDocument) -> Result<DocumentId>;

    fn document(&self, id: DocumentId) -> Option<Document>;

    fn set_metadata(&mut self, id: DocumentId, key: &str, value: &str) -> Result<()>;

    /// Reindex the document's position after structural changes, given its
    /// freshly read state.
    fn reconsolidate(&mut self, id: DocumentId, document: &Document) -> Result<()>;
}

/// Host storage for media assets produced by image localization.
pub trait MediaStore {
    /// Take ownership of a validated temporary file under `filename`.
    fn store_uploaded_file(&mut self, temp: &Path, filename: &str) -> io::Result<MediaId>;

    /// Durable public URL for a stored asset, if the host can produce one.
    fn public_url(&self, id: MediaId) -> Option<String>;
}

/// Opaque persistence for the pending-import manifest between phases.
pub trait ManifestStore {
    fn save(&mut self, manifest: &Manifest) -> Result<()>;

    fn load(&self) -> Result<Option<Manifest>>;

    fn delete(&mut self) -> Result<()>;
}

/// Network fetch of a remote image into a temporary file.
///
/// The returned [`NamedTempFile`] is deleted on drop, so the temporary
/// resource is cleaned up whether or not the image survives validation.
pub trait ImageFetcher {
    fn fetch(&mut self, url: &Url) -> io::Result<NamedTempFile>;
}

/// Per-record approval consulted during commit, with an optional type
/// override (the user may re-type a record between planning and applying).
pub trait ApprovalGate {
    fn is_flagged(&self, id: u64) -> bool;

    /// Committed target type for a record; `None` falls back to the type
    /// captured in the manifest.
    fn committed_type(&self, id: u64) -> Option<PostType> {
        let _ = id;
        None
    }
}

/// Gate that approves every manifest entry with no overrides.
pub struct ApproveAll;

impl ApprovalGate for ApproveAll {
    fn is_flagged(&self, _id: u64) -> bool {
        true
    }
}
