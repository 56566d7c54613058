//! In-memory host stores.
//!
//! Reference implementations of the collaborator traits. The integration
//! tests run against these, and embedding hosts without durable storage can
//! use them directly.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use url::Url;

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::store::{
    Document, DocumentId, DocumentStore, ImageFetcher, ManifestStore, MediaId, MediaStore,
    NewDocument,
};

/// Document store keeping everything in a map. Ids are assigned
/// sequentially, so iteration order is creation order.
#[derive(Debug, Default)]
pub struct MemoryDocuments {
    documents: BTreeMap<DocumentId, Document>,
    reconsolidated: Vec<DocumentId>,
    next_id: u64,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids handed to [`DocumentStore::reconsolidate`], in call order.
    pub fn reconsolidated(&self) -> &[DocumentId] {
        &self.reconsolidated
    }
}

impl DocumentStore for MemoryDocuments {
    fn create_document(&mut self, doc: NewDocument) -> Result<DocumentId> {
        self.next_id += 1;
        let id = DocumentId(self.next_id);

        self.documents.insert(
            id,
            Document {
                id,
                title: doc.title,
                doc_type: doc.doc_type,
                status: doc.status,
                content: doc.content,
                parent: doc.parent,
                metadata: Vec::new(),
            },
        );

        Ok(id)
    }

    fn document(&self, id: DocumentId) -> Option<Document> {
        self.documents.get(&id).cloned()
    }

    fn set_metadata(&mut self, id: DocumentId, key: &str, value: &str) -> Result<()> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| Error::Store(format!("no document {}", id.0)))?;
        doc.metadata.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn reconsolidate(&mut self, id: DocumentId, _document: &Document) -> Result<()> {
        if !self.documents.contains_key(&id) {
            return Err(Error::Store(format!("no document {}", id.0)));
        }
        self.reconsolidated.push(id);
        Ok(())
    }
}

/// Media store that reads uploads into memory and mints URLs under a fixed
/// base.
#[derive(Debug)]
pub struct MemoryMedia {
    base_url: String,
    assets: BTreeMap<MediaId, (String, Vec<u8>)>,
    next_id: u64,
}

impl MemoryMedia {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            assets: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Stored asset bytes by filename.
    pub fn asset(&self, filename: &str) -> Option<&[u8]> {
        self.assets
            .values()
            .find(|(name, _)| name == filename)
            .map(|(_, data)| data.as_slice())
    }
}

impl MediaStore for MemoryMedia {
    fn store_uploaded_file(&mut self, temp: &Path, filename: &str) -> io::Result<MediaId> {
        let data = std::fs::read(temp)?;
        self.next_id += 1;
        let id = MediaId(self.next_id);
        self.assets.insert(id, (filename.to_string(), data));
        Ok(id)
    }

    fn public_url(&self, id: MediaId) -> Option<String> {
        self.assets
            .get(&id)
            .map(|(name, _)| format!("{}/{}", self.base_url, name))
    }
}

/// Manifest persistence backed by a single JSON slot, mirroring the opaque
/// key-value option storage a real host provides.
#[derive(Debug, Default)]
pub struct MemoryManifests {
    slot: Option<String>,
}

impl MemoryManifests {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestStore for MemoryManifests {
    fn save(&mut self, manifest: &Manifest) -> Result<()> {
        let encoded =
            serde_json::to_string(manifest).map_err(|e| Error::Store(e.to_string()))?;
        self.slot = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<Manifest>> {
        match &self.slot {
            Some(encoded) => {
                let manifest =
                    serde_json::from_str(encoded).map_err(|e| Error::Store(e.to_string()))?;
                Ok(Some(manifest))
            }
            None => Ok(None),
        }
    }

    fn delete(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }
}

/// Fetcher serving canned responses from a URL → bytes map, recording how
/// often each URL was requested.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: HashMap<String, u32>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes served for `url`.
    pub fn insert(&mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.responses.insert(url.into(), data.into());
    }

    /// How many times `url` has been fetched.
    pub fn request_count(&self, url: &str) -> u32 {
        self.requests.get(url).copied().unwrap_or(0)
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&mut self, url: &Url) -> io::Result<NamedTempFile> {
        *self.requests.entry(url.as_str().to_string()).or_insert(0) += 1;

        let data = self.responses.get(url.as_str()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no response for {url}"))
        })?;

        let mut temp = NamedTempFile::new()?;
        temp.write_all(data)?;
        temp.flush()?;
        Ok(temp)
    }
}
