//! WXR export parsing and the two-phase import workflow.
//!
//! Importing is a two-step protocol. [`plan`] parses the export, works out
//! which records are importable, and persists that selection as a
//! [`Manifest`] for the user to review. [`apply`] loads the manifest,
//! re-parses the same file from scratch (it never trusts in-memory state
//! from the planning phase), commits the approved records, and consumes the
//! manifest. If the file changed between the phases, the manifest simply
//! matches fewer records; that risk is accepted rather than re-validated.

mod parser;

pub use parser::parse_str;

use std::path::Path;

use tracing::info;

use crate::commit::{ImportOptions, commit};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::record::Record;
use crate::store::{ApprovalGate, DocumentStore, ImageFetcher, ManifestStore, MediaStore};
use crate::util::{decode_text, extract_xml_encoding};

/// A parsed WXR export: the flat record stream, in document order.
#[derive(Debug, Clone)]
pub struct Export {
    pub records: Vec<Record>,
}

/// Read and parse a WXR export file, tolerating legacy encodings.
pub fn parse_file(path: &Path) -> Result<Export> {
    let bytes = std::fs::read(path)?;
    let hint = extract_xml_encoding(&bytes);
    let text = decode_text(&bytes, hint);
    parse_str(&text)
}

/// Phase 1: parse an export and persist the selection manifest for review.
///
/// Nothing is imported here; the returned manifest lists what *would* be.
/// A parse failure surfaces as `Err` and leaves no manifest behind.
pub fn plan(
    path: &Path,
    source_mime: &str,
    manifests: &mut dyn ManifestStore,
) -> Result<Manifest> {
    let export = parse_file(path)?;
    let manifest = Manifest::build(&export, &path.to_string_lossy(), source_mime);
    manifests.save(&manifest)?;

    info!(
        source = %manifest.source_file,
        entries = manifest.entries.len(),
        "import plan saved"
    );
    Ok(manifest)
}

/// Phase 2: load the pending manifest, re-parse its export, and commit the
/// approved records. Returns the number of documents imported.
///
/// The manifest is deleted once the commit loop completes, so a finished
/// import cannot be replayed. Skipped records and degraded images do not
/// keep it alive.
pub fn apply(
    manifests: &mut dyn ManifestStore,
    documents: &mut dyn DocumentStore,
    media: &mut dyn MediaStore,
    fetcher: &mut dyn ImageFetcher,
    gate: &dyn ApprovalGate,
    options: &ImportOptions,
) -> Result<usize> {
    let Some(manifest) = manifests.load()? else {
        return Err(Error::MissingManifest);
    };

    let export = parse_file(Path::new(&manifest.source_file))?;
    let imported = commit(&manifest, export, documents, media, fetcher, gate, options)?;

    manifests.delete()?;

    info!(imported, "import applied");
    Ok(imported)
}
