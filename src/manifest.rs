//! Selection manifest: the phase-1 output a user reviews before commit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::PostType;
use crate::structure::{is_book_export, nested_sort};
use crate::wxr::Export;

/// Marker identifying a structural-export manifest.
pub const MANIFEST_KIND: &str = "wxr";

/// Placeholder the exporter writes into intentionally empty scaffold posts.
/// Records carrying exactly this content have nothing to import.
pub const EMPTY_CONTENT_SENTINEL: &str = "<!-- Here be dragons.-->";

/// Which records of an export are importable, persisted between the plan
/// and apply phases. The apply phase never trusts in-memory state: it
/// re-parses `source_file` and matches records against `entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Path of the export to re-parse at apply time.
    pub source_file: String,
    pub source_mime: String,
    /// Always [`MANIFEST_KIND`] for manifests built by this importer.
    pub kind: String,
    /// Importable record id → title, for user review.
    pub entries: BTreeMap<u64, String>,
    /// Importable record id → resolved target type.
    pub entry_types: BTreeMap<u64, PostType>,
    /// Parts capability; always true for this importer.
    pub allow_parts: bool,
}

impl Manifest {
    /// Scan an export and record every importable post.
    ///
    /// Skipped: records with empty content (unless they are parts, which
    /// legitimately have none) and scaffold posts carrying the
    /// [`EMPTY_CONTENT_SENTINEL`]. For book-authored exports the scan runs
    /// in hierarchy order, so chapters dangling from a missing part never
    /// make it into the manifest.
    pub fn build(export: &Export, source_file: &str, source_mime: &str) -> Manifest {
        let mut manifest = Manifest {
            source_file: source_file.to_string(),
            source_mime: source_mime.to_string(),
            kind: MANIFEST_KIND.to_string(),
            entries: BTreeMap::new(),
            entry_types: BTreeMap::new(),
            allow_parts: true,
        };

        let records = if is_book_export(&export.records) {
            nested_sort(export.records.clone())
        } else {
            export.records.clone()
        };

        for record in &records {
            if record.content.is_empty() && record.post_type != PostType::Part {
                debug!(id = record.id, "skipping record with no content");
                continue;
            }
            if record.content == EMPTY_CONTENT_SENTINEL {
                debug!(id = record.id, "skipping scaffold record");
                continue;
            }

            manifest.entries.insert(record.id, record.title.clone());
            manifest.entry_types.insert(record.id, record.post_type);
        }

        manifest
    }
}
