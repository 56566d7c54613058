//! # quire
//!
//! Imports WordPress WXR exports into a book's document structure.
//!
//! A WXR export is a flat, unordered list of posts. When at least two
//! structural post types (part, chapter, front matter, back matter) are
//! present, the export is treated as book-authored and canonical reading
//! order is rebuilt: front matter first, each part followed by its
//! chapters, back matter last.
//!
//! Importing runs in two phases. [`plan`] parses the export and persists a
//! [`Manifest`] of importable records for user review; [`apply`] re-parses
//! the same file, commits the approved records to the host's
//! [`DocumentStore`](store::DocumentStore), and localizes remote images:
//! each distinct URL is fetched once, validated, stored through the host's
//! media store, and rewritten in the content. Broken references are kept
//! but tagged with [`FIXUP_MARKER`] so they can be found later.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use quire::commit::ImportOptions;
//! use quire::store::ApproveAll;
//! use quire::store::memory::{MemoryDocuments, MemoryFetcher, MemoryManifests, MemoryMedia};
//!
//! let mut manifests = MemoryManifests::new();
//!
//! // Phase 1: build the selection for review
//! let manifest = quire::plan(Path::new("book.xml"), "text/xml", &mut manifests).unwrap();
//! for (id, title) in &manifest.entries {
//!     println!("{id}: {title}");
//! }
//!
//! // Phase 2: commit the approved records
//! let mut documents = MemoryDocuments::new();
//! let mut media = MemoryMedia::new("https://book.example.net/media");
//! let mut fetcher = MemoryFetcher::new();
//! let imported = quire::apply(
//!     &mut manifests,
//!     &mut documents,
//!     &mut media,
//!     &mut fetcher,
//!     &ApproveAll,
//!     &ImportOptions::default(),
//! )
//! .unwrap();
//! println!("imported {imported} documents");
//! ```

pub mod commit;
pub mod error;
pub mod images;
pub mod manifest;
pub mod record;
pub mod store;
pub mod structure;
pub mod wxr;

pub(crate) mod html;
pub(crate) mod util;

pub use commit::ImportOptions;
pub use error::{Error, Result};
pub use images::{FIXUP_MARKER, ImageLocalizer};
pub use manifest::{EMPTY_CONTENT_SENTINEL, Manifest};
pub use record::{DocumentStatus, PostType, Record};
pub use structure::{is_book_export, nested_sort};
pub use wxr::{Export, apply, parse_file, parse_str, plan};
