//! Phase-1 tests: classification and manifest construction from a
//! book-authored WXR fixture.

use std::path::Path;

use quire::store::ManifestStore;
use quire::store::memory::MemoryManifests;
use quire::{PostType, is_book_export, parse_file, plan};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

#[test]
fn test_fixture_is_classified_as_book_export() {
    let export = parse_file(Path::new(&fixture_path("selfauthored.xml"))).unwrap();
    assert!(is_book_export(&export.records));

    // the attachment item never becomes a record
    assert!(export.records.iter().all(|r| r.id != 17));
    assert_eq!(export.records.len(), 7);
}

#[test]
fn test_plan_builds_and_persists_manifest() {
    let path = fixture_path("selfauthored.xml");
    let mut manifests = MemoryManifests::new();

    let manifest = plan(Path::new(&path), "text/xml", &mut manifests).unwrap();

    assert_eq!(manifest.kind, "wxr");
    assert!(manifest.allow_parts);
    assert_eq!(manifest.source_file, path);
    assert_eq!(manifest.source_mime, "text/xml");

    let ids: Vec<u64> = manifest.entries.keys().copied().collect();
    assert_eq!(ids, vec![10, 11, 12, 13]);

    // titles are captured verbatim for review
    assert_eq!(manifest.entries[&11], "Introduction");
    assert_eq!(manifest.entries[&12], "Part & Parcel");
    assert_eq!(manifest.entries[&13], "The <em>Long</em> Road");

    assert_eq!(manifest.entry_types[&10], PostType::BackMatter);
    assert_eq!(manifest.entry_types[&12], PostType::Part);
    assert_eq!(manifest.entry_types[&13], PostType::Chapter);

    // the empty chapter, the scaffold sentinel, and the orphaned chapter
    // are all left out
    assert!(!manifest.entries.contains_key(&14));
    assert!(!manifest.entries.contains_key(&15));
    assert!(!manifest.entries.contains_key(&16));

    // the manifest is retrievable until a commit consumes it
    assert_eq!(manifests.load().unwrap(), Some(manifest));
}

#[test]
fn test_plan_failure_leaves_no_manifest() {
    let mut manifests = MemoryManifests::new();

    let result = plan(
        Path::new(&fixture_path("does-not-exist.xml")),
        "text/xml",
        &mut manifests,
    );

    assert!(result.is_err());
    assert_eq!(manifests.load().unwrap(), None);
}
