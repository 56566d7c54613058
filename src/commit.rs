//! Phase-2 committer: turns manifest-approved records into documents.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::html;
use crate::images::ImageLocalizer;
use crate::manifest::Manifest;
use crate::record::PostType;
use crate::store::{
    ApprovalGate, DocumentId, DocumentStore, ImageFetcher, MediaStore, NewDocument,
};
use crate::structure::{is_book_export, nested_sort};
use crate::wxr::Export;

/// Metadata keys copied from the export onto each imported document unless
/// the host extends the set.
pub const DEFAULT_META_KEYS: [&str; 4] = ["author", "license", "short_title", "subtitle"];

/// Distinguished metadata key carrying a part's descriptive text.
pub const PART_CONTENT_KEY: &str = "part_content";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Metadata keys propagated from records to documents; first matching
    /// entry per key wins, empty values are skipped.
    pub meta_keys: Vec<String>,
    /// Parent for chapters committed before any part in the pass.
    pub default_parent: Option<DocumentId>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            meta_keys: DEFAULT_META_KEYS.iter().map(|k| k.to_string()).collect(),
            default_parent: None,
        }
    }
}

/// Commit every approved record of a freshly parsed export.
///
/// The export is re-classified and re-sorted here, so documents are created
/// in canonical order; each chapter attaches to the most recently created
/// part (or the configured default when none has been created yet).
/// Per-record image failures degrade to fixup markers and the pass
/// continues; a document-store error aborts with the records committed so
/// far left in place.
pub fn commit(
    manifest: &Manifest,
    export: Export,
    documents: &mut dyn DocumentStore,
    media: &mut dyn MediaStore,
    fetcher: &mut dyn ImageFetcher,
    gate: &dyn ApprovalGate,
    options: &ImportOptions,
) -> Result<usize> {
    let records = if is_book_export(&export.records) {
        nested_sort(export.records)
    } else {
        export.records
    };

    let mut localizer = ImageLocalizer::new(fetcher, media);
    let mut running_part: Option<DocumentId> = None;
    let mut imported = 0usize;

    for record in &records {
        if !gate.is_flagged(record.id) || !manifest.entries.contains_key(&record.id) {
            debug!(id = record.id, "record not approved for import");
            continue;
        }

        // the user may have re-typed the record since planning
        let doc_type = gate
            .committed_type(record.id)
            .or_else(|| manifest.entry_types.get(&record.id).copied())
            .unwrap_or(record.post_type);

        let content = localizer.localize(&record.content);

        let parent = if doc_type.nests_under_part() {
            running_part.or(options.default_parent)
        } else {
            None
        };

        let id = documents.create_document(NewDocument {
            title: html::strip_tags(&record.title),
            doc_type,
            status: doc_type.default_status(),
            content: doc_type.carries_content().then_some(content),
            parent,
        })?;

        if doc_type == PostType::Part {
            running_part = Some(id);
        }

        for key in &options.meta_keys {
            if let Some(value) = record.meta_value(key)
                && !value.is_empty()
            {
                documents.set_metadata(id, key, value)?;
            }
        }

        if doc_type == PostType::Part
            && let Some(part_content) = record.meta_value(PART_CONTENT_KEY)
            && !part_content.is_empty()
        {
            documents.set_metadata(id, PART_CONTENT_KEY, part_content)?;
        }

        documents.set_metadata(id, "show_title", "on")?;
        documents.set_metadata(id, "export", "on")?;

        let stored = documents
            .document(id)
            .ok_or_else(|| Error::Store(format!("document {} vanished after create", id.0)))?;
        documents.reconsolidate(id, &stored)?;

        imported += 1;
    }

    info!(imported, total = records.len(), "commit pass finished");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ApproveAll;
    use crate::store::memory::{MemoryDocuments, MemoryFetcher, MemoryMedia};
    use crate::wxr::parse_str;

    fn book_export() -> Export {
        parse_str(
            r#"<rss><channel>
            <item>
                <title>Chapter Two</title>
                <content:encoded><![CDATA[<p>Second</p>]]></content:encoded>
                <wp:post_id>3</wp:post_id>
                <wp:post_type>chapter</wp:post_type>
                <wp:post_parent>1</wp:post_parent>
                <wp:menu_order>2</wp:menu_order>
            </item>
            <item>
                <title>Part One</title>
                <content:encoded><![CDATA[]]></content:encoded>
                <wp:post_id>1</wp:post_id>
                <wp:post_type>part</wp:post_type>
                <wp:post_parent>0</wp:post_parent>
                <wp:menu_order>0</wp:menu_order>
                <wp:postmeta>
                    <wp:meta_key>part_content</wp:meta_key>
                    <wp:meta_value><![CDATA[<p>About this part.</p>]]></wp:meta_value>
                </wp:postmeta>
            </item>
            <item>
                <title>Chapter One</title>
                <content:encoded><![CDATA[<p>First</p>]]></content:encoded>
                <wp:post_id>2</wp:post_id>
                <wp:post_type>chapter</wp:post_type>
                <wp:post_parent>1</wp:post_parent>
                <wp:menu_order>1</wp:menu_order>
            </item>
            </channel></rss>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_chapters_attach_to_running_part() {
        let export = book_export();
        let manifest = Manifest::build(&export, "book.xml", "text/xml");

        let mut documents = MemoryDocuments::new();
        let mut media = MemoryMedia::new("https://book.example.net/media");
        let mut fetcher = MemoryFetcher::new();

        let imported = commit(
            &manifest,
            export,
            &mut documents,
            &mut media,
            &mut fetcher,
            &ApproveAll,
            &ImportOptions::default(),
        )
        .unwrap();

        assert_eq!(imported, 3);

        let docs: Vec<_> = documents.iter().collect();
        assert_eq!(docs[0].title, "Part One");
        assert_eq!(docs[1].title, "Chapter One");
        assert_eq!(docs[2].title, "Chapter Two");

        // both chapters hang off the freshly created part document
        let part_id = docs[0].id;
        assert_eq!(docs[1].parent, Some(part_id));
        assert_eq!(docs[2].parent, Some(part_id));

        // parts carry no body; their text lives in metadata
        assert_eq!(docs[0].content, None);
        assert!(
            docs[0]
                .metadata
                .contains(&(PART_CONTENT_KEY.to_string(), "<p>About this part.</p>".to_string()))
        );

        // the display/export flags are always set
        for doc in &docs {
            assert!(doc.metadata.contains(&("show_title".to_string(), "on".to_string())));
            assert!(doc.metadata.contains(&("export".to_string(), "on".to_string())));
        }

        assert_eq!(documents.reconsolidated().len(), 3);
    }

    #[test]
    fn test_chapter_before_any_part_uses_default_parent() {
        // a single chapter is not a book export, so insertion order applies
        // and no part precedes it
        let export = parse_str(
            r#"<rss><channel><item>
                <title>Stray</title>
                <content:encoded><![CDATA[<p>Loose chapter</p>]]></content:encoded>
                <wp:post_id>9</wp:post_id>
                <wp:post_type>chapter</wp:post_type>
                <wp:post_parent>0</wp:post_parent>
                <wp:menu_order>0</wp:menu_order>
            </item></channel></rss>"#,
        )
        .unwrap();
        let manifest = Manifest::build(&export, "book.xml", "text/xml");

        let mut documents = MemoryDocuments::new();
        let mut media = MemoryMedia::new("https://book.example.net/media");
        let mut fetcher = MemoryFetcher::new();

        let options = ImportOptions {
            default_parent: Some(DocumentId(77)),
            ..ImportOptions::default()
        };

        let imported = commit(
            &manifest,
            export,
            &mut documents,
            &mut media,
            &mut fetcher,
            &ApproveAll,
            &options,
        )
        .unwrap();

        assert_eq!(imported, 1);
        let doc = documents.iter().next().unwrap();
        assert_eq!(doc.parent, Some(DocumentId(77)));
    }

    #[test]
    fn test_gate_and_type_override() {
        struct OnlyChapterOne;
        impl ApprovalGate for OnlyChapterOne {
            fn is_flagged(&self, id: u64) -> bool {
                id == 2
            }
            fn committed_type(&self, id: u64) -> Option<PostType> {
                (id == 2).then_some(PostType::FrontMatter)
            }
        }

        let export = book_export();
        let manifest = Manifest::build(&export, "book.xml", "text/xml");

        let mut documents = MemoryDocuments::new();
        let mut media = MemoryMedia::new("https://book.example.net/media");
        let mut fetcher = MemoryFetcher::new();

        let imported = commit(
            &manifest,
            export,
            &mut documents,
            &mut media,
            &mut fetcher,
            &OnlyChapterOne,
            &ImportOptions::default(),
        )
        .unwrap();

        assert_eq!(imported, 1);
        let doc = documents.iter().next().unwrap();
        assert_eq!(doc.title, "Chapter One");
        // the override re-typed the chapter, so it no longer nests
        assert_eq!(doc.doc_type, PostType::FrontMatter);
        assert_eq!(doc.parent, None);
    }

    #[test]
    fn test_empty_metadata_values_are_skipped() {
        let export = parse_str(
            r#"<rss><channel><item>
                <title>Meta</title>
                <content:encoded><![CDATA[<p>x</p>]]></content:encoded>
                <wp:post_id>5</wp:post_id>
                <wp:post_type>front-matter</wp:post_type>
                <wp:post_parent>0</wp:post_parent>
                <wp:menu_order>0</wp:menu_order>
                <wp:postmeta>
                    <wp:meta_key>subtitle</wp:meta_key>
                    <wp:meta_value><![CDATA[]]></wp:meta_value>
                </wp:postmeta>
                <wp:postmeta>
                    <wp:meta_key>author</wp:meta_key>
                    <wp:meta_value><![CDATA[First Author]]></wp:meta_value>
                </wp:postmeta>
                <wp:postmeta>
                    <wp:meta_key>author</wp:meta_key>
                    <wp:meta_value><![CDATA[Shadowed]]></wp:meta_value>
                </wp:postmeta>
            </item></channel></rss>"#,
        )
        .unwrap();
        let manifest = Manifest::build(&export, "book.xml", "text/xml");

        let mut documents = MemoryDocuments::new();
        let mut media = MemoryMedia::new("https://book.example.net/media");
        let mut fetcher = MemoryFetcher::new();

        commit(
            &manifest,
            export,
            &mut documents,
            &mut media,
            &mut fetcher,
            &ApproveAll,
            &ImportOptions::default(),
        )
        .unwrap();

        let doc = documents.iter().next().unwrap();
        assert!(doc.metadata.contains(&("author".to_string(), "First Author".to_string())));
        assert!(!doc.metadata.iter().any(|(k, _)| k == "subtitle"));
        assert!(!doc.metadata.iter().any(|(_, v)| v == "Shadowed"));
    }
}
