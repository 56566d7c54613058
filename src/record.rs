//! Record model: one parsed WXR post plus its metadata entries.

use serde::{Deserialize, Serialize};

/// Publication status assigned to an imported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Visible immediately (structural containers).
    Published,
    /// Held for editorial review.
    Draft,
}

/// Post type of a WXR record.
///
/// A closed set: the four structural types participate in book hierarchy,
/// `post` and `page` are plain content. Per-type behavior (status, content,
/// parenting) hangs off this enum rather than being scattered through the
/// import loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostType {
    Post,
    Page,
    FrontMatter,
    Chapter,
    Part,
    BackMatter,
}

impl PostType {
    /// Parse a WXR `wp:post_type` value. Returns `None` for types this
    /// importer does not handle (attachments, nav menu items, etc.).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(PostType::Post),
            "page" => Some(PostType::Page),
            "front-matter" => Some(PostType::FrontMatter),
            "chapter" => Some(PostType::Chapter),
            "part" => Some(PostType::Part),
            "back-matter" => Some(PostType::BackMatter),
            _ => None,
        }
    }

    /// The WXR spelling of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Post => "post",
            PostType::Page => "page",
            PostType::FrontMatter => "front-matter",
            PostType::Chapter => "chapter",
            PostType::Part => "part",
            PostType::BackMatter => "back-matter",
        }
    }

    /// Whether this type participates in book hierarchy.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            PostType::FrontMatter | PostType::Chapter | PostType::Part | PostType::BackMatter
        )
    }

    /// Status a freshly imported document of this type starts with.
    /// Parts go live immediately; everything else lands as a draft.
    pub fn default_status(self) -> DocumentStatus {
        match self {
            PostType::Part => DocumentStatus::Published,
            _ => DocumentStatus::Draft,
        }
    }

    /// Whether documents of this type carry a body. Parts are structural
    /// containers only.
    pub fn carries_content(self) -> bool {
        !matches!(self, PostType::Part)
    }

    /// Whether documents of this type are attached under the most recently
    /// created part.
    pub fn nests_under_part(self) -> bool {
        matches!(self, PostType::Chapter)
    }
}

/// One parsed post from a WXR export.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Post id, unique within one export.
    pub id: u64,
    pub title: String,
    /// HTML body; may be empty for structural types.
    pub content: String,
    pub post_type: PostType,
    /// Owning record, meaningful only for chapters (their part).
    pub parent_id: Option<u64>,
    /// Ascending placement before structural grouping.
    pub menu_order: i64,
    /// Ordered `(key, value)` metadata pairs; duplicate keys may appear.
    pub meta: Vec<(String, String)>,
}

impl Record {
    /// Look up a metadata value by key. The export may carry the same key
    /// from multiple sources; the earliest match wins.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
