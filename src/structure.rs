//! Export classification and hierarchy ordering.
//!
//! WXR stores posts as a flat, unordered list. An export produced by a book
//! carries structural post types; when at least two distinct structural
//! types are present we treat the export as book-authored and rebuild
//! canonical reading order from `menu_order` and part/chapter parentage.

use crate::record::{PostType, Record};

/// Whether the export encodes a book hierarchy: true iff at least two of
/// {part, chapter, front-matter, back-matter} occur among the records.
///
/// Single linear scan, short-circuiting as soon as two distinct structural
/// types have been seen. Callers compute this once per pass and cache it.
pub fn is_book_export(records: &[Record]) -> bool {
    let (mut pt, mut ch, mut fm, mut bm) = (0u8, 0u8, 0u8, 0u8);

    for record in records {
        match record.post_type {
            PostType::Part => pt = 1,
            PostType::Chapter => ch = 1,
            PostType::FrontMatter => fm = 1,
            PostType::BackMatter => bm = 1,
            _ => {}
        }

        if pt + ch + fm + bm >= 2 {
            return true;
        }
    }

    false
}

/// Reorder a classified export into canonical document sequence:
/// front matter, then each part immediately followed by its chapters,
/// then back matter.
///
/// Records are first stable-sorted ascending by `menu_order`, so ties keep
/// their original relative order and `menu_order` decides placement *within*
/// each structural group. Chapters whose `parent_id` matches no part are
/// dropped, as are non-structural records; callers wanting completeness
/// validate the manifest before committing.
pub fn nested_sort(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| r.menu_order);

    let mut front = Vec::new();
    let mut parts = Vec::new();
    let mut chapters = Vec::new();
    let mut back = Vec::new();

    for record in records {
        match record.post_type {
            PostType::FrontMatter => front.push(record),
            PostType::Part => parts.push(record),
            PostType::Chapter => chapters.push(record),
            PostType::BackMatter => back.push(record),
            _ => {}
        }
    }

    let mut ordered = front;
    for part in parts {
        let part_id = part.id;
        ordered.push(part);

        let mut i = 0;
        while i < chapters.len() {
            if chapters[i].parent_id == Some(part_id) {
                ordered.push(chapters.remove(i));
            } else {
                i += 1;
            }
        }
    }
    ordered.extend(back);

    ordered
}
