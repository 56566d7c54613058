//! Streaming WXR parser: turns RSS `<item>` elements into [`Record`]s.
//!
//! Only the fields the importer consumes are read: title, encoded content,
//! post id/type/parent, menu order, and postmeta pairs. Items carrying a
//! post type outside the supported set (attachments, nav menu items, ...)
//! are dropped here, with a debug log.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{PostType, Record};
use crate::wxr::Export;

/// Item child element whose text is currently being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Content,
    PostId,
    PostType,
    PostParent,
    MenuOrder,
    MetaKey,
    MetaValue,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"content:encoded" => Some(Field::Content),
        b"wp:post_id" => Some(Field::PostId),
        b"wp:post_type" => Some(Field::PostType),
        b"wp:post_parent" => Some(Field::PostParent),
        b"wp:menu_order" => Some(Field::MenuOrder),
        b"wp:meta_key" => Some(Field::MetaKey),
        b"wp:meta_value" => Some(Field::MetaValue),
        _ => None,
    }
}

/// Accumulates one `<item>` while its children stream past.
#[derive(Debug, Default)]
struct ItemState {
    title: String,
    content: String,
    post_id: String,
    post_type: String,
    post_parent: String,
    menu_order: String,
    meta: Vec<(String, String)>,
    meta_key: String,
    meta_value: String,
}

impl ItemState {
    fn append(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Content => &mut self.content,
            Field::PostId => &mut self.post_id,
            Field::PostType => &mut self.post_type,
            Field::PostParent => &mut self.post_parent,
            Field::MenuOrder => &mut self.menu_order,
            Field::MetaKey => &mut self.meta_key,
            Field::MetaValue => &mut self.meta_value,
        };
        target.push_str(text);
    }

    fn finish(self) -> Option<Record> {
        let Ok(id) = self.post_id.trim().parse::<u64>() else {
            warn!(post_title = %self.title, "dropping item without a usable post id");
            return None;
        };

        let raw_type = self.post_type.trim();
        let Some(post_type) = PostType::parse(raw_type) else {
            debug!(id, post_type = raw_type, "dropping unsupported post type");
            return None;
        };

        let parent: u64 = self.post_parent.trim().parse().unwrap_or(0);

        Some(Record {
            id,
            title: self.title,
            content: self.content,
            post_type,
            parent_id: (parent != 0).then_some(parent),
            menu_order: self.menu_order.trim().parse().unwrap_or(0),
            meta: self.meta,
        })
    }
}

/// Parse a WXR document into an export.
pub fn parse_str(xml: &str) -> Result<Export> {
    let mut reader = Reader::from_str(xml);

    let mut records = Vec::new();
    let mut item: Option<ItemState> = None;
    let mut field: Option<Field> = None;
    let mut saw_rss = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"rss" => saw_rss = true,
                b"item" => item = Some(ItemState::default()),
                b"wp:postmeta" => {
                    if let Some(state) = item.as_mut() {
                        state.meta_key.clear();
                        state.meta_value.clear();
                    }
                }
                other => {
                    field = if item.is_some() { field_for(other) } else { None };
                }
            },
            Ok(Event::Text(e)) => {
                if let (Some(state), Some(f)) = (item.as_mut(), field) {
                    state.append(f, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(state), Some(f)) = (item.as_mut(), field) {
                    let raw = e.into_inner();
                    state.append(f, &String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let (Some(state), Some(f)) = (item.as_mut(), field)
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    state.append(f, &resolved);
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"item" => {
                        if let Some(state) = item.take()
                            && let Some(record) = state.finish()
                        {
                            records.push(record);
                        }
                    }
                    b"wp:postmeta" => {
                        if let Some(state) = item.as_mut() {
                            let key = std::mem::take(&mut state.meta_key);
                            let value = std::mem::take(&mut state.meta_value);
                            state.meta.push((key, value));
                        }
                    }
                    _ => {}
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    if !saw_rss {
        return Err(Error::InvalidWxr("no <rss> root element".to_string()));
    }

    Ok(Export { records })
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
