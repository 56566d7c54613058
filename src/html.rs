//! HTML helpers for import content normalization, built on html5ever.
//!
//! WXR `content:encoded` payloads are HTML fragments. Parsing wraps them in
//! a full document (doctype, `<html>`, `<body>`); [`inner_markup`] strips
//! that scaffolding back off after the image pass so only the author's
//! markup reaches the document store.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{Attribute, QualName, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Parse an HTML fragment into a DOM tree by wrapping it in a minimal
/// document structure.
pub(crate) fn parse_fragment(html: &str) -> RcDom {
    let wrapped = format!(
        "<!DOCTYPE html><html><head></head><body>{}</body></html>",
        html
    );

    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(wrapped.as_bytes())
}

/// Collect every element with the given local name, in document order.
pub(crate) fn find_elements(handle: &Handle, name: &str) -> Vec<Handle> {
    let mut results = Vec::new();
    find_elements_recursive(handle, name, &mut results);
    results
}

fn find_elements_recursive(handle: &Handle, name: &str, results: &mut Vec<Handle>) {
    if let NodeData::Element { name: ref qname, .. } = handle.data
        && qname.local.as_ref() == name
    {
        results.push(handle.clone());
    }

    for child in handle.children.borrow().iter() {
        find_elements_recursive(child, name, results);
    }
}

fn first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: ref qname, .. } = handle.data
        && qname.local.as_ref() == name
    {
        return Some(handle.clone());
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = first_element(child, name) {
            return Some(found);
        }
    }

    None
}

/// Get an attribute value from an element node.
pub(crate) fn attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == attr_name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Set (or add) an attribute on an element node.
pub(crate) fn set_attribute(handle: &Handle, attr_name: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        let mut attrs_mut = attrs.borrow_mut();

        for attr in attrs_mut.iter_mut() {
            if attr.name.local.as_ref() == attr_name {
                attr.value = value.into();
                return;
            }
        }

        attrs_mut.push(Attribute {
            name: QualName::new(None, ns!(), attr_name.into()),
            value: value.into(),
        });
    }
}

fn serialize_node(handle: &Handle) -> String {
    let mut bytes = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();

    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    serialize(&mut bytes, &serializable, opts).expect("serialization failed");

    String::from_utf8(bytes).unwrap_or_default()
}

/// Serialize the markup inside `<body>`, dropping the document scaffolding
/// the fragment parse introduced.
pub(crate) fn inner_markup(dom: &RcDom) -> String {
    match first_element(&dom.document, "body") {
        Some(body) => {
            let mut content = String::new();
            for child in body.children.borrow().iter() {
                content.push_str(&serialize_node(child));
            }
            content
        }
        None => String::new(),
    }
}

/// Reduce HTML to its text content, with surrounding whitespace trimmed.
/// Used for document titles, which must be plain text.
pub(crate) fn strip_tags(html: &str) -> String {
    let dom = parse_fragment(html);
    let mut text = String::new();
    collect_text(&dom.document, &mut text);
    text.trim().to_string()
}

fn collect_text(handle: &Handle, text: &mut String) {
    match handle.data {
        NodeData::Text { ref contents } => {
            text.push_str(&contents.borrow());
        }
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, text);
            }
        }
    }
}
