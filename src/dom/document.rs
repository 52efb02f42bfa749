// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host document representation

use std::sync::Arc;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use parking_lot::RwLock;

use super::CONFIG_ELEMENT_ID;
use crate::error::{Error, Result};

/// The page hosting the reporter.
///
/// Holds the page markup rather than a parsed tree: the markup can be swapped
/// at any time with [`HostDocument::set_html`] and every lookup sees the
/// current state, the same way a live DOM would.
#[derive(Debug, Clone)]
pub struct HostDocument {
    /// Raw page markup
    html: Arc<RwLock<String>>,
    /// Id of the element holding the reporter configuration
    config_element_id: String,
}

impl HostDocument {
    /// Create a document from page markup
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: Arc::new(RwLock::new(html.into())),
            config_element_id: CONFIG_ELEMENT_ID.to_string(),
        }
    }

    /// Look the configuration up under a different element id
    pub fn config_element_id(mut self, id: impl Into<String>) -> Self {
        self.config_element_id = id.into();
        self
    }

    /// Id of the element the configuration is read from
    pub fn config_id(&self) -> &str {
        &self.config_element_id
    }

    /// Replace the page markup
    pub fn set_html(&self, html: impl Into<String>) {
        *self.html.write() = html.into();
    }

    /// Text content of the first element with the given id
    ///
    /// Returns `Ok(None)` when no element carries the id.
    pub fn get_element_text_by_id(&self, id: &str) -> Result<Option<String>> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let dom = {
            let html = self.html.read();
            parse_document(RcDom::default(), opts)
                .from_utf8()
                .read_from(&mut html.as_bytes())
                .map_err(|e| Error::dom(format!("failed to parse host document: {}", e)))?
        };

        Ok(find_by_id(&dom.document, id).map(|handle| text_content(&handle)))
    }
}

impl Default for HostDocument {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Depth-first search in document order
fn find_by_id(handle: &Handle, id: &str) -> Option<Handle> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        let matches = attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == "id" && &*attr.value == id);
        if matches {
            return Some(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = find_by_id(child, id) {
            return Some(found);
        }
    }

    None
}

/// Concatenated text of all descendant text nodes, like DOM `textContent`
fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    match handle.data {
        NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}
