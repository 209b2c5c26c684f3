//! Rich-text documents: a tree of block, inline and text nodes.
//!
//! [`Node`] keeps every key Contentful writes (`data`, `marks`) so a document can be
//! read, edited and written back without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DOCUMENT: &str = "document";
pub const PARAGRAPH: &str = "paragraph";
pub const HEADING_1: &str = "heading-1";
pub const TEXT: &str = "text";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Value>>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
}

impl Node {
    pub fn document(content: Vec<Node>) -> Self {
        Self::block(DOCUMENT, content)
    }

    pub fn block(node_type: &str, content: Vec<Node>) -> Self {
        Self {
            node_type: node_type.to_string(),
            value: None,
            marks: None,
            data: Map::new(),
            content: Some(content),
        }
    }

    pub fn text(value: &str) -> Self {
        Self {
            node_type: TEXT.to_string(),
            value: Some(value.to_string()),
            marks: Some(Vec::new()),
            data: Map::new(),
            content: None,
        }
    }

    /// Parse a field value as a rich-text node. Anything without a `nodeType` is not one.
    pub fn from_value(value: &Value) -> Option<Node> {
        if value.get("nodeType").and_then(Value::as_str).is_none() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn is_text(&self) -> bool {
        self.node_type == TEXT
    }

    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    /// True if any text leaf below this node holds non-blank text.
    pub fn has_text(&self) -> bool {
        if self.is_text() {
            return self.value.as_deref().is_some_and(|v| !v.trim().is_empty());
        }
        self.children().iter().any(Node::has_text)
    }
}

/// First text of a document, trimmed; empty when the document has no text.
///
/// Walks the tree depth-first in document order. Consecutive text siblings form one run
/// (a heading split by bold/italic marks is still one string); the first run that is not
/// blank wins.
pub fn first_text(node: &Node) -> String {
    if node.is_text() {
        return node.value.as_deref().unwrap_or("").trim().to_string();
    }
    first_text_in(node.children()).unwrap_or_default()
}

fn first_text_in(children: &[Node]) -> Option<String> {
    let mut i = 0;
    while i < children.len() {
        if children[i].is_text() {
            let mut run = String::new();
            while i < children.len() && children[i].is_text() {
                run.push_str(children[i].value.as_deref().unwrap_or(""));
                i += 1;
            }
            let run = run.trim();
            if !run.is_empty() {
                return Some(run.to_string());
            }
        } else {
            if let Some(found) = first_text_in(children[i].children()) {
                return Some(found);
            }
            i += 1;
        }
    }
    None
}

/// Copy of `document` without its first top-level `heading-1` that holds text.
/// `None` when there is no such heading.
pub fn remove_first_heading(document: &Node) -> Option<Node> {
    let position = document
        .children()
        .iter()
        .position(|node| node.node_type == HEADING_1 && node.has_text())?;
    let mut updated = document.clone();
    if let Some(content) = updated.content.as_mut() {
        content.remove(position);
    }
    Some(updated)
}
