//! Markup tree helpers over html5ever / rcdom
//!
//! All transforms parse a document body into an owned tree, traverse a
//! snapshot of its elements, mutate, and serialize the body's children back
//! to a string. Unparseable fragments survive as opaque text nodes.

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

/// Errors that can occur while serializing a markup tree
#[derive(Error, Debug)]
pub enum DomError {
    /// Serialization into the output buffer failed
    #[error("markup serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    /// Serialized markup was not valid UTF-8
    #[error("serialized markup was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse a document body string and return the `<body>` element handle.
///
/// The parser is a conforming HTML parser, so bare text and partial markup
/// are accepted; whatever cannot be parsed structurally remains text.
///
/// The body is detached from the parsed document before that document is
/// dropped; `Node`'s `Drop` strips the children of every node it can still
/// reach, so a body left attached would come back empty.
pub fn parse_body(markup: &str) -> Handle {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
    match find_child_element(&dom.document, "html")
        .and_then(|html| find_child_element(&html, "body"))
    {
        Some(body) => detach(&body),
        None => dom.document.clone(),
    }
}

/// Unlink a node from its parent so the parent's teardown cannot reach it
fn detach(node: &Handle) -> Handle {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.clone()
}

fn find_child_element(node: &Handle, name: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some(name))
        .cloned()
}

/// Lowercase tag name of an element node, `None` for non-elements
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

/// All element descendants of `root` in document order (preorder), as a
/// snapshot list that stays valid while the tree is mutated
pub fn elements_in_order(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    collect_elements(root, &mut out);
    out
}

fn collect_elements(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if element_name(child).is_some() {
            out.push(child.clone());
        }
        collect_elements(child, out);
    }
}

/// Concatenated text of all descendant text nodes
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    gather_text(node, &mut out);
    out
}

fn gather_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        gather_text(child, out);
    }
}

/// True when the node has no element children (it may still hold text)
pub fn is_leaf_element(node: &Handle) -> bool {
    element_name(node).is_some()
        && node
            .children
            .borrow()
            .iter()
            .all(|child| element_name(child).is_none())
}

/// True for a text node holding only whitespace
pub fn is_blank_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        _ => false,
    }
}

/// Serialize the children of a node back to a markup string (inner markup)
pub fn inner_markup(node: &Handle) -> Result<String, DomError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)?;
    Ok(String::from_utf8(output)?)
}

/// Replace a node's children with the parse result of a markup string.
///
/// The children are moved out of the fragment body, not cloned; the
/// fragment body drops here and would otherwise strip their descendants.
pub fn set_inner_markup(node: &Handle, markup: &str) {
    let fragment_body = parse_body(markup);
    let new_children = std::mem::take(&mut *fragment_body.children.borrow_mut());
    *node.children.borrow_mut() = new_children;
}

/// Create an element node with the given tag and no attributes
pub fn create_element(tag: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(Vec::new()),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Insert a child node at the front of a node's child list
pub fn prepend_child(node: &Handle, child: Handle) {
    node.children.borrow_mut().insert(0, child);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_survives_parser_teardown() {
        // The parsed document is gone by the time parse_body returns; the
        // body must keep its subtree regardless
        let body = parse_body("<h4>A</h4>");
        assert_eq!(body.children.borrow().len(), 1);
        assert_eq!(inner_markup(&body).unwrap(), "<h4>A</h4>");
    }

    #[test]
    fn test_parse_and_serialize_roundtrip() {
        let body = parse_body("<h4>A</h4><h5>X</h5><p>text</p>");
        assert_eq!(
            inner_markup(&body).unwrap(),
            "<h4>A</h4><h5>X</h5><p>text</p>"
        );
    }

    #[test]
    fn test_bare_text_survives_parsing() {
        let body = parse_body("no tags at all");
        assert_eq!(inner_markup(&body).unwrap(), "no tags at all");
    }

    #[test]
    fn test_elements_in_document_order() {
        let body = parse_body("<h2>one</h2><div><p>two</p></div><h3>three</h3>");
        let names: Vec<_> = elements_in_order(&body)
            .iter()
            .filter_map(element_name)
            .collect();
        assert_eq!(names, vec!["h2", "div", "p", "h3"]);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let body = parse_body("<h2>one <em>two</em> three</h2>");
        let heading = &elements_in_order(&body)[0];
        assert_eq!(text_content(heading), "one two three");
    }

    #[test]
    fn test_leaf_detection() {
        let body = parse_body("<div><p>leaf</p></div>");
        let elements = elements_in_order(&body);
        assert!(!is_leaf_element(&elements[0]));
        assert!(is_leaf_element(&elements[1]));
    }

    #[test]
    fn test_set_inner_markup_replaces_children() {
        let body = parse_body("<p>old</p>");
        let paragraph = elements_in_order(&body)[0].clone();
        set_inner_markup(&paragraph, "new <strong>content</strong>");
        assert_eq!(
            inner_markup(&paragraph).unwrap(),
            "new <strong>content</strong>"
        );
    }

    #[test]
    fn test_set_inner_markup_keeps_nested_descendants() {
        let body = parse_body("<p>old</p>");
        let paragraph = elements_in_order(&body)[0].clone();
        set_inner_markup(&paragraph, "<em>new <strong>deep</strong></em>");
        assert_eq!(
            inner_markup(&paragraph).unwrap(),
            "<em>new <strong>deep</strong></em>"
        );
    }

    #[test]
    fn test_prepend_text_node() {
        let body = parse_body("<h5>X</h5>");
        let heading = elements_in_order(&body)[0].clone();
        prepend_child(&heading, create_text("A "));
        assert_eq!(inner_markup(&body).unwrap(), "<h5>A X</h5>");
    }
}
