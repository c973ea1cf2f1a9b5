//! Lightweight mirror of the page DOM.
//!
//! The recorder does not talk to a live browser; the host bridge feeds it a
//! tree of element nodes plus attach/detach mutations, and events reference
//! nodes by id. The mirror keeps parent/child/sibling structure so the
//! selector and label resolvers can walk ancestors and preceding siblings.

use std::collections::HashMap;

use serde_json::Value;

/// Index of a node inside a [`PageDom`] arena.
pub type NodeId = usize;

const TEXT_INPUT_TYPES: [&str; 9] = [
    "text", "email", "password", "number", "search", "tel", "url", "date", "time",
];

const INTERACTIVE_TAGS: [&str; 8] = [
    "a", "button", "input", "select", "textarea", "label", "details", "summary",
];

/// A single element node. Structure (parent/children/detached) is managed by
/// the owning [`PageDom`]; node data is set through the builder methods.
#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    detached: bool,
}

impl DomNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: HashMap::new(),
            text: None,
            visible: true,
            parent: None,
            children: Vec::new(),
            detached: false,
        }
    }

    /// Builder: set an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Builder: set the node's direct text.
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Builder: mark the node as not visible.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    pub fn dom_id(&self) -> Option<&str> {
        self.get_attr("id").filter(|v| !v.is_empty())
    }

    pub fn name_attr(&self) -> Option<&str> {
        self.get_attr("name").filter(|v| !v.is_empty())
    }

    pub fn input_type(&self) -> Option<&str> {
        self.get_attr("type").filter(|v| !v.is_empty())
    }

    pub fn classes(&self) -> Vec<&str> {
        self.get_attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// `input`, `select` or `textarea`.
    pub fn is_form_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// An element that accepts free text: a `textarea`, or an `input` whose
    /// type is text-like (or absent, the DOM default).
    pub fn is_text_input(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => match self.input_type() {
                Some(t) => TEXT_INPUT_TYPES.contains(&t.to_lowercase().as_str()),
                None => true,
            },
            _ => false,
        }
    }

    pub fn is_checkbox(&self) -> bool {
        self.tag == "input" && self.input_type().map(|t| t.eq_ignore_ascii_case("checkbox")).unwrap_or(false)
    }

    pub fn is_radio(&self) -> bool {
        self.tag == "input" && self.input_type().map(|t| t.eq_ignore_ascii_case("radio")).unwrap_or(false)
    }

    /// A `button` whose type is `submit`, or a `button` with no type at all
    /// (the DOM reports `type` as "submit" for those).
    pub fn is_submit_button(&self) -> bool {
        self.tag == "button"
            && self
                .input_type()
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(true)
    }

    pub fn is_interactive(&self) -> bool {
        if INTERACTIVE_TAGS.contains(&self.tag.as_str()) {
            return true;
        }
        self.attributes.contains_key("onclick")
            || self.get_attr("contenteditable") == Some("true")
            || self.get_attr("tabindex").map(|v| v != "-1").unwrap_or(false)
    }
}

/// Arena-backed element tree plus the current page URL.
#[derive(Debug, Clone)]
pub struct PageDom {
    pub url: String,
    nodes: Vec<DomNode>,
}

impl PageDom {
    /// Empty document: a single `html` root.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            nodes: vec![DomNode::new("html")],
        }
    }

    /// Build a document from a JSON snapshot of the shape
    /// `{"tag": ..., "attributes": {...}, "text": ..., "visible": ..., "children": [...]}`.
    /// Unknown or missing fields fall back to defaults; the snapshot becomes
    /// the children of a fresh root.
    pub fn from_json(url: &str, root: &Value) -> Self {
        let mut dom = Self::new(url);
        let root_id = dom.root();
        match root.as_array() {
            Some(items) => {
                for item in items {
                    dom.attach_from_json(root_id, item);
                }
            }
            None => {
                dom.attach_from_json(root_id, root);
            }
        }
        dom
    }

    fn attach_from_json(&mut self, parent: NodeId, value: &Value) {
        let tag = value.get("tag").and_then(|v| v.as_str()).unwrap_or("div");
        let mut node = DomNode::new(tag);
        if let Some(attrs) = value.get("attributes").and_then(|v| v.as_object()) {
            for (name, val) in attrs {
                if let Some(s) = val.as_str() {
                    node.attributes.insert(name.clone(), s.to_string());
                }
            }
        }
        if let Some(text) = value.get("text").and_then(|v| v.as_str()) {
            node.text = Some(text.to_string());
        }
        if let Some(false) = value.get("visible").and_then(|v| v.as_bool()) {
            node.visible = false;
        }
        let id = self.attach(parent, node);
        if let Some(children) = value.get("children").and_then(|v| v.as_array()) {
            for child in children {
                self.attach_from_json(id, child);
            }
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    pub fn attach(&mut self, parent: NodeId, mut node: DomNode) -> NodeId {
        let parent = if parent < self.nodes.len() { parent } else { self.root() };
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.children = Vec::new();
        node.detached = false;
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Remove a node from its parent and mark the subtree detached. Node data
    /// stays readable (detached nodes can still be labeled).
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }
        self.mark_detached(id);
    }

    fn mark_detached(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id) {
            Some(node) => {
                node.detached = true;
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            self.mark_detached(child);
        }
    }

    pub fn is_detached(&self, id: NodeId) -> bool {
        self.nodes.get(id).map(|n| n.detached).unwrap_or(true)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node_id) = current {
            out.push(node_id);
            current = self.parent(node_id);
        }
        out
    }

    /// Siblings before `id` in its parent, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        let Some(position) = siblings.iter().position(|&s| s == id) else {
            return Vec::new();
        };
        siblings[..position].iter().rev().copied().collect()
    }

    /// 1-based position among same-tag siblings, plus the same-tag count.
    pub fn nth_of_type(&self, id: NodeId) -> (usize, usize) {
        let Some(node) = self.node(id) else {
            return (1, 1);
        };
        let tag = node.tag.clone();
        let Some(parent) = self.parent(id) else {
            return (1, 1);
        };
        let same_tag: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| self.node(c).map(|n| n.tag == tag).unwrap_or(false))
            .collect();
        let position = same_tag.iter().position(|&c| c == id).map(|p| p + 1).unwrap_or(1);
        (position, same_tag.len())
    }

    /// Whitespace-normalized text of the node and its attached descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts: Vec<String> = Vec::new();
        self.collect_text(id, &mut parts);
        let joined = parts.join(" ");
        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, parts: &mut Vec<String>) {
        let Some(node) = self.node(id) else { return };
        if matches!(node.tag.as_str(), "script" | "style") {
            return;
        }
        if let Some(text) = &node.text {
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
        for &child in &node.children {
            self.collect_text(child, parts);
        }
    }

    /// First attached node matching the predicate, in document order.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| !n.detached && predicate(n))
            .map(|(id, _)| id)
    }

    /// Attached descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if self.is_detached(current) {
                continue;
            }
            out.push(current);
            let mut children = self.children(current).to_vec();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn element_by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.find(|n| n.dom_id() == Some(dom_id))
    }

    /// Visible means the node and all of its ancestors are visible and attached.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else { return false };
        if node.detached || !node.visible {
            return false;
        }
        self.ancestors(id)
            .iter()
            .all(|&a| self.node(a).map(|n| n.visible && !n.detached).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> (PageDom, NodeId, NodeId) {
        let mut dom = PageDom::new("https://example.com/form");
        let form = dom.attach(dom.root(), DomNode::new("form").attr("action", "/submit"));
        let label = dom.attach(form, DomNode::new("label").attr("for", "name").text("Full name"));
        let input = dom.attach(form, DomNode::new("input").attr("id", "name").attr("type", "text"));
        let _ = label;
        (dom, form, input)
    }

    #[test]
    fn ancestors_walk_to_root() {
        let (dom, form, input) = sample();
        assert_eq!(dom.ancestors(input), vec![form, dom.root()]);
    }

    #[test]
    fn preceding_siblings_nearest_first() {
        let (dom, form, input) = sample();
        let siblings = dom.preceding_siblings(input);
        assert_eq!(siblings.len(), 1);
        assert_eq!(dom.node(siblings[0]).map(|n| n.tag.as_str()), Some("label"));
        assert!(dom.preceding_siblings(form).is_empty());
    }

    #[test]
    fn text_content_normalizes_whitespace() {
        let mut dom = PageDom::new("https://example.com");
        let div = dom.attach(dom.root(), DomNode::new("div").text("  Hello "));
        dom.attach(div, DomNode::new("span").text("  world\n"));
        assert_eq!(dom.text_content(div), "Hello world");
    }

    #[test]
    fn detach_keeps_node_data_readable() {
        let (mut dom, form, input) = sample();
        dom.detach(input);
        assert!(dom.is_detached(input));
        assert!(!dom.children(form).contains(&input));
        assert_eq!(dom.node(input).and_then(|n| n.dom_id()), Some("name"));
    }

    #[test]
    fn nth_of_type_counts_same_tag_only() {
        let mut dom = PageDom::new("https://example.com");
        let list = dom.attach(dom.root(), DomNode::new("ul"));
        dom.attach(list, DomNode::new("li"));
        let second = dom.attach(list, DomNode::new("li"));
        dom.attach(list, DomNode::new("span"));
        assert_eq!(dom.nth_of_type(second), (2, 2));
    }

    #[test]
    fn from_json_builds_tree() {
        let snapshot = json!({
            "tag": "form",
            "attributes": {"id": "checkout"},
            "children": [
                {"tag": "input", "attributes": {"id": "email", "type": "email"}},
                {"tag": "button", "attributes": {"type": "submit"}, "text": "Buy"}
            ]
        });
        let dom = PageDom::from_json("https://shop.test", &snapshot);
        let email = dom.element_by_dom_id("email").unwrap();
        assert!(dom.node(email).unwrap().is_text_input());
        let button = dom.find(|n| n.tag == "button").unwrap();
        assert_eq!(dom.text_content(button), "Buy");
        assert!(dom.node(button).unwrap().is_submit_button());
    }

    #[test]
    fn hidden_ancestor_makes_node_invisible() {
        let mut dom = PageDom::new("https://example.com");
        let wrapper = dom.attach(dom.root(), DomNode::new("div").hidden());
        let input = dom.attach(wrapper, DomNode::new("input"));
        assert!(!dom.is_visible(input));
    }
}
