//! Arena-backed HTML tree.
//!
//! Every stage of the pipeline — inference, rewriting, extraction — operates
//! on this one tree type. Nodes live in a flat arena and are addressed by
//! [`NodeId`] indices, which stay valid across mutation: detaching a node
//! removes it from its parent's child list but never moves other nodes.
//! That stability is what lets inference hand out selectors and ownership
//! sets as plain ids instead of flagging the tree in place.
//!
//! ## Determinism
//!
//! Child order and attribute order are preserved exactly as parsed. All
//! traversals are document-order. Selectors computed from one parse resolve
//! identically on a reparse of the same input.
//!
//! ## Selectors
//!
//! Selectors are child-combinator paths rooted at `<body>`:
//!
//! ```text
//! main > section.hero > h1:nth-of-type(1)
//! ```
//!
//! Each step is `tag`, optionally qualified by one class and/or an
//! `:nth-of-type(n)` ordinal. Generation prefers `tag.class` when that is
//! unambiguous among siblings and falls back to the ordinal. Collection
//! container selectors end in a class-qualified step with no ordinal, so
//! the same path addresses every repetition of the group.
//!
//! ## Parsing
//!
//! [`Dom::parse`] uses html5ever's recovering document parser — malformed
//! markup never fails, it yields the best-effort tree plus a list of
//! recovery messages the caller can surface as warnings.

use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Stable index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    /// Attributes in source order. Order is preserved through mutation so
    /// serialization is deterministic.
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or("")
            .split_ascii_whitespace()
            .filter(|c| !c.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// First class token, if any. Used as the primary structural class.
    pub fn first_class(&self) -> Option<&str> {
        self.classes().next()
    }

    /// Set an attribute, replacing an existing value in place (keeps order)
    /// or appending a new one.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed HTML document as a mutable arena tree.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    /// Recovery messages emitted by the parser for malformed input.
    pub parse_errors: Vec<String>,
}

impl Dom {
    /// Parse raw markup into a tree. Never fails: html5ever auto-recovers
    /// from malformed input, and whatever it salvages is the tree.
    pub fn parse(raw: &str) -> Dom {
        let rc = html5ever::parse_document(RcDom::default(), html5ever::ParseOpts::default())
            .one(raw);
        let mut dom = Dom {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            root: NodeId(0),
            parse_errors: rc.errors.borrow().iter().map(|e| e.to_string()).collect(),
        };
        let root = dom.root;
        for child in rc.document.children.borrow().iter() {
            dom.convert(child, root);
        }
        dom
    }

    fn convert(&mut self, handle: &Handle, parent: NodeId) {
        let data = match &handle.data {
            RcNodeData::Element { name, attrs, .. } => NodeData::Element(ElementData {
                tag: name.local.to_string(),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect(),
            }),
            RcNodeData::Text { contents } => NodeData::Text(contents.borrow().to_string()),
            RcNodeData::Comment { contents } => NodeData::Comment(contents.to_string()),
            // Doctype is re-emitted by the serializer; PIs carry nothing we use.
            _ => {
                for child in handle.children.borrow().iter() {
                    self.convert(child, parent);
                }
                return;
            }
        };
        let id = self.push(parent, data);
        for child in handle.children.borrow().iter() {
            self.convert(child, id);
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// All descendant elements of `id` in document order.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.element(n).is_some())
            .collect()
    }

    /// The `<body>` element. Selector paths are rooted here.
    pub fn body(&self) -> Option<NodeId> {
        self.find_tag("body")
    }

    /// The `<head>` element.
    pub fn head(&self) -> Option<NodeId> {
        self.find_tag("head")
    }

    /// The root `<html>` element.
    pub fn html(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&n| self.tag(n) == Some("html"))
    }

    fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.tag(n) == Some(tag))
    }

    /// Concatenated descendant text with whitespace collapsed and trimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => out.push_str(t),
            _ => {
                for &child in self.children(id) {
                    out.push(' ');
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// 1-based position of `id` among same-tag element siblings
    /// (CSS `:nth-of-type` semantics).
    pub fn nth_of_type(&self, id: NodeId) -> usize {
        let tag = match self.tag(id) {
            Some(t) => t.to_string(),
            None => return 1,
        };
        let Some(parent) = self.parent(id) else {
            return 1;
        };
        let mut nth = 0;
        for &sib in self.children(parent) {
            if self.tag(sib) == Some(tag.as_str()) {
                nth += 1;
                if sib == id {
                    return nth;
                }
            }
        }
        1
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Remove `id` from its parent's child list. The node (and its subtree)
    /// stays in the arena, so other ids remain valid.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].children.clear();
        self.push(id, NodeData::Text(text.to_string()));
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    // =========================================================================
    // Selector generation
    // =========================================================================

    /// Build the selector path for `id`, rooted at `<body>`.
    ///
    /// Returns `None` for nodes outside the body subtree (head, html, the
    /// body itself).
    pub fn selector_for(&self, id: NodeId) -> Option<String> {
        let body = self.body()?;
        self.path_between(body, id, false)
    }

    /// Selector path for `id` relative to `ancestor` (exclusive).
    pub fn selector_relative(&self, id: NodeId, ancestor: NodeId) -> Option<String> {
        self.path_between(ancestor, id, false)
    }

    /// Selector for a collection container: same as [`Dom::selector_for`]
    /// but the final step is class-qualified with no ordinal, so it matches
    /// every repetition of the structural group.
    pub fn selector_for_container(&self, id: NodeId) -> Option<String> {
        let body = self.body()?;
        self.path_between(body, id, true)
    }

    fn path_between(&self, ancestor: NodeId, id: NodeId, open_last: bool) -> Option<String> {
        let mut chain = Vec::new();
        let mut cur = id;
        while cur != ancestor {
            self.element(cur)?;
            chain.push(cur);
            cur = self.parent(cur)?;
        }
        if chain.is_empty() {
            return None;
        }
        chain.reverse();
        let last = *chain.last().unwrap_or(&id);
        let steps: Vec<String> = chain
            .iter()
            .map(|&n| self.step_for(n, open_last && n == last))
            .collect();
        Some(steps.join(" > "))
    }

    /// Format one selector step for an element.
    ///
    /// `open` omits the ordinal and requires the class qualifier — used for
    /// the final step of container selectors.
    fn step_for(&self, id: NodeId, open: bool) -> String {
        let el = match self.element(id) {
            Some(el) => el,
            None => return String::new(),
        };
        let tag = el.tag.clone();
        let class = el.first_class().map(str::to_string);

        if open {
            return match class {
                Some(c) => format!("{tag}.{c}"),
                None => tag,
            };
        }

        let parent = self.parent(id);
        let siblings = parent.map(|p| self.child_elements(p)).unwrap_or_default();

        if let Some(class) = &class {
            let same = siblings
                .iter()
                .filter(|&&s| {
                    self.tag(s) == Some(tag.as_str())
                        && self.element(s).map(|e| e.has_class(class)).unwrap_or(false)
                })
                .count();
            if same <= 1 {
                return format!("{tag}.{class}");
            }
            return format!("{tag}.{class}:nth-of-type({})", self.nth_of_type(id));
        }

        let same_tag = siblings
            .iter()
            .filter(|&&s| self.tag(s) == Some(tag.as_str()))
            .count();
        if same_tag <= 1 {
            tag
        } else {
            format!("{tag}:nth-of-type({})", self.nth_of_type(id))
        }
    }

    // =========================================================================
    // Selector resolution
    // =========================================================================

    /// First node matching `selector`, rooted at `<body>`.
    pub fn resolve(&self, selector: &str) -> Option<NodeId> {
        self.resolve_all(selector).into_iter().next()
    }

    /// Every node matching `selector` in document order, rooted at `<body>`.
    pub fn resolve_all(&self, selector: &str) -> Vec<NodeId> {
        match self.body() {
            Some(body) => self.resolve_all_from(body, selector),
            None => Vec::new(),
        }
    }

    /// First node matching `selector` relative to `scope`.
    pub fn resolve_from(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.resolve_all_from(scope, selector).into_iter().next()
    }

    /// Every node matching `selector` relative to `scope`, document order.
    pub fn resolve_all_from(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let steps: Vec<Step> = match selector.split(" > ").map(Step::parse).collect() {
            Some(steps) => steps,
            None => return Vec::new(),
        };
        if steps.is_empty() {
            return Vec::new();
        }
        let mut current = self.child_elements(scope);
        for (i, step) in steps.iter().enumerate() {
            let matched: Vec<NodeId> = current
                .into_iter()
                .filter(|&n| self.step_matches(n, step))
                .collect();
            if i + 1 == steps.len() {
                return matched;
            }
            current = matched
                .iter()
                .flat_map(|&n| self.child_elements(n))
                .collect();
        }
        Vec::new()
    }

    fn step_matches(&self, id: NodeId, step: &Step) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.tag != step.tag {
            return false;
        }
        if let Some(class) = &step.class {
            if !el.has_class(class) {
                return false;
            }
        }
        if let Some(nth) = step.nth {
            if self.nth_of_type(id) != nth {
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize the whole document, with a doctype.
    pub fn serialize(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        for &child in self.children(self.root) {
            self.serialize_node(child, &mut out);
        }
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            NodeData::Document => {
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
            }
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// One parsed selector step: `tag(.class)?(:nth-of-type(n))?`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    tag: String,
    class: Option<String>,
    nth: Option<usize>,
}

impl Step {
    fn parse(step: &str) -> Option<Step> {
        let step = step.trim();
        if step.is_empty() {
            return None;
        }
        let (head, nth) = match step.find(":nth-of-type(") {
            Some(pos) => {
                let rest = &step[pos + ":nth-of-type(".len()..];
                let n: usize = rest.strip_suffix(')')?.parse().ok()?;
                (&step[..pos], Some(n))
            }
            None => (step, None),
        };
        let (tag, class) = match head.find('.') {
            Some(pos) => (&head[..pos], Some(head[pos + 1..].to_string())),
            None => (head, None),
        };
        if tag.is_empty() {
            return None;
        }
        Some(Step {
            tag: tag.to_string(),
            class,
            nth,
        })
    }
}
