//! Read-only node handles and search helpers.
//!
//! Every helper is total: absence is `None`/`false`, never an error.

use super::classify;
use super::node::{Category, Context, Node, NodeId, NodeKind};
use super::Document;

/// A borrowed view of one node in a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> PartialEq for NodeRef<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl<'a> Eq for NodeRef<'a> {}

impl<'a> std::fmt::Debug for NodeRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id.0)
            .field("kind", self.kind())
            .field("offset", &self.source_offset())
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    fn node(&self) -> &'a Node {
        self.doc.node(self.id)
    }

    fn link(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.map(|id| NodeRef::new(self.doc, id))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node().kind
    }

    pub fn category(&self) -> Category {
        self.node().kind.category()
    }

    /// Environment or command name.
    pub fn token(&self) -> Option<&'a str> {
        self.node().kind.token()
    }

    /// Own text of a text node.
    pub fn text(&self) -> Option<&'a str> {
        match &self.node().kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.category() == Category::Text
    }

    pub fn is_command(&self, name: &str) -> bool {
        matches!(&self.node().kind, NodeKind::Command(n) if n == name)
    }

    pub fn is_command_in(&self, names: &[&str]) -> bool {
        matches!(&self.node().kind, NodeKind::Command(n) if names.contains(&n.as_str()))
    }

    pub fn is_environment(&self, name: &str) -> bool {
        matches!(&self.node().kind, NodeKind::Environment(n) if n == name)
    }

    /// Inline or display math environment.
    pub fn is_math_environment(&self) -> bool {
        matches!(&self.node().kind, NodeKind::Environment(n) if classify::is_math(n))
    }

    pub fn is_display_math_environment(&self) -> bool {
        matches!(&self.node().kind, NodeKind::Environment(n) if classify::is_display_math(n))
    }

    /// Text node made only of whitespace.
    pub fn is_blank(&self) -> bool {
        self.text().map_or(false, |t| t.trim().is_empty())
    }

    pub fn arguments(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.node().arguments.iter().map(move |id| NodeRef::new(doc, *id))
    }

    /// Body list; `None` when omitted.
    pub fn content(&self) -> Option<impl Iterator<Item = NodeRef<'a>> + 'a> {
        let doc = self.doc;
        self.node()
            .content
            .as_ref()
            .map(move |ids| ids.iter().map(move |id| NodeRef::new(doc, *id)))
    }

    /// Arguments followed by content.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        let node = self.node();
        node.arguments
            .iter()
            .chain(node.content.iter().flatten())
            .map(move |id| NodeRef::new(doc, *id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().parent)
    }

    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().prev_sibling)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().next_sibling)
    }

    pub fn prev_node(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().prev_node)
    }

    pub fn next_node(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().next_node)
    }

    pub fn context(&self) -> Context {
        self.node().context
    }

    pub fn in_math(&self) -> bool {
        self.node().context.in_math
    }

    pub fn in_display_math(&self) -> bool {
        self.node().context.in_display_math
    }

    pub fn in_non_text_argument(&self) -> bool {
        self.node().context.in_non_text_argument
    }

    pub fn source_offset(&self) -> Option<usize> {
        self.node().source_offset
    }

    /// Own offset, else the nearest earlier node in document order that has one.
    pub fn resolve_offset(&self) -> Option<usize> {
        self.source_offset()
            .or_else(|| self.find_prev(|n| n.source_offset().is_some())?.source_offset())
    }

    /// Concatenated text of this node and all its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if let Some(text) = node.text() {
                out.push_str(text);
            }
            let first = stack.len();
            stack.extend(node.children());
            stack[first..].reverse();
        }
        out
    }

    /// First node strictly before this one in document order matching `pred`.
    pub fn find_prev(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        std::iter::successors(self.prev_node(), |n| n.prev_node()).find(|n| pred(n))
    }

    /// First node strictly after this one in document order matching `pred`.
    pub fn find_next(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        std::iter::successors(self.next_node(), |n| n.next_node()).find(|n| pred(n))
    }

    pub fn find_child(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        self.children().find(|n| pred(n))
    }

    pub fn has_child(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> bool {
        self.find_child(pred).is_some()
    }

    /// Pre-order search over descendants, excluding this node.
    pub fn find_descendant(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let mut stack: Vec<NodeRef<'a>> = self.children().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if pred(&node) {
                return Some(node);
            }
            let len = stack.len();
            stack.extend(node.children());
            stack[len..].reverse();
        }
        None
    }

    pub fn has_descendant(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> bool {
        self.find_descendant(pred).is_some()
    }

    /// Other nodes of the same owning list.
    pub fn siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let backward = std::iter::successors(self.prev_sibling(), |n| n.prev_sibling());
        let forward = std::iter::successors(self.next_sibling(), |n| n.next_sibling());
        backward.chain(forward)
    }

    pub fn has_sibling(&self, pred: impl Fn(&NodeRef<'a>) -> bool) -> bool {
        self.siblings().any(|n| pred(&n))
    }

    /// Next sibling that is not whitespace-only text.
    pub fn next_significant_sibling(&self) -> Option<NodeRef<'a>> {
        std::iter::successors(self.next_sibling(), |n| n.next_sibling()).find(|n| !n.is_blank())
    }

    /// Previous sibling that is not whitespace-only text.
    pub fn prev_significant_sibling(&self) -> Option<NodeRef<'a>> {
        std::iter::successors(self.prev_sibling(), |n| n.prev_sibling()).find(|n| !n.is_blank())
    }

    /// Previous node in document order that is not whitespace-only text.
    pub fn prev_significant_node(&self) -> Option<NodeRef<'a>> {
        self.find_prev(|n| !n.is_blank())
    }

    /// Next node in document order that is not whitespace-only text.
    pub fn next_significant_node(&self) -> Option<NodeRef<'a>> {
        self.find_next(|n| !n.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{RawKind, RawNode, TexParser};
    use crate::tree::{Category, Document};

    fn doc(source: &str) -> Document {
        let raw = TexParser::new().parse_source(source).unwrap();
        Document::from_raw(&raw, source).unwrap()
    }

    #[test]
    fn test_find_prev_is_strict() {
        let d = doc(r"\alpha x \beta");
        let beta = d.iter().find(|n| n.is_command("beta")).unwrap();
        assert!(beta.find_prev(|n| n.is_command("beta")).is_none());
        let alpha = beta.find_prev(|n| n.category() == Category::Command).unwrap();
        assert!(alpha.is_command("alpha"));
        assert!(alpha.find_next(|n| n.is_command("beta")).is_some());
    }

    #[test]
    fn test_child_search_is_shallow() {
        let d = doc(r"\begin{equation}\frac{a}{b}\end{equation}");
        let env = d.iter().find(|n| n.is_environment("equation")).unwrap();
        assert!(env.has_child(|n| n.is_command("frac")));
        assert!(!env.has_child(|n| n.text() == Some("a")));
        assert!(env.has_descendant(|n| n.text() == Some("a")));
        assert!(!env.has_descendant(|n| n.is_environment("equation")));
    }

    #[test]
    fn test_find_descendant_is_preorder() {
        let d = doc(r"\frac{a}{b}");
        let frac = d.iter().find(|n| n.is_command("frac")).unwrap();
        let first = frac.find_descendant(|n| n.is_text()).unwrap();
        assert_eq!(first.text(), Some("a"));
    }

    #[test]
    fn test_siblings_stay_in_owning_list() {
        let d = doc(r"$\{ x \mid y \}$");
        let mid = d.iter().find(|n| n.is_command("mid")).unwrap();
        assert!(mid.has_sibling(|n| n.text().map_or(false, |t| t.contains("\\{"))));
        assert!(!mid.has_sibling(|n| n.is_command("mid")));

        let d = doc(r"\frac{a}{b} c");
        let first_arg = d.iter().find(|n| n.category() == Category::BraceGroup).unwrap();
        assert!(!first_arg.has_sibling(|n| n.is_text()));
    }

    #[test]
    fn test_significant_siblings_skip_whitespace() {
        let d = doc("\\[a\\]\n \\[b\\]");
        let first = d.iter().find(|n| n.is_environment("displaymath")).unwrap();
        let next = first.next_significant_sibling().unwrap();
        assert!(next.is_environment("displaymath"));
        assert_ne!(next, first);
        assert_eq!(next.prev_significant_sibling(), Some(first));
    }

    #[test]
    fn test_plain_text_concatenates_descendants() {
        let d = doc(r"\label{eq:\alpha-1}");
        let label = d.iter().find(|n| n.is_command("label")).unwrap();
        assert_eq!(label.plain_text(), "eq:-1");
        assert!(label.content().is_none());
    }

    #[test]
    fn test_resolve_offset_walks_back() {
        let raw = RawNode::new(RawKind::Root, None).with_contents(vec![
            RawNode::new(RawKind::Command("par".into()), Some(3)),
            RawNode::text("x", None),
        ]);
        let d = Document::from_raw(&raw, "   \\par x").unwrap();
        let text = d.iter().find(|n| n.is_text()).unwrap();
        assert_eq!(text.source_offset(), None);
        assert_eq!(text.resolve_offset(), Some(3));

        let raw = RawNode::new(RawKind::Root, None).with_contents(vec![RawNode::text("x", None)]);
        let d = Document::from_raw(&raw, "x").unwrap();
        let text = d.iter().find(|n| n.is_text()).unwrap();
        assert_eq!(text.resolve_offset(), None);
    }
}
