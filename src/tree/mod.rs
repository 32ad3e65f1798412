//! Annotated document tree.
//!
//! A [`Document`] owns every node in an arena; links between nodes are
//! [`NodeId`] indices. Construction runs the builder and then the context
//! annotator exactly once, after which the tree is immutable and read through
//! [`NodeRef`] handles.

mod builder;
pub mod classify;
mod context;
mod node;
mod query;

use std::fmt::Write as _;

pub use builder::TreeError;
pub use context::MathLevel;
pub use node::{Category, Context, NodeId, NodeKind};
pub use query::NodeRef;

use crate::parser::RawNode;
use builder::TreeBuilder;
use node::Node;

/// A fully built and annotated document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    order: Vec<NodeId>,
    source: String,
}

impl Document {
    /// Build and annotate the tree for `source` from its raw parse.
    pub fn from_raw(raw: &RawNode, source: &str) -> Result<Self, TreeError> {
        let (mut nodes, root) = TreeBuilder::new().build(raw)?;
        let order = context::annotate(&mut nodes, root);
        log::debug!("built document tree with {} nodes", nodes.len());

        Ok(Self {
            nodes,
            root,
            order,
            source: source.to_string(),
        })
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.get(self.root)
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.order.iter().map(move |id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The source the tree was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Indented dump of the tree with context flags, for `--debug-tree`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for node in self.iter() {
            let depth = node.ancestors().count();
            let label = match node.kind() {
                NodeKind::Text(text) => format!("{:?}", text),
                NodeKind::Environment(name) | NodeKind::Command(name) => name.clone(),
                NodeKind::BraceGroup => "{..}".to_string(),
                NodeKind::BracketGroup => "[..]".to_string(),
            };
            let mut flags = String::new();
            if node.in_display_math() {
                flags.push_str(" display");
            } else if node.in_math() {
                flags.push_str(" math");
            }
            if node.in_non_text_argument() {
                flags.push_str(" non-text");
            }
            let offset = node
                .source_offset()
                .map_or_else(|| "-".to_string(), |o| o.to_string());
            let _ = writeln!(
                out,
                "{}{} {} @{}{}",
                "  ".repeat(depth),
                node.category(),
                label,
                offset,
                flags
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawKind, TexParser};

    #[test]
    fn test_dump_marks_math() {
        let source = "a $b$";
        let raw = TexParser::new().parse_source(source).unwrap();
        let doc = Document::from_raw(&raw, source).unwrap();
        let dump = doc.dump();
        assert!(dump.starts_with("environment document @-"));
        assert!(dump.contains("  environment math @2 math"));
        assert!(dump.contains("\"b\" @3 math"));
    }

    #[test]
    fn test_from_raw_rejects_non_root() {
        let raw = RawNode::new(RawKind::BraceGroup, Some(0));
        assert_eq!(Document::from_raw(&raw, "{}").unwrap_err(), TreeError::MissingRoot);
    }
}
