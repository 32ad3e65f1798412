//! Conversion of a raw parse tree into the arena.

use thiserror::Error;

use super::classify;
use super::node::{Node, NodeId, NodeKind};
use crate::parser::{RawKind, RawNode};

/// Malformed raw input the builder refuses to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("raw tree must start with a root node")]
    MissingRoot,
    #[error("root node nested inside the document (offset {offset:?})")]
    NestedRoot { offset: Option<usize> },
    #[error("{what} without a name (offset {offset:?})")]
    MissingName {
        what: &'static str,
        offset: Option<usize>,
    },
    #[error("text fragment with child nodes (offset {offset:?})")]
    TextWithChildren { offset: Option<usize> },
    #[error("tree deeper than {} levels (offset {offset:?})", MAX_TREE_DEPTH)]
    TooDeep { offset: Option<usize> },
}

/// Deepest raw tree accepted from a parser.
pub const MAX_TREE_DEPTH: usize = 1024;

/// Builds the node arena. Links other than parent and siblings are left to
/// the context annotator.
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
    depth: usize,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            depth: 0,
        }
    }

    /// Builds the whole tree and returns the arena with its root id.
    pub(crate) fn build(mut self, raw: &RawNode) -> Result<(Vec<Node>, NodeId), TreeError> {
        if raw.kind != RawKind::Root {
            return Err(TreeError::MissingRoot);
        }

        let root = self.push(Node::new(
            NodeKind::Environment(classify::DOCUMENT.to_string()),
            None,
        ));
        let arguments = self.build_list(&raw.args, root)?;
        let content = self.build_list(&raw.contents, root)?;
        self.nodes[root.0].arguments = arguments;
        self.nodes[root.0].content = Some(content);

        Ok((self.nodes, root))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn build_node(&mut self, raw: &RawNode, parent: NodeId) -> Result<NodeId, TreeError> {
        if self.depth >= MAX_TREE_DEPTH {
            return Err(TreeError::TooDeep { offset: raw.position });
        }
        let kind = match &raw.kind {
            RawKind::Root => return Err(TreeError::NestedRoot { offset: raw.position }),
            RawKind::Text(_) => return Err(TreeError::TextWithChildren { offset: raw.position }),
            RawKind::Environment(name) if name.is_empty() => {
                return Err(TreeError::MissingName {
                    what: "environment",
                    offset: raw.position,
                })
            }
            RawKind::Command(name) if name.is_empty() => {
                return Err(TreeError::MissingName {
                    what: "command",
                    offset: raw.position,
                })
            }
            RawKind::Environment(name) => {
                NodeKind::Environment(classify::normalize_environment(name).to_string())
            }
            RawKind::Command(name) => NodeKind::Command(name.clone()),
            RawKind::BraceGroup => NodeKind::BraceGroup,
            RawKind::BracketGroup => NodeKind::BracketGroup,
        };

        let omit_content = matches!(&kind, NodeKind::Command(name) if classify::is_no_text_command(name));

        let mut node = Node::new(kind, raw.position);
        node.parent = Some(parent);
        let id = self.push(node);

        self.depth += 1;
        let arguments = self.build_list(&raw.args, id)?;
        let content = if omit_content {
            None
        } else {
            Some(self.build_list(&raw.contents, id)?)
        };
        self.depth -= 1;

        let node = &mut self.nodes[id.0];
        node.arguments = arguments;
        node.content = content;
        Ok(id)
    }

    /// Builds one owning list, merging text fragments and dropping comments.
    fn build_list(&mut self, raws: &[RawNode], parent: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut ids = Vec::with_capacity(raws.len());
        let mut pending: Option<(String, Option<usize>)> = None;

        for raw in raws {
            if let RawKind::Text(fragment) = &raw.kind {
                if !raw.args.is_empty() || !raw.contents.is_empty() {
                    return Err(TreeError::TextWithChildren { offset: raw.position });
                }
                if fragment.starts_with('%') {
                    continue;
                }
                match pending.as_mut() {
                    Some((text, _)) => text.push_str(fragment),
                    None => pending = Some((fragment.clone(), raw.position)),
                }
                continue;
            }

            if let Some((text, offset)) = pending.take() {
                ids.push(self.text_node(text, offset, parent));
            }
            ids.push(self.build_node(raw, parent)?);
        }

        if let Some((text, offset)) = pending.take() {
            ids.push(self.text_node(text, offset, parent));
        }

        for pair in ids.windows(2) {
            self.nodes[pair[0].0].next_sibling = Some(pair[1]);
            self.nodes[pair[1].0].prev_sibling = Some(pair[0]);
        }

        Ok(ids)
    }

    fn text_node(&mut self, text: String, offset: Option<usize>, parent: NodeId) -> NodeId {
        let mut node = Node::new(NodeKind::Text(text), offset);
        node.parent = Some(parent);
        self.push(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: &RawNode) -> Vec<Node> {
        TreeBuilder::new().build(raw).unwrap().0
    }

    fn root(contents: Vec<RawNode>) -> RawNode {
        RawNode::new(RawKind::Root, None).with_contents(contents)
    }

    #[test]
    fn test_overly_deep_tree_is_rejected() {
        let mut raw = RawNode::text("x", Some(0));
        for _ in 0..MAX_TREE_DEPTH + 10 {
            raw = RawNode::new(RawKind::BraceGroup, Some(0)).with_contents(vec![raw]);
        }
        let err = TreeBuilder::new().build(&root(vec![raw])).unwrap_err();
        assert_eq!(err, TreeError::TooDeep { offset: Some(0) });
    }

    #[test]
    fn test_adjacent_fragments_merge() {
        let raw = root(vec![
            RawNode::text("a", Some(0)),
            RawNode::text(" ", Some(1)),
            RawNode::text("b", Some(2)),
        ]);
        let nodes = build(&raw);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].kind, NodeKind::Text("a b".into()));
        assert_eq!(nodes[1].source_offset, Some(0));
    }

    #[test]
    fn test_comments_are_dropped() {
        let raw = root(vec![
            RawNode::text("% lead", Some(0)),
            RawNode::text("\n", Some(6)),
            RawNode::text("x", Some(7)),
            RawNode::text("% tail", Some(8)),
        ]);
        let nodes = build(&raw);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].kind, NodeKind::Text("\nx".into()));
        assert_eq!(nodes[1].source_offset, Some(6));
    }

    #[test]
    fn test_merged_offset_comes_from_first_fragment_only() {
        let raw = root(vec![RawNode::text("a", None), RawNode::text("b", Some(1))]);
        let nodes = build(&raw);
        assert_eq!(nodes[1].source_offset, None);
    }

    #[test]
    fn test_comment_only_list_is_empty() {
        let nodes = build(&root(vec![RawNode::text("%x", Some(0))]));
        assert_eq!(nodes[0].content.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_reference_commands_have_no_content() {
        let label = RawNode::new(RawKind::Command("label".into()), Some(0))
            .with_args(vec![RawNode::new(RawKind::BraceGroup, Some(6))
                .with_contents(vec![RawNode::text("eq", Some(7))])])
            .with_contents(vec![RawNode::text("eq", Some(7))]);
        let nodes = build(&root(vec![label]));
        assert!(nodes[1].content.is_none());
        assert_eq!(nodes[1].arguments.len(), 1);
    }

    #[test]
    fn test_sibling_chains_are_per_list() {
        let cmd = RawNode::new(RawKind::Environment("itemize".into()), Some(0))
            .with_args(vec![RawNode::new(RawKind::BracketGroup, Some(1))])
            .with_contents(vec![
                RawNode::new(RawKind::Command("item".into()), Some(3)),
                RawNode::text("x", Some(8)),
            ]);
        let nodes = build(&root(vec![cmd]));
        let env = &nodes[1];
        let arg = env.arguments[0];
        let content = env.content.clone().unwrap();
        assert_eq!(nodes[arg.0].next_sibling, None);
        assert_eq!(nodes[content[0].0].prev_sibling, None);
        assert_eq!(nodes[content[0].0].next_sibling, Some(content[1]));
        assert_eq!(nodes[content[1].0].parent, Some(NodeId(1)));
    }

    #[test]
    fn test_inline_math_is_normalized() {
        let raw = root(vec![RawNode::new(RawKind::Environment("$".into()), Some(0))]);
        let nodes = build(&raw);
        assert_eq!(nodes[1].kind, NodeKind::Environment("math".into()));
    }

    #[test]
    fn test_malformed_shapes() {
        let nested = root(vec![RawNode::new(RawKind::Root, None)]);
        assert!(matches!(
            TreeBuilder::new().build(&nested),
            Err(TreeError::NestedRoot { .. })
        ));

        let unnamed = root(vec![RawNode::new(RawKind::Command(String::new()), Some(4))]);
        assert_eq!(
            TreeBuilder::new().build(&unnamed).unwrap_err(),
            TreeError::MissingName {
                what: "command",
                offset: Some(4)
            }
        );

        let text = root(vec![RawNode::text("a", Some(0)).with_args(vec![RawNode::text("b", None)])]);
        assert!(TreeBuilder::new().build(&text).is_err());

        assert_eq!(
            TreeBuilder::new().build(&RawNode::text("a", None)).unwrap_err(),
            TreeError::MissingRoot
        );
    }
}
