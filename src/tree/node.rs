//! Arena-backed node model.

use std::fmt;

/// Index of a node inside its [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is, with its identifying payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Environment(String),
    Command(String),
    BraceGroup,
    BracketGroup,
}

/// Payload-free tag of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Text,
    Environment,
    Command,
    BraceGroup,
    BracketGroup,
}

impl NodeKind {
    pub fn category(&self) -> Category {
        match self {
            NodeKind::Text(_) => Category::Text,
            NodeKind::Environment(_) => Category::Environment,
            NodeKind::Command(_) => Category::Command,
            NodeKind::BraceGroup => Category::BraceGroup,
            NodeKind::BracketGroup => Category::BracketGroup,
        }
    }

    /// Environment or command name.
    pub fn token(&self) -> Option<&str> {
        match self {
            NodeKind::Environment(name) | NodeKind::Command(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Text => "text",
            Category::Environment => "environment",
            Category::Command => "command",
            Category::BraceGroup => "brace-group",
            Category::BracketGroup => "bracket-group",
        };
        write!(f, "{}", s)
    }
}

/// Context flags computed once by the annotator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub in_math: bool,
    pub in_display_math: bool,
    pub in_non_text_argument: bool,
}

/// A node and all of its links.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) arguments: Vec<NodeId>,
    /// `None` for text nodes and for commands whose arguments are not prose.
    pub(crate) content: Option<Vec<NodeId>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) prev_node: Option<NodeId>,
    pub(crate) next_node: Option<NodeId>,
    pub(crate) context: Context,
    pub(crate) source_offset: Option<usize>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, source_offset: Option<usize>) -> Self {
        Self {
            kind,
            arguments: Vec::new(),
            content: None,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            prev_node: None,
            next_node: None,
            context: Context::default(),
            source_offset,
        }
    }
}
