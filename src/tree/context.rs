//! Context annotation: math mode, non-text arguments and document order.
//!
//! One iterative pre-order walk. Each stack entry carries the state inherited
//! from its parent by value, so no context is shared between siblings.

use super::classify;
use super::node::{Context, Node, NodeId, NodeKind};

/// How deep into math a node sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum MathLevel {
    #[default]
    Text,
    Inline,
    Display,
}

/// State handed from a node to its children.
#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    level: MathLevel,
    non_text_argument: bool,
}

impl Inherited {
    /// The node's own level after entering it.
    fn enter(self, kind: &NodeKind) -> MathLevel {
        match kind {
            NodeKind::Environment(name) if classify::is_display_math(name) => MathLevel::Display,
            NodeKind::Environment(name) if classify::is_math(name) => self.level.max(MathLevel::Inline),
            _ => self.level,
        }
    }
}

/// Fills context flags and the `prev_node`/`next_node` chain; returns the
/// document order.
pub(crate) fn annotate(nodes: &mut [Node], root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![(root, Inherited::default())];

    while let Some((id, inherited)) = stack.pop() {
        let node = &mut nodes[id.0];
        let level = inherited.enter(&node.kind);

        node.context = Context {
            in_math: level >= MathLevel::Inline,
            in_display_math: level == MathLevel::Display,
            in_non_text_argument: inherited.non_text_argument,
        };
        order.push(id);

        let (text_mode, no_text) = match &node.kind {
            NodeKind::Command(name) => (
                classify::is_text_mode_command(name),
                classify::is_no_text_command(name),
            ),
            _ => (false, false),
        };

        let child_level = if text_mode { MathLevel::Text } else { level };
        let for_content = Inherited {
            level: child_level,
            non_text_argument: inherited.non_text_argument,
        };
        let for_arguments = Inherited {
            level: child_level,
            non_text_argument: inherited.non_text_argument || no_text,
        };

        // Reversed pushes so arguments pop before content, each in source order.
        if let Some(content) = &node.content {
            for child in content.iter().rev() {
                stack.push((*child, for_content));
            }
        }
        for child in node.arguments.iter().rev() {
            stack.push((*child, for_arguments));
        }
    }

    for pair in order.windows(2) {
        nodes[pair[0].0].next_node = Some(pair[1]);
        nodes[pair[1].0].prev_node = Some(pair[0]);
    }

    order
}

#[cfg(test)]
mod tests {
    use crate::parser::TexParser;
    use crate::tree::{Document, NodeKind};

    fn doc(source: &str) -> Document {
        let raw = TexParser::new().parse_source(source).unwrap();
        Document::from_raw(&raw, source).unwrap()
    }

    fn text_node<'a>(doc: &'a Document, needle: &str) -> crate::tree::NodeRef<'a> {
        doc.iter()
            .find(|n| n.text().map_or(false, |t| t.contains(needle)))
            .unwrap()
    }

    #[test]
    fn test_inline_and_display_levels() {
        let d = doc("a $b$ \\[c\\]");
        let a = text_node(&d, "a");
        let b = text_node(&d, "b");
        let c = text_node(&d, "c");
        assert!(!a.in_math());
        assert!(b.in_math() && !b.in_display_math());
        assert!(c.in_math() && c.in_display_math());
    }

    #[test]
    fn test_math_environment_itself_is_in_math() {
        let d = doc("$x$");
        let env = d.iter().find(|n| n.is_environment("math")).unwrap();
        assert!(env.in_math());
        assert!(!d.root().in_math());
    }

    #[test]
    fn test_text_mode_command_resets_children() {
        let d = doc(r"\[ x \text{if y} \]");
        let text_cmd = d.iter().find(|n| n.is_command("text")).unwrap();
        assert!(text_cmd.in_math());
        let inner = text_node(&d, "if");
        assert!(!inner.in_math());
        assert!(!inner.in_display_math());
    }

    #[test]
    fn test_math_inside_text_mode_reenters_math() {
        let d = doc(r"$\mbox{a $b$}$");
        assert!(!text_node(&d, "a").in_math());
        assert!(text_node(&d, "b").in_math());
    }

    #[test]
    fn test_inline_inside_display_stays_display() {
        let d = doc(r"\begin{equation}\begin{math}x\end{math}\end{equation}");
        assert!(text_node(&d, "x").in_display_math());
    }

    #[test]
    fn test_non_text_argument_propagates() {
        let d = doc(r"see \ref{eq:main} and \textbf{bold}");
        assert!(text_node(&d, "eq:main").in_non_text_argument());
        assert!(!text_node(&d, "bold").in_non_text_argument());
        assert!(!text_node(&d, "see").in_non_text_argument());
    }

    #[test]
    fn test_display_implies_math_everywhere() {
        let d = doc(r"a $$ b \mbox{c $d$} $$ \begin{align} e \text{f} \end{align}");
        for node in d.iter() {
            if node.in_display_math() {
                assert!(node.in_math());
            }
        }
    }

    #[test]
    fn test_order_is_preorder_arguments_first() {
        let d = doc(r"\frac{a}{b}c");
        let tokens: Vec<String> = d
            .iter()
            .map(|n| match n.kind() {
                NodeKind::Text(t) => t.clone(),
                NodeKind::Command(c) | NodeKind::Environment(c) => c.clone(),
                NodeKind::BraceGroup => "{}".to_string(),
                NodeKind::BracketGroup => "[]".to_string(),
            })
            .collect();
        assert_eq!(tokens, vec!["document", "frac", "{}", "a", "{}", "b", "c"]);
    }

    #[test]
    fn test_order_chain_is_total() {
        let d = doc("x \\begin{itemize}\\item[a] b $c^{2}$\\end{itemize} % comment\n y");
        let mut seen = vec![false; d.len()];
        let mut cursor = Some(d.root());
        let mut visited = 0;
        while let Some(node) = cursor {
            assert!(!seen[node.id().index()], "node visited twice");
            seen[node.id().index()] = true;
            visited += 1;
            cursor = node.next_node();
        }
        assert_eq!(visited, d.len());
        assert!(d.root().prev_node().is_none());
    }
}
