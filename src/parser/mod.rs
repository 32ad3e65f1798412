//! Raw LaTeX parsing.
//!
//! The rest of the crate only depends on the [`RawParser`] contract: a raw tree
//! of environments, commands, groups and text fragments carrying byte offsets.
//! [`TexParser`] is the bundled implementation, a recursive-descent parser
//! over [`lexer::Lexer`] tokens.

pub mod lexer;

use std::collections::HashSet;

use phf::phf_set;
use thiserror::Error;

use lexer::{Lexer, Token};

/// Node shapes produced by a raw parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKind {
    Root,
    Environment(String),
    Command(String),
    BraceGroup,
    BracketGroup,
    /// A literal fragment. Fragments starting with `%` are comments.
    Text(String),
}

/// One node of the raw parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub kind: RawKind,
    pub args: Vec<RawNode>,
    pub contents: Vec<RawNode>,
    /// Byte offset of the node's first character.
    pub position: Option<usize>,
}

impl RawNode {
    pub fn new(kind: RawKind, position: Option<usize>) -> Self {
        Self {
            kind,
            args: Vec::new(),
            contents: Vec::new(),
            position,
        }
    }

    pub fn text(fragment: impl Into<String>, position: Option<usize>) -> Self {
        Self::new(RawKind::Text(fragment.into()), position)
    }

    pub fn with_args(mut self, args: Vec<RawNode>) -> Self {
        self.args = args;
        self
    }

    pub fn with_contents(mut self, contents: Vec<RawNode>) -> Self {
        self.contents = contents;
        self
    }
}

/// Something that turns source text into a raw tree.
///
/// Failures must render the location as `[Line: <n>, Offset: <byte>]` in the
/// error message so callers can recover the offset.
pub trait RawParser: Send + Sync {
    fn parse(&self, source: &str) -> anyhow::Result<RawNode>;
}

/// A fatal syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} [Line: {line}, Offset: {offset}]")]
pub struct ParseError {
    pub message: String,
    /// 1-based line number.
    pub line: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Commands that never take brace or bracket arguments.
static NO_ARGUMENT_COMMANDS: phf::Set<&'static str> = phf_set! {
    "left", "right", "middle",
    "big", "Big", "bigg", "Bigg",
    "bigl", "Bigl", "biggl", "Biggl",
    "bigr", "Bigr", "biggr", "Biggr",
    "bigm", "Bigm", "biggm", "Biggm",
};

/// Deepest group/environment/formula nesting accepted before giving up.
pub const MAX_NESTING: usize = 256;

/// The bundled LaTeX parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TexParser;

impl TexParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse into a raw tree, keeping the typed error.
    pub fn parse_source(&self, source: &str) -> Result<RawNode, ParseError> {
        let tokens: Vec<_> = Lexer::new(source).collect();
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
            depth: 0,
            failed_brackets: HashSet::new(),
        };
        let contents = parser.parse_content(&Until::Eof, 0)?;
        Ok(RawNode::new(RawKind::Root, None).with_contents(contents))
    }
}

impl RawParser for TexParser {
    fn parse(&self, source: &str) -> anyhow::Result<RawNode> {
        Ok(self.parse_source(source)?)
    }
}

/// What terminates the sequence currently being parsed.
#[derive(Debug, PartialEq, Eq)]
enum Until {
    Eof,
    RBrace,
    RBracket,
    Dollar,
    DoubleDollar,
    CloseParen,
    CloseBracket,
    End(String),
}

impl Until {
    fn describe(&self) -> String {
        match self {
            Until::Eof => "end of input".to_string(),
            Until::RBrace => "`}`".to_string(),
            Until::RBracket => "`]`".to_string(),
            Until::Dollar => "`$`".to_string(),
            Until::DoubleDollar => "`$$`".to_string(),
            Until::CloseParen => "`\\)`".to_string(),
            Until::CloseBracket => "`\\]`".to_string(),
            Until::End(name) => format!("`\\end{{{}}}`", name),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token<'a>, usize)>,
    pos: usize,
    depth: usize,
    /// Token positions of `[` already rejected as an optional argument.
    failed_brackets: HashSet<usize>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<(Token<'a>, usize)> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn error(&self, message: String, offset: usize) -> ParseError {
        let line = self.source[..offset.min(self.source.len())]
            .matches('\n')
            .count()
            + 1;
        ParseError {
            message,
            line,
            offset,
        }
    }

    /// Parse nodes until `until` is consumed. `opened_at` locates the opening
    /// delimiter for "unclosed" and nesting diagnostics.
    fn parse_content(&mut self, until: &Until, opened_at: usize) -> Result<Vec<RawNode>, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(
                format!("nesting deeper than {} levels", MAX_NESTING),
                opened_at,
            ));
        }
        self.depth += 1;
        let nodes = self.parse_sequence(until, opened_at);
        self.depth -= 1;
        nodes
    }

    fn parse_sequence(&mut self, until: &Until, opened_at: usize) -> Result<Vec<RawNode>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            let (token, offset) = match self.peek() {
                Some(t) => t,
                None if *until == Until::Eof => return Ok(nodes),
                None => {
                    return Err(self.error(
                        format!("unclosed group, expected {}", until.describe()),
                        opened_at,
                    ))
                }
            };

            match token {
                Token::RBrace => {
                    if *until == Until::RBrace {
                        self.bump();
                        return Ok(nodes);
                    }
                    return Err(self.error("unexpected `}`".to_string(), offset));
                }
                Token::RBracket => {
                    self.bump();
                    if *until == Until::RBracket {
                        return Ok(nodes);
                    }
                    nodes.push(RawNode::text("]", Some(offset)));
                }
                Token::LBracket => {
                    self.bump();
                    nodes.push(RawNode::text("[", Some(offset)));
                }
                Token::LBrace => {
                    self.bump();
                    let contents = self.parse_content(&Until::RBrace, offset)?;
                    nodes.push(RawNode::new(RawKind::BraceGroup, Some(offset)).with_contents(contents));
                }
                Token::Dollar => {
                    self.bump();
                    if *until == Until::Dollar {
                        return Ok(nodes);
                    }
                    if *until == Until::DoubleDollar {
                        return Err(self.error("single `$` inside `$$` block".to_string(), offset));
                    }
                    nodes.push(self.parse_math("$", Until::Dollar, offset)?);
                }
                Token::DoubleDollar => {
                    if *until == Until::Dollar {
                        // `$a$$b$` closes one formula and opens the next.
                        self.tokens[self.pos] = (Token::Dollar, offset + 1);
                        return Ok(nodes);
                    }
                    self.bump();
                    if *until == Until::DoubleDollar {
                        return Ok(nodes);
                    }
                    nodes.push(self.parse_math("$$", Until::DoubleDollar, offset)?);
                }
                Token::ControlSymbol(sym) => {
                    self.bump();
                    match sym {
                        "\\(" => nodes.push(self.parse_math("math", Until::CloseParen, offset)?),
                        "\\[" => nodes.push(self.parse_math("displaymath", Until::CloseBracket, offset)?),
                        "\\)" | "\\]" => {
                            let expected = if sym == "\\)" { Until::CloseParen } else { Until::CloseBracket };
                            if *until == expected {
                                return Ok(nodes);
                            }
                            return Err(self.error(format!("unexpected `{}`", sym), offset));
                        }
                        _ => nodes.push(RawNode::text(sym, Some(offset))),
                    }
                }
                Token::ControlWord("begin") => {
                    self.bump();
                    nodes.push(self.parse_environment(offset)?);
                }
                Token::ControlWord("end") => {
                    self.bump();
                    let name = self.parse_name(offset)?;
                    return match until {
                        Until::End(open) if *open == name => Ok(nodes),
                        Until::End(open) => Err(self.error(
                            format!("`\\end{{{}}}` does not match `\\begin{{{}}}`", name, open),
                            offset,
                        )),
                        _ => Err(self.error(format!("`\\end{{{}}}` without `\\begin`", name), offset)),
                    };
                }
                Token::ControlWord(name) => {
                    self.bump();
                    let args = if NO_ARGUMENT_COMMANDS.contains(name) {
                        Vec::new()
                    } else {
                        self.parse_args()?
                    };
                    nodes.push(RawNode::new(RawKind::Command(name.to_string()), Some(offset)).with_args(args));
                }
                Token::Verb(_) => {
                    self.bump();
                    nodes.push(RawNode::new(RawKind::Command("verb".to_string()), Some(offset)));
                }
                Token::VerbatimEnv { name, closed } => {
                    if !closed {
                        return Err(self.error(format!("unclosed `\\begin{{{}}}`", name), offset));
                    }
                    self.bump();
                    nodes.push(RawNode::new(RawKind::Environment(name.to_string()), Some(offset)));
                }
                Token::Comment(text) | Token::Whitespace(text) | Token::Text(text) => {
                    self.bump();
                    nodes.push(RawNode::text(text, Some(offset)));
                }
            }
        }
    }

    fn parse_math(&mut self, name: &str, until: Until, offset: usize) -> Result<RawNode, ParseError> {
        let contents = self.parse_content(&until, offset)?;
        Ok(RawNode::new(RawKind::Environment(name.to_string()), Some(offset)).with_contents(contents))
    }

    /// `\begin` has been consumed.
    fn parse_environment(&mut self, offset: usize) -> Result<RawNode, ParseError> {
        let name = self.parse_name(offset)?;
        let args = self.parse_args()?;
        let contents = self.parse_content(&Until::End(name.clone()), offset)?;
        Ok(RawNode::new(RawKind::Environment(name), Some(offset))
            .with_args(args)
            .with_contents(contents))
    }

    /// Reads the `{name}` group after `\begin` or `\end`.
    fn parse_name(&mut self, offset: usize) -> Result<String, ParseError> {
        while let Some((Token::Whitespace(_), _)) = self.peek() {
            self.bump();
        }
        if !matches!(self.peek(), Some((Token::LBrace, _))) {
            return Err(self.error("missing environment name".to_string(), offset));
        }
        self.bump();

        let mut name = String::new();
        loop {
            match self.peek() {
                Some((Token::Text(part), _)) => {
                    name.push_str(part);
                    self.bump();
                }
                Some((Token::RBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("malformed environment name".to_string(), offset)),
            }
        }

        if name.is_empty() {
            return Err(self.error("missing environment name".to_string(), offset));
        }
        Ok(name)
    }

    /// Whether the `[` just before token `from` is closed by a matching `]`
    /// at the same brace depth before any math delimiter, environment
    /// boundary, blank line or unmatched `}`.
    fn bracket_closes(&self, from: usize) -> bool {
        let mut braces = 0usize;
        let mut brackets = 0usize;
        for token in self.tokens[from..].iter().map(|(token, _)| *token) {
            match token {
                Token::LBrace => braces += 1,
                Token::RBrace if braces == 0 => return false,
                Token::RBrace => braces -= 1,
                Token::LBracket if braces == 0 => brackets += 1,
                Token::RBracket if braces == 0 && brackets == 0 => return true,
                Token::RBracket if braces == 0 => brackets -= 1,
                Token::Dollar | Token::DoubleDollar | Token::VerbatimEnv { .. } => return false,
                Token::ControlSymbol("\\(" | "\\)" | "\\[" | "\\]") => return false,
                Token::ControlWord("begin" | "end") => return false,
                Token::Whitespace(space) if space.matches('\n').count() >= 2 => return false,
                _ => {}
            }
        }
        false
    }

    /// Collects the groups directly adjacent to a command or `\begin{...}`.
    ///
    /// A `[` that is not closed within the surrounding paragraph text is not
    /// an argument and is left for the caller to read as text.
    fn parse_args(&mut self) -> Result<Vec<RawNode>, ParseError> {
        let mut args = Vec::new();

        while let Some((token, offset)) = self.peek() {
            match token {
                Token::LBrace => {
                    self.bump();
                    let contents = self.parse_content(&Until::RBrace, offset)?;
                    args.push(RawNode::new(RawKind::BraceGroup, Some(offset)).with_contents(contents));
                }
                Token::LBracket => {
                    let checkpoint = self.pos;
                    if self.failed_brackets.contains(&checkpoint) || !self.bracket_closes(checkpoint + 1) {
                        break;
                    }
                    self.bump();
                    match self.parse_content(&Until::RBracket, offset) {
                        Ok(contents) => args.push(
                            RawNode::new(RawKind::BracketGroup, Some(offset)).with_contents(contents),
                        ),
                        Err(_) => {
                            self.failed_brackets.insert(checkpoint);
                            self.pos = checkpoint;
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        Ok(args)
    }
}
