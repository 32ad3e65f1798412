//! Character-level tokenizer for LaTeX source.
//!
//! Produces `(Token, offset)` pairs where `offset` is the byte position of the
//! token's first character. Whitespace and comments are kept as tokens so the
//! tree builder sees every fragment of the source.

use lazy_static::lazy_static;
use regex::Regex;

/// Environments whose bodies are never tokenized.
pub const VERBATIM_ENVIRONMENTS: &[&str] = &["verbatim", "verbatim*", "lstlisting", "minted", "comment"];

lazy_static! {
    static ref VERBATIM_BEGIN: Regex = {
        let names: Vec<String> = VERBATIM_ENVIRONMENTS.iter().map(|n| regex::escape(n)).collect();
        Regex::new(&format!(r"^\s*\{{({})\}}", names.join("|"))).unwrap()
    };
}

/// A lexical token. Slices borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `\` followed by ASCII letters (and an optional `*`), without the backslash.
    ControlWord(&'a str),
    /// `\` followed by one non-letter character, backslash included.
    ControlSymbol(&'a str),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dollar,
    DoubleDollar,
    /// `%` through end of line, marker included.
    Comment(&'a str),
    Whitespace(&'a str),
    Text(&'a str),
    /// `\verb<d>...<d>`, kept whole.
    Verb(&'a str),
    /// A verbatim-like environment swallowed from `\begin` to its `\end`.
    VerbatimEnv {
        name: &'a str,
        closed: bool,
    },
}

/// Tokenizer over a source string.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    /// Returns the next token with its start offset, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<(Token<'a>, usize)> {
        let start = self.position;
        let c = self.peek_char()?;
        self.position += c.len_utf8();

        let token = match c {
            '\\' => self.lex_control(start),
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '$' => {
                if self.peek_char() == Some('$') {
                    self.position += 1;
                    Token::DoubleDollar
                } else {
                    Token::Dollar
                }
            }
            '%' => {
                self.eat_while(|n| n != '\n' && n != '\r');
                Token::Comment(&self.input[start..self.position])
            }
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                Token::Whitespace(&self.input[start..self.position])
            }
            _ => {
                self.eat_while(|n| {
                    !matches!(n, '\\' | '{' | '}' | '[' | ']' | '%' | '$') && !n.is_whitespace()
                });
                Token::Text(&self.input[start..self.position])
            }
        };

        Some((token, start))
    }

    fn lex_control(&mut self, start: usize) -> Token<'a> {
        let next = match self.peek_char() {
            Some(n) => n,
            None => return Token::Text("\\"),
        };

        if !next.is_ascii_alphabetic() {
            self.position += next.len_utf8();
            return Token::ControlSymbol(&self.input[start..self.position]);
        }

        self.eat_while(|n| n.is_ascii_alphabetic());
        if self.peek_char() == Some('*') {
            self.position += 1;
        }
        let name = &self.input[start + 1..self.position];

        match name {
            "verb" | "verb*" => self.lex_verb(start),
            "begin" => match VERBATIM_BEGIN.captures(&self.input[self.position..]) {
                Some(caps) => {
                    let env = caps.get(1).map_or("", |m| m.as_str());
                    let header = caps.get(0).map_or(0, |m| m.end());
                    self.position += header;
                    self.lex_verbatim_body(env)
                }
                None => Token::ControlWord(name),
            },
            _ => Token::ControlWord(name),
        }
    }

    fn lex_verb(&mut self, start: usize) -> Token<'a> {
        if let Some(delim) = self.peek_char() {
            self.position += delim.len_utf8();
            self.eat_while(|n| n != delim && n != '\n');
            if self.peek_char() == Some(delim) {
                self.position += delim.len_utf8();
            }
        }
        Token::Verb(&self.input[start..self.position])
    }

    fn lex_verbatim_body(&mut self, env: &'a str) -> Token<'a> {
        let terminator = format!("\\end{{{}}}", env);
        match self.input[self.position..].find(&terminator) {
            Some(idx) => {
                self.position += idx + terminator.len();
                Token::VerbatimEnv { name: env, closed: true }
            }
            None => {
                self.position = self.input.len();
                Token::VerbatimEnv { name: env, closed: false }
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Token<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize(r"\section{Hello} % comment");
        assert_eq!(
            tokens,
            vec![
                Token::ControlWord("section"),
                Token::LBrace,
                Token::Text("Hello"),
                Token::RBrace,
                Token::Whitespace(" "),
                Token::Comment("% comment"),
            ]
        );
    }

    #[test]
    fn test_control_symbols() {
        let tokens = tokenize(r"50\% \\ \(x\)");
        assert_eq!(
            tokens,
            vec![
                Token::Text("50"),
                Token::ControlSymbol("\\%"),
                Token::Whitespace(" "),
                Token::ControlSymbol("\\\\"),
                Token::Whitespace(" "),
                Token::ControlSymbol("\\("),
                Token::Text("x"),
                Token::ControlSymbol("\\)"),
            ]
        );
    }

    #[test]
    fn test_command_name_stops_at_non_ascii() {
        let tokens = tokenize("\\alphaбета");
        assert_eq!(tokens, vec![Token::ControlWord("alpha"), Token::Text("бета")]);
    }

    #[test]
    fn test_starred_command() {
        let tokens = tokenize(r"\section*{A}");
        assert_eq!(tokens[0], Token::ControlWord("section*"));
    }

    #[test]
    fn test_dollars() {
        let tokens = tokenize("a$b$$c$$");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a"),
                Token::Dollar,
                Token::Text("b"),
                Token::DoubleDollar,
                Token::Text("c"),
                Token::DoubleDollar,
            ]
        );
    }

    #[test]
    fn test_offsets_are_bytes() {
        let offsets: Vec<usize> = Lexer::new("ё $x$").map(|(_, o)| o).collect();
        assert_eq!(offsets, vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn test_verb_is_opaque() {
        let tokens = tokenize(r"see \verb|$x{| here");
        assert_eq!(tokens[2], Token::Verb(r"\verb|$x{|"));
        assert_eq!(tokens[3], Token::Whitespace(" "));
    }

    #[test]
    fn test_verbatim_environment() {
        let tokens = tokenize("\\begin{verbatim}$ { %\\end{verbatim}!");
        assert_eq!(
            tokens,
            vec![
                Token::VerbatimEnv { name: "verbatim", closed: true },
                Token::Text("!"),
            ]
        );
    }

    #[test]
    fn test_unterminated_verbatim() {
        let tokens = tokenize("\\begin{comment} never closed");
        assert_eq!(tokens, vec![Token::VerbatimEnv { name: "comment", closed: false }]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }
}
