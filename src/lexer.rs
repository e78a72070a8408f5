//! Tokenizer
//!
//! Turns source text into a flat list of [`Token`]s. Matching walks an ordered
//! rule table at the current position and takes the first rule that accepts;
//! operators that share a prefix (`+`/`++`, `-`/`--`, `=`/`==`/`=:`) are kept
//! apart by lookaround on the neighbouring source characters rather than by
//! longest match.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    While,
    If,
    Print,
    Assign,
    Def,
    End,
    Separator,
    Equals,
    NotEquals,
    Greater,
    Lesser,
    Add,
    Multiply,
    Subtract,
    Divide,
    OpenParen,
    CloseParen,
    Identifier,
    Integer,
}

impl TokenKind {
    /// Human readable name used in parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::While => "`while`",
            TokenKind::If => "`if`",
            TokenKind::Print => "`print`",
            TokenKind::Assign => "`=`",
            TokenKind::Def => "`?`",
            TokenKind::End => "`;`",
            TokenKind::Separator => "`,`",
            TokenKind::Equals => "`==`",
            TokenKind::NotEquals => "`!=`",
            TokenKind::Greater => "`:=`",
            TokenKind::Lesser => "`=:`",
            TokenKind::Add => "`+`",
            TokenKind::Multiply => "`++`",
            TokenKind::Subtract => "`-`",
            TokenKind::Divide => "`--`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the first character of `text`.
    pub position: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unexpected character {character:?} at position {position}")]
pub struct LexError {
    pub character: char,
    pub position: usize,
}

/// How a rule recognises its lexeme at a given offset.
enum Pattern {
    /// A reserved word that may not touch other word characters.
    Keyword(&'static str),
    /// Punctuation, rejected when the previous or next source character is
    /// in `fenced_by`.
    Symbol {
        text: &'static str,
        fenced_by: &'static [char],
    },
    Identifier,
    Integer,
}

struct Rule {
    kind: TokenKind,
    pattern: Pattern,
}

const fn symbol(kind: TokenKind, text: &'static str) -> Rule {
    Rule {
        kind,
        pattern: Pattern::Symbol { text, fenced_by: &[] },
    }
}

const fn fenced(kind: TokenKind, text: &'static str, fenced_by: &'static [char]) -> Rule {
    Rule {
        kind,
        pattern: Pattern::Symbol { text, fenced_by },
    }
}

const fn keyword(kind: TokenKind, word: &'static str) -> Rule {
    Rule {
        kind,
        pattern: Pattern::Keyword(word),
    }
}

// Order matters: the first rule that accepts wins.
const RULES: &[Rule] = &[
    keyword(TokenKind::While, "while"),
    keyword(TokenKind::If, "if"),
    keyword(TokenKind::Print, "print"),
    fenced(TokenKind::Assign, "=", &['=', ':']),
    symbol(TokenKind::Def, "?"),
    symbol(TokenKind::End, ";"),
    symbol(TokenKind::Separator, ","),
    symbol(TokenKind::Equals, "=="),
    symbol(TokenKind::NotEquals, "!="),
    symbol(TokenKind::Greater, ":="),
    symbol(TokenKind::Lesser, "=:"),
    fenced(TokenKind::Add, "+", &['+']),
    symbol(TokenKind::Multiply, "++"),
    fenced(TokenKind::Subtract, "-", &['-']),
    symbol(TokenKind::Divide, "--"),
    symbol(TokenKind::OpenParen, "("),
    symbol(TokenKind::CloseParen, ")"),
    Rule {
        kind: TokenKind::Identifier,
        pattern: Pattern::Identifier,
    },
    Rule {
        kind: TokenKind::Integer,
        pattern: Pattern::Integer,
    },
];

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Pattern {
    /// Length in characters of the lexeme starting at `pos`, if any.
    fn match_at(&self, chars: &[char], pos: usize) -> Option<usize> {
        let before = pos.checked_sub(1).and_then(|i| chars.get(i)).copied();
        match self {
            Pattern::Keyword(word) => {
                let len = prefix_len(chars, pos, word)?;
                let after = chars.get(pos + len).copied();
                let touches = |c: Option<char>| c.is_some_and(is_word);
                (!touches(before) && !touches(after)).then_some(len)
            }
            Pattern::Symbol { text, fenced_by } => {
                let len = prefix_len(chars, pos, text)?;
                let after = chars.get(pos + len).copied();
                let fenced = |c: Option<char>| c.is_some_and(|c| fenced_by.contains(&c));
                (!fenced(before) && !fenced(after)).then_some(len)
            }
            Pattern::Identifier => {
                if !chars.get(pos)?.is_ascii_alphabetic() {
                    return None;
                }
                Some(1 + chars[pos + 1..].iter().take_while(|c| is_word(**c)).count())
            }
            Pattern::Integer => {
                let len = chars[pos..].iter().take_while(|c| c.is_ascii_digit()).count();
                (len > 0).then_some(len)
            }
        }
    }
}

fn prefix_len(chars: &[char], pos: usize, text: &str) -> Option<usize> {
    let mut len = 0;
    for expected in text.chars() {
        if chars.get(pos + len) != Some(&expected) {
            return None;
        }
        len += 1;
    }
    Some(len)
}

/// Tokenizes `source`, failing on the first character no rule covers.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len() / 2);
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }

        let (kind, len) = RULES
            .iter()
            .find_map(|rule| rule.pattern.match_at(&chars, pos).map(|len| (rule.kind, len)))
            .ok_or(LexError {
                character: chars[pos],
                position: pos,
            })?;

        tokens.push(Token {
            kind,
            text: chars[pos..pos + len].iter().collect(),
            position: pos,
        });
        pos += len;
    }

    Ok(tokens)
}
