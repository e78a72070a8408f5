//! Recursive-descent parser with precedence climbing for binary operators.
//!
//! ```text
//! program    := function { function }
//! function   := "?" IDENT "(" [ IDENT { "," IDENT } ] ")" statements ";"
//! statements := { statement ";" }
//! statement  := IDENT "=" value
//!             | "print" "(" value { "," value } ")"
//!             | ("while" | "if") "(" value ")" statements
//! value      := expression        (followed by "," ")" or ";")
//! primary    := INTEGER | IDENT | IDENT "(" [ value { "," value } ] ")"
//! ```

use crate::ast::{BinOp, Expr, FunctionDef, Precedence, Program, Stmt};
use crate::lexer::{Token, TokenKind};
use crate::limits::Limits;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected}, but got `{found}` which is a(n) {kind}, at position {position}")]
    Unexpected {
        expected: String,
        found: String,
        kind: TokenKind,
        position: usize,
    },
    #[error("Expected {expected}, but reached the end of the input")]
    UnexpectedEnd { expected: String },
    #[error("Parameter `{name}` of function `{function}` is declared more than once")]
    DuplicateParameter {
        name: String,
        function: String,
        position: usize,
    },
    #[error("Function `{name}` is defined more than once")]
    DuplicateFunction { name: String, position: usize },
    #[error("Nesting exceeds the limit of {limit} levels at position {position}")]
    NestingTooDeep { limit: usize, position: usize },
}

impl ParseError {
    /// Character offset the error points at; `None` at end of input.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Unexpected { position, .. }
            | ParseError::DuplicateParameter { position, .. }
            | ParseError::DuplicateFunction { position, .. }
            | ParseError::NestingTooDeep { position, .. } => Some(*position),
            ParseError::UnexpectedEnd { .. } => None,
        }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parses a token stream into a program using the default [`Limits`].
pub fn parse(tokens: Vec<Token>) -> PResult<Program> {
    parse_with_limits(tokens, &Limits::default())
}

pub fn parse_with_limits(tokens: Vec<Token>, limits: &Limits) -> PResult<Program> {
    Parser::new(tokens, limits.max_nesting).program()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, max_nesting: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_nesting,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Builds the error for the current token not being `expected`.
    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::Unexpected {
                expected: expected.to_string(),
                found: token.text.clone(),
                kind: token.kind,
                position: token.position,
            },
            None => ParseError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    fn eat(&mut self, kind: TokenKind) -> PResult<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(kind.describe())),
        }
    }

    fn enter(&mut self, position: usize) -> PResult<()> {
        if self.depth >= self.max_nesting {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_nesting,
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn program(&mut self) -> PResult<Program> {
        let mut functions: Vec<FunctionDef> = Vec::new();
        let mut names = HashSet::new();

        // At least one definition is required, so the first `?` is not optional.
        loop {
            let function = self.function()?;
            if !names.insert(function.name.clone()) {
                return Err(ParseError::DuplicateFunction {
                    name: function.name,
                    position: function.position,
                });
            }
            functions.push(function);
            if self.peek().is_none() {
                break;
            }
        }
        Ok(functions)
    }

    fn function(&mut self) -> PResult<FunctionDef> {
        self.eat(TokenKind::Def)?;
        let name = self.eat(TokenKind::Identifier)?;
        self.eat(TokenKind::OpenParen)?;
        let params = self.params(&name.text)?;
        self.eat(TokenKind::CloseParen)?;
        let body = self.statements()?;
        self.eat(TokenKind::End)?;
        Ok(FunctionDef {
            name: name.text,
            params,
            body,
            position: name.position,
        })
    }

    fn params(&mut self, function: &str) -> PResult<Vec<String>> {
        let mut params: Vec<String> = Vec::new();
        if self.peek_kind() == Some(TokenKind::CloseParen) {
            return Ok(params);
        }
        loop {
            let param = self.eat(TokenKind::Identifier)?;
            if params.contains(&param.text) {
                return Err(ParseError::DuplicateParameter {
                    name: param.text,
                    function: function.to_string(),
                    position: param.position,
                });
            }
            params.push(param.text);
            if self.peek_kind() != Some(TokenKind::Separator) {
                break;
            }
            self.advance();
        }
        Ok(params)
    }

    /// Parses statements until a token that cannot start one, which is left
    /// for the caller.
    fn statements(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            let stmt = match self.peek_kind() {
                Some(TokenKind::Identifier) => self.assign()?,
                Some(TokenKind::Print) => self.print()?,
                Some(TokenKind::While | TokenKind::If) => self.conditional_loop()?,
                _ => break,
            };
            self.eat(TokenKind::End)?;
            stmts.push(stmt);
        }
        Ok(stmts)
    }

    fn assign(&mut self) -> PResult<Stmt> {
        let name = self.eat(TokenKind::Identifier)?;
        self.eat(TokenKind::Assign)?;
        let value = self.value()?;
        Ok(Stmt::Assign {
            name: name.text,
            value,
            position: name.position,
        })
    }

    fn print(&mut self) -> PResult<Stmt> {
        let keyword = self.eat(TokenKind::Print)?;
        self.eat(TokenKind::OpenParen)?;
        let mut values = vec![self.value()?];
        while self.peek_kind() == Some(TokenKind::Separator) {
            self.advance();
            values.push(self.value()?);
        }
        self.eat(TokenKind::CloseParen)?;
        Ok(Stmt::Print {
            values,
            position: keyword.position,
        })
    }

    fn conditional_loop(&mut self) -> PResult<Stmt> {
        let keyword = self
            .advance()
            .ok_or_else(|| self.unexpected("`while` or `if`"))?;
        self.enter(keyword.position)?;
        self.eat(TokenKind::OpenParen)?;
        let condition = self.value()?;
        self.eat(TokenKind::CloseParen)?;
        let body = self.statements()?;
        self.leave();
        Ok(Stmt::ConditionalLoop {
            condition,
            body,
            is_loop: keyword.kind == TokenKind::While,
            position: keyword.position,
        })
    }

    /// An expression that must be followed by `,`, `)` or `;`.
    fn value(&mut self) -> PResult<Expr> {
        let expr = self.expression(Precedence::Comparison)?;
        match self.peek_kind() {
            Some(TokenKind::Separator | TokenKind::CloseParen | TokenKind::End) => Ok(expr),
            _ => Err(self.unexpected("`;`, `,` or `)`")),
        }
    }

    /// Folds operators of at least `min` precedence left to right, recursing
    /// one tier up for each right operand so tighter operators bind first.
    ///
    /// Every fold deepens the tree by one level, so folds count towards the
    /// nesting limit until the whole chain is built.
    fn expression(&mut self, min: Precedence) -> PResult<Expr> {
        let mut left = self.primary()?;
        let mut folds = 0;

        while let Some((op, position)) = self
            .peek()
            .and_then(|t| binary_operator(t.kind).map(|op| (op, t.position)))
        {
            if op.precedence() < min {
                break;
            }
            self.enter(position)?;
            folds += 1;
            self.advance();
            let right = match tighter(op.precedence()) {
                Some(tier) => self.expression(tier)?,
                None => self.primary()?,
            };
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        self.depth -= folds;
        Ok(left)
    }

    fn primary(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Integer) => {
                let token = self.eat(TokenKind::Integer)?;
                Ok(Expr::IntegerLiteral {
                    digits: token.text,
                    position: token.position,
                })
            }
            Some(TokenKind::Identifier) => {
                let name = self.eat(TokenKind::Identifier)?;
                if self.peek_kind() == Some(TokenKind::OpenParen) {
                    let arguments = self.arguments(name.position)?;
                    Ok(Expr::FunctionCall {
                        name: name.text,
                        arguments,
                        position: name.position,
                    })
                } else {
                    Ok(Expr::Variable {
                        name: name.text,
                        position: name.position,
                    })
                }
            }
            _ => Err(self.unexpected("integer, variable or function call")),
        }
    }

    fn arguments(&mut self, position: usize) -> PResult<Vec<Expr>> {
        self.enter(position)?;
        self.eat(TokenKind::OpenParen)?;
        let mut args = vec![];
        if self.peek_kind() != Some(TokenKind::CloseParen) {
            args.push(self.value()?);
            while self.peek_kind() == Some(TokenKind::Separator) {
                self.advance();
                args.push(self.value()?);
            }
        }
        self.eat(TokenKind::CloseParen)?;
        self.leave();
        Ok(args)
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Add => BinOp::Add,
        TokenKind::Subtract => BinOp::Subtract,
        TokenKind::Multiply => BinOp::Multiply,
        TokenKind::Divide => BinOp::Divide,
        TokenKind::Equals => BinOp::Equals,
        TokenKind::NotEquals => BinOp::NotEquals,
        TokenKind::Greater => BinOp::Greater,
        TokenKind::Lesser => BinOp::Lesser,
        _ => return None,
    })
}

fn tighter(tier: Precedence) -> Option<Precedence> {
    match tier {
        Precedence::Comparison => Some(Precedence::Additive),
        Precedence::Additive => Some(Precedence::Multiplicative),
        Precedence::Multiplicative => None,
    }
}
