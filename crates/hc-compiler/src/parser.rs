//! Phase-1 ("line") parser: turns the tokens of a single line into a
//! statement, following this language's grammar and operator-precedence
//! table. Grounded in `examples/original_source/hcparse.py`'s
//! per-line grammar productions, extended with `if`/`while`/`else` and
//! the comparison/logical operators the original's `let`-only language
//! didn't have.
//!
//! One line in, one [`RawLine`] out — nesting lines into bodies by
//! indentation is [`crate::indent`]'s job, not this module's.

use crate::ast::Expr;
use crate::error::HCError;
use crate::lexer::{Tok, Token};

/// What a single source line parses to, before indentation nesting.
pub enum RawLine {
    InitDecl { name: String, address: i32 },
    Forever,
    While { cond: Expr },
    If { cond: Expr },
    /// Pseudo-line: matched against the preceding `If` by the indent
    /// nester, not a statement in its own right.
    Else,
    Output { expr: Expr },
    ExprLine { expr: Expr },
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    lineno: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + ahead).map(|t| &t.tok)
    }

    fn col(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.col)
            .unwrap_or(self.tokens.last().map(|t| t.col + 1).unwrap_or(1))
    }

    fn advance(&mut self) -> Option<Tok> {
        let t = self.tokens.get(self.pos).map(|t| t.tok.clone());
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect_identifier(&mut self) -> Result<String, HCError> {
        match self.advance() {
            Some(Tok::Identifier(name)) => Ok(name),
            other => Err(self.unexpected(other)),
        }
    }

    fn expect_number(&mut self) -> Result<i32, HCError> {
        match self.advance() {
            Some(Tok::Number(n)) => Ok(n),
            other => Err(self.unexpected(other)),
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), HCError> {
        match self.advance() {
            Some(t) if t == tok => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }

    fn unexpected(&self, found: Option<Tok>) -> HCError {
        let desc = match found {
            Some(t) => format!("{t:?}"),
            None => "end of line".to_string(),
        };
        HCError::syntax(
            format!(
                "Syntax error at '{desc}' on line {}, col {}",
                self.lineno,
                self.col()
            ),
            self.lineno,
            self.col(),
        )
    }

    fn end_of_line(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

/// Parse one already-tokenized line (indentation already stripped out
/// by the lexer) into a [`RawLine`].
pub fn parse_line(tokens: &[Token], lineno: usize) -> Result<RawLine, HCError> {
    let mut cur = Cursor {
        tokens,
        pos: 0,
        lineno,
    };

    let line = match cur.peek() {
        Some(Tok::Init) => {
            cur.advance();
            let name = cur.expect_identifier()?;
            cur.expect(Tok::At)?;
            let address = cur.expect_number()?;
            RawLine::InitDecl { name, address }
        }
        Some(Tok::Forever) => {
            cur.advance();
            RawLine::Forever
        }
        Some(Tok::While) => {
            cur.advance();
            let cond = parse_expr(&mut cur)?;
            RawLine::While { cond }
        }
        Some(Tok::If) => {
            cur.advance();
            let cond = parse_expr(&mut cur)?;
            RawLine::If { cond }
        }
        Some(Tok::Else) => {
            cur.advance();
            RawLine::Else
        }
        Some(Tok::Output) => {
            cur.advance();
            let expr = parse_expr(&mut cur)?;
            RawLine::Output { expr }
        }
        _ => {
            let expr = parse_expr(&mut cur)?;
            RawLine::ExprLine { expr }
        }
    };

    if !cur.end_of_line() {
        let found = cur.advance();
        return Err(cur.unexpected(found));
    }

    Ok(line)
}

/// Entry point for expression parsing: `= += -=` bind loosest (and
/// right-associate through recursive descent, matching the original
/// grammar's `expr : IDENTIFIER '=' expr`).
fn parse_expr(cur: &mut Cursor) -> Result<Expr, HCError> {
    if let (Some(Tok::Identifier(_)), Some(op)) = (cur.peek(), cur.peek_at(1)) {
        match op {
            Tok::Equals => {
                let name = cur.expect_identifier()?;
                cur.advance();
                let rhs = parse_expr(cur)?;
                return Ok(Expr::Assignment(name, Box::new(rhs)));
            }
            Tok::PlusEquals => {
                let name = cur.expect_identifier()?;
                cur.advance();
                let rhs = parse_expr(cur)?;
                return Ok(Expr::Assignment(
                    name.clone(),
                    Box::new(Expr::Add(
                        Box::new(Expr::VariableRef(name)),
                        Box::new(rhs),
                    )),
                ));
            }
            Tok::MinusEquals => {
                let name = cur.expect_identifier()?;
                cur.advance();
                let rhs = parse_expr(cur)?;
                return Ok(Expr::Assignment(
                    name.clone(),
                    Box::new(Expr::Subtract(
                        Box::new(Expr::VariableRef(name)),
                        Box::new(rhs),
                    )),
                ));
            }
            _ => {}
        }
    }
    parse_or(cur)
}

fn parse_or(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_and(cur)?;
    while matches!(cur.peek(), Some(Tok::OrOr)) {
        cur.advance();
        let right = parse_and(cur)?;
        left = Expr::LogicalOr(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_and(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_equality(cur)?;
    while matches!(cur.peek(), Some(Tok::AndAnd)) {
        cur.advance();
        let right = parse_equality(cur)?;
        left = Expr::LogicalAnd(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_equality(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_relational(cur)?;
    loop {
        match cur.peek() {
            Some(Tok::EqEq) => {
                cur.advance();
                let right = parse_relational(cur)?;
                left = Expr::CompareEq(Box::new(left), Box::new(right));
            }
            Some(Tok::NotEq) => {
                cur.advance();
                let right = parse_relational(cur)?;
                left = Expr::CompareNe(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_relational(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_additive(cur)?;
    loop {
        match cur.peek() {
            Some(Tok::Lt) => {
                cur.advance();
                let right = parse_additive(cur)?;
                left = Expr::CompareLt(Box::new(left), Box::new(right));
            }
            Some(Tok::Le) => {
                cur.advance();
                let right = parse_additive(cur)?;
                left = Expr::CompareLe(Box::new(left), Box::new(right));
            }
            Some(Tok::Gt) => {
                cur.advance();
                let right = parse_additive(cur)?;
                left = Expr::CompareGt(Box::new(left), Box::new(right));
            }
            Some(Tok::Ge) => {
                cur.advance();
                let right = parse_additive(cur)?;
                left = Expr::CompareGe(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_additive(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_multiplicative(cur)?;
    loop {
        match cur.peek() {
            Some(Tok::Plus) => {
                cur.advance();
                let right = parse_multiplicative(cur)?;
                left = Expr::Add(Box::new(left), Box::new(right));
            }
            Some(Tok::Minus) => {
                cur.advance();
                let right = parse_multiplicative(cur)?;
                left = Expr::Subtract(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_multiplicative(cur: &mut Cursor) -> Result<Expr, HCError> {
    let mut left = parse_unary(cur)?;
    while matches!(cur.peek(), Some(Tok::Star)) {
        cur.advance();
        let right = parse_unary(cur)?;
        left = Expr::Multiply(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_unary(cur: &mut Cursor) -> Result<Expr, HCError> {
    match cur.peek() {
        Some(Tok::Minus) => {
            cur.advance();
            let inner = parse_unary(cur)?;
            Ok(match inner {
                Expr::Number(n) => Expr::Number(-n),
                other => Expr::Subtract(Box::new(Expr::Number(0)), Box::new(other)),
            })
        }
        Some(Tok::Bang) => {
            cur.advance();
            let inner = parse_unary(cur)?;
            Ok(Expr::LogicalNot(Box::new(inner)))
        }
        _ => parse_primary(cur),
    }
}

fn parse_primary(cur: &mut Cursor) -> Result<Expr, HCError> {
    match cur.advance() {
        Some(Tok::Number(n)) => Ok(Expr::Number(n)),
        Some(Tok::Identifier(name)) => Ok(Expr::VariableRef(name)),
        Some(Tok::Input) => Ok(Expr::Input),
        Some(Tok::LParen) => {
            let inner = parse_expr(cur)?;
            cur.expect(Tok::RParen)?;
            Ok(inner)
        }
        other => Err(cur.unexpected(other)),
    }
}
