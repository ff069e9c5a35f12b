//! Abstract syntax tree produced by the front end (lexer + phase-1 line
//! parser + phase-2 indent nester) and consumed by expression lowering.
//!
//! Modeled as two closed sum types, [`Stmt`] and [`Expr`], with behavior
//! attached as ordinary `impl` methods rather than a trait per variant —
//! there is a fixed, small set of node kinds and no external crate ever
//! needs to add one.

use std::collections::HashSet;

/// Static result type of an expression. Booleans are never storable —
/// they may only be branched on (see [`Expr::result_kind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Integer,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `init NAME @ ADDR`
    InitialValueDeclaration {
        name: String,
        address: i32,
        line: usize,
    },
    /// `forever` ... infinite loop.
    Forever { body: Vec<Stmt>, line: usize },
    /// `while COND` ...
    While {
        cond: Expr,
        body: Vec<Stmt>,
        line: usize,
    },
    /// `if COND` ... (`else` ...)?
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        line: usize,
    },
    /// A bare expression, evaluated for side effects (assignment, input).
    ExprLine { expr: Expr, line: usize },
    /// `output EXPR`
    Output { expr: Expr, line: usize },
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::InitialValueDeclaration { line, .. }
            | Stmt::Forever { line, .. }
            | Stmt::While { line, .. }
            | Stmt::If { line, .. }
            | Stmt::ExprLine { line, .. }
            | Stmt::Output { line, .. } => *line,
        }
    }

    /// Names bound by assignments (etc.) anywhere in this statement,
    /// including nested bodies, and `init` declarations. Used to seed
    /// the program's [`Namespace`] before lowering begins.
    pub fn collect_names(&self, ns: &mut Namespace) {
        match self {
            Stmt::InitialValueDeclaration { name, .. } => ns.add_name(name.clone()),
            Stmt::Forever { body, .. } => {
                for s in body {
                    s.collect_names(ns);
                }
            }
            Stmt::While { cond, body, .. } => {
                cond.collect_names(ns);
                for s in body {
                    s.collect_names(ns);
                }
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                cond.collect_names(ns);
                for s in then_body {
                    s.collect_names(ns);
                }
                if let Some(eb) = else_body {
                    for s in eb {
                        s.collect_names(ns);
                    }
                }
            }
            Stmt::ExprLine { expr, .. } | Stmt::Output { expr, .. } => expr.collect_names(ns),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i32),
    /// Compiler-internal only — never produced by the parser, only by
    /// lowering (e.g. folding `while false`).
    Boolean(bool),
    VariableRef(String),
    Input,
    Assignment(String, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    /// `|a - b|`-style difference; either operand may end up on the
    /// left of the emitted `SUB` depending on what's already in hand.
    Difference(Box<Expr>, Box<Expr>),
    Multiply(Box<Expr>, Box<Expr>),
    CompareEq(Box<Expr>, Box<Expr>),
    CompareNe(Box<Expr>, Box<Expr>),
    CompareLt(Box<Expr>, Box<Expr>),
    CompareLe(Box<Expr>, Box<Expr>),
    CompareGt(Box<Expr>, Box<Expr>),
    CompareGe(Box<Expr>, Box<Expr>),
    LogicalNot(Box<Expr>),
    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
    /// Carries out a statement list, then yields an expression.
    /// Introduced during lowering to sequence injected statements that
    /// must only run along one side of a short-circuit branch.
    InlineStatementExpr(Vec<Stmt>, Box<Expr>),
}

impl Expr {
    pub fn result_kind(&self) -> ResultKind {
        use Expr::*;
        match self {
            Number(_) | VariableRef(_) | Input | Add(..) | Subtract(..) | Difference(..)
            | Multiply(..) => ResultKind::Integer,
            Assignment(_, e) => e.result_kind(),
            Boolean(_) | CompareEq(..) | CompareNe(..) | CompareLt(..) | CompareLe(..)
            | CompareGt(..) | CompareGe(..) | LogicalNot(..) | LogicalAnd(..) | LogicalOr(..) => {
                ResultKind::Boolean
            }
            InlineStatementExpr(_, e) => e.result_kind(),
        }
    }

    pub fn has_side_effects(&self) -> bool {
        use Expr::*;
        match self {
            Number(_) | Boolean(_) | VariableRef(_) => false,
            Input | Assignment(..) => true,
            Add(l, r) | Subtract(l, r) | Difference(l, r) | Multiply(l, r) => {
                l.has_side_effects() || r.has_side_effects()
            }
            CompareEq(l, r) | CompareNe(l, r) | CompareLt(l, r) | CompareLe(l, r)
            | CompareGt(l, r) | CompareGe(l, r) | LogicalAnd(l, r) | LogicalOr(l, r) => {
                l.has_side_effects() || r.has_side_effects()
            }
            LogicalNot(e) => e.has_side_effects(),
            InlineStatementExpr(stmts, e) => !stmts.is_empty() || e.has_side_effects(),
        }
    }

    /// Names read or written anywhere in this expression.
    pub fn free_names(&self) -> HashSet<String> {
        let mut ns = Namespace::new();
        self.collect_names(&mut ns);
        ns.names
    }

    pub fn collect_names(&self, ns: &mut Namespace) {
        use Expr::*;
        match self {
            Number(_) | Boolean(_) | Input => {}
            VariableRef(name) => ns.add_name(name.clone()),
            Assignment(name, e) => {
                ns.add_name(name.clone());
                e.collect_names(ns);
            }
            Add(l, r) | Subtract(l, r) | Difference(l, r) | Multiply(l, r) => {
                l.collect_names(ns);
                r.collect_names(ns);
            }
            CompareEq(l, r) | CompareNe(l, r) | CompareLt(l, r) | CompareLe(l, r)
            | CompareGt(l, r) | CompareGe(l, r) | LogicalAnd(l, r) | LogicalOr(l, r) => {
                l.collect_names(ns);
                r.collect_names(ns);
            }
            LogicalNot(e) => e.collect_names(ns),
            InlineStatementExpr(stmts, e) => {
                for s in stmts {
                    s.collect_names(ns);
                }
                e.collect_names(ns);
            }
        }
    }
}

/// Generate the `idx`-th base-26 lowercase name: `a, b, ..., z, aa, ab, ...`.
///
/// Bijective base-26: unlike plain positional base-26, there's no
/// separate "zero" digit, so the sequence doesn't waste a leading `a`
/// the way `0, 1, 2, ...` in ordinary base-26 would skip straight from
/// `z` to `ba` instead of `aa`.
fn generate_name(mut idx: usize) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(idx % 26);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    digits
        .into_iter()
        .rev()
        .map(|d| (b'a' + d as u8) as char)
        .collect()
}

/// The set of names in use across a program (or sub-tree), plus a
/// counter for minting fresh ones. Fresh names are deterministic:
/// `next_id` only ever increases, and generation skips any name already
/// present (whether user-written or previously generated).
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    names: HashSet<String>,
    next_id: usize,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace {
            names: HashSet::new(),
            next_id: 0,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn merge(&mut self, other: &Namespace) {
        for n in &other.names {
            self.names.insert(n.clone());
        }
        if other.next_id > self.next_id {
            self.next_id = other.next_id;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    /// Mint a fresh name not already present, in deterministic base-26
    /// order, skipping collisions with names already seen.
    pub fn fresh_name(&mut self) -> String {
        loop {
            let name = generate_name(self.next_id);
            self.next_id += 1;
            if !self.names.contains(&name) {
                self.names.insert(name.clone());
                return name;
            }
        }
    }
}
