//! Abstract syntax tree for Went.
//!
//! Nodes live in an arena ([`Ast`]) and refer to their children by
//! [`NodeId`]; every child has exactly one parent and nothing is mutated once
//! the parser has pushed it. Behaviour over the tree is added through the
//! [`Visitor`] trait: [`Ast::accept`] matches the node variant and calls the
//! one `visit_*` method for it.

use serde::Serialize;
use std::num::IntErrorKind;

use crate::token::{Pos, Token};

/// Index of an expression node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arithmetic and logical operators: `left <op> right`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr<'a> {
    pub left: NodeId,
    pub op: Token<'a>,
    pub right: NodeId,
}

/// `==` or, with `is_not`, `!=`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqExpr<'a> {
    pub left: NodeId,
    pub op: Token<'a>,
    pub right: NodeId,
    pub is_not: bool,
}

/// `<`/`>` or, with `or_eq`, `<=`/`>=`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderExpr<'a> {
    pub left: NodeId,
    pub op: Token<'a>,
    pub right: NodeId,
    pub or_eq: bool,
}

/// `in` or, with `is_not`, `! in`. `op` is the first operator token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InExpr<'a> {
    pub left: NodeId,
    pub op: Token<'a>,
    pub right: NodeId,
    pub is_not: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr<'a> {
    pub op: Token<'a>,
    pub operand: NodeId,
}

/// A numeric literal with both an integer and a float view.
///
/// `int` is present when the literal is an exact integer that survives a
/// round trip through `f64`; `float` is always set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberLit<'a> {
    pub token: Token<'a>,
    pub int: Option<i64>,
    pub float: f64,
}

impl<'a> NumberLit<'a> {
    /// Build the literal from an `INT` or `FLOAT` token.
    ///
    /// Integer text honours the `0x` (hexadecimal) and leading `0` (octal)
    /// prefixes. Text that only parses as a float is accepted when it carries
    /// a fraction or exponent, otherwise it is an integer overflow.
    pub fn new(token: Token<'a>) -> Result<Self, String> {
        let text = token.text;

        match parse_int(text) {
            Ok(i) => {
                let float = i as f64;
                let int = (float as i64 == i).then_some(i);
                return Ok(Self { token, int, float });
            }
            Err(IntErrorKind::PosOverflow) => return Err(format!("integer overflow: {:?}", text)),
            Err(_) => {}
        }

        match text.parse::<f64>() {
            Ok(_) if !text.contains(['.', 'e', 'E']) => {
                Err(format!("integer overflow: {:?}", text))
            }
            Ok(float) => {
                let bound = 2f64.powi(63);
                let int = (float.fract() == 0.0 && float >= -bound && float < bound)
                    .then_some(float as i64);
                Ok(Self { token, int, float })
            }
            Err(_) => Err(format!("illegal number syntax: {:?}", text)),
        }
    }

    pub fn is_int(&self) -> bool {
        self.int.is_some()
    }
}

fn parse_int(text: &str) -> Result<i64, IntErrorKind> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8)
    } else {
        text.parse::<i64>()
    };

    parsed.map_err(|e| e.kind().clone())
}

/// A string literal; `value` is the unescaped text (raw strings verbatim).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLit<'a> {
    pub token: Token<'a>,
    pub value: String,
}

impl<'a> StringLit<'a> {
    pub fn new(token: Token<'a>, raw: bool) -> Self {
        let value = if raw {
            token.text.to_owned()
        } else {
            unescape(token.text)
        };

        Self { token, value }
    }
}

/// Resolve backslash escapes; an unknown escape stands for the escaped char.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolLit<'a> {
    pub token: Token<'a>,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListLit<'a> {
    pub lsquare: Token<'a>,
    pub elements: Vec<NodeId>,
    pub rsquare: Token<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident<'a> {
    pub token: Token<'a>,
}

impl Ident<'_> {
    pub fn name(&self) -> &str {
        self.token.text
    }
}

/// Every expression node kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr<'a> {
    Add(BinaryExpr<'a>),
    Sub(BinaryExpr<'a>),
    Mul(BinaryExpr<'a>),
    Div(BinaryExpr<'a>),
    Mod(BinaryExpr<'a>),
    Eq(EqExpr<'a>),
    Sm(OrderExpr<'a>),
    Gr(OrderExpr<'a>),
    In(InExpr<'a>),
    And(BinaryExpr<'a>),
    Or(BinaryExpr<'a>),
    Plus(UnaryExpr<'a>),
    Minus(UnaryExpr<'a>),
    Not(UnaryExpr<'a>),
    Num(NumberLit<'a>),
    Str(StringLit<'a>),
    Null(Token<'a>),
    Bool(BoolLit<'a>),
    List(ListLit<'a>),
    Ident(Ident<'a>),
}

/// An expression evaluated for its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprStmt {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expr(ExprStmt),
}

/// The parsed program: a node arena plus the top level statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ast<'a> {
    name: String,
    nodes: Vec<Expr<'a>>,
    statements: Vec<Stmt>,
}

impl<'a> Ast<'a> {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Name of the parsed input, used for error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn push(&mut self, expr: Expr<'a>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    pub(crate) fn push_stmt(&mut self, stmt: Stmt) {
        self.statements.push(stmt);
    }

    /// The node behind `id`. Ids are only handed out by this arena.
    pub fn node(&self, id: NodeId) -> &Expr<'a> {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// The expression of a program made of exactly one expression statement.
    pub fn expression(&self) -> Option<NodeId> {
        match self.statements.as_slice() {
            [Stmt::Expr(stmt)] => Some(stmt.expr),
            _ => None,
        }
    }

    /// Position of the first character of the node.
    pub fn start_pos(&self, mut id: NodeId) -> Pos {
        loop {
            id = match self.node(id) {
                Expr::Add(b) | Expr::Sub(b) | Expr::Mul(b) | Expr::Div(b) | Expr::Mod(b) => {
                    b.left
                }
                Expr::And(b) | Expr::Or(b) => b.left,
                Expr::Eq(e) => e.left,
                Expr::Sm(o) | Expr::Gr(o) => o.left,
                Expr::In(i) => i.left,
                Expr::Plus(u) | Expr::Minus(u) | Expr::Not(u) => return u.op.pos,
                Expr::Num(n) => return n.token.pos,
                Expr::Str(s) => return s.token.pos,
                Expr::Null(t) => return t.pos,
                Expr::Bool(b) => return b.token.pos,
                Expr::List(l) => return l.lsquare.pos,
                Expr::Ident(i) => return i.token.pos,
            };
        }
    }

    /// Position one past the last character of the node.
    pub fn end_pos(&self, mut id: NodeId) -> Pos {
        loop {
            id = match self.node(id) {
                Expr::Add(b) | Expr::Sub(b) | Expr::Mul(b) | Expr::Div(b) | Expr::Mod(b) => {
                    b.right
                }
                Expr::And(b) | Expr::Or(b) => b.right,
                Expr::Eq(e) => e.right,
                Expr::Sm(o) | Expr::Gr(o) => o.right,
                Expr::In(i) => i.right,
                Expr::Plus(u) | Expr::Minus(u) | Expr::Not(u) => u.operand,
                Expr::Num(n) => return n.token.end_pos(),
                Expr::Str(s) => return s.token.end_pos(),
                Expr::Null(t) => return t.end_pos(),
                Expr::Bool(b) => return b.token.end_pos(),
                Expr::List(l) => return l.rsquare.end_pos(),
                Expr::Ident(i) => return i.token.end_pos(),
            };
        }
    }

    /// Dispatch `visitor` to the method matching the node at `id`.
    pub fn accept<V: Visitor>(&self, id: NodeId, visitor: &mut V) -> V::Output {
        match self.node(id) {
            Expr::Add(n) => visitor.visit_add(self, n),
            Expr::Sub(n) => visitor.visit_sub(self, n),
            Expr::Mul(n) => visitor.visit_mul(self, n),
            Expr::Div(n) => visitor.visit_div(self, n),
            Expr::Mod(n) => visitor.visit_mod(self, n),
            Expr::Eq(n) => visitor.visit_eq(self, n),
            Expr::Sm(n) => visitor.visit_sm(self, n),
            Expr::Gr(n) => visitor.visit_gr(self, n),
            Expr::In(n) => visitor.visit_in(self, n),
            Expr::And(n) => visitor.visit_and(self, n),
            Expr::Or(n) => visitor.visit_or(self, n),
            Expr::Plus(n) => visitor.visit_plus(self, n),
            Expr::Minus(n) => visitor.visit_minus(self, n),
            Expr::Not(n) => visitor.visit_not(self, n),
            Expr::Num(n) => visitor.visit_num(self, n),
            Expr::Str(n) => visitor.visit_str(self, n),
            Expr::Null(t) => visitor.visit_null(self, t),
            Expr::Bool(n) => visitor.visit_bool(self, n),
            Expr::List(n) => visitor.visit_list(self, n),
            Expr::Ident(n) => visitor.visit_ident(self, n),
        }
    }

    pub fn accept_stmt<V: Visitor>(&self, stmt: &Stmt, visitor: &mut V) -> V::Output {
        match stmt {
            Stmt::Expr(s) => visitor.visit_expr_stmt(self, s),
        }
    }
}

/// One method per node kind. Implementors recurse into children through
/// [`Ast::accept`].
pub trait Visitor {
    type Output;

    fn visit_add(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_sub(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_mul(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_div(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_mod(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_eq(&mut self, ast: &Ast<'_>, node: &EqExpr<'_>) -> Self::Output;
    fn visit_sm(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> Self::Output;
    fn visit_gr(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> Self::Output;
    fn visit_in(&mut self, ast: &Ast<'_>, node: &InExpr<'_>) -> Self::Output;
    fn visit_and(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_or(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Self::Output;
    fn visit_plus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Self::Output;
    fn visit_minus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Self::Output;
    fn visit_not(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Self::Output;
    fn visit_num(&mut self, ast: &Ast<'_>, node: &NumberLit<'_>) -> Self::Output;
    fn visit_str(&mut self, ast: &Ast<'_>, node: &StringLit<'_>) -> Self::Output;
    fn visit_null(&mut self, ast: &Ast<'_>, token: &Token<'_>) -> Self::Output;
    fn visit_bool(&mut self, ast: &Ast<'_>, node: &BoolLit<'_>) -> Self::Output;
    fn visit_list(&mut self, ast: &Ast<'_>, node: &ListLit<'_>) -> Self::Output;
    fn visit_ident(&mut self, ast: &Ast<'_>, node: &Ident<'_>) -> Self::Output;

    fn visit_expr_stmt(&mut self, ast: &Ast<'_>, stmt: &ExprStmt) -> Self::Output;
}
