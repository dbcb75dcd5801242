use crate::ast::{
    Ast, BinaryExpr, BoolLit, EqExpr, ExprStmt, Ident, InExpr, ListLit, NodeId, NumberLit,
    OrderExpr, StringLit, UnaryExpr, Visitor,
};
use crate::token::{Token, TokenType};

/// Converts expressions to a parenthesised prefix form such as
/// `(+ 1 (* 2 3))`. Literals print as written in the source.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    /// Prefix form of the node `id`.
    pub fn print(ast: &Ast<'_>, id: NodeId) -> String {
        ast.accept(id, &mut AstPrinter)
    }

    /// One line per statement.
    pub fn print_program(ast: &Ast<'_>) -> Vec<String> {
        ast.statements()
            .iter()
            .map(|stmt| ast.accept_stmt(stmt, &mut AstPrinter))
            .collect()
    }

    fn parenthesize(&mut self, ast: &Ast<'_>, name: &str, nodes: &[NodeId]) -> String {
        let mut s = String::from("(");
        s.push_str(name);

        for &id in nodes {
            s.push(' ');
            s.push_str(&ast.accept(id, self));
        }

        s.push(')');
        s
    }
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_add(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "+", &[node.left, node.right])
    }

    fn visit_sub(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "-", &[node.left, node.right])
    }

    fn visit_mul(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "*", &[node.left, node.right])
    }

    fn visit_div(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "/", &[node.left, node.right])
    }

    fn visit_mod(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "%", &[node.left, node.right])
    }

    fn visit_eq(&mut self, ast: &Ast<'_>, node: &EqExpr<'_>) -> String {
        let op = if node.is_not { "!=" } else { "==" };
        self.parenthesize(ast, op, &[node.left, node.right])
    }

    fn visit_sm(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> String {
        let op = if node.or_eq { "<=" } else { "<" };
        self.parenthesize(ast, op, &[node.left, node.right])
    }

    fn visit_gr(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> String {
        let op = if node.or_eq { ">=" } else { ">" };
        self.parenthesize(ast, op, &[node.left, node.right])
    }

    fn visit_in(&mut self, ast: &Ast<'_>, node: &InExpr<'_>) -> String {
        let op = if node.is_not { "!in" } else { "in" };
        self.parenthesize(ast, op, &[node.left, node.right])
    }

    fn visit_and(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "&&", &[node.left, node.right])
    }

    fn visit_or(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> String {
        self.parenthesize(ast, "||", &[node.left, node.right])
    }

    fn visit_plus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> String {
        self.parenthesize(ast, "+", &[node.operand])
    }

    fn visit_minus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> String {
        self.parenthesize(ast, "-", &[node.operand])
    }

    fn visit_not(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> String {
        self.parenthesize(ast, "!", &[node.operand])
    }

    fn visit_num(&mut self, _ast: &Ast<'_>, node: &NumberLit<'_>) -> String {
        node.token.text.to_owned()
    }

    fn visit_str(&mut self, _ast: &Ast<'_>, node: &StringLit<'_>) -> String {
        match node.token.kind {
            TokenType::RAWSTRING => format!("`{}`", node.token.text),
            _ => format!("'{}'", node.token.text),
        }
    }

    fn visit_null(&mut self, _ast: &Ast<'_>, _token: &Token<'_>) -> String {
        "null".into()
    }

    fn visit_bool(&mut self, _ast: &Ast<'_>, node: &BoolLit<'_>) -> String {
        node.value.to_string()
    }

    fn visit_list(&mut self, ast: &Ast<'_>, node: &ListLit<'_>) -> String {
        self.parenthesize(ast, "list", &node.elements)
    }

    fn visit_ident(&mut self, _ast: &Ast<'_>, node: &Ident<'_>) -> String {
        node.name().to_owned()
    }

    fn visit_expr_stmt(&mut self, ast: &Ast<'_>, stmt: &ExprStmt) -> String {
        ast.accept(stmt.expr, self)
    }
}
