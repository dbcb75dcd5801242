use log::{debug, info, trace};

use crate::ast::{
    Ast, BinaryExpr, BoolLit, EqExpr, Expr, ExprStmt, Ident, InExpr, ListLit, NodeId, NumberLit,
    OrderExpr, StringLit, UnaryExpr, Visitor,
};
use crate::environment::{Environment, Scope};
use crate::error::{Result, WentError};
use crate::token::{Pos, Token, TokenType};
use crate::value::{ArithOp, OpError, Value};

/// Tree walking evaluator. Children are evaluated before their parent, and
/// the first error aborts the whole evaluation.
///
/// Binary operators are left associative, so long operator chains grow down
/// the left spine of the tree. Those spines are folded in a loop; recursion
/// only follows right operands and prefix operands, whose depth the parser
/// bounds.
pub struct Interpreter<S: Scope = Environment> {
    scope: S,
}

impl Interpreter<Environment> {
    /// An interpreter over an empty global [`Environment`].
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        Self {
            scope: Environment::new(),
        }
    }
}

impl Default for Interpreter<Environment> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scope> Interpreter<S> {
    /// An interpreter resolving names through `scope`.
    pub fn with_scope(scope: S) -> Self {
        info!("Initializing Interpreter with a custom scope");

        Self { scope }
    }

    pub fn scope_mut(&mut self) -> &mut S {
        &mut self.scope
    }

    pub fn into_scope(self) -> S {
        self.scope
    }

    /// Evaluate every statement in order; the value of the last one is the
    /// result (`null` for an empty program).
    pub fn evaluate(&mut self, ast: &Ast<'_>) -> Result<Value> {
        debug!("Evaluating {} statements", ast.statements().len());

        let mut last = Value::Null;
        for stmt in ast.statements() {
            last = ast.accept_stmt(stmt, self)?;
        }

        info!("Evaluation finished: {}", last);

        Ok(last)
    }

    /// Evaluate the single node `id` of `ast`.
    pub fn evaluate_node(&mut self, ast: &Ast<'_>, id: NodeId) -> Result<Value> {
        ast.accept(id, self)
    }

    /// Evaluate `top` and every binary node on its left spine, innermost
    /// first.
    fn chain(&mut self, ast: &Ast<'_>, top: Binary<'_>) -> Result<Value> {
        let mut spine = vec![top];
        let mut leftmost = top.left();

        while let Some(binary) = Binary::of(ast.node(leftmost)) {
            leftmost = binary.left();
            spine.push(binary);
        }

        if spine.len() > 1 {
            trace!("Folding a chain of {} binary operations", spine.len());
        }

        let mut value = ast.accept(leftmost, self)?;
        for binary in spine.into_iter().rev() {
            value = self.apply(ast, binary, value)?;
        }

        Ok(value)
    }

    /// Finish one binary node whose left operand is already `left`.
    fn apply(&mut self, ast: &Ast<'_>, binary: Binary<'_>, left: Value) -> Result<Value> {
        match binary {
            Binary::And(node) => {
                if left.is_zero_value() {
                    return Ok(left);
                }

                ast.accept(node.right, self)
            }
            Binary::Or(node) => {
                if !left.is_zero_value() {
                    return Ok(left);
                }

                ast.accept(node.right, self)
            }
            Binary::Arith(op, node) => {
                let right = ast.accept(node.right, self)?;

                let value = left
                    .arith(op, &right)
                    .map_err(|e| op_error(ast, node.op.pos, e))?;

                trace!("{} {} {} => {}", left, op.symbol(), right, value);

                Ok(value)
            }
            Binary::Eq(node) => {
                let right = ast.accept(node.right, self)?;

                Ok(Value::Bool(left.equals(&right) != node.is_not))
            }
            Binary::Sm(node) => {
                let right = ast.accept(node.right, self)?;

                left.sm(&right, node.or_eq)
                    .map(Value::Bool)
                    .map_err(|e| op_error(ast, node.op.pos, e))
            }
            Binary::Gr(node) => {
                let right = ast.accept(node.right, self)?;

                left.gr(&right, node.or_eq)
                    .map(Value::Bool)
                    .map_err(|e| op_error(ast, node.op.pos, e))
            }
            Binary::In(node) => {
                let container = ast.accept(node.right, self)?;

                container
                    .contains(&left)
                    .map(|found| Value::Bool(found != node.is_not))
                    .map_err(|e| op_error(ast, node.op.pos, e))
            }
        }
    }

    fn unary(
        &mut self,
        ast: &Ast<'_>,
        node: &UnaryExpr<'_>,
        apply: fn(&Value) -> std::result::Result<Value, OpError>,
    ) -> Result<Value> {
        let operand = ast.accept(node.operand, self)?;

        apply(&operand).map_err(|e| op_error(ast, node.op.pos, e))
    }
}

/// A binary node together with what its operator does.
#[derive(Clone, Copy)]
enum Binary<'n> {
    Arith(ArithOp, &'n BinaryExpr<'n>),
    Eq(&'n EqExpr<'n>),
    Sm(&'n OrderExpr<'n>),
    Gr(&'n OrderExpr<'n>),
    In(&'n InExpr<'n>),
    And(&'n BinaryExpr<'n>),
    Or(&'n BinaryExpr<'n>),
}

impl<'n> Binary<'n> {
    fn of(expr: &'n Expr<'n>) -> Option<Self> {
        let binary = match expr {
            Expr::Add(b) => Binary::Arith(ArithOp::Add, b),
            Expr::Sub(b) => Binary::Arith(ArithOp::Sub, b),
            Expr::Mul(b) => Binary::Arith(ArithOp::Mul, b),
            Expr::Div(b) => Binary::Arith(ArithOp::Div, b),
            Expr::Mod(b) => Binary::Arith(ArithOp::Mod, b),
            Expr::Eq(e) => Binary::Eq(e),
            Expr::Sm(o) => Binary::Sm(o),
            Expr::Gr(o) => Binary::Gr(o),
            Expr::In(i) => Binary::In(i),
            Expr::And(b) => Binary::And(b),
            Expr::Or(b) => Binary::Or(b),
            _ => return None,
        };

        Some(binary)
    }

    fn left(self) -> NodeId {
        match self {
            Binary::Arith(_, b) | Binary::And(b) | Binary::Or(b) => b.left,
            Binary::Eq(e) => e.left,
            Binary::Sm(o) | Binary::Gr(o) => o.left,
            Binary::In(i) => i.left,
        }
    }
}

fn op_error(ast: &Ast<'_>, pos: Pos, err: OpError) -> WentError {
    match err {
        OpError::Type(msg) => WentError::type_error(ast.name(), pos, msg),
        OpError::ZeroDivision(msg) => WentError::zero_division(ast.name(), pos, msg),
    }
}

impl<S: Scope> Visitor for Interpreter<S> {
    type Output = Result<Value>;

    fn visit_add(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Arith(ArithOp::Add, node))
    }

    fn visit_sub(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Arith(ArithOp::Sub, node))
    }

    fn visit_mul(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Arith(ArithOp::Mul, node))
    }

    fn visit_div(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Arith(ArithOp::Div, node))
    }

    fn visit_mod(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Arith(ArithOp::Mod, node))
    }

    fn visit_eq(&mut self, ast: &Ast<'_>, node: &EqExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Eq(node))
    }

    fn visit_sm(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Sm(node))
    }

    fn visit_gr(&mut self, ast: &Ast<'_>, node: &OrderExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Gr(node))
    }

    fn visit_in(&mut self, ast: &Ast<'_>, node: &InExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::In(node))
    }

    /// `&&` and `||` return the deciding operand itself, not a bool.
    fn visit_and(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::And(node))
    }

    fn visit_or(&mut self, ast: &Ast<'_>, node: &BinaryExpr<'_>) -> Result<Value> {
        self.chain(ast, Binary::Or(node))
    }

    fn visit_plus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Result<Value> {
        self.unary(ast, node, Value::identity)
    }

    fn visit_minus(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Result<Value> {
        self.unary(ast, node, Value::negate)
    }

    fn visit_not(&mut self, ast: &Ast<'_>, node: &UnaryExpr<'_>) -> Result<Value> {
        let operand = ast.accept(node.operand, self)?;

        Ok(Value::Bool(operand.is_zero_value()))
    }

    fn visit_num(&mut self, _ast: &Ast<'_>, node: &NumberLit<'_>) -> Result<Value> {
        // a FLOAT token stays a float even when integral
        let value = match (node.token.kind, node.int) {
            (TokenType::INT, Some(i)) => Value::int(i),
            _ => Value::float(node.float),
        };

        Ok(value)
    }

    fn visit_str(&mut self, _ast: &Ast<'_>, node: &StringLit<'_>) -> Result<Value> {
        Ok(Value::String(node.value.clone()))
    }

    fn visit_null(&mut self, _ast: &Ast<'_>, _token: &Token<'_>) -> Result<Value> {
        Ok(Value::Null)
    }

    fn visit_bool(&mut self, _ast: &Ast<'_>, node: &BoolLit<'_>) -> Result<Value> {
        Ok(Value::Bool(node.value))
    }

    fn visit_list(&mut self, ast: &Ast<'_>, node: &ListLit<'_>) -> Result<Value> {
        let elements = node
            .elements
            .iter()
            .map(|&id| ast.accept(id, self))
            .collect::<Result<Vec<Value>>>()?;

        Ok(Value::List(elements))
    }

    fn visit_ident(&mut self, ast: &Ast<'_>, node: &Ident<'_>) -> Result<Value> {
        self.scope.resolve(node.name()).ok_or_else(|| {
            WentError::runtime(
                ast.name(),
                node.token.pos,
                format!("name '{}' is not defined", node.name()),
            )
        })
    }

    fn visit_expr_stmt(&mut self, ast: &Ast<'_>, stmt: &ExprStmt) -> Result<Value> {
        let value = ast.accept(stmt.expr, self)?;

        trace!("Statement evaluated to {}", value);

        Ok(value)
    }
}
