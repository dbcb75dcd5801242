/*!
Recursive‑descent parser for Went.

The parser pulls tokens from a [`Lexer`] on demand and keeps a small FIFO
lookahead queue; `backup` pushes tokens back onto the *front* of that queue so
they are replayed in their original order. Each precedence level is one
function that loops over its own operators and recurses into the next tighter
level for operands, which makes every binary operator left‑associative.

The first lexical or syntax error aborts the whole parse; no partial tree is
returned. Parentheses, list literals and prefix operators may nest at most
[`MAX_NESTING`] deep; deeper input is a syntax error rather than a stack
overflow.

### Logging Policy

| Location               | Level   | Purpose                                     |
|------------------------|---------|---------------------------------------------|
| `Parser::new`, `parse` | `info`  | Lifecycle milestones.                       |
| statements, atoms      | `debug` | Descent into grammar branches.              |
| error paths            | `debug` | Through the `WentError` constructors.       |

--------------------------------------------------------------------------------
Grammar
-------

```text
program     := { [ orExpr ] ( ';' | EOF ) }
orExpr      := andExpr ( '||' andExpr )*
andExpr     := notExpr ( '&&' notExpr )*
notExpr     := '!' notExpr | comparison
comparison  := addExpr ( ( '==' | '!=' | '<' | '<=' | '>' | '>=' | 'in' | '!' 'in' ) addExpr )*
addExpr     := mulExpr ( ( '+' | '-' ) mulExpr )*
mulExpr     := unary ( ( '*' | '/' | '%' ) unary )*
unary       := ( '+' | '-' ) unary | atom
atom        := NAME | INT | FLOAT | STRING | RAWSTRING | 'null' | 'false' | 'true'
             | '(' orExpr ')' | '[' [ exprList ] ']'
exprList    := orExpr ( ',' orExpr )* [ ',' ]
```
*/

use std::collections::VecDeque;

use crate::ast::{
    Ast, BinaryExpr, BoolLit, EqExpr, Expr, ExprStmt, Ident, InExpr, ListLit, NodeId, NumberLit,
    OrderExpr, Stmt, StringLit, UnaryExpr,
};
use crate::error::{Result, WentError};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Deepest accepted nesting of groups, lists and prefix operators.
pub const MAX_NESTING: usize = 64;

/// Parse `src` (named `name` in error messages) into an [`Ast`].
pub fn parse<'a>(name: &str, src: &'a str) -> Result<Ast<'a>> {
    Parser::new(Lexer::new(name, src)).parse()
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token<'a>>,
    reported: usize, // lexer errors already turned into a parse failure
    depth: usize,
    ast: Ast<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        info!("Parser created for {:?}", lexer.name());

        let ast = Ast::new(lexer.name());

        Self {
            lexer,
            lookahead: VecDeque::new(),
            reported: 0,
            depth: 0,
            ast,
        }
    }

    /// Parse the whole input. Empty statements are skipped.
    pub fn parse(mut self) -> Result<Ast<'a>> {
        info!("Beginning parse phase");

        loop {
            match self.peek()?.kind {
                TokenType::EOF => break,
                TokenType::SEMICOLON => {
                    self.next()?;
                    continue;
                }
                _ => {}
            }

            debug!("Entering expression statement");

            let expr = self.or_expr()?;
            self.ast.push_stmt(Stmt::Expr(ExprStmt { expr }));

            self.expect_one_of(&[TokenType::SEMICOLON, TokenType::EOF], "statement")?;
        }

        info!(
            "Parse finished: {} statements, {} nodes",
            self.ast.statements().len(),
            self.ast.len()
        );

        Ok(self.ast)
    }

    // ────────────────────── token consumption ───────────────────────

    /// Pull one token from the lexer, failing on the first error it reported
    /// while producing it.
    fn pull(&mut self) -> Result<Token<'a>> {
        // `Iterator::scan` would shadow the inherent method on a by-value receiver
        let tok = Lexer::scan(&mut self.lexer);

        if let Some(err) = self.lexer.errors().get(self.reported) {
            self.reported = self.lexer.error_count();
            return Err(err.clone());
        }

        Ok(tok)
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self) -> Result<Token<'a>> {
        if let Some(tok) = self.lookahead.front() {
            return Ok(*tok);
        }

        let tok = self.pull()?;
        self.lookahead.push_back(tok);

        Ok(tok)
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Result<Token<'a>> {
        match self.lookahead.pop_front() {
            Some(tok) => Ok(tok),
            None => self.pull(),
        }
    }

    /// Push `tokens` back so the following `next` calls return them in order.
    pub fn backup(&mut self, tokens: &[Token<'a>]) {
        for tok in tokens.iter().rev() {
            self.lookahead.push_front(*tok);
        }
    }

    /// Consume the next token iff it has kind `kind`.
    fn matches(&mut self, kind: TokenType) -> Result<Option<Token<'a>>> {
        if self.peek()?.kind == kind {
            return self.next().map(Some);
        }

        Ok(None)
    }

    fn expect(&mut self, kind: TokenType, context: &str) -> Result<Token<'a>> {
        let tok = self.next()?;

        if tok.kind != kind {
            return Err(self.error(
                &tok,
                format!("expected '{}' in {}, found {}", kind.symbol(), context, tok),
            ));
        }

        Ok(tok)
    }

    fn expect_one_of(&mut self, kinds: &[TokenType], context: &str) -> Result<Token<'a>> {
        let tok = self.next()?;

        if !kinds.contains(&tok.kind) {
            return Err(self.unexpected(&tok, context));
        }

        Ok(tok)
    }

    fn unexpected(&self, tok: &Token<'a>, context: &str) -> WentError {
        self.error(tok, format!("unexpected {} in {}", tok, context))
    }

    fn error(&self, tok: &Token<'a>, msg: String) -> WentError {
        WentError::syntax(self.ast.name(), tok.pos, msg)
    }

    /// Run `parse` one nesting level deeper; `opener` is the token that
    /// opened the level.
    fn nested<F>(&mut self, opener: &Token<'a>, parse: F) -> Result<NodeId>
    where
        F: FnOnce(&mut Self) -> Result<NodeId>,
    {
        if self.depth >= MAX_NESTING {
            return Err(self.error(opener, "expression nested too deeply".to_owned()));
        }

        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;

        node
    }

    // ────────────────────── precedence levels ───────────────────────

    fn or_expr(&mut self) -> Result<NodeId> {
        let mut node = self.and_expr()?;

        while let Some(op) = self.matches(TokenType::LOGICAL_OR)? {
            let right = self.and_expr()?;
            node = self.ast.push(Expr::Or(BinaryExpr { left: node, op, right }));
        }

        Ok(node)
    }

    fn and_expr(&mut self) -> Result<NodeId> {
        let mut node = self.not_expr()?;

        while let Some(op) = self.matches(TokenType::LOGICAL_AND)? {
            let right = self.not_expr()?;
            node = self.ast.push(Expr::And(BinaryExpr { left: node, op, right }));
        }

        Ok(node)
    }

    fn not_expr(&mut self) -> Result<NodeId> {
        if let Some(op) = self.matches(TokenType::LOGICAL_NOT)? {
            let operand = self.nested(&op, Self::not_expr)?;
            return Ok(self.ast.push(Expr::Not(UnaryExpr { op, operand })));
        }

        self.comparison()
    }

    fn comparison(&mut self) -> Result<NodeId> {
        let mut node = self.add_expr()?;

        loop {
            let op = self.peek()?;

            let build: fn(NodeId, Token<'a>, NodeId) -> Expr<'a> = match op.kind {
                TokenType::EQ => |left, op, right| {
                    Expr::Eq(EqExpr { left, op, right, is_not: false })
                },
                TokenType::NEQ => |left, op, right| {
                    Expr::Eq(EqExpr { left, op, right, is_not: true })
                },
                TokenType::SM => |left, op, right| {
                    Expr::Sm(OrderExpr { left, op, right, or_eq: false })
                },
                TokenType::SMEQ => |left, op, right| {
                    Expr::Sm(OrderExpr { left, op, right, or_eq: true })
                },
                TokenType::GR => |left, op, right| {
                    Expr::Gr(OrderExpr { left, op, right, or_eq: false })
                },
                TokenType::GREQ => |left, op, right| {
                    Expr::Gr(OrderExpr { left, op, right, or_eq: true })
                },
                TokenType::IN => |left, op, right| {
                    Expr::In(InExpr { left, op, right, is_not: false })
                },
                TokenType::LOGICAL_NOT => {
                    // only `! in` continues a comparison
                    let bang = self.next()?;

                    if self.peek()?.kind != TokenType::IN {
                        self.backup(&[bang]);
                        break;
                    }

                    self.next()?;
                    let right = self.add_expr()?;
                    node = self.ast.push(Expr::In(InExpr {
                        left: node,
                        op: bang,
                        right,
                        is_not: true,
                    }));
                    continue;
                }
                _ => break,
            };

            self.next()?;
            let right = self.add_expr()?;
            node = self.ast.push(build(node, op, right));
        }

        Ok(node)
    }

    fn add_expr(&mut self) -> Result<NodeId> {
        let mut node = self.mul_expr()?;

        loop {
            let op = self.peek()?;

            let build: fn(BinaryExpr<'a>) -> Expr<'a> = match op.kind {
                TokenType::PLUS => Expr::Add,
                TokenType::MINUS => Expr::Sub,
                _ => break,
            };

            self.next()?;
            let right = self.mul_expr()?;
            node = self.ast.push(build(BinaryExpr { left: node, op, right }));
        }

        Ok(node)
    }

    fn mul_expr(&mut self) -> Result<NodeId> {
        let mut node = self.unary()?;

        loop {
            let op = self.peek()?;

            let build: fn(BinaryExpr<'a>) -> Expr<'a> = match op.kind {
                TokenType::MULT => Expr::Mul,
                TokenType::DIV => Expr::Div,
                TokenType::MOD => Expr::Mod,
                _ => break,
            };

            self.next()?;
            let right = self.unary()?;
            node = self.ast.push(build(BinaryExpr { left: node, op, right }));
        }

        Ok(node)
    }

    fn unary(&mut self) -> Result<NodeId> {
        let op = self.peek()?;

        let build: fn(UnaryExpr<'a>) -> Expr<'a> = match op.kind {
            TokenType::PLUS => Expr::Plus,
            TokenType::MINUS => Expr::Minus,
            _ => return self.atom(),
        };

        self.next()?;
        let operand = self.nested(&op, Self::unary)?;

        Ok(self.ast.push(build(UnaryExpr { op, operand })))
    }

    fn atom(&mut self) -> Result<NodeId> {
        let tok = self.next()?;

        debug!("Parsing atom {}", tok);

        let expr = match tok.kind {
            TokenType::NAME => Expr::Ident(Ident { token: tok }),
            TokenType::INT | TokenType::FLOAT => {
                let lit = NumberLit::new(tok).map_err(|msg| self.error(&tok, msg))?;
                Expr::Num(lit)
            }
            TokenType::STRING => Expr::Str(StringLit::new(tok, false)),
            TokenType::RAWSTRING => Expr::Str(StringLit::new(tok, true)),
            TokenType::NULL => Expr::Null(tok),
            TokenType::TRUE => Expr::Bool(BoolLit { token: tok, value: true }),
            TokenType::FALSE => Expr::Bool(BoolLit { token: tok, value: false }),
            TokenType::LROUND => {
                let inner = self.nested(&tok, Self::or_expr)?;
                self.expect(TokenType::RROUND, "parenthesised expression")?;
                return Ok(inner);
            }
            TokenType::LSQUARE => return self.nested(&tok, |p| p.list(tok)),
            _ => return Err(self.unexpected(&tok, "atom")),
        };

        Ok(self.ast.push(expr))
    }

    /// List literal after its `[`; a trailing comma is allowed.
    fn list(&mut self, lsquare: Token<'a>) -> Result<NodeId> {
        let mut elements = Vec::new();

        let rsquare = match self.matches(TokenType::RSQUARE)? {
            Some(rsquare) => rsquare,
            None => loop {
                elements.push(self.or_expr()?);

                let sep =
                    self.expect_one_of(&[TokenType::COMMA, TokenType::RSQUARE], "list literal")?;

                if sep.kind == TokenType::RSQUARE {
                    break sep;
                }

                if let Some(rsquare) = self.matches(TokenType::RSQUARE)? {
                    break rsquare;
                }
            },
        };

        Ok(self.ast.push(Expr::List(ListLit {
            lsquare,
            elements,
            rsquare,
        })))
    }
}
