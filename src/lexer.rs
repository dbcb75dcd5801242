//! Module `lexer` implements the pull-based, one-pass lexer for Went.
//!
//! Each call to [`Lexer::scan`] advances the cursor exactly far enough to
//! produce one [`Token`]. Besides plain tokenisation the lexer tracks:
//!
//! - **Positions**: 1-based line and column of every token's first character.
//! - **Bracket balance**: a stack of open `(`, `[`, `{`; mismatched closers and
//!   unclosed openers are lexical errors.
//! - **Automatic semicolon insertion**: a run of newlines after a token that can
//!   end a statement (see [`TokenType::ends_statement`]) yields a `SEMICOLON`
//!   with text `"\n"`. A `}` is preceded by a synthetic empty `SEMICOLON` unless
//!   the previous token already was one.
//!
//! Errors never stop the lexer. They are accumulated in an [`ErrorList`] (and
//! passed to an optional handler) while a best-effort token is still returned.
//! Once the input is exhausted every further call returns `EOF`.
//!
//! # Example
//!
//! ```rust
//! use went::lexer::Lexer;
//! use went::token::TokenType;
//!
//! let mut lexer = Lexer::new("demo", "x + 1\n");
//! let kinds: Vec<TokenType> = lexer.by_ref().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenType::NAME, TokenType::PLUS, TokenType::INT, TokenType::SEMICOLON, TokenType::EOF]
//! );
//! assert!(lexer.errors().is_empty());
//! ```

use crate::error::{ErrorList, WentError};
use crate::token::{Pos, Token, TokenType};
use log::{debug, info};
use memchr::{memchr, memchr_iter, memmem, memrchr};
use std::fmt;
use std::iter::FusedIterator;

/// Callback invoked with every lexical error as soon as it is reported.
pub type ErrorHandler<'a> = Box<dyn FnMut(&WentError) + 'a>;

/// A single pass **lexer** over one named input.
pub struct Lexer<'a> {
    name: String,                   // input name used in error messages
    src: &'a str,                   // entire source text
    start: usize,                   // byte index of the first char of the current lexeme
    curr: usize,                    // byte index one past the last char examined
    line: u32,                      // line of `curr`
    col: u32,                       // column of `curr`
    start_pos: Pos,                 // position of `start`
    brackets: Vec<(char, Pos)>,     // open brackets and where they were opened
    last: Option<TokenType>,        // kind of the previously emitted token
    pending: Option<Token<'a>>,     // `}` held back behind a synthetic semicolon
    errors: ErrorList,
    handler: Option<ErrorHandler<'a>>,
    finished: bool,                 // iterator already yielded EOF
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over `src`; `name` prefixes error messages.
    pub fn new<S: Into<String>>(name: S, src: &'a str) -> Self {
        let name = name.into();

        info!("Lexer created for {:?} over {} bytes", name, src.len());

        Self {
            name,
            src,
            start: 0,
            curr: 0,
            line: 1,
            col: 1,
            start_pos: Pos::new(1, 1),
            brackets: Vec::new(),
            last: None,
            pending: None,
            errors: ErrorList::new(),
            handler: None,
            finished: false,
        }
    }

    /// Install a callback that sees every error as it is reported.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&WentError) + 'a,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every error reported so far, in reporting order.
    pub fn errors(&self) -> &ErrorList {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Hand over the accumulated errors, leaving the lexer's list empty.
    pub fn take_errors(&mut self) -> ErrorList {
        std::mem::take(&mut self.errors)
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    #[inline(always)]
    fn rest(&self) -> &'a str {
        &self.src[self.curr..]
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline(always)]
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    /// Consume one char, keeping line and column in step.
    #[inline(always)]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.curr += c.len_utf8();

        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }

        Some(c)
    }

    /// Consume the next char iff it equals `expected`.
    #[inline(always)]
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a run of chars satisfying `pred`.
    fn advance_while<P: Fn(char) -> bool>(&mut self, pred: P) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Move the cursor to byte index `to`, recomputing line and column with
    /// `memchr` instead of walking char by char.
    fn jump_to(&mut self, to: usize) {
        let skipped = &self.src[self.curr..to];
        let bytes = skipped.as_bytes();

        let newlines = memchr_iter(b'\n', bytes).count() as u32;

        match memrchr(b'\n', bytes) {
            Some(last_nl) => {
                self.line += newlines;
                self.col = 1 + skipped[last_nl + 1..].chars().count() as u32;
            }
            None => self.col += skipped.chars().count() as u32,
        }

        self.curr = to;
    }

    fn text(&self) -> &'a str {
        &self.src[self.start..self.curr]
    }

    fn token(&self, kind: TokenType) -> Token<'a> {
        Token::new(kind, self.text(), self.start_pos)
    }

    /// Record an error at `pos` and pass it to the handler, if any.
    fn error<S: Into<String>>(&mut self, pos: Pos, msg: S) {
        let err = WentError::lex(self.name.as_str(), pos, msg);

        if let Some(handler) = self.handler.as_mut() {
            handler(&err);
        }

        self.errors.add(err);
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan the next token. After the end of input this keeps returning `EOF`.
    pub fn scan(&mut self) -> Token<'a> {
        if let Some(tok) = self.pending.take() {
            return self.emit(tok);
        }

        loop {
            self.advance_while(|c| matches!(c, ' ' | '\t' | '\r'));

            self.start = self.curr;
            self.start_pos = self.pos();

            let Some(c) = self.advance() else {
                return self.scan_eof();
            };

            if let Some(tok) = self.scan_token(c) {
                return self.emit(tok);
            }
            // whitespace, comments and discarded newlines: go again
        }
    }

    fn emit(&mut self, tok: Token<'a>) -> Token<'a> {
        debug!("Scanned {:?} {:?} at {}", tok.kind, tok.text, tok.pos);

        self.last = Some(tok.kind);
        tok
    }

    fn scan_eof(&mut self) -> Token<'a> {
        // only the innermost unclosed opener is reported, once
        if let Some((open, pos)) = self.brackets.last().copied() {
            self.error(pos, format!("unclosed left bracket: {}", fmt_rune(open)));
            self.brackets.clear();
        }

        Token::new(TokenType::EOF, "", self.start_pos)
    }

    /// Classify by the first char `c` (already consumed). `None` means the
    /// lexeme produced no token.
    fn scan_token(&mut self, c: char) -> Option<Token<'a>> {
        let kind = match c {
            // ── punctuation ──────────────────────────────────────────────
            ':' => TokenType::COLON,
            ',' => TokenType::COMMA,
            ';' => TokenType::SEMICOLON,
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(c),
            '.' => TokenType::DOT,

            // ── brackets ────────────────────────────────────────────────
            '(' | '[' | '{' => {
                self.brackets.push((c, self.start_pos));

                match c {
                    '(' => TokenType::LROUND,
                    '[' => TokenType::LSQUARE,
                    _ => TokenType::LCURLY,
                }
            }
            ')' => {
                self.close_bracket(c, '(');
                TokenType::RROUND
            }
            ']' => {
                self.close_bracket(c, '[');
                TokenType::RSQUARE
            }
            '}' => {
                self.close_bracket(c, '{');

                let rcurly = self.token(TokenType::RCURLY);

                if self.last.is_some_and(|k| k != TokenType::SEMICOLON) {
                    self.pending = Some(rcurly);
                    return Some(Token::new(TokenType::SEMICOLON, "", self.start_pos));
                }

                return Some(rcurly);
            }

            // ── one or two char operators ────────────────────────────────
            '+' => self.scan2(TokenType::PLUS, TokenType::PLUS_ASSIGN),
            '-' => self.scan2(TokenType::MINUS, TokenType::MINUS_ASSIGN),
            '*' => self.scan2(TokenType::MULT, TokenType::MULT_ASSIGN),
            '%' => self.scan2(TokenType::MOD, TokenType::MOD_ASSIGN),
            '=' => self.scan2(TokenType::ASSIGN, TokenType::EQ),
            '!' => self.scan2(TokenType::LOGICAL_NOT, TokenType::NEQ),
            '<' => self.scan2(TokenType::SM, TokenType::SMEQ),
            '>' => self.scan2(TokenType::GR, TokenType::GREQ),

            '&' | '|' => {
                if self.match_char(c) {
                    if c == '&' {
                        TokenType::LOGICAL_AND
                    } else {
                        TokenType::LOGICAL_OR
                    }
                } else {
                    self.error(
                        self.start_pos,
                        format!("unexpected character: {}", fmt_rune(c)),
                    );
                    TokenType::ERROR
                }
            }

            // ── comments or division ─────────────────────────────────────
            '/' => match self.peek() {
                Some('/') => {
                    // up to, not including, the newline so ASI still sees it
                    let end = memchr(b'\n', self.rest().as_bytes())
                        .map_or(self.src.len(), |off| self.curr + off);
                    self.jump_to(end);
                    return None;
                }
                Some('*') => {
                    self.skip_block_comment();
                    return None;
                }
                _ => self.scan2(TokenType::DIV, TokenType::DIV_ASSIGN),
            },

            // ── newlines: automatic semicolon insertion ─────────────────
            '\n' => {
                let newline = self.text();

                self.advance_while(|c| matches!(c, '\n' | ' ' | '\t' | '\r'));

                if self.last.is_some_and(TokenType::ends_statement) {
                    return Some(Token::new(TokenType::SEMICOLON, newline, self.start_pos));
                }

                return None;
            }

            // ── literals ────────────────────────────────────────────────
            '\'' => return Some(self.scan_quoted_string()),
            '`' => return Some(self.scan_raw_string()),
            '0'..='9' => self.scan_number(c),

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                self.error(self.start_pos, format!("illegal character: {}", fmt_rune(c)));
                TokenType::ERROR
            }
        };

        Some(self.token(kind))
    }

    /// `one` or, if the next char is `=`, the two char form `two`.
    fn scan2(&mut self, one: TokenType, two: TokenType) -> TokenType {
        if self.match_char('=') {
            two
        } else {
            one
        }
    }

    fn close_bracket(&mut self, closer: char, opener: char) {
        match self.brackets.pop() {
            Some((open, _)) if open == opener => {}
            _ => self.error(
                self.start_pos,
                format!("unexpected right bracket {}", fmt_rune(closer)),
            ),
        }
    }

    /// Skip `/* ... */`; `self.start` points at the `/`.
    fn skip_block_comment(&mut self) {
        self.advance(); // '*'

        match memmem::find(self.rest().as_bytes(), b"*/") {
            Some(off) => {
                let end = self.curr + off + 2;
                self.jump_to(end);
            }
            None => {
                self.error(self.start_pos, "unterminated block comment");
                self.jump_to(self.src.len());
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenType {
        self.advance_while(|c| c.is_alphanumeric() || c == '_');

        TokenType::keyword(self.text()).unwrap_or(TokenType::NAME)
    }

    /// Quoted string; escapes are left untouched, a backslash only protects
    /// the following char.
    fn scan_quoted_string(&mut self) -> Token<'a> {
        let body = self.curr;

        loop {
            match self.peek() {
                None => break,
                Some('\'') => {
                    let text = &self.src[body..self.curr];
                    let tok = Token::new(TokenType::STRING, text, self.start_pos);
                    self.advance();
                    return tok;
                }
                Some('\\') => {
                    self.advance();

                    match self.peek() {
                        None | Some('\n') => break,
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        self.error(self.start_pos, "unterminated quoted string");
        Token::new(TokenType::STRING, &self.src[body..self.curr], self.start_pos)
    }

    fn scan_raw_string(&mut self) -> Token<'a> {
        let body = self.curr;

        match memchr(b'`', self.rest().as_bytes()) {
            Some(off) => {
                let end = self.curr + off;
                self.jump_to(end);
                let tok = Token::new(TokenType::RAWSTRING, &self.src[body..end], self.start_pos);
                self.advance();
                tok
            }
            None => {
                self.error(self.start_pos, "unterminated raw string");
                self.jump_to(self.src.len());
                Token::new(TokenType::RAWSTRING, &self.src[body..], self.start_pos)
            }
        }
    }

    /// Number literal; `first` is a digit or a `.` followed by a digit.
    fn scan_number(&mut self, first: char) -> TokenType {
        if first == '.' {
            self.advance_while(|c| c.is_ascii_digit());
            self.scan_exponent();
            return TokenType::FLOAT;
        }

        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit());

            if self.curr - self.start <= 2 {
                let msg = format!("illegal hexadecimal number: {:?}", self.text());
                self.error(self.pos(), msg);
            }

            return TokenType::INT;
        }

        // decimal run; with a leading 0 this is octal unless a fraction or
        // exponent follows
        let mut bad_octal: Option<Pos> = None;
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            if first == '0' && bad_octal.is_none() && matches!(c, '8' | '9') {
                bad_octal = Some(self.pos());
            }
            self.advance();
        }

        let mut kind = TokenType::INT;

        if self.peek() == Some('.') {
            let dot = self.pos();
            self.advance();
            kind = TokenType::FLOAT;

            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.error(dot, "Illegal trailing decimal point after number");
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        if self.scan_exponent() {
            kind = TokenType::FLOAT;
        }

        if let (TokenType::INT, Some(pos)) = (kind, bad_octal) {
            let msg = format!("illegal octal number: {:?}", self.text());
            self.error(pos, msg);
        }

        kind
    }

    /// Optional `e`/`E`, sign and digits. Returns whether a marker was seen.
    fn scan_exponent(&mut self) -> bool {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return false;
        }
        self.advance();

        if matches!(self.peek(), Some('+' | '-'))
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
        }

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance_while(|c| c.is_ascii_digit());
        } else {
            let msg = format!("Illegal floating-point exponent: {:?}", self.text());
            self.error(self.pos(), msg);
        }

        true
    }
}

/// `U+0024 '$'`, the form used in character related messages.
pub fn fmt_rune(c: char) -> String {
    format!("U+{:04X} {:?}", c as u32, c)
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("name", &self.name)
            .field("pos", &self.pos())
            .field("brackets", &self.brackets)
            .field("last", &self.last)
            .field("errors", &self.errors.len())
            .finish()
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token up to and including the first `EOF`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let tok = Lexer::scan(self);
        self.finished = tok.kind == TokenType::EOF;

        Some(tok)
    }
}

impl FusedIterator for Lexer<'_> {}
