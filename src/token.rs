use log::trace;
use phf::phf_map;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognised by the Went lexer.
///
/// Variants carry no data: the source text of every token lives in
/// [`Token::text`], so a kind can be compared, hashed and copied freely.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    /// Lexical error recovery token; the text is the offending input.
    ERROR,

    /// End‑of‑file marker
    EOF,

    /// '.'
    DOT,

    /// ':'
    COLON,

    /// ';' (written, or inserted automatically)
    SEMICOLON,

    /// ','
    COMMA,

    /// '('
    LROUND,

    /// '{'
    LCURLY,

    /// '['
    LSQUARE,

    /// ')'
    RROUND,

    /// '}'
    RCURLY,

    /// ']'
    RSQUARE,

    /// A user‑defined identifier
    NAME,

    /// Integer literal (decimal, octal or hexadecimal)
    INT,

    /// Floating point literal
    FLOAT,

    /// Single‑quoted string, text is the raw (still escaped) interior
    STRING,

    /// Backtick‑delimited raw string
    RAWSTRING,

    /// '+'
    PLUS,

    /// '-'
    MINUS,

    /// '/'
    DIV,

    /// '*'
    MULT,

    /// '%'
    MOD,

    /// '='
    ASSIGN,

    /// '+='
    PLUS_ASSIGN,

    /// '-='
    MINUS_ASSIGN,

    /// '/='
    DIV_ASSIGN,

    /// '*='
    MULT_ASSIGN,

    /// '%='
    MOD_ASSIGN,

    /// '=='
    EQ,

    /// '!='
    NEQ,

    /// '>'
    GR,

    /// '<'
    SM,

    /// '>='
    GREQ,

    /// '<='
    SMEQ,

    /// '!'
    LOGICAL_NOT,

    /// '||'
    LOGICAL_OR,

    /// '&&'
    LOGICAL_AND,

    /// 'func'
    FUNC,

    /// 'if'
    IF,

    /// 'else'
    ELSE,

    /// 'elif'
    ELIF,

    /// 'for'
    FOR,

    /// 'null'
    NULL,

    /// 'false'
    FALSE,

    /// 'true'
    TRUE,

    /// 'while'
    WHILE,

    /// 'return'
    RETURN,

    /// 'in'
    IN,

    /// 'break'
    BREAK,

    /// 'continue'
    CONTINUE,

    /// 'var'
    VAR,
}

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "func"     => TokenType::FUNC,
    "if"       => TokenType::IF,
    "else"     => TokenType::ELSE,
    "elif"     => TokenType::ELIF,
    "for"      => TokenType::FOR,
    "null"     => TokenType::NULL,
    "false"    => TokenType::FALSE,
    "true"     => TokenType::TRUE,
    "while"    => TokenType::WHILE,
    "return"   => TokenType::RETURN,
    "in"       => TokenType::IN,
    "break"    => TokenType::BREAK,
    "continue" => TokenType::CONTINUE,
    "var"      => TokenType::VAR,
};

impl TokenType {
    /// Look `word` up in the keyword table.
    pub fn keyword(word: &str) -> Option<TokenType> {
        KEYWORDS.get(word).copied()
    }

    /// Is this one of the reserved words?
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenType::FUNC
                | TokenType::IF
                | TokenType::ELSE
                | TokenType::ELIF
                | TokenType::FOR
                | TokenType::NULL
                | TokenType::FALSE
                | TokenType::TRUE
                | TokenType::WHILE
                | TokenType::RETURN
                | TokenType::IN
                | TokenType::BREAK
                | TokenType::CONTINUE
                | TokenType::VAR
        )
    }

    /// Tokens after which a newline terminates the statement.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenType::NAME
                | TokenType::STRING
                | TokenType::RAWSTRING
                | TokenType::INT
                | TokenType::FLOAT
                | TokenType::BREAK
                | TokenType::CONTINUE
                | TokenType::RETURN
                | TokenType::RROUND
                | TokenType::RSQUARE
                | TokenType::RCURLY
        )
    }

    /// Source spelling of punctuation, operators and keywords, or the
    /// category name for tokens whose text varies.
    pub fn symbol(self) -> &'static str {
        match self {
            TokenType::ERROR => "ERROR",
            TokenType::EOF => "EOF",
            TokenType::DOT => ".",
            TokenType::COLON => ":",
            TokenType::SEMICOLON => ";",
            TokenType::COMMA => ",",
            TokenType::LROUND => "(",
            TokenType::LCURLY => "{",
            TokenType::LSQUARE => "[",
            TokenType::RROUND => ")",
            TokenType::RCURLY => "}",
            TokenType::RSQUARE => "]",
            TokenType::NAME => "NAME",
            TokenType::INT => "INTEGER",
            TokenType::FLOAT => "FLOAT",
            TokenType::STRING => "STRING",
            TokenType::RAWSTRING => "RAWSTRING",
            TokenType::PLUS => "+",
            TokenType::MINUS => "-",
            TokenType::DIV => "/",
            TokenType::MULT => "*",
            TokenType::MOD => "%",
            TokenType::ASSIGN => "=",
            TokenType::PLUS_ASSIGN => "+=",
            TokenType::MINUS_ASSIGN => "-=",
            TokenType::DIV_ASSIGN => "/=",
            TokenType::MULT_ASSIGN => "*=",
            TokenType::MOD_ASSIGN => "%=",
            TokenType::EQ => "==",
            TokenType::NEQ => "!=",
            TokenType::GR => ">",
            TokenType::SM => "<",
            TokenType::GREQ => ">=",
            TokenType::SMEQ => "<=",
            TokenType::LOGICAL_NOT => "!",
            TokenType::LOGICAL_OR => "||",
            TokenType::LOGICAL_AND => "&&",
            TokenType::FUNC => "func",
            TokenType::IF => "if",
            TokenType::ELSE => "else",
            TokenType::ELIF => "elif",
            TokenType::FOR => "for",
            TokenType::NULL => "null",
            TokenType::FALSE => "false",
            TokenType::TRUE => "true",
            TokenType::WHILE => "while",
            TokenType::RETURN => "return",
            TokenType::IN => "in",
            TokenType::BREAK => "break",
            TokenType::CONTINUE => "continue",
            TokenType::VAR => "var",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A source position: 1‑based line and column (columns count characters).
///
/// Line `0` marks an unknown position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Does this position point into an input?
    pub const fn is_valid(&self) -> bool {
        self.line > 0
    }

    /// The position reached after reading `text` starting at `self`.
    pub fn advance(self, text: &str) -> Pos {
        text.chars().fold(self, |pos, c| {
            if c == '\n' {
                Pos::new(pos.line + 1, 1)
            } else {
                Pos::new(pos.line, pos.col + 1)
            }
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A scanned token: its kind, the exact source text it covers and the
/// position of its first character.
///
/// The lifetime `'a` ties `text` back to the lexer's input. Strings keep only
/// their interior (without quotes) but are positioned at the opening quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub text: &'a str,
    pub pos: Pos,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenType, text: &'a str, pos: Pos) -> Self {
        trace!("Creating token: kind={:?}, text={:?}, pos={}", kind, text, pos);

        Self { kind, text, pos }
    }

    /// The position one past the last character of this token.
    pub fn end_pos(&self) -> Pos {
        match self.kind {
            TokenType::STRING | TokenType::RAWSTRING => {
                // opening quote, interior, closing quote
                let inner = Pos::new(self.pos.line, self.pos.col + 1).advance(self.text);
                Pos::new(inner.line, inner.col + 1)
            }
            _ => self.pos.advance(self.text),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenType::EOF => f.write_str("EOF"),
            TokenType::ERROR => write!(f, "<err: {}>", self.text),
            TokenType::SEMICOLON if self.text == "\n" => f.write_str("newline"),
            TokenType::SEMICOLON => f.write_str(";"),
            TokenType::NAME => write!(f, "<NAME:{:?}>", self.text),
            kind if kind.is_keyword() => write!(f, "<{}>", self.text),
            _ => write!(f, "{:?}", self.text),
        }
    }
}
