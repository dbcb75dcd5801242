#[cfg(test)]
mod lexer_tests {
    use went::lexer::Lexer;
    use went::token::{Pos, Token, TokenType};
    use went::ErrorKind;

    use test_case::test_case;

    use TokenType::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        Lexer::new("test", source).map(|t| t.kind).collect()
    }

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let tokens: Vec<Token<'_>> = Lexer::new("test", source).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_kind, expected_text)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_kind);
            assert_eq!(actual.text, *expected_text);
        }
    }

    /// Messages and positions of every error reported while scanning `source`.
    fn errors(source: &str) -> Vec<(String, Pos)> {
        let mut lexer = Lexer::new("test", source);
        lexer.by_ref().for_each(drop);

        lexer
            .errors()
            .iter()
            .map(|e| {
                assert_eq!(e.kind(), ErrorKind::Lex);
                (e.message().to_owned(), e.position())
            })
            .collect()
    }

    #[test_case("" ; "empty input")]
    #[test_case("x" ; "single name")]
    #[test_case("(" ; "unclosed bracket")]
    #[test_case("'abc" ; "unterminated string")]
    #[test_case("a /* b" ; "unterminated comment")]
    fn eof_is_idempotent(source: &str) {
        let mut lexer = Lexer::new("test", source);

        let eof = loop {
            let tok = Lexer::scan(&mut lexer);
            if tok.kind == EOF {
                break tok;
            }
        };
        let reported = lexer.error_count();

        for _ in 0..5 {
            assert_eq!(Lexer::scan(&mut lexer), eof);
        }
        assert_eq!(lexer.error_count(), reported);
    }

    #[test_case("x\n", &[NAME, SEMICOLON, EOF] ; "after name")]
    #[test_case("(x+1)\n", &[LROUND, NAME, PLUS, INT, RROUND, SEMICOLON, EOF] ; "after closing round")]
    #[test_case("x+\n", &[NAME, PLUS, EOF] ; "not after operator")]
    #[test_case("return\n\n\nbreak\n", &[RETURN, SEMICOLON, BREAK, SEMICOLON, EOF] ; "newline runs collapse")]
    #[test_case("continue\n", &[CONTINUE, SEMICOLON, EOF] ; "after continue")]
    #[test_case("'s'\n`r`\n", &[STRING, SEMICOLON, RAWSTRING, SEMICOLON, EOF] ; "after strings")]
    #[test_case("1.5\n[]\n", &[FLOAT, SEMICOLON, LSQUARE, RSQUARE, SEMICOLON, EOF] ; "after float and square")]
    #[test_case("true\nnull\n", &[TRUE, NULL, EOF] ; "not after true or null")]
    #[test_case("a // note\nb", &[NAME, SEMICOLON, NAME, EOF] ; "line comment keeps newline")]
    #[test_case("x;\n", &[NAME, SEMICOLON, EOF] ; "not after explicit semicolon")]
    fn automatic_semicolons(source: &str, expected: &[TokenType]) {
        assert_eq!(kinds(source), expected);
    }

    #[test]
    fn asi_semicolon_is_synthetic_newline() {
        let tokens: Vec<Token<'_>> = Lexer::new("test", "ab\n\n  cd").collect();

        assert_eq!(tokens[1].kind, SEMICOLON);
        assert_eq!(tokens[1].text, "\n");
        assert_eq!(tokens[1].pos, Pos::new(1, 3));
        assert_eq!(tokens[1].to_string(), "newline");
        assert_eq!(tokens[2].pos, Pos::new(3, 3));
    }

    #[test_case("{x}", &[LCURLY, NAME, SEMICOLON, RCURLY, EOF] ; "inserted before curly")]
    #[test_case("{x;}", &[LCURLY, NAME, SEMICOLON, RCURLY, EOF] ; "not doubled")]
    #[test_case("{x\n}", &[LCURLY, NAME, SEMICOLON, RCURLY, EOF] ; "newline already terminated")]
    #[test_case("{\n}", &[LCURLY, SEMICOLON, RCURLY, EOF] ; "empty block")]
    fn closing_curly_terminates_statement(source: &str, expected: &[TokenType]) {
        assert_eq!(kinds(source), expected);
    }

    #[test]
    fn semicolon_before_curly_has_no_text() {
        let tokens: Vec<Token<'_>> = Lexer::new("test", "{x}").collect();

        assert_eq!(tokens[2], Token::new(SEMICOLON, "", Pos::new(1, 3)));
        assert_eq!(tokens[3], Token::new(RCURLY, "}", Pos::new(1, 3)));
        assert_eq!(tokens[2].to_string(), ";");
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("+ += - -= * *= / /= % %= = == ! != < <= > >= && || . : ,"),
            vec![
                PLUS, PLUS_ASSIGN, MINUS, MINUS_ASSIGN, MULT, MULT_ASSIGN, DIV, DIV_ASSIGN, MOD,
                MOD_ASSIGN, ASSIGN, EQ, LOGICAL_NOT, NEQ, SM, SMEQ, GR, GREQ, LOGICAL_AND,
                LOGICAL_OR, DOT, COLON, COMMA, EOF
            ]
        );
    }

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            kinds("func if else elif for null false true while return in break continue var"),
            vec![
                FUNC, IF, ELSE, ELIF, FOR, NULL, FALSE, TRUE, WHILE, RETURN, IN, BREAK, CONTINUE,
                VAR, EOF
            ]
        );

        assert_token_sequence(
            "foo _bar b4z größe",
            &[
                (NAME, "foo"),
                (NAME, "_bar"),
                (NAME, "b4z"),
                (NAME, "größe"),
                (EOF, ""),
            ],
        );
    }

    #[test_case("42", INT ; "decimal")]
    #[test_case("0", INT ; "zero")]
    #[test_case("0x1F", INT ; "hexadecimal")]
    #[test_case("0XaB", INT ; "upper hex prefix")]
    #[test_case("017", INT ; "octal")]
    #[test_case("3.14", FLOAT ; "fraction")]
    #[test_case(".5", FLOAT ; "leading dot")]
    #[test_case("1e10", FLOAT ; "exponent")]
    #[test_case("2E-3", FLOAT ; "signed exponent")]
    #[test_case("09.5", FLOAT ; "octal looking float")]
    #[test_case("08e1", FLOAT ; "octal looking exponent")]
    fn numbers_keep_their_text(source: &str, kind: TokenType) {
        assert_token_sequence(source, &[(kind, source), (EOF, "")]);
        assert!(errors(source).is_empty());
    }

    #[test_case("0x", "illegal hexadecimal number: \"0x\"", Pos::new(1, 3) ; "hex without digits")]
    #[test_case("089", "illegal octal number: \"089\"", Pos::new(1, 2) ; "octal with eight")]
    #[test_case("1.", "Illegal trailing decimal point after number", Pos::new(1, 2) ; "trailing point")]
    #[test_case("1e", "Illegal floating-point exponent: \"1e\"", Pos::new(1, 3) ; "missing exponent")]
    #[test_case("2e+", "Illegal floating-point exponent: \"2e\"", Pos::new(1, 3) ; "sign without digits")]
    fn number_errors(source: &str, message: &str, pos: Pos) {
        assert_eq!(errors(source), vec![(message.to_owned(), pos)]);
    }

    #[test]
    fn dot_without_digit_is_punctuation() {
        assert_token_sequence("a.b", &[(NAME, "a"), (DOT, "."), (NAME, "b"), (EOF, "")]);
    }

    #[test]
    fn quoted_string_keeps_escapes() {
        let tokens: Vec<Token<'_>> = Lexer::new("test", r"x 'a\'b\n'").collect();

        assert_eq!(tokens[1], Token::new(STRING, r"a\'b\n", Pos::new(1, 3)));
        assert_eq!(tokens[1].end_pos(), Pos::new(1, 11));
    }

    #[test]
    fn raw_string_spans_lines() {
        let tokens: Vec<Token<'_>> = Lexer::new("test", "`x\ny` z").collect();

        assert_eq!(tokens[0], Token::new(RAWSTRING, "x\ny", Pos::new(1, 1)));
        assert_eq!(tokens[1], Token::new(NAME, "z", Pos::new(2, 4)));
    }

    #[test]
    fn unterminated_strings_report_the_opening_quote() {
        assert_eq!(
            errors("x = 'abc"),
            vec![("unterminated quoted string".to_owned(), Pos::new(1, 5))]
        );
        assert_eq!(
            errors("'abc\\"),
            vec![("unterminated quoted string".to_owned(), Pos::new(1, 1))]
        );
        assert_eq!(
            errors("\n  `abc\ndef"),
            vec![("unterminated raw string".to_owned(), Pos::new(2, 3))]
        );

        assert_token_sequence("'abc", &[(STRING, "abc"), (EOF, "")]);
    }

    #[test]
    fn block_comments_track_lines() {
        let tokens: Vec<Token<'_>> = Lexer::new("test", "/* a\nb */ x").collect();

        assert_eq!(tokens[0], Token::new(NAME, "x", Pos::new(2, 6)));
    }

    #[test]
    fn unterminated_block_comment_reports_its_start() {
        assert_eq!(kinds("a /* never\nclosed"), vec![NAME, EOF]);
        assert_eq!(
            errors("a /* never\nclosed"),
            vec![("unterminated block comment".to_owned(), Pos::new(1, 3))]
        );
    }

    #[test_case("([{}])" ; "nested")]
    #[test_case("(a)[b]{c}" ; "sequential")]
    #[test_case("f(\n  [1,\n   2]\n)" ; "across lines")]
    fn balanced_brackets_lex_cleanly(source: &str) {
        assert!(errors(source).is_empty());
    }

    #[test]
    fn unclosed_bracket_reported_once_at_opener() {
        assert_eq!(
            errors("(\n  ["),
            vec![("unclosed left bracket: U+005B '['".to_owned(), Pos::new(2, 3))]
        );
    }

    #[test_case("(]", Pos::new(1, 2), ']' ; "mismatched")]
    #[test_case("a)", Pos::new(1, 2), ')' ; "premature")]
    #[test_case("[x}", Pos::new(1, 3), '}' ; "wrong closer")]
    fn unexpected_closer_reported_once(source: &str, pos: Pos, closer: char) {
        let message = format!("unexpected right bracket U+{:04X} '{}'", closer as u32, closer);

        assert_eq!(errors(source), vec![(message, pos)]);
    }

    #[test]
    fn unexpected_closer_still_emitted() {
        assert_eq!(kinds("a)"), vec![NAME, RROUND, EOF]);
    }

    #[test]
    fn illegal_character_yields_error_token() {
        assert_token_sequence(",$x", &[(COMMA, ","), (ERROR, "$"), (NAME, "x"), (EOF, "")]);
        assert_eq!(
            errors(",$x"),
            vec![("illegal character: U+0024 '$'".to_owned(), Pos::new(1, 2))]
        );
    }

    #[test_case("a & b", '&' ; "lone ampersand")]
    #[test_case("a | b", '|' ; "lone bar")]
    fn single_logical_char_is_an_error(source: &str, c: char) {
        assert_eq!(kinds(source), vec![NAME, ERROR, NAME, EOF]);

        let message = format!("unexpected character: U+{:04X} '{}'", c as u32, c);
        assert_eq!(errors(source), vec![(message, Pos::new(1, 3))]);
    }

    #[test]
    fn handler_sees_every_error() {
        let mut seen = Vec::new();

        {
            let mut lexer =
                Lexer::new("input.went", "$ (").with_handler(|e| seen.push(e.to_string()));
            lexer.by_ref().for_each(drop);
            assert_eq!(lexer.error_count(), 2);
        }

        assert_eq!(
            seen,
            vec![
                "input.went:1:1: illegal character: U+0024 '$'".to_owned(),
                "input.went:1:3: unclosed left bracket: U+0028 '('".to_owned(),
            ]
        );
    }

    #[test]
    fn iterator_stops_after_eof() {
        let mut lexer = Lexer::new("test", "a b");

        assert_eq!(lexer.by_ref().count(), 3);
        assert_eq!(lexer.next(), None);
        assert_eq!(Lexer::scan(&mut lexer).kind, EOF);
    }

    #[test]
    fn token_display() {
        let pos = Pos::new(1, 1);

        assert_eq!(Token::new(NAME, "x", pos).to_string(), "<NAME:\"x\">");
        assert_eq!(Token::new(IN, "in", pos).to_string(), "<in>");
        assert_eq!(Token::new(INT, "42", pos).to_string(), "\"42\"");
        assert_eq!(Token::new(ERROR, "$", pos).to_string(), "<err: $>");
        assert_eq!(Token::new(EOF, "", pos).to_string(), "EOF");
    }

    #[test]
    fn tokenize_sorts_and_dedups_errors() {
        let (tokens, errors) = went::tokenize("test", "$ $\n#");

        assert_eq!(tokens.last().map(|t| t.kind), Some(EOF));

        let positions: Vec<Pos> = errors.iter().map(|e| e.position()).collect();
        assert_eq!(positions, vec![Pos::new(1, 1), Pos::new(2, 1)]);
    }
}
