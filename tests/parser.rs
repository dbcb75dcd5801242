#[cfg(test)]
mod parser_tests {
    use went::ast::{Expr, Stmt};
    use went::ast_printer::AstPrinter;
    use went::lexer::Lexer;
    use went::parser::{parse, Parser, MAX_NESTING};
    use went::token::{Pos, TokenType};
    use went::ErrorKind;

    use test_case::test_case;

    fn prefix(source: &str) -> String {
        let ast = parse("test", source).unwrap();
        let root = ast.expression().expect("single expression");

        AstPrinter::print(&ast, root)
    }

    #[test_case("1 + 2 * 3", "(+ 1 (* 2 3))" ; "mul binds tighter than add")]
    #[test_case("-2 * 3", "(* (- 2) 3)" ; "unary minus binds tightest")]
    #[test_case("8 - 3 - 2", "(- (- 8 3) 2)" ; "sub is left associative")]
    #[test_case("1 % 2 / 3", "(/ (% 1 2) 3)" ; "mul level is left associative")]
    #[test_case("1 + 2 < 4", "(< (+ 1 2) 4)" ; "comparison over arithmetic")]
    #[test_case("(1 + 2) * 3", "(* (+ 1 2) 3)" ; "parentheses")]
    #[test_case("a || b && c", "(|| a (&& b c))" ; "and binds tighter than or")]
    #[test_case("!a == b", "(! (== a b))" ; "not is looser than comparison")]
    #[test_case("!!a", "(! (! a))" ; "double not")]
    #[test_case("--x", "(- (- x))" ; "nested unary minus")]
    #[test_case("+x", "(+ x)" ; "unary plus")]
    #[test_case("a <= b >= c", "(>= (<= a b) c)" ; "comparison chain folds left")]
    #[test_case("null != true", "(!= null true)" ; "not equal")]
    #[test_case("a > b", "(> a b)" ; "greater")]
    #[test_case("x in [1, 2,]", "(in x (list 1 2))" ; "in with trailing comma list")]
    #[test_case("a ! in b", "(!in a b)" ; "not in")]
    #[test_case("[]", "(list)" ; "empty list")]
    #[test_case("[[1], 'a']", "(list (list 1) 'a')" ; "nested list")]
    #[test_case("'s' + `r`", "(+ 's' `r`)" ; "string literals")]
    #[test_case("(1 +\n 2)\n", "(+ 1 2)" ; "newline after operator is ignored")]
    #[test_case("0x1F * 1.5e2", "(* 0x1F 1.5e2)" ; "number text is kept")]
    fn expression_shape(source: &str, expected: &str) {
        assert_eq!(prefix(source), expected);
    }

    #[test]
    fn statements_are_split_on_semicolons_and_newlines() {
        let ast = parse("test", "1\n2;3").unwrap();

        assert_eq!(ast.statements().len(), 3);
        assert_eq!(AstPrinter::print_program(&ast), vec!["1", "2", "3"]);
        assert_eq!(ast.expression(), None);
    }

    #[test_case("" ; "empty")]
    #[test_case(";;\n;" ; "only semicolons")]
    #[test_case("// just a comment\n" ; "only a comment")]
    fn empty_programs(source: &str) {
        let ast = parse("test", source).unwrap();

        assert!(ast.statements().is_empty());
        assert!(ast.is_empty());
    }

    #[test]
    fn expression_statement_wraps_root() {
        let ast = parse("test", "a + b").unwrap();

        let Stmt::Expr(stmt) = &ast.statements()[0];
        assert!(matches!(ast.node(stmt.expr), Expr::Add(_)));
    }

    #[test_case("1 +", "test:1:4: unexpected EOF in atom" ; "missing operand")]
    #[test_case("1 + \n", "test:2:1: unexpected EOF in atom" ; "operand after newline")]
    #[test_case("1 2", "test:1:3: unexpected \"2\" in statement" ; "two atoms")]
    #[test_case("x = 1", "test:1:3: unexpected \"=\" in statement" ; "assignment is not an expression")]
    #[test_case("(1 2)", "test:1:4: expected ')' in parenthesised expression, found \"2\"" ; "unclosed group")]
    #[test_case("[1 2]", "test:1:4: unexpected \"2\" in list literal" ; "missing list comma")]
    #[test_case("[1\n, 2]", "test:1:3: unexpected newline in list literal" ; "newline ends list element")]
    #[test_case("* 2", "test:1:1: unexpected \"*\" in atom" ; "leading operator")]
    #[test_case("a !b", "test:1:3: unexpected \"!\" in statement" ; "bang without in")]
    #[test_case("if", "test:1:1: unexpected <if> in atom" ; "keyword")]
    fn syntax_errors(source: &str, expected: &str) {
        let err = parse("test", source).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn oversized_integer_literal_is_a_syntax_error() {
        let err = parse("test", "1 + 99999999999999999999").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Pos::new(1, 5));
        assert_eq!(err.message(), "integer overflow: \"99999999999999999999\"");
    }

    #[test_case("1 $ 2", "test:1:3: illegal character: U+0024 '$'" ; "illegal character")]
    #[test_case("(1 + 2", "test:1:1: unclosed left bracket: U+0028 '('" ; "unclosed bracket")]
    #[test_case("089", "test:1:2: illegal octal number: \"089\"" ; "bad octal")]
    fn first_lexical_error_aborts_parse(source: &str, expected: &str) {
        let err = parse("test", source).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Lex);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn backup_replays_tokens_in_order() {
        let mut parser = Parser::new(Lexer::new("test", "a b c"));

        let a = parser.next().unwrap();
        let b = parser.next().unwrap();
        assert_eq!(parser.peek().unwrap().text, "c");

        parser.backup(&[a, b]);

        assert_eq!(parser.peek().unwrap().text, "a");
        assert_eq!(parser.next().unwrap().text, "a");
        assert_eq!(parser.next().unwrap().text, "b");
        assert_eq!(parser.next().unwrap().text, "c");
        assert_eq!(parser.next().unwrap().kind, TokenType::EOF);
    }

    #[test]
    fn node_positions_cover_source() {
        let ast = parse("test", "  foo + [1,\n 22]").unwrap();
        let root = ast.expression().unwrap();

        assert_eq!(ast.start_pos(root), Pos::new(1, 3));
        assert_eq!(ast.end_pos(root), Pos::new(2, 5));

        let ast = parse("test", "-'ab'").unwrap();
        let root = ast.expression().unwrap();

        assert_eq!(ast.start_pos(root), Pos::new(1, 1));
        assert_eq!(ast.end_pos(root), Pos::new(1, 6));
    }

    #[test_case("0" ; "zero")]
    #[test_case("42" ; "decimal")]
    #[test_case("0x2A" ; "hexadecimal")]
    #[test_case("052" ; "octal")]
    #[test_case("9007199254740992" ; "two to the fifty three")]
    fn integer_literals_agree_with_their_float(source: &str) {
        let ast = parse("test", source).unwrap();

        let Expr::Num(lit) = ast.node(ast.expression().unwrap()) else {
            panic!("expected a number literal");
        };

        assert_eq!(lit.token.text, source);

        assert!(lit.is_int());
        let int = lit.int.expect("integer view");
        assert_eq!(int as f64, lit.float);
    }

    #[test]
    fn strings_are_unescaped_unless_raw() {
        let ast = parse("test", r"'a\tb'; `a\tb`").unwrap();

        let values: Vec<&str> = ast
            .statements()
            .iter()
            .map(|stmt| {
                let Stmt::Expr(s) = stmt;
                match ast.node(s.expr) {
                    Expr::Str(lit) => lit.value.as_str(),
                    other => panic!("unexpected node {:?}", other),
                }
            })
            .collect();

        assert_eq!(values, vec!["a\tb", r"a\tb"]);
    }

    #[test_case("(", ")" ; "parentheses")]
    #[test_case("[", "]" ; "list literals")]
    #[test_case("-", "" ; "unary minus")]
    #[test_case("!", "" ; "logical not")]
    fn nesting_past_limit_is_a_syntax_error(open: &str, close: &str) {
        let source = format!("{}x{}", open.repeat(200), close.repeat(200));

        let err = parse("test", &source).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Pos::new(1, MAX_NESTING as u32 + 1));
        assert_eq!(err.message(), "expression nested too deeply");
    }

    #[test]
    fn nesting_up_to_limit_parses() {
        let source = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(prefix(&source), "1");

        let source = format!("{}1", "-".repeat(MAX_NESTING));
        assert!(parse("test", &source).is_ok());
    }

    #[test]
    fn long_flat_chain_parses() {
        let source = format!("1{}", " + 1".repeat(10_000));

        let ast = parse("test", &source).unwrap();
        let root = ast.expression().unwrap();

        assert_eq!(ast.len(), 20_001);
        assert_eq!(ast.start_pos(root), Pos::new(1, 1));
        assert_eq!(ast.end_pos(root), Pos::new(1, source.len() as u32 + 1));
    }
}
