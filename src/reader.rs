use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{opt, recognize},
};

use crate::ast::{IntegerType, Value};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Reader options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Maximum nesting of lists and quoted lists
    pub max_depth: usize,
    /// Treat `;` up to end of line as whitespace
    pub handle_comments: bool,
    /// Read unquoted, non-numeric atoms as symbols instead of rejecting them
    pub bare_symbols: bool,
}

impl Default for ReadConfig {
    fn default() -> Self {
        ReadConfig {
            max_depth: MAX_PARSE_DEPTH,
            handle_comments: false,
            bare_symbols: false,
        }
    }
}

/// Parse exactly one expression from `input` with the default configuration.
pub fn read(input: &str) -> Result<Value, ParseError> {
    read_with_config(input, ReadConfig::default())
}

/// Parse exactly one expression from `input`.
///
/// Leading and trailing whitespace is allowed; anything else after the expression is an error.
pub fn read_with_config(input: &str, config: ReadConfig) -> Result<Value, ParseError> {
    let mut reader = Reader {
        lexer: Lexer::new(input).with_comments(config.handle_comments),
        config,
    };

    let token = reader.lexer.next_token();
    if token.kind == TokenKind::EndOfInput {
        return Err(reader.error(ParseErrorKind::InvalidSyntax, "Empty input", &token));
    }

    let value = reader.read_expr(token, 0)?;
    reader.expect_end()?;
    Ok(value)
}

/// An optional `-` followed by decimal digits
fn integer_literal(input: &str) -> IResult<&str, &str> {
    recognize((opt(char('-')), digit1)).parse(input)
}

fn parse_integer(text: &str) -> Result<IntegerType, String> {
    match integer_literal(text) {
        Ok(("", literal)) => literal
            .parse::<IntegerType>()
            .map_err(|_| format!("Integer literal '{text}' is out of range")),
        _ => Err(format!("Invalid integer literal '{text}'")),
    }
}

/// Whether an atom must be read as an integer: a digit, or `-` then a digit
fn starts_integer(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

struct Reader<'a> {
    lexer: Lexer<'a>,
    config: ReadConfig,
}

impl<'a> Reader<'a> {
    fn error(&self, kind: ParseErrorKind, message: impl Into<String>, at: &Token) -> ParseError {
        let found = match at.kind {
            TokenKind::EndOfInput => None,
            _ => Some(at.text().to_owned()),
        };
        ParseError::with_context(kind, message, self.lexer.input(), at.offset, found)
    }

    fn read_expr(&mut self, token: Token<'a>, depth: usize) -> Result<Value, ParseError> {
        if depth >= self.config.max_depth {
            return Err(self.error(
                ParseErrorKind::TooDeeplyNested,
                format!(
                    "Expression too deeply nested (max depth: {})",
                    self.config.max_depth
                ),
                &token,
            ));
        }

        match token.kind {
            TokenKind::LeftParen => self.read_list(token, depth),
            TokenKind::RightParen => Err(self.error(
                ParseErrorKind::MismatchedParen,
                "Unexpected ')'",
                &token,
            )),
            TokenKind::Atom(text) => self.read_atom(token, text, depth),
            TokenKind::EndOfInput => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                "Unexpected end of input",
                &token,
            )),
        }
    }

    fn read_atom(
        &mut self,
        token: Token<'a>,
        text: &str,
        depth: usize,
    ) -> Result<Value, ParseError> {
        if let Some(quoted) = text.strip_prefix('\'') {
            if !quoted.is_empty() {
                return Ok(Value::Symbol(quoted.to_owned()));
            }
            // A lone quote only forms an expression when `(` follows immediately
            if self.lexer.peek_char() == Some('(') {
                let open = self.lexer.next_token();
                return self.read_expr(open, depth + 1);
            }
            return Err(self.error(
                ParseErrorKind::InvalidSyntax,
                "Quote must be followed by a symbol or '('",
                &token,
            ));
        }

        if starts_integer(text) {
            return parse_integer(text)
                .map(Value::Integer)
                .map_err(|message| self.error(ParseErrorKind::InvalidInteger, message, &token));
        }

        if self.config.bare_symbols && text != "." {
            return Ok(Value::Symbol(text.to_owned()));
        }

        let message = if text == "." {
            "Unexpected '.' outside the tail of a list".to_owned()
        } else {
            format!("Invalid syntax near '{text}'")
        };
        Err(self.error(ParseErrorKind::InvalidSyntax, message, &token))
    }

    /// Read list elements after `open` up to the matching `)`, with an optional `. tail`
    fn read_list(&mut self, open: Token<'a>, depth: usize) -> Result<Value, ParseError> {
        let mut elements = Vec::new();
        let mut tail = Value::Null;

        loop {
            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::RightParen => break,
                TokenKind::EndOfInput => {
                    return Err(self.error(
                        ParseErrorKind::MismatchedParen,
                        "Unclosed '(' at end of input",
                        &open,
                    ));
                }
                TokenKind::Atom(".") => {
                    if elements.is_empty() {
                        return Err(self.error(
                            ParseErrorKind::InvalidSyntax,
                            "'.' cannot start a list",
                            &token,
                        ));
                    }
                    tail = self.read_dotted_tail(&open, depth)?;
                    break;
                }
                _ => elements.push(self.read_expr(token, depth + 1)?),
            }
        }

        Ok(elements
            .into_iter()
            .rev()
            .fold(tail, |rest, first| Value::cons(first, rest)))
    }

    /// After a `.`: exactly one expression, then `)`
    fn read_dotted_tail(&mut self, open: &Token<'a>, depth: usize) -> Result<Value, ParseError> {
        let token = self.lexer.next_token();
        match token.kind {
            TokenKind::RightParen => {
                return Err(self.error(
                    ParseErrorKind::InvalidSyntax,
                    "Missing expression after '.'",
                    &token,
                ));
            }
            TokenKind::EndOfInput => {
                return Err(self.error(
                    ParseErrorKind::MismatchedParen,
                    "Unclosed '(' at end of input",
                    open,
                ));
            }
            TokenKind::Atom(".") => {
                return Err(self.error(
                    ParseErrorKind::InvalidSyntax,
                    "More than one '.' in a list",
                    &token,
                ));
            }
            _ => {}
        }

        let tail = self.read_expr(token, depth + 1)?;

        let close = self.lexer.next_token();
        match close.kind {
            TokenKind::RightParen => Ok(tail),
            TokenKind::EndOfInput => Err(self.error(
                ParseErrorKind::MismatchedParen,
                "Unclosed '(' at end of input",
                open,
            )),
            _ => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                "Expected ')' after the expression following '.'",
                &close,
            )),
        }
    }

    /// Reject anything after the top-level expression. Unbalanced parentheses in the
    /// trailing text are reported as parenthesis errors, anything else as extra input.
    fn expect_end(&mut self) -> Result<(), ParseError> {
        let first = self.lexer.next_token();
        if first.kind == TokenKind::EndOfInput {
            return Ok(());
        }

        let mut open_parens: Vec<Token> = Vec::new();
        let mut token = first;
        while token.kind != TokenKind::EndOfInput {
            match token.kind {
                TokenKind::LeftParen => open_parens.push(token),
                TokenKind::RightParen => {
                    if open_parens.pop().is_none() {
                        return Err(self.error(
                            ParseErrorKind::MismatchedParen,
                            "Unexpected ')'",
                            &token,
                        ));
                    }
                }
                _ => {}
            }
            token = self.lexer.next_token();
        }

        if let Some(unclosed) = open_parens.first() {
            return Err(self.error(
                ParseErrorKind::MismatchedParen,
                "Unclosed '(' at end of input",
                unclosed,
            ));
        }

        Err(self.error(
            ParseErrorKind::InvalidSyntax,
            "Unexpected remaining input after expression",
            &first,
        ))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{cons, int, nil, sym};
    use crate::printer::print;

    #[derive(Debug)]
    enum ReadTestResult {
        /// Reading succeeds with this value, and printing then re-reading gives the same text
        Success(Value),
        /// Reading fails with this error kind
        Fails(ParseErrorKind),
    }
    use ReadTestResult::*;

    fn success<T: Into<Value>>(value: T) -> ReadTestResult {
        Success(value.into())
    }

    fn run_read_tests(test_cases: Vec<(&str, ReadTestResult)>, config: ReadConfig) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Read test #{} ({input:?})", i + 1);
            let result = read_with_config(input, config);

            match (result, expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(actual, *expected_val, "{test_id}: value mismatch");

                    // Printed symbols are bare, so the second read must accept them
                    let displayed = print(&actual);
                    let reread_config = ReadConfig {
                        bare_symbols: true,
                        ..config
                    };
                    let reread = read_with_config(&displayed, reread_config).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip read failed for '{displayed}': {e:?}")
                    });
                    assert_eq!(
                        displayed,
                        print(&reread),
                        "{test_id}: round-trip print mismatch"
                    );
                }
                (Err(err), Fails(kind)) => {
                    assert_eq!(err.kind, *kind, "{test_id}: wrong error kind ({err})");
                }
                (Ok(actual), Fails(kind)) => {
                    panic!("{test_id}: expected {kind:?}, got {actual:?}");
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}");
                }
            }
        }
    }

    #[test]
    fn test_reader_comprehensive() {
        use ParseErrorKind::*;

        let test_cases = vec![
            // ===== INTEGERS =====
            ("42", success(42)),
            ("0", success(0)),
            ("007", success(7)),
            ("-42", success(-42)),
            ("-0", success(0)),
            ("9223372036854775807", success(i64::MAX)),
            ("-9223372036854775808", success(i64::MIN)),
            ("  42  ", success(42)),
            ("\t-5\n", success(-5)),
            ("-4a", Fails(InvalidInteger)),
            ("123abc", Fails(InvalidInteger)),
            ("3.14", Fails(InvalidInteger)),
            ("1-2", Fails(InvalidInteger)),
            ("--5", Fails(InvalidSyntax)),
            ("9223372036854775808", Fails(InvalidInteger)),
            ("-9223372036854775809", Fails(InvalidInteger)),
            ("99999999999999999999", Fails(InvalidInteger)),
            // ===== QUOTED SYMBOLS =====
            ("'foo", success(sym("foo"))),
            ("'Foo-Bar?", success(sym("Foo-Bar?"))),
            ("'+", success(sym("+"))),
            ("'-", success(sym("-"))),
            ("'12", success(sym("12"))),
            ("  'x  ", success(sym("x"))),
            ("'", Fails(InvalidSyntax)),
            ("' foo", Fails(InvalidSyntax)),
            ("' (1)", Fails(InvalidSyntax)),
            // ===== QUOTED LISTS =====
            ("'(1 2)", success([1, 2])),
            ("'()", success(nil())),
            ("'(1 . 2)", success(cons(1, 2))),
            ("'('a '('b))", success(vec![sym("a"), Value::from(vec![sym("b")])])),
            // ===== BARE ATOMS ARE NOT EXPRESSIONS =====
            ("foo", Fails(InvalidSyntax)),
            ("-", Fails(InvalidSyntax)),
            ("-abc", Fails(InvalidSyntax)),
            ("(foo)", Fails(InvalidSyntax)),
            (".", Fails(InvalidSyntax)),
            ("@", Fails(InvalidSyntax)),
            // ===== PROPER LISTS =====
            ("()", success(nil())),
            ("(   )", success(nil())),
            ("(\t\n)", success(nil())),
            ("(42)", success([42])),
            ("(1 2 3)", success([1, 2, 3])),
            ("( 1   2\t\n3 )", success([1, 2, 3])),
            ("((1 2) (3 4))", success([[1, 2], [3, 4]])),
            ("(((1)))", success([[[1]]])),
            ("(() ())", success(vec![nil(), nil()])),
            ("(1(2)3)", success(vec![int(1), Value::from([2]), int(3)])),
            ("(-1 'a)", success(vec![int(-1), sym("a")])),
            // ===== DOTTED LISTS =====
            ("(1 . 2)", success(cons(1, 2))),
            ("(1 2 . 3)", success(cons(1, cons(2, 3)))),
            ("(1 . 'a)", success(cons(1, sym("a")))),
            ("((1) . (2))", success(cons(Value::from([1]), Value::from([2])))),
            // A list tail splices into a proper list
            ("(1 . (2 3))", success([1, 2, 3])),
            ("(1 . ())", success([1])),
            ("(. 1)", Fails(InvalidSyntax)),
            ("(.)", Fails(InvalidSyntax)),
            ("(1 .)", Fails(InvalidSyntax)),
            ("(1 . 2 3)", Fails(InvalidSyntax)),
            ("(1 . . 2)", Fails(InvalidSyntax)),
            ("(1 . 2 . 3)", Fails(InvalidSyntax)),
            ("(1 .2)", Fails(InvalidSyntax)),
            ("(1 . 2", Fails(MismatchedParen)),
            ("(1 .", Fails(MismatchedParen)),
            // ===== MISMATCHED PARENTHESES =====
            ("(1 2", Fails(MismatchedParen)),
            ("((1 2)", Fails(MismatchedParen)),
            ("(", Fails(MismatchedParen)),
            ("'(", Fails(MismatchedParen)),
            (")", Fails(MismatchedParen)),
            (")(", Fails(MismatchedParen)),
            ("(1 2))", Fails(MismatchedParen)),
            ("1 2 3)", Fails(MismatchedParen)),
            // Surplus '(' after a complete expression
            ("42 (", Fails(MismatchedParen)),
            ("(1) (2", Fails(MismatchedParen)),
            ("'a ((", Fails(MismatchedParen)),
            ("() (", Fails(MismatchedParen)),
            ("1 (2 (3)", Fails(MismatchedParen)),
            // Errors inside a list are reported before the missing ')'
            ("(1 2a", Fails(InvalidInteger)),
            // ===== EMPTY INPUT AND TRAILING CONTENT =====
            ("", Fails(InvalidSyntax)),
            ("   ", Fails(InvalidSyntax)),
            ("\t\n", Fails(InvalidSyntax)),
            ("1 2", Fails(InvalidSyntax)),
            ("(1) (2)", Fails(InvalidSyntax)),
            ("'a 'b", Fails(InvalidSyntax)),
        ];

        run_read_tests(test_cases, ReadConfig::default());
    }

    #[test]
    fn test_bare_symbols_config() {
        use ParseErrorKind::*;

        let config = ReadConfig {
            bare_symbols: true,
            ..ReadConfig::default()
        };
        let test_cases = vec![
            ("foo", success(sym("foo"))),
            ("-", success(sym("-"))),
            ("-abc", success(sym("-abc"))),
            (
                "(+ 1 (* x 2))",
                success(vec![
                    sym("+"),
                    int(1),
                    Value::from(vec![sym("*"), sym("x"), int(2)]),
                ]),
            ),
            ("(a . b)", success(cons(sym("a"), sym("b")))),
            ("'foo", success(sym("foo"))),
            ("'(a 'b)", success(vec![sym("a"), sym("b")])),
            ("'('a (b))", success(vec![sym("a"), Value::from(vec![sym("b")])])),
            // Numeric-looking atoms still go through integer validation
            ("-4a", Fails(InvalidInteger)),
            (".", Fails(InvalidSyntax)),
        ];

        run_read_tests(test_cases, config);
    }

    #[test]
    fn test_comments_config() {
        let config = ReadConfig {
            handle_comments: true,
            ..ReadConfig::default()
        };
        let test_cases = vec![
            ("; leading\n42", success(42)),
            ("(1 ; one\n 2) ; done", success([1, 2])),
            ("; only a comment", Fails(ParseErrorKind::InvalidSyntax)),
        ];

        run_read_tests(test_cases, config);
    }

    #[test]
    fn test_reader_depth_limits() {
        let parens_under_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH - 1),
            ")".repeat(MAX_PARSE_DEPTH - 1)
        );
        let parens_at_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let empty_list_at_limit = format!(
            "{}{}",
            "(".repeat(MAX_PARSE_DEPTH + 1),
            ")".repeat(MAX_PARSE_DEPTH + 1)
        );
        let quoted_lists_at_limit = format!(
            "{}1{}",
            "'(".repeat(MAX_PARSE_DEPTH / 2),
            ")".repeat(MAX_PARSE_DEPTH / 2)
        );

        assert!(
            read(&parens_under_limit).is_ok(),
            "Parens just under depth limit should read successfully"
        );
        for input in [&parens_at_limit, &empty_list_at_limit, &quoted_lists_at_limit] {
            assert_eq!(
                read(input).unwrap_err().kind,
                ParseErrorKind::TooDeeplyNested
            );
        }

        // A far deeper input fails cleanly instead of overflowing the stack
        let very_deep = "(".repeat(1_000_000);
        assert_eq!(
            read(&very_deep).unwrap_err().kind,
            ParseErrorKind::TooDeeplyNested
        );

        let shallow = ReadConfig {
            max_depth: 2,
            ..ReadConfig::default()
        };
        assert!(read_with_config("(1)", shallow).is_ok());
        assert!(read_with_config("((1))", shallow).is_err());
    }

    #[test]
    fn test_long_flat_list() {
        let input = format!("({})", "7 ".repeat(100_000));
        let value = read(&input).unwrap();
        assert!(value.is_list());
        assert_eq!(value.iter().count(), 100_000);
    }

    #[test]
    fn test_error_details() {
        let err = read("(1 2a 3)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidInteger);
        assert_eq!(err.found.as_deref(), Some("2a"));
        assert_eq!(err.offset, 3);
        assert_eq!(err.context.as_deref(), Some("(1 2a 3)"));

        let err = read("(1 (2 3)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedParen);
        assert_eq!(err.offset, 0, "points at the unclosed '('");

        // After a complete expression, the outermost unclosed '(' is reported
        let err = read("1 (2 (3)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedParen);
        assert_eq!(err.offset, 2);
        assert_eq!(err.found.as_deref(), Some("("));

        let err = read("   ").unwrap_err();
        assert_eq!(err.found, None);
        assert!(err.to_string().starts_with("ParseError: Empty input"));
    }
}
