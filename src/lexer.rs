//! Tokenizer: splits text into parenthesis and atom tokens.
//!
//! Tokens are spans borrowed from the input. An atom is a maximal run of characters that
//! are neither whitespace nor parentheses; the lexer does not decide whether an atom is a
//! number or a symbol, that is the reader's job.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, take_till, take_while1},
    character::complete::char,
    combinator::{map, recognize, value},
};

/// Characters skipped between tokens
pub const WHITESPACE: &str = " \t\n\r";

/// Characters that end an atom
const DELIMITERS: &str = "() \t\n\r";

/// Characters that end an atom when `;` comments are enabled
const DELIMITERS_WITH_COMMENTS: &str = "() \t\n\r;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    LeftParen,
    RightParen,
    Atom(&'a str),
    /// No non-whitespace characters remain. Not an error.
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the token's first character
    pub offset: usize,
}

impl Token<'_> {
    /// Source text of the token, empty at end of input
    pub fn text(&self) -> &str {
        match self.kind {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Atom(text) => text,
            TokenKind::EndOfInput => "",
        }
    }
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| WHITESPACE.contains(c)).parse(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize((char(';'), take_till(|c: char| c == '\n'))).parse(input)
}

fn paren(input: &str) -> IResult<&str, TokenKind<'_>> {
    alt((
        value(TokenKind::LeftParen, char('(')),
        value(TokenKind::RightParen, char(')')),
    ))
    .parse(input)
}

fn atom<'a>(input: &'a str, delimiters: &'static str) -> IResult<&'a str, TokenKind<'a>> {
    map(is_not(delimiters), TokenKind::Atom).parse(input)
}

/// Scanner over a text buffer, producing one token per call to [`Lexer::next_token`]
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    handle_comments: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            handle_comments: false,
        }
    }

    /// Treat `;` up to the end of the line as whitespace
    pub fn with_comments(mut self, handle_comments: bool) -> Self {
        self.handle_comments = handle_comments;
        self
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    fn skip_ignored(&self, mut rest: &'a str) -> &'a str {
        loop {
            if let Ok((remaining, _)) = whitespace(rest) {
                rest = remaining;
            } else if self.handle_comments
                && let Ok((remaining, _)) = comment(rest)
            {
                rest = remaining;
            } else {
                return rest;
            }
        }
    }

    /// Skip leading whitespace (and comments, if enabled) and scan the next token
    pub fn next_token(&mut self) -> Token<'a> {
        let rest = self.skip_ignored(&self.input[self.position..]);
        let offset = self.input.len() - rest.len();
        self.position = offset;

        if rest.is_empty() {
            return Token {
                kind: TokenKind::EndOfInput,
                offset,
            };
        }

        let delimiters = if self.handle_comments {
            DELIMITERS_WITH_COMMENTS
        } else {
            DELIMITERS
        };

        // Any non-empty remainder starts with a paren or an atom character
        match alt((paren, |i| atom(i, delimiters))).parse(rest) {
            Ok((remaining, kind)) => {
                self.position = self.input.len() - remaining.len();
                Token { kind, offset }
            }
            Err(_) => {
                self.position = self.input.len();
                Token {
                    kind: TokenKind::EndOfInput,
                    offset,
                }
            }
        }
    }

    /// The character at the scan position, before any whitespace is skipped
    pub fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        match self.next_token() {
            Token {
                kind: TokenKind::EndOfInput,
                ..
            } => None,
            token => Some(token),
        }
    }
}
