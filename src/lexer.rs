// ABOUTME: Lexer module turning source text into a token stream
// Single pass, byte-indexed, one character of lookahead (peek_next is used
// only for the NUMBER fractional part).

use crate::diagnostics::Reporter;
use crate::token::{keyword, Literal, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a [u8],
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, reporter: &mut Reporter) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.start = self.current;
            match self.scan_token(reporter) {
                Some(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                None => continue,
            }
        }
        tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            0
        } else {
            self.source[self.current + 1]
        }
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned()
    }

    fn make(&self, kind: TokenKind) -> Option<Token> {
        Some(Token::new(kind, self.lexeme(), Literal::None, self.line))
    }

    /// Scans and returns exactly one token, or `None` if the scanned span
    /// produced no token (whitespace, comments). Returns `Some(Eof)` once
    /// the source is exhausted.
    fn scan_token(&mut self, reporter: &mut Reporter) -> Option<Token> {
        if self.is_at_end() {
            return Some(Token::new(TokenKind::Eof, "", Literal::None, self.line));
        }

        let c = self.advance();
        use TokenKind::*;
        match c {
            b'(' => self.make(LeftParen),
            b')' => self.make(RightParen),
            b'{' => self.make(LeftBrace),
            b'}' => self.make(RightBrace),
            b'[' => self.make(LeftBracket),
            b']' => self.make(RightBracket),
            b',' => self.make(Comma),
            b'.' => self.make(Dot),
            b'-' => self.make(Minus),
            b'+' => self.make(Plus),
            b';' => self.make(Semicolon),
            b'%' => self.make(Percent),
            b':' => self.make(Colon),
            b'*' => {
                if self.matches(b'*') {
                    self.make(StarStar)
                } else {
                    self.make(Star)
                }
            }
            b'!' => {
                let kind = if self.matches(b'=') { BangEqual } else { Bang };
                self.make(kind)
            }
            b'=' => {
                let kind = if self.matches(b'=') { EqualEqual } else { Equal };
                self.make(kind)
            }
            b'<' => {
                let kind = if self.matches(b'=') { LessEqual } else { Less };
                self.make(kind)
            }
            b'>' => {
                let kind = if self.matches(b'=') {
                    GreaterEqual
                } else {
                    Greater
                };
                self.make(kind)
            }
            b'/' => {
                if self.matches(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                    None
                } else {
                    self.make(Slash)
                }
            }
            b' ' | b'\t' | b'\r' => None,
            b'\n' => {
                self.line += 1;
                None
            }
            b'"' => self.string(reporter),
            b'0'..=b'9' => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            _ => {
                reporter.error(self.line, "Unexpected character");
                None
            }
        }
    }

    fn string(&mut self, reporter: &mut Reporter) -> Option<Token> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            reporter.error(self.line, "Unterminated string");
            return None;
        }

        // Consume the closing quote.
        self.advance();

        let value = String::from_utf8_lossy(&self.source[self.start + 1..self.current - 1])
            .into_owned();
        Some(Token::new(
            TokenKind::String,
            self.lexeme(),
            Literal::String(value),
            self.line,
        ))
    }

    fn number(&mut self) -> Option<Token> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        let value: f64 = text.parse().expect("lexer only admits valid number text");
        Some(Token::new(
            TokenKind::Number,
            text,
            Literal::Number(value),
            self.line,
        ))
    }

    fn identifier(&mut self) -> Option<Token> {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text = self.lexeme();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        Some(Token::new(kind, text, Literal::None, self.line))
    }
}

fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_identifier_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}
