//! # JSON Lexer
//!
//! Splits an input byte sequence from a JSON document into the flat token
//! tape that the on-demand reader navigates. The lexer only recognizes
//! token boundaries; grammar is checked later, and only where the reader
//! looks.
use crate::reader::{Token, TokenKind};

/// A lexer that can be used to split an input slice of bytes from a JSON
/// document into tokens.
struct Lexer<'a> {
    /// The input sequence of bytes to tokenize
    input: &'a [u8],
    /// Current position (current byte)
    position: usize,
    /// Current reading position (after current byte)
    read_position: usize,
    /// Current byte under examination, meaningless at end of input
    byte: u8,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        let mut lexer = Self {
            input,
            position: 0,
            read_position: 0,
            byte: 0,
        };
        // put the lexer in an initial working state
        lexer.read_byte();
        lexer
    }

    /// Reads and consumes the next byte in the input sequence.
    fn read_byte(&mut self) {
        self.byte = self.input.get(self.read_position).copied().unwrap_or(0);
        // Advance the positions
        self.position = self.read_position;
        self.read_position += 1;
    }

    /// Whether every byte of the input has been consumed. A literal NUL byte
    /// inside the input is not mistaken for the end.
    const fn at_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consume whitespace byte(s) starting from the current position.
    fn skip_whitespace(&mut self) {
        while !self.at_eof() && matches!(self.byte, b' ' | b'\t' | b'\n' | b'\r')
        {
            self.read_byte();
        }
    }

    /// Returns the next token in the input sequence from the current position.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        if self.at_eof() {
            return Token { kind: TokenKind::Eof, start, end: start };
        }

        let kind = match self.byte {
            b'{' => self.single(TokenKind::LCurly),
            b'}' => self.single(TokenKind::RCurly),
            b'[' => self.single(TokenKind::LSquare),
            b']' => self.single(TokenKind::RSquare),
            b':' => self.single(TokenKind::Colon),
            b',' => self.single(TokenKind::Comma),
            b'"' => self.read_string(),
            b'-' | b'0'..=b'9' => self.read_number(),
            c if c.is_ascii_alphabetic() => self.read_literal(),
            _ => self.single(TokenKind::Illegal),
        };

        Token { kind, start, end: self.position }
    }

    /// Consumes a one-byte token.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.read_byte();
        kind
    }

    /// Reads an alphabetic literal (`true`/`false`/`null`) and returns the
    /// corresponding token.
    fn read_literal(&mut self) -> TokenKind {
        let start_pos = self.position;
        while !self.at_eof() && self.byte.is_ascii_alphabetic() {
            self.read_byte();
        }
        match &self.input[start_pos..self.position] {
            b"true" => TokenKind::Bool(true),
            b"false" => TokenKind::Bool(false),
            b"null" => TokenKind::Null,
            _ => TokenKind::Illegal,
        }
    }

    /// Reads a string value and returns the corresponding token. Raw control
    /// characters and a missing closing quote make the token illegal.
    fn read_string(&mut self) -> TokenKind {
        // Skip opening quote
        self.read_byte();
        let mut escaped = false;
        while !self.at_eof() && self.byte != b'"' {
            match self.byte {
                b'\\' => {
                    // skip the escaped character to avoid premature
                    // termination with `\"`
                    escaped = true;
                    self.read_byte();
                }
                c if c < 0x20 => return TokenKind::Illegal,
                _ => {}
            }
            self.read_byte();
        }

        if self.at_eof() {
            // string not terminated, invalid
            return TokenKind::Illegal;
        }

        // closing quote
        self.read_byte();
        TokenKind::Str { escaped }
    }

    /// Reads the extent of a JSON number (int, frac, exp). The text is not
    /// validated here; see `Node::canonical_number`.
    fn read_number(&mut self) -> TokenKind {
        // optional leading '-'
        if self.byte == b'-' {
            self.read_byte();
        }

        // integer part
        self.skip_digits();

        // fractional part
        if !self.at_eof() && self.byte == b'.' {
            self.read_byte();
            self.skip_digits();
        }

        // exponent part
        if !self.at_eof() && matches!(self.byte, b'e' | b'E') {
            self.read_byte();
            if !self.at_eof() && matches!(self.byte, b'+' | b'-') {
                self.read_byte();
            }
            self.skip_digits();
        }

        TokenKind::Number
    }

    fn skip_digits(&mut self) {
        while !self.at_eof() && self.byte.is_ascii_digit() {
            self.read_byte();
        }
    }
}

/// Tokenize a JSON document into its token tape. The returned tape always
/// ends with a single [`TokenKind::Eof`] token.
#[must_use]
pub fn tokenize(text: &[u8]) -> Vec<Token> {
    let mut lexer = Lexer::new(text);
    let mut tokens: Vec<Token> = Vec::with_capacity(text.len() / 4 + 1);

    loop {
        let token = lexer.next_token();
        let is_eof = matches!(token.kind, TokenKind::Eof);

        tokens.push(token);

        if is_eof {
            break;
        }
    }

    tokens
}
