/*!
# On-demand Document

A [`Document`] is a JSON buffer plus its structural token tape. Building one
tokenizes the input and pairs up brackets, nothing more: no tree is
materialized. [`Node`] handles point into the tape and decode only what is
asked of them, so a malformed region that no query visits is never
reported, while one that is visited fails at the exact access that touched
it.

```
use jsonsift::reader::{Document, JsonType};

let doc = Document::parse(br#"{"a": [1, 2, 3], "b": "x"}"#).unwrap();
let a = doc.root().get_field("a").unwrap().unwrap();
assert_eq!(a.kind().unwrap(), JsonType::Array);
assert_eq!(a.get_index(2).unwrap().unwrap().to_json_string().unwrap(), "3");
```
*/
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Number;

use crate::reader::{JsonError, JsonErrorKind, Token, TokenKind, tokenize};

/// Default maximum nesting depth accepted by [`Document::parse`].
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Resource limits applied while reading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of arrays and objects. Deeper documents are rejected
    /// up front with [`JsonErrorKind::DepthLimitExceeded`].
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// The runtime type of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// Any JSON number
    Number,
    /// A string
    String,
    /// An array
    Array,
    /// An object
    Object,
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        write!(f, "{name}")
    }
}

/// A JSON document indexed for on-demand access.
pub struct Document<'a> {
    /// Raw document bytes
    input: &'a [u8],
    /// Token tape, terminated by a single `Eof` token
    tokens: Vec<Token>,
    /// For every opening bracket, the tape index of its closing bracket.
    /// Entries for other tokens are unused.
    closers: Vec<usize>,
    /// Deepest nesting level seen
    depth: usize,
}

impl<'a> Document<'a> {
    /// Index `input` with the default [`Limits`].
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the input is empty, contains an illegal
    /// token, has unbalanced brackets, nests too deeply, or holds more than
    /// one top-level value.
    pub fn parse(input: &'a [u8]) -> Result<Self, JsonError> {
        Self::parse_with_limits(input, Limits::default())
    }

    /// Index `input`, rejecting documents that exceed `limits`.
    ///
    /// # Errors
    ///
    /// See [`Document::parse`].
    pub fn parse_with_limits(
        input: &'a [u8],
        limits: Limits,
    ) -> Result<Self, JsonError> {
        let tokens = tokenize(input);
        let mut closers = vec![0; tokens.len()];
        let mut open: Vec<usize> = Vec::new();
        let mut depth = 0;

        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Illegal => {
                    return Err(JsonError::new(
                        JsonErrorKind::IllegalToken,
                        token.start,
                    ));
                }
                TokenKind::LCurly | TokenKind::LSquare => {
                    open.push(i);
                    if open.len() > limits.max_depth {
                        return Err(JsonError::new(
                            JsonErrorKind::DepthLimitExceeded(limits.max_depth),
                            token.start,
                        ));
                    }
                    depth = depth.max(open.len());
                }
                TokenKind::RCurly | TokenKind::RSquare => {
                    let expected = if token.kind == TokenKind::RCurly {
                        TokenKind::LCurly
                    } else {
                        TokenKind::LSquare
                    };
                    match open.pop() {
                        Some(opener) if tokens[opener].kind == expected => {
                            closers[opener] = i;
                        }
                        _ => {
                            return Err(JsonError::new(
                                JsonErrorKind::UnbalancedBracket,
                                token.start,
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(&opener) = open.last() {
            return Err(JsonError::new(
                JsonErrorKind::UnbalancedBracket,
                tokens[opener].start,
            ));
        }

        let doc = Self { input, tokens, closers, depth };

        let first = doc.tokens[0];
        if first.kind == TokenKind::Eof {
            return Err(JsonError::new(JsonErrorKind::Empty, first.start));
        }
        doc.expect_value(0)?;

        // Exactly one top-level value
        let trailing = doc.tokens[doc.value_end(0)];
        if trailing.kind != TokenKind::Eof {
            return Err(JsonError::new(
                JsonErrorKind::TrailingContent,
                trailing.start,
            ));
        }

        log::trace!(
            "indexed document: {} bytes, {} tokens, depth {}",
            input.len(),
            doc.tokens.len(),
            doc.depth
        );

        Ok(doc)
    }

    /// The top-level value.
    #[must_use]
    pub const fn root(&self) -> Node<'_> {
        Node { doc: self, index: 0 }
    }

    /// Deepest nesting of arrays and objects in the document.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The raw document bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.input
    }

    /// Tape index one past the value starting at `index`.
    fn value_end(&self, index: usize) -> usize {
        match self.tokens[index].kind {
            TokenKind::LCurly | TokenKind::LSquare => self.closers[index] + 1,
            _ => index + 1,
        }
    }

    /// Checks that a value starts at `index`.
    fn expect_value(&self, index: usize) -> Result<Token, JsonError> {
        let token = self.tokens[index];
        if token.kind.starts_value() {
            Ok(token)
        } else {
            Err(unexpected(token, "a value"))
        }
    }

    /// Checks that the token at `index` is of kind `kind`.
    fn expect(
        &self,
        index: usize,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Token, JsonError> {
        let token = self.tokens[index];
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(token, expected))
        }
    }

    /// Decodes the string token at `index`. Strings without escapes are
    /// borrowed from the input.
    fn decode_string(&self, index: usize) -> Result<Cow<'a, str>, JsonError> {
        let token = self.tokens[index];
        let invalid = || JsonError::new(JsonErrorKind::InvalidString, token.start);
        match token.kind {
            TokenKind::Str { escaped: false } => {
                std::str::from_utf8(&self.input[token.content()])
                    .map(Cow::Borrowed)
                    .map_err(|_| invalid())
            }
            TokenKind::Str { escaped: true } => {
                serde_json::from_slice::<String>(
                    &self.input[token.start..token.end],
                )
                .map(Cow::Owned)
                .map_err(|_| invalid())
            }
            _ => Err(unexpected(token, "a string")),
        }
    }
}

fn unexpected(token: Token, expected: &'static str) -> JsonError {
    JsonError::new(
        JsonErrorKind::UnexpectedToken { expected, found: token.kind },
        token.start,
    )
}

/// A handle to one value inside a [`Document`].
///
/// Cheap to copy. Every accessor is fallible because grammar is only checked
/// for the tokens an accessor touches.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document<'a>,
    /// Tape index of the first token of the value
    index: usize,
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("offset", &self.offset())
            .field("token", &self.doc.tokens[self.index].kind)
            .finish()
    }
}

impl<'a> Node<'a> {
    /// Byte offset of the value in the document.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.doc.tokens[self.index].start
    }

    /// The value's type.
    ///
    /// # Errors
    ///
    /// Fails if no value starts at this position.
    pub fn kind(&self) -> Result<JsonType, JsonError> {
        let token = self.doc.expect_value(self.index)?;
        Ok(match token.kind {
            TokenKind::LCurly => JsonType::Object,
            TokenKind::LSquare => JsonType::Array,
            TokenKind::Str { .. } => JsonType::String,
            TokenKind::Number => JsonType::Number,
            TokenKind::Bool(_) => JsonType::Bool,
            _ => JsonType::Null,
        })
    }

    /// The source bytes of this value, exactly as they appear in the input.
    #[must_use]
    pub fn source(&self) -> &'a [u8] {
        let start = self.doc.tokens[self.index].start;
        let last = self.doc.value_end(self.index) - 1;
        &self.doc.input[start..self.doc.tokens[last].end]
    }

    /// Iterates the elements of an array.
    ///
    /// # Errors
    ///
    /// Fails if this value is not an array.
    pub fn elements(&self) -> Result<Elements<'a>, JsonError> {
        self.doc.expect(self.index, TokenKind::LSquare, "an array")?;
        Ok(Elements { entries: self.entries() })
    }

    /// Iterates the fields of an object in declaration order.
    ///
    /// # Errors
    ///
    /// Fails if this value is not an object.
    pub fn fields(&self) -> Result<Fields<'a>, JsonError> {
        self.doc.expect(self.index, TokenKind::LCurly, "an object")?;
        Ok(Fields { entries: self.entries() })
    }

    /// Iterates the direct children of any value: array elements in index
    /// order, object values in declaration order, nothing for scalars.
    ///
    /// # Errors
    ///
    /// Fails if no value starts at this position.
    pub fn children(&self) -> Result<Children<'a>, JsonError> {
        Ok(match self.kind()? {
            JsonType::Array => Children::Elements(self.elements()?),
            JsonType::Object => Children::Values(self.fields()?),
            _ => Children::Empty,
        })
    }

    /// Looks up the first field named `name`. Returns `None` when the field
    /// is absent or this value is not an object.
    ///
    /// # Errors
    ///
    /// Fails on malformed input met while scanning for the field.
    pub fn get_field(&self, name: &str) -> Result<Option<Self>, JsonError> {
        if self.kind()? != JsonType::Object {
            return Ok(None);
        }
        for field in self.fields()? {
            let (key, value) = field?;
            if key.as_str()? == name {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Looks up the element at `index`. Returns `None` when the index is out
    /// of range or this value is not an array.
    ///
    /// # Errors
    ///
    /// Fails on malformed input in any element up to `index`, or anywhere in
    /// the array when `index` is out of range.
    pub fn get_index(&self, index: usize) -> Result<Option<Self>, JsonError> {
        if self.kind()? != JsonType::Array {
            return Ok(None);
        }
        // Elements before the target are checked, and an out-of-range
        // index checks the whole array
        for (i, element) in self.elements()?.enumerate() {
            let element = element?;
            if i == index {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// The value of a boolean.
    ///
    /// # Errors
    ///
    /// Fails if this value is not a boolean.
    pub fn as_bool(&self) -> Result<bool, JsonError> {
        let token = self.doc.tokens[self.index];
        match token.kind {
            TokenKind::Bool(b) => Ok(b),
            _ => Err(unexpected(token, "a boolean")),
        }
    }

    /// The fully unescaped content of a string.
    ///
    /// # Errors
    ///
    /// Fails if this value is not a string or its escapes are invalid.
    pub fn as_str(&self) -> Result<Cow<'a, str>, JsonError> {
        self.doc.decode_string(self.index)
    }

    /// The canonical text of a number, e.g. `1e2` becomes `100.0`.
    ///
    /// # Errors
    ///
    /// Fails if this value is not a well-formed number.
    pub fn canonical_number(&self) -> Result<String, JsonError> {
        self.number().map(|n| n.to_string())
    }

    fn number(&self) -> Result<Number, JsonError> {
        let token = self.doc.expect(self.index, TokenKind::Number, "a number")?;
        std::str::from_utf8(&self.doc.input[token.content()])
            .ok()
            .and_then(|text| Number::from_str(text).ok())
            .ok_or_else(|| {
                JsonError::new(JsonErrorKind::InvalidNumber, token.start)
            })
    }

    /// Re-serializes the value as compact JSON. The output is equivalent to
    /// the source span: whitespace is dropped, strings keep their original
    /// escapes and numbers keep their original spelling.
    ///
    /// # Errors
    ///
    /// Fails on any malformed input inside the value.
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        let mut out = String::with_capacity(self.source().len());
        self.write_json(&mut out)?;
        Ok(out)
    }

    /// Appends the compact JSON text of the value to `out`. Containers are
    /// walked with an explicit stack, so nesting depth costs heap rather
    /// than call stack.
    ///
    /// # Errors
    ///
    /// See [`Node::to_json_string`].
    pub fn write_json(&self, out: &mut String) -> Result<(), JsonError> {
        let mut stack = vec![Emit::Value(*self)];

        while let Some(step) = stack.pop() {
            match step {
                Emit::Value(node) => match node.kind()? {
                    JsonType::Object => {
                        out.push('{');
                        stack.push(Emit::Fields { fields: node.fields()?, first: true });
                    }
                    JsonType::Array => {
                        out.push('[');
                        stack.push(Emit::Elements {
                            elements: node.elements()?,
                            first: true,
                        });
                    }
                    JsonType::String => node.doc.write_raw_string(node.index, out)?,
                    JsonType::Number => {
                        node.number()?;
                        // ASCII-only per the lexer
                        out.push_str(&String::from_utf8_lossy(node.source()));
                    }
                    JsonType::Bool => {
                        out.push_str(if node.as_bool()? { "true" } else { "false" });
                    }
                    JsonType::Null => out.push_str("null"),
                },
                Emit::Elements { mut elements, first } => match elements.next() {
                    Some(element) => {
                        let element = element?;
                        if !first {
                            out.push(',');
                        }
                        stack.push(Emit::Elements { elements, first: false });
                        stack.push(Emit::Value(element));
                    }
                    None => out.push(']'),
                },
                Emit::Fields { mut fields, first } => match fields.next() {
                    Some(field) => {
                        let (key, value) = field?;
                        if !first {
                            out.push(',');
                        }
                        key.write_json(out)?;
                        out.push(':');
                        stack.push(Emit::Fields { fields, first: false });
                        stack.push(Emit::Value(value));
                    }
                    None => out.push('}'),
                },
            }
        }
        Ok(())
    }
}

/// Pending work while re-serializing a value.
enum Emit<'a> {
    Value(Node<'a>),
    /// Remaining elements of an open array
    Elements { elements: Elements<'a>, first: bool },
    /// Remaining fields of an open object
    Fields { fields: Fields<'a>, first: bool },
}

impl Document<'_> {
    /// Appends the string token at `index` with its quotes and original
    /// escapes, after checking that it decodes.
    fn write_raw_string(
        &self,
        index: usize,
        out: &mut String,
    ) -> Result<(), JsonError> {
        self.decode_string(index)?;
        let token = self.tokens[index];
        let raw = std::str::from_utf8(&self.input[token.start..token.end])
            .map_err(|_| {
                JsonError::new(JsonErrorKind::InvalidString, token.start)
            })?;
        out.push_str(raw);
        Ok(())
    }
}

/// The key of an object field, decoded on demand.
#[derive(Clone, Copy)]
pub struct Key<'a> {
    doc: &'a Document<'a>,
    index: usize,
}

impl<'a> Key<'a> {
    /// The unescaped key text.
    ///
    /// # Errors
    ///
    /// Fails if the key's escapes or encoding are invalid.
    pub fn as_str(&self) -> Result<Cow<'a, str>, JsonError> {
        self.doc.decode_string(self.index)
    }

    fn write_json(&self, out: &mut String) -> Result<(), JsonError> {
        self.doc.write_raw_string(self.index, out)
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", self.as_str())
    }
}

/// Walks the comma-separated entries between a pair of brackets.
#[derive(Clone)]
struct Entries<'a> {
    doc: &'a Document<'a>,
    /// Tape index of the next unread token
    pos: usize,
    /// Tape index of the closing bracket
    close: usize,
    first: bool,
    done: bool,
}

impl<'a> Node<'a> {
    fn entries(&self) -> Entries<'a> {
        Entries {
            doc: self.doc,
            pos: self.index + 1,
            close: self.doc.closers[self.index],
            first: true,
            done: false,
        }
    }
}

impl Entries<'_> {
    /// Moves past the separator before the next entry and returns the tape
    /// index the entry starts at, or `None` at the closing bracket.
    fn next_entry(&mut self) -> Result<Option<usize>, JsonError> {
        if self.done || self.pos == self.close {
            self.done = true;
            return Ok(None);
        }
        if self.first {
            self.first = false;
        } else {
            self.doc.expect(self.pos, TokenKind::Comma, "',' or a closing bracket")?;
            // An entry must follow the comma; a closing bracket here is
            // rejected by the entry parser.
            self.pos += 1;
        }
        Ok(Some(self.pos))
    }

    /// Stops iteration after the first error.
    fn fuse<T>(&mut self, result: Result<T, JsonError>) -> Option<Result<T, JsonError>> {
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Iterator over the elements of an array.
#[derive(Clone)]
pub struct Elements<'a> {
    entries: Entries<'a>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Result<Node<'a>, JsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.entries.doc;
        let result = match self.entries.next_entry() {
            Ok(None) => return None,
            Ok(Some(start)) => doc.expect_value(start).map(|_| {
                self.entries.pos = doc.value_end(start);
                Node { doc, index: start }
            }),
            Err(err) => Err(err),
        };
        self.entries.fuse(result)
    }
}

/// Iterator over the `(key, value)` fields of an object.
#[derive(Clone)]
pub struct Fields<'a> {
    entries: Entries<'a>,
}

impl<'a> Fields<'a> {
    fn read_field(&mut self, start: usize) -> Result<(Key<'a>, Node<'a>), JsonError> {
        let doc = self.entries.doc;
        let key_token = doc.tokens[start];
        if !matches!(key_token.kind, TokenKind::Str { .. }) {
            return Err(unexpected(key_token, "an object key"));
        }
        doc.expect(start + 1, TokenKind::Colon, "':'")?;
        doc.expect_value(start + 2)?;
        self.entries.pos = doc.value_end(start + 2);
        Ok((Key { doc, index: start }, Node { doc, index: start + 2 }))
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<(Key<'a>, Node<'a>), JsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.entries.next_entry() {
            Ok(None) => return None,
            Ok(Some(start)) => self.read_field(start),
            Err(err) => Err(err),
        };
        self.entries.fuse(result)
    }
}

/// Iterator over the direct children of a value, see [`Node::children`].
#[derive(Clone)]
pub enum Children<'a> {
    /// Elements of an array
    Elements(Elements<'a>),
    /// Values of an object's fields
    Values(Fields<'a>),
    /// A scalar has no children
    Empty,
}

impl<'a> Iterator for Children<'a> {
    type Item = Result<Node<'a>, JsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Elements(elements) => elements.next(),
            Self::Values(fields) => {
                fields.next().map(|field| field.map(|(_, value)| value))
            }
            Self::Empty => None,
        }
    }
}
