/*!
# Path Compiler

Compiles path expression strings into [`PathProgram`]s.

## Examples

```rust
use jsonsift::path::{self, Selector};
let program = path::compile("$.store.book[*].price").expect("Invalid path");
assert_eq!(program.selectors().len(), 5);
assert_eq!(program.selectors()[3], Selector::Wildcard);
```

Bare all-digit tokens match both array positions and object keys, while
quoted tokens are always object keys:

```rust
use jsonsift::path::{self, Selector};
let program = path::compile(r#"$[0]["0"]"#).unwrap();
assert_eq!(program.selectors()[1], Selector::field_or_index("0"));
assert_eq!(program.selectors()[2], Selector::field("0"));
```

## Errors

If the input path is invalid, [`compile`] returns a [`PathParseError`]
describing how the parsing failed:

```rust
use jsonsift::path::{self, PathParseError};

assert!(matches!(path::compile("  "), Err(PathParseError::Empty)));
assert!(matches!(
    path::compile("$.bar[2]-1"),
    Err(PathParseError::UnexpectedToken(_))
));
```

## See Also

- [`PathProgram`]: The compiled form.
- [`PathParseError`]: The error type for failed compiles.
*/

use pest::Parser;
use pest_derive::Parser;
use std::error::Error;
use std::fmt;

use crate::path::{PathProgram, Selector};

/// Parser for turning raw path strings into [`PathProgram`]s.
#[derive(Parser)]
#[grammar = "path/grammar/path.pest"]
pub struct JsonPathParser;

/// Represents errors that can occur while compiling a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The path is empty or only whitespace.
    Empty,
    /// The path does not follow the grammar; carries the rendered parser
    /// diagnostic.
    UnexpectedToken(String),
}

impl Error for PathParseError {}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Invalid JSON path: empty path"),
            Self::UnexpectedToken(token) => {
                write!(f, "Invalid JSON path: {token}")
            }
        }
    }
}

/// Compile an input path string into a [`PathProgram`].
///
/// # Errors
///
/// Returns a [`PathParseError`] for an empty path, a path not anchored at a
/// single `$`, a trailing `.`, an unterminated `[` or quote, or any trailing
/// characters that do not form a segment.
pub fn compile(input: &str) -> Result<PathProgram, PathParseError> {
    if input.trim().is_empty() {
        return Err(PathParseError::Empty);
    }

    let mut pairs = JsonPathParser::parse(Rule::path, input)
        .map_err(|e| PathParseError::UnexpectedToken(e.to_string()))?;

    // Get and unwrap the `path` rule
    let path = pairs.next().ok_or(PathParseError::Empty)?;

    let mut selectors: Vec<Selector> = vec![];
    for pair in path.into_inner() {
        match pair.as_rule() {
            Rule::root => selectors.push(Selector::Root),
            Rule::descendant => {
                selectors.push(Selector::RecursiveDescent);
                let key = pair.into_inner().next().ok_or_else(|| {
                    PathParseError::UnexpectedToken(
                        "Expected key after '..'".to_string(),
                    )
                })?;
                selectors.push(parse_key(key)?);
            }
            Rule::EOI => {}
            _ => selectors.push(parse_key(pair)?),
        }
    }

    let program = PathProgram::new(selectors);

    log::trace!("compiled `{input}` into `{program}`");

    Ok(program)
}

/// Parse one key rule (dot, bare bracket, or quoted bracket) into a
/// [`Selector`].
fn parse_key(
    pair: pest::iterators::Pair<Rule>,
) -> Result<Selector, PathParseError> {
    match pair.as_rule() {
        Rule::dot_key | Rule::bare_key => Ok(parse_unquoted(pair.as_str())),
        Rule::single_quoted | Rule::double_quoted => {
            let inner = pair.into_inner().next().ok_or_else(|| {
                PathParseError::UnexpectedToken(
                    "Expected quoted key".to_string(),
                )
            })?;
            Ok(Selector::ChildByName(unescape_quoted(inner.as_str())))
        }
        rule => Err(PathParseError::UnexpectedToken(format!(
            "Expected key, got {rule:?}"
        ))),
    }
}

/// Classify an unquoted token: `*` is the wildcard, an all-digit token
/// matches by name or index, anything else is a plain field name.
fn parse_unquoted(token: &str) -> Selector {
    if token == "*" {
        Selector::Wildcard
    } else if token.bytes().all(|b| b.is_ascii_digit()) {
        Selector::field_or_index(token)
    } else {
        Selector::field(token)
    }
}

/// A backslash inside quotes makes the following character literal.
fn unescape_quoted(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            _ => result.push(c),
        }
    }
    result
}
