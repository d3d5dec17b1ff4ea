/*!
# Path Program and Builder

Defines the compiled form of a path expression, a [`PathProgram`] made of
[`Selector`]s, and exposes a fluent API for constructing programs with a
builder.

# Examples

A program can be built directly:
```
use jsonsift::path::{PathBuilder, Selector};
let program = PathBuilder::new().field("store").wildcard().build();
assert_eq!(
    program.selectors(),
    &[Selector::Root, Selector::field("store"), Selector::Wildcard]
);
assert!(!program.is_definite());
```

or compiled from a raw path string:

```
use jsonsift::path::PathProgram;
let program: PathProgram = "$.store.book[0]".parse().expect("Invalid path");
assert_eq!(program.to_string(), r#"$["store"]["book"][0]"#);
assert!(program.is_definite());
```
*/
use serde::Serialize;
use std::{fmt::Display, str::FromStr};

use super::{PathParseError, compile};

/// One compiled step of a path expression.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(tag = "selector", content = "key", rename_all = "snake_case")]
pub enum Selector {
    /// The document root, `$`. Only valid as the first selector.
    Root,
    /// Object field with exactly this (unescaped) name, e.g. `["foo"]`.
    /// Never matches an array element.
    ChildByName(String),
    /// Array element at this position. Never matches an object field.
    ChildByIndex(usize),
    /// A bare all-digit token such as `.1` or `[1]`: the element at that
    /// position of an array, or the field with that name of an object.
    ChildByNameOrIndex {
        /// The token as written, used as the object key
        name: String,
        /// The token as an array index, `None` if it does not fit a `usize`
        index: Option<usize>,
    },
    /// Every array element or object value, `*` or `[*]`.
    Wildcard,
    /// The current node and all of its descendants in pre-order, `..`.
    RecursiveDescent,
}

impl Selector {
    /// Helper for ergonomic construction of field selectors
    pub fn field<T: Into<String>>(name: T) -> Self {
        Self::ChildByName(name.into())
    }

    /// Builds a [`Selector::ChildByNameOrIndex`] for an all-digit token.
    pub fn field_or_index<T: Into<String>>(token: T) -> Self {
        let name = token.into();
        let index = name.parse::<usize>().ok();
        Self::ChildByNameOrIndex { name, index }
    }

    /// Whether this selector can yield more than one node.
    #[must_use]
    pub const fn is_expanding(&self) -> bool {
        matches!(self, Self::Wildcard | Self::RecursiveDescent)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "$"),
            Self::ChildByName(name) => {
                write!(f, "[\"{}\"]", escape_quoted_key(name))
            }
            Self::ChildByIndex(idx) => write!(f, "[{idx}]"),
            Self::ChildByNameOrIndex { name, .. } => write!(f, "[{name}]"),
            Self::Wildcard => write!(f, "[*]"),
            Self::RecursiveDescent => write!(f, ".."),
        }
    }
}

/// Escape a key for display inside double quotes. This is the inverse of the
/// unescaping the compiler applies to quoted keys.
fn escape_quoted_key(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// An immutable, ordered sequence of selectors starting with
/// [`Selector::Root`].
///
/// Built once per distinct path and shared freely afterwards; nothing
/// mutates it after construction.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PathProgram {
    selectors: Vec<Selector>,
    /// Cached at construction, see [`PathProgram::is_definite`]
    definite: bool,
}

impl PathProgram {
    /// Wraps a selector sequence. A leading [`Selector::Root`] is added when
    /// missing.
    #[must_use]
    pub fn new(mut selectors: Vec<Selector>) -> Self {
        if selectors.first() != Some(&Selector::Root) {
            selectors.insert(0, Selector::Root);
        }
        let definite = !selectors.iter().any(Selector::is_expanding);
        Self { selectors, definite }
    }

    /// The selectors in application order, including the leading root.
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// `true` if the program has no wildcard or recursive descent and so can
    /// match at most one node.
    #[must_use]
    pub const fn is_definite(&self) -> bool {
        self.definite
    }

    /// Number of selectors, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always `false`: a program holds at least the root selector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl Display for PathProgram {
    /// Canonical bracket notation. Compiling the output of a compiled
    /// program yields the same program; [`Selector::ChildByIndex`] prints like
    /// an all-digit token and so re-compiles to
    /// [`Selector::ChildByNameOrIndex`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for selector in &self.selectors {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl FromStr for PathProgram {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Builder for constructing path programs
pub struct PathBuilder {
    /// Selectors appended so far, after the implicit root
    selectors: Vec<Selector>,
}

impl PathBuilder {
    /// Creates a new `PathBuilder` whose program matches the root.
    ///
    /// # Examples
    /// ```
    /// use jsonsift::path::{PathBuilder, Selector};
    /// let program = PathBuilder::new().build();
    /// assert_eq!(program.selectors(), &[Selector::Root]);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self { selectors: Vec::new() }
    }

    /// Appends an object field lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonsift::path::{PathBuilder, Selector};
    /// let program = PathBuilder::new().field("foo").build();
    /// assert_eq!(program.selectors()[1], Selector::field("foo"));
    /// ```
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        self.selectors.push(Selector::field(name));
        self
    }

    /// Appends an array index lookup that never matches object keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonsift::path::{PathBuilder, Selector};
    /// let program = PathBuilder::new().index(3).build();
    /// assert_eq!(program.selectors()[1], Selector::ChildByIndex(3));
    /// ```
    #[must_use]
    pub fn index(mut self, idx: usize) -> Self {
        self.selectors.push(Selector::ChildByIndex(idx));
        self
    }

    /// Appends a lookup that matches array position `idx` or the object key
    /// spelled as its decimal digits, like `.3` in a path string.
    #[must_use]
    pub fn field_or_index(mut self, idx: usize) -> Self {
        self.selectors.push(Selector::field_or_index(idx.to_string()));
        self
    }

    /// Appends a wildcard over array elements or object values.
    #[must_use]
    pub fn wildcard(mut self) -> Self {
        self.selectors.push(Selector::Wildcard);
        self
    }

    /// Appends a recursive descent. The next selector is applied to the
    /// current node and to each of its descendants.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonsift::path::{PathBuilder, PathProgram};
    /// let built = PathBuilder::new().descendants().field("price").build();
    /// let parsed: PathProgram = "$..price".parse().unwrap();
    /// assert_eq!(built, parsed);
    /// ```
    #[must_use]
    pub fn descendants(mut self) -> Self {
        self.selectors.push(Selector::RecursiveDescent);
        self
    }

    /// Return the built program.
    #[must_use]
    pub fn build(self) -> PathProgram {
        PathProgram::new(self.selectors)
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definiteness() {
        assert!(PathBuilder::new().field("a").index(0).build().is_definite());
        assert!(!PathBuilder::new().wildcard().build().is_definite());
        assert!(!PathBuilder::new().descendants().field("a").build().is_definite());
    }

    #[test]
    fn root_is_prepended_once() {
        let program = PathProgram::new(vec![Selector::Root, Selector::Wildcard]);
        assert_eq!(program.len(), 2);
        let program = PathProgram::new(vec![Selector::Wildcard]);
        assert_eq!(program.selectors()[0], Selector::Root);
    }

    #[test]
    fn field_or_index_overflow() {
        let selector = Selector::field_or_index("99999999999999999999999");
        assert!(matches!(
            selector,
            Selector::ChildByNameOrIndex { index: None, .. }
        ));
    }

    #[test]
    fn display_round_trips_through_compiler() {
        for path in [
            "$",
            "$.store.book[*].price",
            r#"$["e mail"]"#,
            r#"$["ab\"cd"]"#,
            "$..object..1",
            "$.*.['*']",
            "$.'0'.bar",
        ] {
            let program: PathProgram = path.parse().unwrap();
            let reparsed: PathProgram = program.to_string().parse().unwrap();
            assert_eq!(program, reparsed, "path {path} displayed as {program}");
        }
    }

    #[test]
    fn serializes_for_explain() {
        let program = PathBuilder::new().field("a").field_or_index(1).build();
        let json = serde_json::to_string(&program).unwrap();
        assert_eq!(
            json,
            r#"{"selectors":[{"selector":"root"},{"selector":"child_by_name","key":"a"},{"selector":"child_by_name_or_index","key":{"name":"1","index":1}}],"definite":true}"#
        );
    }
}
