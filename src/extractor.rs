/*!
# Extractors and the Extractor Cache

An [`Extractor`] pairs a compiled [`PathProgram`] with the reader limits it
runs under. An [`ExtractorCache`] hands out shared extractors keyed by the
literal path string, compiling each distinct path once no matter how many
threads ask for it at the same time.

```
use jsonsift::ExtractorCache;

let cache = ExtractorCache::new();
let extractor = cache.get_extractor("$.store.book[*].price").unwrap();
let prices = extractor
    .extract_all(br#"{"store": {"book": [{"price": 8.95}, {"price": 22.99}]}}"#)
    .unwrap();
assert_eq!(prices, ["8.95", "22.99"]);
assert!(!extractor.is_definite());
```

Invalid paths fail when the extractor is acquired, malformed documents fail
when they are read:

```
use jsonsift::ExtractorCache;

let cache = ExtractorCache::new();
assert!(cache.get_extractor("$.").is_err());
let extractor = cache.get_extractor("$.foo").unwrap();
assert!(extractor.extract_all(br#"{"foo: "bar"}"#).is_err());
```
*/
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::path::{PathParseError, PathProgram, compile, evaluate};
use crate::reader::{Document, JsonError, JsonType, Limits, Node};

/// Default number of distinct paths an [`ExtractorCache`] holds.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Summary of a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    /// Number of times the consumer was called
    pub matches: usize,
    /// Whether the path can match at most once. Callers that want a single
    /// value should treat more than one match of an indefinite path as no
    /// value.
    pub definite: bool,
}

/// A compiled path ready to run against any number of documents.
#[derive(Debug)]
pub struct Extractor {
    /// The path as given by the caller
    path: String,
    program: PathProgram,
    limits: Limits,
}

impl Extractor {
    /// Compiles `path` into a new extractor.
    ///
    /// # Errors
    ///
    /// Returns a [`PathParseError`] if `path` is not a valid path.
    pub fn new(path: &str) -> Result<Self, PathParseError> {
        Ok(Self {
            path: path.to_owned(),
            program: compile(path)?,
            limits: Limits::default(),
        })
    }

    /// Wraps an already built program, e.g. one from a
    /// [`PathBuilder`](crate::path::PathBuilder).
    #[must_use]
    pub fn from_program(program: PathProgram) -> Self {
        Self { path: program.to_string(), program, limits: Limits::default() }
    }

    /// Replaces the reader limits applied to documents.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The path this extractor was built from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The compiled program.
    #[must_use]
    pub const fn program(&self) -> &PathProgram {
        &self.program
    }

    /// Whether the path can match at most once.
    #[must_use]
    pub const fn is_definite(&self) -> bool {
        self.program.is_definite()
    }

    /// Runs the path over `document`, calling `consumer` synchronously for
    /// every match before returning.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] (converted into `E`) if the document is
    /// malformed where the walk needed to read it, or the consumer's own
    /// error as soon as it returns one. Matches delivered before either
    /// failure are not retracted.
    pub fn extract<E, F>(&self, document: &[u8], consumer: F) -> Result<Extraction, E>
    where
        E: From<JsonError>,
        F: FnMut(Node<'_>) -> Result<(), E>,
    {
        let doc = Document::parse_with_limits(document, self.limits)?;
        let matches = evaluate(&self.program, doc.root(), consumer)?;
        Ok(Extraction { matches, definite: self.is_definite() })
    }

    /// Collects the compact JSON text of every match.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the document is malformed where it was
    /// read.
    pub fn extract_all(&self, document: &[u8]) -> Result<Vec<String>, JsonError> {
        let mut values = Vec::new();
        self.extract(document, |node| {
            values.push(node.to_json_string()?);
            Ok::<(), JsonError>(())
        })?;
        Ok(values)
    }

    /// Extracts a single scalar as text, see [`ScalarProjection`]. Returns
    /// `None` for no match, more than one match, `null`, arrays and objects.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the document is malformed where it was
    /// read.
    pub fn extract_scalar(&self, document: &[u8]) -> Result<Option<String>, JsonError> {
        let mut projection = ScalarProjection::default();
        self.extract(document, |node| projection.accept(node))?;
        Ok(projection.into_value())
    }
}

/// Compiles `path` and runs it over `document` once, without caching.
///
/// # Errors
///
/// Returns the compile error or any error [`Extractor::extract`] returns,
/// converted into `E`.
///
/// # Examples
///
/// ```
/// let mut owners = Vec::new();
/// jsonsift::extract(br#"{"owner": "amy"}"#, "$.owner", |node| {
///     owners.push(node.as_str()?.into_owned());
///     Ok::<(), anyhow::Error>(())
/// })
/// .unwrap();
/// assert_eq!(owners, ["amy"]);
/// ```
pub fn extract<E, F>(document: &[u8], path: &str, consumer: F) -> Result<Extraction, E>
where
    E: From<JsonError> + From<PathParseError>,
    F: FnMut(Node<'_>) -> Result<(), E>,
{
    Extractor::new(path)?.extract(document, consumer)
}

#[derive(Debug, Default)]
enum ScalarState {
    #[default]
    Unset,
    One(Option<String>),
    Many,
}

/// Consumer-side helper that reduces the matches of a path to at most one
/// scalar text value.
///
/// Only the first match counts; a second match discards the value. Within
/// that match `null`, arrays and objects give no value, booleans give
/// `"true"`/`"false"`, strings give their unescaped content and numbers give
/// their canonical text.
#[derive(Debug, Default)]
pub struct ScalarProjection {
    state: ScalarState,
}

impl ScalarProjection {
    /// Feeds one match.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the first match is a malformed scalar.
    pub fn accept(&mut self, node: Node<'_>) -> Result<(), JsonError> {
        self.state = match self.state {
            ScalarState::Unset => ScalarState::One(scalar_text(node)?),
            ScalarState::One(_) | ScalarState::Many => ScalarState::Many,
        };
        Ok(())
    }

    /// The projected value, if exactly one usable match was fed.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self.state {
            ScalarState::One(value) => value,
            ScalarState::Unset | ScalarState::Many => None,
        }
    }
}

/// Text of a scalar node, `None` for `null` and containers.
///
/// # Errors
///
/// Returns a [`JsonError`] if the node is malformed.
pub fn scalar_text(node: Node<'_>) -> Result<Option<String>, JsonError> {
    Ok(match node.kind()? {
        JsonType::Null | JsonType::Array | JsonType::Object => None,
        JsonType::Bool => {
            Some(if node.as_bool()? { "true" } else { "false" }.to_owned())
        }
        JsonType::String => Some(node.as_str()?.into_owned()),
        JsonType::Number => Some(node.canonical_number()?),
    })
}

/// Result of compiling one path, shared by every caller asking for it.
type Slot = Arc<OnceLock<Result<Arc<Extractor>, PathParseError>>>;

/// A thread-safe map from literal path strings to compiled extractors.
///
/// Each path is compiled at most once per cache entry: concurrent callers
/// for a path that is still compiling wait for that compile instead of
/// starting their own. Compile failures are cached (and logged) just like
/// successes. When the cache is full it is cleared before the next new path
/// is inserted; extractors already handed out stay valid.
#[derive(Debug)]
pub struct ExtractorCache {
    entries: Mutex<HashMap<String, Slot>>,
    capacity: usize,
    limits: Limits,
}

impl ExtractorCache {
    /// Creates an empty cache holding up to [`DEFAULT_CACHE_CAPACITY`]
    /// paths.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates an empty cache holding up to `capacity` paths (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            limits: Limits::default(),
        }
    }

    /// Sets the reader limits given to extractors compiled from now on.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the extractor for `path`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns a [`PathParseError`] if `path` is not a valid path. The
    /// failure is remembered, so asking again does not recompile.
    pub fn get_extractor(&self, path: &str) -> Result<Arc<Extractor>, PathParseError> {
        let slot = {
            let mut entries =
                self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = entries.get(path) {
                log::trace!("extractor cache hit for `{path}`");
                Arc::clone(slot)
            } else {
                if entries.len() >= self.capacity {
                    log::debug!(
                        "extractor cache full ({} paths), clearing",
                        entries.len()
                    );
                    entries.clear();
                }
                let slot: Slot = Arc::new(OnceLock::new());
                entries.insert(path.to_owned(), Arc::clone(&slot));
                slot
            }
        };

        // Compile outside the map lock; racers on the same slot block here
        slot.get_or_init(|| {
            log::debug!("compiling extractor for `{path}`");
            Extractor::new(path)
                .map(|extractor| Arc::new(extractor.with_limits(self.limits)))
                .inspect_err(|err| log::warn!("rejected path `{path}`: {err}"))
        })
        .clone()
    }

    /// Number of cached paths, including ones that failed to compile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached path.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for ExtractorCache {
    fn default() -> Self {
        Self::new()
    }
}
