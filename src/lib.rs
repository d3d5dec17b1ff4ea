/*!
# `jsonsift` Library

Extracts values from JSON documents with a compact JSONPath subset, reading
documents on demand instead of parsing them into a tree.

```
use jsonsift::ExtractorCache;

let cache = ExtractorCache::new();
let extractor = cache.get_extractor("$..array").unwrap();
let json = br#"{"a": {"array": [0, 1]}, "b": {"array": [2]}}"#;
assert_eq!(extractor.extract_all(json).unwrap(), ["[0,1]", "[2]"]);
```
*/

pub mod extractor;
pub mod path;
pub mod reader;
pub mod utils;

// Re-exports
pub use extractor::{
    Extraction, Extractor, ExtractorCache, ScalarProjection, extract,
};
pub use path::{PathParseError, PathProgram, compile};
pub use reader::{JsonError, Node};
