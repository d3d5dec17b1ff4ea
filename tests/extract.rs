//! End-to-end extraction scenarios against the public library API.
use jsonsift::{Extractor, ExtractorCache, JsonError, Node, PathParseError};
use serde_json::Value;

const STORE: &str = include_str!("data/store.json");

const NESTED: &str = r#"
    {
    "object": {
      "array": [0,1,2],
      "object": {
        "1": "value",
        "array": [4,5,6],
        "foo": "bar"
      }
    }
  }"#;

const INNER: &str = r#"{"1": "value", "array": [4,5,6], "foo": "bar"}"#;
const OUTER: &str = r#"{"array": [0,1,2], "object": {"1": "value", "array": [4,5,6], "foo": "bar"}}"#;

/// Runs `path` over `json` and checks the matches, compared as JSON values,
/// against `expected` in order.
fn check(json: &str, path: &str, expected: &[&str]) {
    let extractor = Extractor::new(path)
        .unwrap_or_else(|err| panic!("path {path:?} should compile: {err}"));
    let actual: Vec<Value> = extractor
        .extract_all(json.as_bytes())
        .unwrap_or_else(|err| panic!("extracting {path:?} failed: {err}"))
        .iter()
        .map(|text| serde_json::from_str(text).expect("match is valid JSON"))
        .collect();
    let expected: Vec<Value> = expected
        .iter()
        .map(|text| serde_json::from_str(text).expect("expectation is valid JSON"))
        .collect();
    assert_eq!(actual, expected, "path {path:?}");
}

fn scalar(json: &str, path: &str) -> Option<String> {
    Extractor::new(path)
        .expect("valid test path")
        .extract_scalar(json.as_bytes())
        .expect("well-formed test document")
}

#[test]
fn general_store_document() {
    check(STORE, "$.store.fruit[0].weight", &["8"]);
    check(STORE, "$.store.fruit[1].weight", &["9"]);
    check(STORE, "$.store.fruit[2].weight", &[]);
    check(STORE, "$.store.fruit[*].weight", &["8", "9"]);
    check(STORE, "$.store.fruit[*].type", &[r#""apple""#, r#""pear""#]);
    check(STORE, "$.store.book[0].price", &["8.95"]);
    check(STORE, "$.store.book[2].category", &[r#""fiction""#]);
    check(STORE, "$.store.basket[1]", &["[3,4]"]);
    check(STORE, "$.store.basket[0]", &[r#"[1,2,{"a":"x","b":"y"}]"#]);
    check(STORE, "$.store.baskets[1]", &[]);
    check(STORE, r#"$["e mail"]"#, &[r#""amy@only_for_json_udf_test.net""#]);
    check(STORE, "$.owner", &[r#""amy""#]);
}

#[test]
fn wildcard_over_object_values() {
    check(
        STORE,
        "$.store.book[0].[*]",
        &[r#""Nigel Rees""#, r#""ayings of the Century""#, r#""reference""#, "8.95"],
    );
    check(STORE, "$.store.[*].price", &["19.95"]);
}

#[test]
fn array_positions() {
    check("[[1.1,[2.1,2.2]],2,{\"a\":\"b\"}]", "$[0][1][1]", &["2.2"]);
    check(" [ [1.1,[2.1,2.2]],2, {\"a\": \"b\"}]", " $[0][1][1]", &["2.2"]);

    let json = r#"[1,2,{"a":"b"}]"#;
    check(json, "$[1]", &["2"]);
    check(json, "$[2]", &[r#"{"a":"b"}"#]);
    check(json, "$[3]", &[]);

    check(r#"[{"a":"b"}]"#, "$[0]", &[r#"{"a":"b"}"#]);
    check(r#"[{"a":"b"}]"#, "$[2]", &[]);
    check(r#"{"a":"b"}"#, " $ ", &[r#"{"a":"b"}"#]);
}

#[test]
fn wildcard_over_array_elements() {
    let json = r#"[[{"key": 1, "value": 2},{"key": 2, "value": 4}],
                   [{"key": 3, "value": 6},{"key": 4, "value": 8},{"key": 5, "value": 10}]]"#;
    check(
        json,
        "$[*]",
        &[
            r#"[{"key": 1, "value": 2},{"key": 2, "value": 4}]"#,
            r#"[{"key": 3, "value": 6},{"key": 4, "value": 8},{"key": 5, "value": 10}]"#,
        ],
    );
    check(
        json,
        "$[*][*]",
        &[
            r#"{"key": 1, "value": 2}"#,
            r#"{"key": 2, "value": 4}"#,
            r#"{"key": 3, "value": 6}"#,
            r#"{"key": 4, "value": 8}"#,
            r#"{"key": 5, "value": 10}"#,
        ],
    );
    check(json, "$[*][*].key", &["1", "2", "3", "4", "5"]);
    check(json, "$[*][0]", &[r#"{"key":1,"value":2}"#, r#"{"key":3,"value":6}"#]);
    check(json, "$[*][2]", &[r#"{"key":5,"value":10}"#]);
}

#[test]
fn scalar_values() {
    assert_eq!(scalar("123", "$").as_deref(), Some("123"));
    assert_eq!(scalar("-1", "$").as_deref(), Some("-1"));
    assert_eq!(scalar("\"abc\"", "$").as_deref(), Some("abc"));
    assert_eq!(scalar("\"\"", "$").as_deref(), Some(""));
    assert_eq!(scalar("null", "$"), None);
    assert_eq!(scalar(r#""ab\u0001c""#, "$").as_deref(), Some("ab\u{1}c"));
    assert_eq!(scalar(r#""ab\u0002c""#, "$").as_deref(), Some("ab\u{2}c"));
    assert_eq!(scalar("[1, 2, 3]", "$"), None);
    assert_eq!(scalar(r#"{"a": 1}"#, "$"), None);
}

#[test]
fn json_values() {
    check("123", "$", &["123"]);
    check("-1", "$", &["-1"]);
    check("0.01", "$", &["0.01"]);
    check("\"abc\"", "$", &["\"abc\""]);
    check("\"\"", "$", &["\"\""]);
    check("null", "$", &["null"]);
    check(r#""ab\u0001c""#, "$", &[r#""ab\u0001c""#]);
    check("[1, 2, 3]", "$", &["[1,2,3]"]);
    check(r#"{"a": 1}"#, "$", &[r#"{"a":1}"#]);
}

#[test]
fn escapes_are_kept_in_json_output() {
    let extractor = Extractor::new("$.fuu[0]").unwrap();
    assert_eq!(
        extractor.extract_all(br#"{"fuu": ["\u0001"]}"#).unwrap(),
        [r#""\u0001""#]
    );
}

#[test]
fn array_json_values() {
    check("[]", "$[0]", &[]);
    check("[1, 2, 3]", "$[0]", &["1"]);
    check("[1, 2]", "$[1]", &["2"]);
    check("[1, null]", "$[1]", &["null"]);
    check("[1]", "$[1]", &[]);
    check(r#"[{"a": 1}, 2, 3]"#, "$[1]", &["2"]);
}

#[test]
fn object_scalar_values() {
    assert_eq!(scalar("{}", "$.fuu"), None);
    assert_eq!(scalar(r#"{"a": 1}"#, "$.fuu"), None);
    assert_eq!(scalar(r#"{"fuu": 1}"#, "$.fuu").as_deref(), Some("1"));
    assert_eq!(scalar(r#"{"a": 0, "fuu": 1}"#, "$.fuu").as_deref(), Some("1"));
    assert_eq!(
        scalar(r#"{"a": [1, 2, 3], "fuu": 1}"#, "$.fuu").as_deref(),
        Some("1")
    );
}

#[test]
fn full_scalar() {
    assert_eq!(scalar("{}", "$"), None);
    assert_eq!(scalar(r#"{"fuu": {"bar": 1}}"#, "$.fuu"), None);
    assert_eq!(scalar(r#"{"fuu": 1}"#, "$.fuu").as_deref(), Some("1"));
    assert_eq!(scalar(r#"{"fuu": 1}"#, "$[fuu]").as_deref(), Some("1"));
    assert_eq!(scalar(r#"{"fuu": 1}"#, r#"$["fuu"]"#).as_deref(), Some("1"));
    assert_eq!(
        scalar(r#"{"ab\"cd\"ef": 2}"#, r#"$["ab\"cd\"ef"]"#).as_deref(),
        Some("2")
    );
    assert_eq!(scalar(r#"{"fuu": null}"#, "$.fuu"), None);
    assert_eq!(scalar(r#"{"fuu": 1}"#, "$.bar"), None);
    assert_eq!(scalar(r#"{"fuu": ["\u0001"]}"#, "$.fuu[0]").as_deref(), Some("\u{1}"));
    assert_eq!(
        scalar(r#"{"fuu": 1, "bar": "abc"}"#, "$.bar").as_deref(),
        Some("abc")
    );
    assert_eq!(scalar(r#"{"fuu": [0.1, 1, 2]}"#, "$.fuu[0]").as_deref(), Some("0.1"));
    assert_eq!(scalar(r#"{"fuu": [0, [100, 101], 2]}"#, "$.fuu[1]"), None);
    assert_eq!(
        scalar(r#"{"fuu": [0, [100, 101], 2]}"#, "$.fuu[1][1]").as_deref(),
        Some("101")
    );
    assert_eq!(
        scalar(
            r#"{"fuu": [0, {"bar": {"key" : ["value"]}}, 2]}"#,
            "$.fuu[1].bar.key[0]"
        )
        .as_deref(),
        Some("value")
    );
    assert_eq!(scalar("[0, 1, 2]", "$[0]").as_deref(), Some("0"));
}

#[test]
fn numeric_tokens_match_arrays_and_objects() {
    let array = "[0, 1, 2]";
    let object = r#"{"0" : 0, "1" : 1, "2" : 2 }"#;
    check(array, "$.1", &["1"]);
    check(array, "$[1]", &["1"]);
    check(array, r#"$["1"]"#, &[]);
    check(object, "$.1", &["1"]);
    check(object, "$[1]", &["1"]);
    check(object, r#"$["1"]"#, &["1"]);
}

#[test]
fn fields_starting_with_a_digit() {
    let json = r#"{"15day" : 0, "30day" : 1, "90day" : 2 }"#;
    check(json, "$.30day", &["1"]);
    check(json, "$[30day]", &["1"]);
    check(json, r#"$["30day"]"#, &["1"]);
    check(r#"{"a\\b": 4}"#, r#"$["a\\b"]"#, &["4"]);
    check(r#"{"fuu" : null}"#, "$.a.b", &[]);
}

#[test]
fn bracket_keys_with_special_characters() {
    check(r#"{"@$fuu": {".b.ar": 1}}"#, r#"$["@$fuu"]"#, &[r#"{".b.ar":1}"#]);
    check(r#"{"fuu..": 1}"#, r#"$["fuu.."]"#, &["1"]);
    check(r#"{"fu*u": null}"#, r#"$["fu*u"]"#, &["null"]);
    check(r#"{",fuu": 1}"#, r#"$["bar"]"#, &[]);
    check(r#"{",fuu": ["\u0001"]}"#, r#"$[",fuu"][0]"#, &[r#""\u0001""#]);
    check(r#"{":fu:u:": 1, ":b:ar:": "abc"}"#, r#"$[":b:ar:"]"#, &[r#""abc""#]);
    check(r#"{"?()fuu": [0.1, 1, 2]}"#, r#"$["?()fuu"][0]"#, &["0.1"]);
    check(r#"{"f?uu": [0, [100, 101], 2]}"#, r#"$["f?uu"][1]"#, &["[100,101]"]);
    check(r#"{"fuu()": [0, [100, 101], 2]}"#, r#"$["fuu()"][1][1]"#, &["101"]);
}

#[test]
fn mixed_bracket_and_dot_notation() {
    check(r#"{"fuu": {"bar": 1}}"#, r#"$["fuu"].bar"#, &["1"]);
    check(r#"{"fuu": {"bar": 1}}"#, r#"$.fuu["bar"]"#, &["1"]);
    check(r#"{"fuu": {"bar": 1}}"#, r#"$["fuu"]["bar"]"#, &["1"]);
    check(r#"{"@$fuu": {"bar": 1}}"#, r#"$["@$fuu"].bar"#, &["1"]);
    check(
        r#"{",fuu": {"bar": ["\u0001"]}}"#,
        r#"$[",fuu"].bar[0]"#,
        &[r#""\u0001""#],
    );
}

#[test]
fn invalid_paths() {
    for path in ["", "$.bar[2]-1", "$.", "$$", " ", ".", "$.store.book[", "  \t\n "] {
        assert!(Extractor::new(path).is_err(), "path {path:?} should be rejected");
    }
    assert_eq!(Extractor::new("  \t\n ").unwrap_err(), PathParseError::Empty);
}

#[test]
fn reextract_round_trip() {
    let extractor = Extractor::new("$").unwrap();
    let first = extractor.extract_all(STORE.as_bytes()).unwrap();
    let second = extractor.extract_all(first[0].as_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extracts_compose() {
    let cache = ExtractorCache::new();
    let store = cache.get_extractor("$.store").unwrap();
    let fruit = cache.get_extractor("$.fruit").unwrap();
    let direct = cache.get_extractor("$.store.fruit").unwrap();

    let step = store.extract_all(STORE.as_bytes()).unwrap();
    let composed = fruit.extract_all(step[0].as_bytes()).unwrap();
    assert_eq!(composed, direct.extract_all(STORE.as_bytes()).unwrap());
}

#[test]
fn invalid_json() {
    fn noop(_: Node<'_>) -> Result<(), JsonError> {
        Ok(())
    }
    let foo = Extractor::new("$.foo").unwrap();
    assert!(foo.extract(br#"{"foo: "bar"}"#, noop).is_err());
    assert!(foo.extract(br#"{"foo": "bar}"#, noop).is_err());
    let first = Extractor::new("$.foo[0]").unwrap();
    assert!(first.extract(br#"{"foo": ["bar", "baz]}"#, noop).is_err());
}

#[test]
fn malformed_elements_before_an_index_fail() {
    let third = Extractor::new("$.foo[2]").unwrap();
    assert!(third.extract_all(br#"{"foo": [1 2, 3]}"#).is_err());
    let sixth = Extractor::new("$[5]").unwrap();
    assert!(sixth.extract_all(b"[1, 2,]").is_err());
    // Index and wildcard agree on the same array
    let all = Extractor::new("$[*]").unwrap();
    assert!(all.extract_all(b"[1 2, 3]").is_err());
    assert!(Extractor::new("$[1]").unwrap().extract_all(b"[1 2, 3]").is_err());
}

#[test]
fn special_cases() {
    let json = r#"{"0" : {"bar" : [1, 2]}}"#;
    check(json, "$[0].bar", &["[1, 2]"]);
    check(json, "$['0'].bar", &["[1, 2]"]);
    check(json, r#"$["0"].bar"#, &["[1, 2]"]);
    check(json, "$.0.bar", &["[1, 2]"]);
    check(json, "$.'0'.bar", &[]);

    let json = r#"[{"bar" : [1, 2]}, {"foo" : [3, 4]}]"#;
    check(json, "$[0].bar", &["[1, 2]"]);
    check(json, "$['0'].bar", &[]);
    check(json, r#"$["0"].bar"#, &[]);
    check(json, "$.0.bar", &["[1, 2]"]);
    check(json, "$.'0'.bar", &[]);

    // Dot keys take quotes literally
    let json = r#"{"\"0\"" : {"bar" : [1, 2]}}"#;
    check(json, "$.0.bar", &[]);
    check(json, r#"$."0".bar"#, &["[1, 2]"]);

    let json = r#"[{"0": "obj"}, ["array0", "array1"]]"#;
    check(json, "$.*.0", &[r#""obj""#, r#""array0""#]);
    check(json, "$.*.[0]", &[r#""obj""#, r#""array0""#]);
    check(json, "$.*.['0']", &[r#""obj""#]);
    check(json, r#"$.*.["0"]"#, &[r#""obj""#]);

    let json = r#"[{"*": "obj"}, ["array0", "array1"]]"#;
    check(json, "$.*.*", &[r#""obj""#, r#""array0""#, r#""array1""#]);
    check(json, "$.*.[*]", &[r#""obj""#, r#""array0""#, r#""array1""#]);
    check(json, "$.*.['*']", &[r#""obj""#]);
    check(json, r#"$.*.["*"]"#, &[r#""obj""#]);
}

#[test]
fn recursive_descent() {
    check(NESTED, "$..object", &[OUTER, INNER]);
    check(NESTED, "$..array", &["[0,1,2]", "[4,5,6]"]);
    check(NESTED, "$..1", &["1", r#""value""#, "5"]);
    check(NESTED, "$..2", &["2", "6"]);
    check(NESTED, "$..non_existent_key", &[]);
    check(NESTED, "$..object..1", &["1", r#""value""#, "5", r#""value""#, "5"]);
    check(NESTED, "$..object..2", &["2", "6", "6"]);
    check(NESTED, "$..non_existent_key..*", &[]);
}

#[test]
fn recursive_descent_wildcards() {
    check(
        NESTED,
        "$..object..*",
        &[
            "[0,1,2]", INNER, "0", "1", "2", r#""value""#, "[4,5,6]", r#""bar""#, "4",
            "5", "6", r#""value""#, "[4,5,6]", r#""bar""#, "4", "5", "6",
        ],
    );
    check(
        NESTED,
        "$..*",
        &[
            OUTER, "[0,1,2]", INNER, "0", "1", "2", r#""value""#, "[4,5,6]",
            r#""bar""#, "4", "5", "6",
        ],
    );
    check(NESTED, "$..*..1", &["1", r#""value""#, "5", "1", r#""value""#, "5", "5"]);
    check(NESTED, "$..*..2", &["2", "6", "2", "6", "6"]);
    check(NESTED, r#"$..*..["1"]"#, &[r#""value""#, r#""value""#]);
    check(NESTED, "$..*..8", &[]);
    check(
        NESTED,
        "$..*..*",
        &[
            "[0,1,2]", INNER, "0", "1", "2", r#""value""#, "[4,5,6]", r#""bar""#, "4",
            "5", "6", "0", "1", "2", r#""value""#, "[4,5,6]", r#""bar""#, "4", "5",
            "6", "4", "5", "6",
        ],
    );
}
