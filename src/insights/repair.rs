//! Recovery of structured fields from free-form model output
//!
//! Stages, first non-empty result wins:
//!
//! 1. the outermost `{...}` block, cleaned of comments and trailing commas, parsed as JSON
//! 2. a key/value scan over that block when it is not valid JSON
//! 3. a `key: value` line scan when the response contains no block at all
//!
//! A result with fewer than two keys is treated as unusable.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

const MIN_FIELDS: usize = 2;

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[\s,{\[])//[^\n]*").expect("valid regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

static QUOTED_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*"([^"]*)""#).expect("valid regex"));
static LIST_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*\[([^\]]*)\]"#).expect("valid regex"));
static NUMBER_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"\s*:\s*(-?\d+(?:\.\d+)?)"#).expect("valid regex")
});
static BARE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*([^,}\]]+)"#).expect("valid regex"));

/// Remove comments and trailing commas, flattening newlines
pub(crate) fn clean_block(block: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(block, "");
    let without_lines = LINE_COMMENT.replace_all(&without_blocks, "$1");
    let flattened = without_lines.replace(['\n', '\r'], " ");
    TRAILING_COMMA.replace_all(&flattened, "$1").into_owned()
}

fn strip_quotes(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn insert_first(fields: &mut Map<String, Value>, key: &str, value: Value) {
    let key = key.trim();
    if key.is_empty() || fields.contains_key(key) {
        return;
    }
    fields.insert(key.to_string(), value);
}

/// Pull `"key": value` pairs out of JSON-like text
///
/// Quoted strings, lists, numbers and barewords are scanned in that order. A key keeps
/// the value from the first of these passes that yields it, so a quoted value beats an
/// earlier bareword for the same key.
pub(crate) fn scan_key_values(text: &str) -> Map<String, Value> {
    let mut fields = Map::new();

    for captures in QUOTED_PAIR.captures_iter(text) {
        let value = captures[2].trim();
        if !value.is_empty() {
            insert_first(&mut fields, &captures[1], Value::String(value.to_string()));
        }
    }
    for captures in LIST_PAIR.captures_iter(text) {
        let items: Vec<Value> = captures[2]
            .split(',')
            .map(strip_quotes)
            .filter(|item| !item.is_empty())
            .map(Value::String)
            .collect();
        if !items.is_empty() {
            insert_first(&mut fields, &captures[1], Value::Array(items));
        }
    }
    for captures in NUMBER_PAIR.captures_iter(text) {
        insert_first(&mut fields, &captures[1], Value::String(captures[2].to_string()));
    }
    for captures in BARE_PAIR.captures_iter(text) {
        let value = strip_quotes(&captures[2]);
        if !value.is_empty() {
            insert_first(&mut fields, &captures[1], Value::String(value));
        }
    }

    fields
}

/// Read `Key Name: value` lines, normalizing keys to snake case
pub(crate) fn scan_lines(text: &str) -> Map<String, Value> {
    let mut fields = Map::new();

    for line in text.lines() {
        let line = line
            .trim()
            .trim_start_matches(|c: char| c == '-' || c == '•' || c.is_ascii_digit())
            .trim_start_matches(['.', ')'])
            .replace('*', "");
        let line = line.trim();
        if line.chars().count() <= 3 {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim().to_lowercase().replace([' ', '-'], "_");
        let value = value.trim();
        if key.chars().count() > 2 && !value.is_empty() {
            fields.insert(key, Value::String(value.to_string()));
        }
    }

    fields
}

/// Recover a field map from a model response
///
/// # Returns
///
/// `None` when no stage yields at least two fields
pub fn parse_response(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }

    let fields = match JSON_BLOCK.find(text) {
        Some(block) => {
            let cleaned = clean_block(block.as_str());
            match serde_json::from_str::<Value>(&cleaned) {
                Ok(Value::Object(fields)) if !fields.is_empty() => fields,
                Ok(_) => {
                    debug!("JSON block is not a usable object, scanning key/value pairs");
                    scan_key_values(&cleaned)
                }
                Err(e) => {
                    debug!("Strict parse failed ({}), scanning key/value pairs", e);
                    scan_key_values(&cleaned)
                }
            }
        }
        None => {
            debug!("No JSON block in response, scanning lines");
            scan_lines(text)
        }
    };

    if fields.len() < MIN_FIELDS {
        debug!("Only {} fields recovered", fields.len());
        return None;
    }
    Some(fields)
}
