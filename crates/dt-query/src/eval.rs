//! Key-search evaluator.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::SearchError;
use crate::pattern::{accepts, MatchPattern};
use crate::project::Projector;
use crate::types::*;

/// A compiled key search: descriptor, match pattern and return key.
///
/// Build once, then run against any number of documents.
#[derive(Debug, Clone)]
pub struct KeySearch {
    descriptor: QueryDescriptor,
    pattern: Option<MatchPattern>,
    return_key: ReturnKey,
}

impl KeySearch {
    /// Compile a search. Fails only when `match_value` is not a valid regex.
    pub fn new(
        descriptor: impl Into<QueryDescriptor>,
        match_value: Option<&str>,
        return_key: impl Into<ReturnKey>,
    ) -> Result<Self, SearchError> {
        let pattern = MatchPattern::compile(match_value)?;
        Ok(Self {
            descriptor: descriptor.into(),
            pattern,
            return_key: return_key.into(),
        })
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn pattern(&self) -> Option<&MatchPattern> {
        self.pattern.as_ref()
    }

    pub fn return_key(&self) -> &ReturnKey {
        &self.return_key
    }

    /// Run the search against a parsed document.
    ///
    /// Results follow document order; duplicates are kept.
    pub fn find(&self, doc: &Value) -> Vec<Projection> {
        let mut results = Vec::new();
        self.eval_node(doc, None, None, &mut results);
        debug!(
            descriptor = %self.descriptor,
            pattern = self.pattern.as_ref().map(MatchPattern::as_str),
            return_key = %self.return_key.as_text(),
            matches = results.len(),
            "key search finished"
        );
        results
    }

    /// Parse `json` and run the search against it.
    pub fn find_in_str(&self, json: &str) -> Result<Vec<Projection>, SearchError> {
        let doc: Value = serde_json::from_str(json)?;
        Ok(self.find(&doc))
    }

    fn eval_node<'a>(
        &self,
        node: &'a Value,
        parent_key: Option<&'a str>,
        parent: Option<&'a Map<String, Value>>,
        results: &mut Vec<Projection>,
    ) {
        match node {
            Value::Object(map) => self.eval_object(map, parent_key, parent, results),
            Value::Array(items) => {
                // Arrays do not shift the parent context.
                for item in items {
                    if item.is_object() || item.is_array() {
                        self.eval_node(item, parent_key, parent, results);
                    }
                }
            }
            _ => {}
        }
    }

    fn eval_object<'a>(
        &self,
        map: &'a Map<String, Value>,
        parent_key: Option<&'a str>,
        parent: Option<&'a Map<String, Value>>,
        results: &mut Vec<Projection>,
    ) {
        let descriptor = &self.descriptor;
        let pattern = self.pattern.as_ref();
        let candidates = [Some(map), parent];

        let mut value_match: Option<Projection> = None;
        let mut context_ok = descriptor.context.is_none();
        let mut key_ok = descriptor.key.is_none();

        for (field, value) in map {
            match value {
                // A list named after the key condition, e.g. {"Name": ["et-demo-1"]}.
                Value::Array(items) if descriptor.key_value() == Some(field.as_str()) => {
                    if pattern.is_none() || items.iter().any(|item| accepts(pattern, item)) {
                        value_match = Some(Projector::project(&self.return_key, &candidates));
                    }
                }
                // A list carrying the values themselves; every matching element yields a result.
                Value::Array(items) if *field == descriptor.value_field => {
                    for item in items.iter().filter(|item| accepts(pattern, item)) {
                        trace!(field = %field, item = %item, "list value matched");
                        results.push(Projector::project(&self.return_key, &candidates));
                    }
                }
                Value::Array(_) | Value::Object(_) => {
                    self.eval_node(value, Some(field.as_str()), Some(map), results);
                }
                _ if *field == descriptor.value_field => {
                    if accepts(pattern, value) {
                        value_match = Some(Projector::project(&self.return_key, &candidates));
                    }
                }
                _ => match (&descriptor.context, &descriptor.key) {
                    (Some(context), _) if *field == context.name => {
                        context_ok = context.is_satisfied_by(value);
                    }
                    (_, Some(key)) if *field == key.name => {
                        key_ok = key.is_satisfied_by(value);
                    }
                    _ => {}
                },
            }
        }

        if !descriptor.accepts_parent(parent_key) || !context_ok || !key_ok {
            return;
        }
        if let Some(projection) = value_match {
            trace!(parent_key, "object matched");
            results.push(projection);
        }
    }
}

/// Search `doc` for `key`, returning `return_key` of every match.
///
/// ```
/// use dt_query::{find_values_by_key, Projection};
/// use serde_json::json;
///
/// let doc = json!([
///     {"displayName": "www.easytravel.com", "entityId": "APPLICATION-1"},
///     {"displayName": "shop.example.com", "entityId": "APPLICATION-2"}
/// ]);
/// let ids = find_values_by_key(&doc, "displayName", Some(".*easytravel.*"), "entityId").unwrap();
/// assert_eq!(ids, vec![Projection::Value(json!("APPLICATION-1"))]);
/// ```
pub fn find_values_by_key(
    doc: &Value,
    key: &str,
    match_value: Option<&str>,
    return_key: &str,
) -> Result<Vec<Projection>, SearchError> {
    Ok(KeySearch::new(key, match_value, return_key)?.find(doc))
}

/// Like [`find_values_by_key`], but parses the document from JSON text first.
///
/// The pattern is compiled before the document is parsed.
pub fn find_values_by_key_str(
    json: &str,
    key: &str,
    match_value: Option<&str>,
    return_key: &str,
) -> Result<Vec<Projection>, SearchError> {
    KeySearch::new(key, match_value, return_key)?.find_in_str(json)
}
