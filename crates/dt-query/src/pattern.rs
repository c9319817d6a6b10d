//! Match-value compilation.

use regex::Regex;
use serde_json::Value;

use crate::error::SearchError;

/// A compiled match value.
///
/// A pattern matches when the regex matches at the start of the text; the
/// rest of the text is unconstrained, so `et-demo` matches `et-demo-1`.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    regex: Regex,
}

impl MatchPattern {
    /// Compile an optional match value. `None` means "accept any non-null value".
    pub fn compile(pattern: Option<&str>) -> Result<Option<Self>, SearchError> {
        pattern.map(Self::new).transpose()
    }

    pub fn new(pattern: &str) -> Result<Self, SearchError> {
        let regex = Regex::new(pattern).map_err(|source| SearchError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Prefix match against a string.
    pub fn is_match(&self, text: &str) -> bool {
        // Leftmost-first search returns a match at offset 0 whenever one exists.
        self.regex.find(text).is_some_and(|m| m.start() == 0)
    }

    /// Match against a JSON scalar. Numbers and booleans are matched by their
    /// JSON text; null, arrays and objects never match.
    pub fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.is_match(s),
            Value::Number(n) => self.is_match(&n.to_string()),
            Value::Bool(b) => self.is_match(if *b { "true" } else { "false" }),
            Value::Null | Value::Array(_) | Value::Object(_) => false,
        }
    }
}

/// Whether `value` is accepted by an optional pattern.
///
/// Without a pattern every non-null scalar is accepted.
pub fn accepts(pattern: Option<&MatchPattern>, value: &Value) -> bool {
    match pattern {
        Some(pattern) => pattern.matches_value(value),
        None => !value.is_null() && !value.is_array() && !value.is_object(),
    }
}
