//! Key string parser.
//!
//! Grammar, each delimiter split on its first occurrence, left to right:
//!
//! ```text
//! [list "/"] [context ":"] [key] ["?" value_field]
//! ```
//!
//! `context` and `key` accept a `fieldname#value` override. A bare literal is
//! the key when a list is named and the value field otherwise.

use std::convert::Infallible;
use std::str::FromStr;

use crate::types::*;

/// Key string parser. Total: malformed or empty fragments leave conditions unset.
pub struct KeyParser;

impl KeyParser {
    /// Parse a key string into a [`QueryDescriptor`].
    pub fn parse(input: &str) -> QueryDescriptor {
        let mut descriptor = QueryDescriptor::default();

        let mut rest = input;
        if let Some((list, tail)) = rest.split_once('/') {
            descriptor.list_name = non_empty(list).map(str::to_string);
            rest = tail;
        }

        if let Some((core, value_field)) = rest.split_once('?') {
            descriptor.value_field = value_field.to_string();
            rest = core;
        }

        if rest.is_empty() {
            return descriptor;
        }

        match rest.split_once(':') {
            Some((context, key)) => {
                descriptor.context = Self::parse_condition(context, DEFAULT_CONTEXT_FIELD);
                descriptor.key = Self::parse_condition(key, DEFAULT_KEY_FIELD);
            }
            None if descriptor.list_name.is_some() => {
                descriptor.key = Self::parse_condition(rest, DEFAULT_KEY_FIELD);
            }
            None => descriptor.value_field = rest.to_string(),
        }

        descriptor
    }

    /// Parse `value` or `fieldname#value`.
    fn parse_condition(literal: &str, default_name: &str) -> Option<FieldCondition> {
        let (name, value) = match literal.split_once('#') {
            Some((name, value)) => (non_empty(name).unwrap_or(default_name), value),
            None => (default_name, literal),
        };
        non_empty(value).map(|value| FieldCondition::new(name, value))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl From<&str> for QueryDescriptor {
    fn from(input: &str) -> Self {
        KeyParser::parse(input)
    }
}

impl From<&String> for QueryDescriptor {
    fn from(input: &String) -> Self {
        KeyParser::parse(input)
    }
}

impl FromStr for QueryDescriptor {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(KeyParser::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literal_is_value_field() {
        let d = KeyParser::parse("displayName");
        assert_eq!(d, QueryDescriptor::value_field("displayName"));
    }

    #[test]
    fn empty_key_is_default_value_match() {
        assert_eq!(KeyParser::parse(""), QueryDescriptor::default());
    }

    #[test]
    fn list_with_context_and_key() {
        let d = KeyParser::parse("tags/AWS:Name");
        assert_eq!(d.list_name.as_deref(), Some("tags"));
        assert_eq!(d.context, Some(FieldCondition::new("context", "AWS")));
        assert_eq!(d.key, Some(FieldCondition::new("key", "Name")));
        assert_eq!(d.value_field, "value");
    }

    #[test]
    fn bare_literal_under_list_is_key() {
        let d = KeyParser::parse("tags/Name");
        assert_eq!(d.key, Some(FieldCondition::new("key", "Name")));
        assert!(d.context.is_none());
        assert_eq!(d.value_field, "value");
    }

    #[test]
    fn field_name_overrides() {
        let d = KeyParser::parse("tags/Env#AWS:Role#Name");
        assert_eq!(d.context, Some(FieldCondition::new("Env", "AWS")));
        assert_eq!(d.key, Some(FieldCondition::new("Role", "Name")));
    }

    #[test]
    fn question_mark_sets_value_field() {
        let d = KeyParser::parse("tags/AWS:Category?value");
        assert_eq!(d.key, Some(FieldCondition::new("key", "Category")));
        assert_eq!(d.value_field, "value");

        let d = KeyParser::parse("softwareTechnologies/?type");
        assert_eq!(d.list_name.as_deref(), Some("softwareTechnologies"));
        assert!(d.key.is_none());
        assert_eq!(d.value_field, "type");
    }

    #[test]
    fn plain_literal_wins_over_question_mark_without_list() {
        let d = KeyParser::parse("displayName?other");
        assert_eq!(d.value_field, "displayName");
    }

    #[test]
    fn empty_fragments_leave_conditions_unset() {
        let d = KeyParser::parse("/x");
        assert!(d.list_name.is_none());
        assert_eq!(d.value_field, "x");

        let d = KeyParser::parse("tags/:Name");
        assert!(d.context.is_none());
        assert_eq!(d.key, Some(FieldCondition::new("key", "Name")));

        let d = KeyParser::parse("tags/AWS:");
        assert!(d.key.is_none());

        let d = KeyParser::parse("tags/#AWS:Name");
        assert_eq!(d.context, Some(FieldCondition::new("context", "AWS")));
    }

    #[test]
    fn delimiters_split_on_first_occurrence() {
        let d = KeyParser::parse("a/b/c");
        assert_eq!(d.list_name.as_deref(), Some("a"));
        assert_eq!(d.key, Some(FieldCondition::new("key", "b/c")));

        let d = KeyParser::parse("x:y:z");
        assert_eq!(d.context, Some(FieldCondition::new("context", "x")));
        assert_eq!(d.key, Some(FieldCondition::new("key", "y:z")));

        let d = KeyParser::parse("tags/k#v#w");
        assert_eq!(d.key, Some(FieldCondition::new("k", "v#w")));
    }

    #[test]
    fn from_str_is_infallible() {
        let d: QueryDescriptor = "tags/AWS:Name".parse().unwrap();
        assert_eq!(d, KeyParser::parse("tags/AWS:Name"));
    }
}
