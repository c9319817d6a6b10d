//! Key-search query language for monitoring API responses.
//!
//! A key string describes which field to test, optionally scoped to a named
//! tag list and to sibling `context`/`key` fields. A search walks an arbitrary
//! JSON document, tests the value field against a match pattern and returns a
//! caller-chosen projection of every matching object.
//!
//! | key string                    | matches |
//! |-------------------------------|---------|
//! | `displayName`                 | objects whose `displayName` matches |
//! | `tags/AWS:Name`               | `{"context":"AWS","key":"Name","value":..}` directly inside `tags` |
//! | `tags/Name`                   | tags with `key` = `Name` |
//! | `tags/Env#AWS:Role#Name`      | tags with `Env` = `AWS` and `Role` = `Name` |
//! | `softwareTechnologies/?type`  | `type` field of objects inside `softwareTechnologies` |
//!
//! # Example
//!
//! ```
//! use dt_query::{KeySearch, Projection};
//! use serde_json::json;
//!
//! let hosts = json!([
//!     {
//!         "entityId": "HOST-1",
//!         "tags": [{"context": "AWS", "key": "Name", "value": "et-demo-1"}]
//!     },
//!     {
//!         "entityId": "HOST-2",
//!         "tags": [{"context": "AWS", "key": "Name", "value": "prod-1"}]
//!     }
//! ]);
//!
//! let search = KeySearch::new("tags/AWS:Name", Some("et-demo.*"), "entityId").unwrap();
//! assert_eq!(search.find(&hosts), vec![Projection::Value(json!("HOST-1"))]);
//! ```

mod types;
pub use types::*;

mod error;
pub use error::SearchError;

mod parser;
pub use parser::KeyParser;

mod pattern;
pub use pattern::MatchPattern;

mod project;
pub use project::Projector;

mod eval;
pub use eval::{find_values_by_key, find_values_by_key_str, KeySearch};

mod util;
pub use util::descriptor_to_string;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_key() {
        let d = KeyParser::parse("entityId");
        assert_eq!(d.value_field, "entityId");
        assert!(!d.is_tag_search());
    }

    #[test]
    fn test_parse_tag_key() {
        let d = KeyParser::parse("tags/AWS:Name");
        assert!(d.is_tag_search());
        assert_eq!(d.key_value(), Some("Name"));
    }

    #[test]
    fn test_eval_tuple_projection() {
        let doc = json!({"displayName": "www.easytravel.com", "entityId": "APP-1"});
        let results = find_values_by_key(&doc, "displayName", Some(".*easytravel.*"), "displayName,entityId").unwrap();
        assert_eq!(results, vec![Projection::Tuple(vec![json!("www.easytravel.com"), json!("APP-1")])]);
    }

    #[test]
    fn test_eval_wildcard_projection() {
        let doc = json!({"displayName": "www.easytravel.com", "entityId": "APP-1"});
        let results = find_values_by_key(&doc, "displayName", None, "*").unwrap();
        assert_eq!(results, vec![Projection::Object(doc.clone())]);
    }

    #[test]
    fn test_eval_missing_return_field() {
        let doc = json!({"displayName": "www.easytravel.com"});
        let results = find_values_by_key(&doc, "displayName", None, "entityId").unwrap();
        assert_eq!(results, vec![Projection::MissingField("entityId".into())]);
        assert!(results[0].to_value().is_none());
    }

    #[test]
    fn test_eval_str_document() {
        let results = find_values_by_key_str(
            r#"{"displayName": "www.easytravel.com", "entityId": "APP-1"}"#,
            "displayName",
            None,
            "entityId",
        )
        .unwrap();
        assert_eq!(results[0].as_str(), Some("APP-1"));
    }

    #[test]
    fn test_prebuilt_descriptor() {
        let descriptor = QueryDescriptor::default().with_list("tags").with_context("context", "AWS").with_key("key", "Name");
        let search = KeySearch::new(descriptor, None, "value").unwrap();
        let doc = json!({"tags": [{"context": "AWS", "key": "Name", "value": "et-demo-1"}]});
        assert_eq!(search.find(&doc), vec![Projection::Value(json!("et-demo-1"))]);
    }
}
