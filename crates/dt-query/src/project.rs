//! Attribute projection over candidate objects.

use serde_json::{Map, Value};

use crate::types::{Projection, ReturnKey};

/// Extracts the requested fields from the first qualifying candidate.
pub struct Projector;

impl Projector {
    /// Project `return_key` over `candidates`, innermost object first.
    ///
    /// A field counts as present only when it holds a non-null value.
    pub fn project(return_key: &ReturnKey, candidates: &[Option<&Map<String, Value>>]) -> Projection {
        let objects = candidates.iter().flatten();
        match return_key {
            ReturnKey::Object => objects
                .map(|obj| Projection::Object(Value::Object((*obj).clone())))
                .next()
                .unwrap_or_else(|| Projection::MissingField(return_key.as_text())),
            ReturnKey::Fields(names) => {
                for obj in objects {
                    let values: Option<Vec<&Value>> = names
                        .iter()
                        .map(|name| obj.get(name).filter(|v| !v.is_null()))
                        .collect();
                    if let Some(mut values) = values {
                        if values.len() == 1 {
                            return Projection::Value(values.remove(0).clone());
                        }
                        return Projection::Tuple(values.into_iter().cloned().collect());
                    }
                }
                Projection::MissingField(return_key.as_text())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn single_field_prefers_innermost() {
        let inner = obj(json!({"value": "et-demo-1"}));
        let outer = obj(json!({"value": "outer", "entityId": "HOST-1"}));
        let key = ReturnKey::parse("value");
        assert_eq!(
            Projector::project(&key, &[Some(&inner), Some(&outer)]),
            Projection::Value(json!("et-demo-1"))
        );
        let key = ReturnKey::parse("entityId");
        assert_eq!(
            Projector::project(&key, &[Some(&inner), Some(&outer)]),
            Projection::Value(json!("HOST-1"))
        );
    }

    #[test]
    fn tuple_requires_every_field_on_one_candidate() {
        let inner = obj(json!({"displayName": "a"}));
        let outer = obj(json!({"displayName": "b", "entityId": "E-1"}));
        let key = ReturnKey::parse("displayName,entityId");
        assert_eq!(
            Projector::project(&key, &[Some(&inner), Some(&outer)]),
            Projection::Tuple(vec![json!("b"), json!("E-1")])
        );
    }

    #[test]
    fn null_field_counts_as_missing() {
        let inner = obj(json!({"entityId": null}));
        let key = ReturnKey::parse("entityId");
        assert_eq!(
            Projector::project(&key, &[Some(&inner), None]),
            Projection::MissingField("entityId".into())
        );
    }

    #[test]
    fn wildcard_returns_first_present_candidate() {
        let outer = obj(json!({"entityId": "E-1"}));
        assert_eq!(
            Projector::project(&ReturnKey::Object, &[None, Some(&outer)]),
            Projection::Object(json!({"entityId": "E-1"}))
        );
        assert!(Projector::project(&ReturnKey::Object, &[None, None]).is_missing());
    }
}
