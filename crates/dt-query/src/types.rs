//! Key-search types: the parsed query descriptor, the return key and the
//! projected results.

use serde_json::Value;

/// Default name of the context field inside a tag-like object.
pub const DEFAULT_CONTEXT_FIELD: &str = "context";
/// Default name of the key field inside a tag-like object.
pub const DEFAULT_KEY_FIELD: &str = "key";
/// Default name of the field whose value is tested against the pattern.
pub const DEFAULT_VALUE_FIELD: &str = "value";

/// Sibling-equality condition: the object must hold `name` with a value equal to `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCondition {
    pub name: String,
    pub value: String,
}

impl FieldCondition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Whether a JSON field value satisfies this condition.
    ///
    /// Only string values can be equal to the expected literal.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        value.as_str() == Some(self.value.as_str())
    }
}

/// Parsed form of a key string such as `tags/AWS:Name` or `displayName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    /// Name of the array a match must sit directly under (`tags` in `tags/AWS:Name`).
    pub list_name: Option<String>,
    /// Context condition (`AWS` in `tags/AWS:Name`).
    pub context: Option<FieldCondition>,
    /// Key condition (`Name` in `tags/AWS:Name`).
    pub key: Option<FieldCondition>,
    /// Field whose value is tested against the match pattern.
    pub value_field: String,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            list_name: None,
            context: None,
            key: None,
            value_field: DEFAULT_VALUE_FIELD.to_string(),
        }
    }
}

impl QueryDescriptor {
    /// Plain value-field match without list, context or key conditions.
    pub fn value_field(name: impl Into<String>) -> Self {
        Self { value_field: name.into(), ..Self::default() }
    }

    pub fn with_list(mut self, list_name: impl Into<String>) -> Self {
        self.list_name = Some(list_name.into());
        self
    }

    pub fn with_context(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context = Some(FieldCondition::new(name, value));
        self
    }

    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.key = Some(FieldCondition::new(name, value));
        self
    }

    /// True when the query is scoped to a named tag list.
    pub fn is_tag_search(&self) -> bool {
        self.list_name.is_some()
    }

    /// Expected value of the key condition, if any.
    pub fn key_value(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.value.as_str())
    }

    /// Whether a match found under `parent_key` is in the required list.
    pub fn accepts_parent(&self, parent_key: Option<&str>) -> bool {
        match &self.list_name {
            None => true,
            Some(list) => parent_key == Some(list.as_str()),
        }
    }
}

/// Which part of a matched object a search returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnKey {
    /// `*`: the whole matched object.
    Object,
    /// One or more comma-separated field names.
    Fields(Vec<String>),
}

impl ReturnKey {
    /// Parse `*`, `entityId` or `displayName,entityId`.
    pub fn parse(input: &str) -> Self {
        if input == "*" {
            return ReturnKey::Object;
        }
        ReturnKey::Fields(input.split(',').map(str::to_string).collect())
    }

    /// Textual form, as accepted by [`ReturnKey::parse`].
    pub fn as_text(&self) -> String {
        match self {
            ReturnKey::Object => String::from("*"),
            ReturnKey::Fields(names) => names.join(","),
        }
    }
}

impl From<&str> for ReturnKey {
    fn from(input: &str) -> Self {
        ReturnKey::parse(input)
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Single requested field.
    Value(Value),
    /// Several requested fields, in request order.
    Tuple(Vec<Value>),
    /// The whole matched object (`*`).
    Object(Value),
    /// No candidate object held the requested field(s); carries the return key.
    MissingField(String),
}

impl Projection {
    pub fn is_missing(&self) -> bool {
        matches!(self, Projection::MissingField(_))
    }

    /// The projected data as a single JSON value; tuples become arrays.
    ///
    /// Returns `None` for [`Projection::MissingField`].
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Projection::Value(v) | Projection::Object(v) => Some(v.clone()),
            Projection::Tuple(values) => Some(Value::Array(values.clone())),
            Projection::MissingField(_) => None,
        }
    }

    /// Consuming variant of [`Projection::to_value`].
    pub fn into_value(self) -> Option<Value> {
        match self {
            Projection::Value(v) | Projection::Object(v) => Some(v),
            Projection::Tuple(values) => Some(Value::Array(values)),
            Projection::MissingField(_) => None,
        }
    }

    /// Borrow a single-field result as a string, e.g. an entity id.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Projection::Value(v) => v.as_str(),
            _ => None,
        }
    }
}
