//! Key string serialization.

use std::fmt;

use crate::types::*;

/// Convert a descriptor back into a key string that parses to the same descriptor.
pub fn descriptor_to_string(descriptor: &QueryDescriptor) -> String {
    let mut out = String::new();
    if let Some(list) = &descriptor.list_name {
        out.push_str(list);
        out.push('/');
    }

    let has_conditions = descriptor.context.is_some() || descriptor.key.is_some();
    if has_conditions {
        match (&descriptor.context, &descriptor.key) {
            (None, Some(key))
                if descriptor.list_name.is_some()
                    && !condition_to_string(key, DEFAULT_KEY_FIELD).contains(':') =>
            {
                out.push_str(&condition_to_string(key, DEFAULT_KEY_FIELD));
            }
            (context, key) => {
                if let Some(context) = context {
                    out.push_str(&condition_to_string(context, DEFAULT_CONTEXT_FIELD));
                }
                out.push(':');
                if let Some(key) = key {
                    out.push_str(&condition_to_string(key, DEFAULT_KEY_FIELD));
                }
            }
        }
        push_value_field_suffix(&mut out, &descriptor.value_field);
    } else if descriptor.list_name.is_some() {
        push_value_field_suffix(&mut out, &descriptor.value_field);
    } else if is_plain_literal(&descriptor.value_field) {
        out.push_str(&descriptor.value_field);
    } else {
        out.push('?');
        out.push_str(&descriptor.value_field);
    }

    // An empty list name parses as no list and keeps the rest intact.
    if descriptor.list_name.is_none() && out.contains('/') {
        out.insert(0, '/');
    }
    out
}

fn condition_to_string(condition: &FieldCondition, default_name: &str) -> String {
    if condition.name == default_name && !condition.value.contains('#') {
        condition.value.clone()
    } else {
        format!("{}#{}", condition.name, condition.value)
    }
}

fn push_value_field_suffix(out: &mut String, value_field: &str) {
    if value_field != DEFAULT_VALUE_FIELD {
        out.push('?');
        out.push_str(value_field);
    }
}

fn is_plain_literal(value_field: &str) -> bool {
    !value_field.is_empty() && !value_field.contains(['/', '?', ':'])
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&descriptor_to_string(self))
    }
}

impl fmt::Display for ReturnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}
