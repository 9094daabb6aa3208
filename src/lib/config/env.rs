//! `${NAME}` interpolation for provider configuration values.

use serde_yaml::Value;
use std::env;

/// Result of expanding environment references in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolated {
    pub value: String,
    /// Variables that were referenced but not set; they expand to ""
    pub missing: Vec<String>,
}

/// Expand `${NAME}` and `$NAME` from the process environment.
pub fn interpolate_env(input: &str) -> Interpolated {
    interpolate_with(input, |name| env::var(name).ok())
}

/// Expand references using a custom lookup.
pub fn interpolate_with<F>(input: &str, mut lookup: F) -> Interpolated
where
    F: FnMut(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let value = shellexpand::env_with_context_no_errors(input, |name: &str| match lookup(name) {
        Some(value) => Some(value),
        None => {
            missing.push(name.to_string());
            Some(String::new())
        }
    })
    .into_owned();

    Interpolated { value, missing }
}

/// Interpolate every string scalar of a YAML document in place.
///
/// Keys are left untouched. Names of unset variables are appended to
/// `missing` in document order.
pub fn interpolate_value<F>(value: &mut Value, lookup: &mut F, missing: &mut Vec<String>)
where
    F: FnMut(&str) -> Option<String>,
{
    match value {
        Value::String(text) => {
            let expanded = interpolate_with(text.as_str(), &mut *lookup);
            *text = expanded.value;
            missing.extend(expanded.missing);
        }
        Value::Sequence(items) => {
            for item in items {
                interpolate_value(item, lookup, missing);
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                interpolate_value(item, lookup, missing);
            }
        }
        Value::Tagged(tagged) => interpolate_value(&mut tagged.value, lookup, missing),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
