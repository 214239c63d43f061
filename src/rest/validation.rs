//! Input checks shared by endpoint wrappers.
//!
//! Each helper fails fast with a [`ValidationError`] naming the parameter.

use serde_json::{Map, Value};

use crate::rest::errors::ValidationError;

/// Requires a non-null value whose string form is not blank.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`].
pub fn presence(value: &Value, name: &str) -> Result<(), ValidationError> {
    let blank = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if blank {
        return Err(ValidationError::Missing {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Requires a non-blank string.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`].
pub fn presence_str(value: &str, name: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Requires a JSON object.
///
/// # Errors
///
/// Returns [`ValidationError::NotObject`].
pub fn object<'v>(value: &'v Value, name: &str) -> Result<&'v Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::NotObject {
        name: name.to_string(),
    })
}

/// Requires `true` or `false`.
///
/// # Errors
///
/// Returns [`ValidationError::NotBoolean`].
pub fn boolean(value: &Value, name: &str) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| ValidationError::NotBoolean {
        name: name.to_string(),
    })
}

/// Requires an integer or a string holding one.
///
/// # Errors
///
/// Returns [`ValidationError::NotInteger`].
pub fn integer(value: &Value, name: &str) -> Result<i64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::NotInteger {
        name: name.to_string(),
    })
}
