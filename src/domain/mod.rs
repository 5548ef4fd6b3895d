use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

pub mod class;
pub mod participant;
pub mod payment;

pub use class::*;
pub use participant::*;
pub use payment::*;

/// A record addressed by its store key.
pub trait Record {
    fn id(&self) -> &str;
}

impl Record for Class {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Participant {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for PaymentFile {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Decode a stored record, taking its id from the store key.
pub fn from_record<T: DeserializeOwned>(id: &str, value: Value) -> Result<T> {
    let Value::Object(mut fields) = value else {
        return Err(AppError::Decode(format!("record '{}' is not an object", id)));
    };
    fields.insert("id".to_string(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Decode(format!("record '{}': {}", id, e)))
}

/// Encode a value for storage. The id lives in the key, never in the record.
pub fn to_record<T: Serialize>(value: &T) -> Result<Value> {
    let mut value = serde_json::to_value(value)?;
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    Ok(value)
}

/// Case-insensitive substring match used by every search box.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
