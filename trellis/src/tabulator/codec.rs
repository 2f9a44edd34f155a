//! Conversion between typed records and their native JSON form.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Bidirectional converter between records and native rows.
///
/// Only the single-record methods are required; sequence and text helpers
/// are derived from them. Decoding a non-array where a sequence is expected
/// is an `Error::Malformed`.
pub trait Codec<T>: Send + Sync {
    fn encode_one(&self, record: &T) -> Result<Value>;

    fn decode_one(&self, value: &Value) -> Result<T>;

    fn encode(&self, records: &[T]) -> Result<Value> {
        records
            .iter()
            .map(|r| self.encode_one(r))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode(&self, value: &Value) -> Result<Vec<T>> {
        match value {
            Value::Array(rows) => rows.iter().map(|row| self.decode_one(row)).collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::malformed(format!(
                "expected an array of rows, got {}",
                kind(other)
            ))),
        }
    }

    /// Encode to JSON text.
    fn encode_text(&self, records: &[T]) -> Result<String> {
        Ok(serde_json::to_string(&self.encode(records)?)?)
    }

    /// Decode from JSON text.
    fn decode_text(&self, text: &str) -> Result<Vec<T>> {
        let value: Value = serde_json::from_str(text)?;
        self.decode(&value)
    }
}

/// Codec for any serde record.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonCodec<{}>", std::any::type_name::<T>())
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode_one(&self, record: &T) -> Result<Value> {
        Ok(serde_json::to_value(record)?)
    }

    fn decode_one(&self, value: &Value) -> Result<T> {
        Ok(T::deserialize(value)?)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
