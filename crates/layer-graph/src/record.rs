// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Field-keyed record reader/writer used by layer persistence.
//!
//! Every persisted layer is one flat record:
//!
//! ```json
//! { "type": "Input", "version": 1, "size": 5 }
//! ```
//!
//! The `type` field is written by the [`crate::Model`]; `version` and the
//! type-specific fields are written by the layer itself. Layers never see the
//! underlying JSON; they only name fields and hand over `serde` values.

use crate::LayerError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field holding the runtime type name of a persisted layer.
pub const TYPE_FIELD: &str = "type";

/// Field holding the per-type record version.
pub const VERSION_FIELD: &str = "version";

/// Accumulates named fields for one persisted record.
#[derive(Debug, Clone, Default)]
pub struct RecordWriter {
    fields: Map<String, Value>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `field`, replacing any earlier value.
    pub fn write<T: Serialize + ?Sized>(&mut self, field: &str, value: &T) -> Result<(), LayerError> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(field.to_owned(), value);
        Ok(())
    }

    /// Writes the record version.
    pub fn write_version(&mut self, version: u32) -> Result<(), LayerError> {
        self.write(VERSION_FIELD, &version)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Read access to the named fields of one persisted record.
#[derive(Debug, Clone)]
pub struct RecordReader {
    fields: Map<String, Value>,
}

impl RecordReader {
    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, LayerError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(LayerError::MalformedRecord(format!(
                "expected a layer record object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Reads and deserializes `field`.
    pub fn read<T: DeserializeOwned>(&self, field: &str) -> Result<T, LayerError> {
        let value = self.fields.get(field).ok_or_else(|| LayerError::MissingField {
            field: field.to_owned(),
        })?;
        Ok(T::deserialize(value)?)
    }

    /// Reads the record version.
    pub fn read_version(&self) -> Result<u32, LayerError> {
        self.read(VERSION_FIELD)
    }

    /// Reads the runtime type name written by the model.
    pub fn type_name(&self) -> Result<String, LayerError> {
        self.read(TYPE_FIELD)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
