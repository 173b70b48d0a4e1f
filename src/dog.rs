use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Error;

/// One photo in every size Petfinder serves it, keyed by variant
/// (`small`, `medium`, `large`, `full`). Values and key order are kept as
/// received.
pub type PhotoSet = Map<String, Value>;

/// An adoptable dog as listed by Petfinder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dog {
    pub name: String,
    pub photos: Vec<PhotoSet>,
    pub gender: String,
    pub status: String,
}

impl Dog {
    pub fn new(
        name: impl Into<String>,
        photos: Vec<PhotoSet>,
        gender: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            photos,
            gender: gender.into(),
            status: status.into(),
        }
    }

    /// Maps one element of the `animals` array.
    ///
    /// `name`, `photos`, `gender` and `status` are all required; any other
    /// keys are ignored.
    pub fn from_json(raw: &Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::Schema(format!("animal is not an object: {}", type_name(raw))))?;

        Ok(Self {
            name: field(obj, "name")?,
            photos: field(obj, "photos")?,
            gender: field(obj, "gender")?,
            status: field(obj, "status")?,
        })
    }
}

impl TryFrom<&Value> for Dog {
    type Error = anyhow::Error;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_json(raw)
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, name: &'static str) -> Result<T> {
    let value = obj.get(name).ok_or(Error::MissingField { field: name })?;
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Schema(format!("field `{}`: {} (got {})", name, e, type_name(value))).into())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
