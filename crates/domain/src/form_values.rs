use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::form::{FieldDescriptor, FieldType, FormSchema, scalar_text};

/// File handle produced by the file picker, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    name: String,
    content_type: Option<String>,
    size: u64,
}

impl FileHandle {
    /// Creates a file handle from picker metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: Option<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type,
            size,
        }
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the MIME type reported by the picker.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Current value of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value.
    Null,
    /// Checkbox state.
    Bool(bool),
    /// Raw string of every text-like widget.
    Text(String),
    /// File picked by the operator.
    File(FileHandle),
}

impl FieldValue {
    /// Returns the type-appropriate empty default.
    #[must_use]
    pub fn empty_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Checkbox => Self::Bool(false),
            _ => Self::Text(String::new()),
        }
    }

    /// Converts a target entity value into a form value.
    ///
    /// Absent and `null` values fall back to the empty default.
    #[must_use]
    pub fn from_target(field_type: FieldType, value: Option<&Value>) -> Self {
        match (field_type, value) {
            (_, None | Some(Value::Null)) => Self::empty_for(field_type),
            (FieldType::Checkbox, Some(Value::Bool(flag))) => Self::Bool(*flag),
            (FieldType::Checkbox, Some(Value::Number(number))) => {
                Self::Bool(number.as_f64().is_some_and(|number| number != 0.0))
            }
            (FieldType::Checkbox, Some(Value::String(text))) => {
                Self::Bool(matches!(text.as_str(), "true" | "1"))
            }
            (_, Some(other)) => Self::Text(scalar_text(other)),
        }
    }

    /// Returns whether a required field would be flagged for this value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(flag) => !flag,
            Self::Text(text) => text.trim().is_empty(),
            Self::File(_) => false,
        }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Normalised change emitted by a rendered field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field name.
    pub name: String,
    /// New value.
    pub value: FieldValue,
}

impl FieldChange {
    /// Creates a change for one field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Field name to value mapping owned by an open form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    /// Creates an empty value map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives create-mode values: every field at its empty default.
    #[must_use]
    pub fn defaults(schema: &FormSchema) -> Self {
        Self {
            values: schema
                .fields()
                .iter()
                .map(|field| {
                    (
                        field.name().to_owned(),
                        FieldValue::empty_for(field.field_type()),
                    )
                })
                .collect(),
        }
    }

    /// Derives edit-mode values from a target JSON object.
    #[must_use]
    pub fn seeded(schema: &FormSchema, target: &Value) -> Self {
        Self {
            values: schema
                .fields()
                .iter()
                .map(|field| {
                    (
                        field.name().to_owned(),
                        FieldValue::from_target(field.field_type(), target.get(field.name())),
                    )
                })
                .collect(),
        }
    }

    /// Returns one field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Merges one change, leaving other fields untouched.
    pub fn apply(&mut self, change: FieldChange) {
        self.values.insert(change.name, change.value);
    }

    /// Returns the number of fields holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no field holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates values in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns names of required fields whose value is empty.
    #[must_use]
    pub fn missing_required<'a>(&self, schema: &'a FormSchema) -> Vec<&'a str> {
        schema
            .fields()
            .iter()
            .filter(|field| field.is_required())
            .filter(|field| self.get(field.name()).is_none_or(FieldValue::is_empty))
            .map(FieldDescriptor::name)
            .collect()
    }

    /// Builds the JSON request body for the schema's fields.
    #[must_use]
    pub fn to_payload(&self, schema: &FormSchema) -> Map<String, Value> {
        schema
            .fields()
            .iter()
            .map(|field| {
                let value = match self.get(field.name()) {
                    Some(value) => payload_value(field, value),
                    None => payload_value(field, &FieldValue::empty_for(field.field_type())),
                };
                (field.name().to_owned(), value)
            })
            .collect()
    }
}

fn payload_value(field: &FieldDescriptor, value: &FieldValue) -> Value {
    match (field.field_type(), value) {
        (_, FieldValue::Null) => Value::Null,
        (_, FieldValue::Bool(flag)) => Value::Bool(*flag),
        (_, FieldValue::File(handle)) => serde_json::to_value(handle).unwrap_or(Value::Null),
        (FieldType::Select | FieldType::Option, FieldValue::Text(text)) => {
            if text.is_empty() {
                return Value::Null;
            }
            field
                .options()
                .iter()
                .find(|option| option.value_text() == *text)
                .map(|option| option.value().clone())
                .unwrap_or_else(|| Value::String(text.clone()))
        }
        (FieldType::Number, FieldValue::Text(text)) => number_value(text.trim()),
        (FieldType::Date, FieldValue::Text(text)) if text.trim().is_empty() => Value::Null,
        (_, FieldValue::Text(text)) => Value::String(text.clone()),
    }
}

fn number_value(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(integer) = text.parse::<i64>() {
        return Value::from(integer);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_owned()))
}
