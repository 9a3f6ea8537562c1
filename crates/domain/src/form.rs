use std::collections::HashSet;
use std::str::FromStr;

use medadmin_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Largest column span of the dashboard form grid.
pub const GRID_COLUMNS: u8 = 12;

/// Supported form input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Numeric text input.
    Number,
    /// Email text input.
    Email,
    /// Masked text input.
    Password,
    /// Boolean toggle.
    Checkbox,
    /// Drop-down with configured options.
    Select,
    /// Drop-down with configured options and an empty placeholder entry.
    Option,
    /// Date picker exchanging `YYYY-MM-DD` strings.
    Date,
    /// File picker.
    File,
    /// Multi-line plain text input.
    Textarea,
    /// Rich-text editor.
    RichText,
}

impl FieldType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Password => "password",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Option => "option",
            Self::Date => "date",
            Self::File => "file",
            Self::Textarea => "textarea",
            Self::RichText => "rich_text",
        }
    }

    /// Returns whether the type renders a list of configured options.
    #[must_use]
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Option)
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            "checkbox" => Ok(Self::Checkbox),
            "select" => Ok(Self::Select),
            "option" => Ok(Self::Option),
            "date" => Ok(Self::Date),
            "file" => Ok(Self::File),
            "textarea" => Ok(Self::Textarea),
            "rich_text" => Ok(Self::RichText),
            _ => Err(AppError::Validation(format!(
                "unknown field type '{value}'"
            ))),
        }
    }
}

/// One selectable entry of a select or option field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    value: Value,
    label: String,
}

impl SelectOption {
    /// Creates a validated option. The value must be a JSON scalar.
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if !(value.is_string() || value.is_number() || value.is_boolean()) {
            return Err(AppError::Validation(
                "select option values must be strings, numbers or booleans".to_owned(),
            ));
        }

        Ok(Self {
            value,
            label: label.into(),
        })
    }

    /// Returns the JSON value sent to the backend.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the value in the string form exchanged with the widget.
    #[must_use]
    pub fn value_text(&self) -> String {
        scalar_text(&self.value)
    }

    /// Returns the option label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// Declarative description of one form input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    name: NonEmptyString,
    field_type: FieldType,
    label: String,
    options: Vec<SelectOption>,
    required: bool,
    grid: Option<u8>,
    placeholder: Option<String>,
}

impl FieldDescriptor {
    /// Creates a validated field descriptor.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        label: impl Into<String>,
        options: Vec<SelectOption>,
        required: bool,
        grid: Option<u8>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;

        match (field_type.has_options(), options.is_empty()) {
            (true, true) => {
                return Err(AppError::Validation(format!(
                    "{} field '{}' requires at least one option",
                    field_type.as_str(),
                    name.as_str()
                )));
            }
            (false, false) => {
                return Err(AppError::Validation(format!(
                    "options are only allowed for select and option fields, got '{}'",
                    field_type.as_str()
                )));
            }
            _ => {}
        }

        if let Some(grid) = grid
            && !(1..=GRID_COLUMNS).contains(&grid)
        {
            return Err(AppError::Validation(format!(
                "grid span for field '{}' must be between 1 and {GRID_COLUMNS}",
                name.as_str()
            )));
        }

        Ok(Self {
            name,
            field_type,
            label: label.into(),
            options,
            required,
            grid,
            placeholder: None,
        })
    }

    /// Returns the descriptor with a placeholder text.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        self.placeholder = (!placeholder.trim().is_empty()).then_some(placeholder);
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the field label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the configured options in display order.
    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Returns whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the grid column span.
    #[must_use]
    pub fn grid(&self) -> Option<u8> {
        self.grid
    }

    /// Returns the placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }
}

/// Ordered descriptor list of one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    /// Creates a validated form schema.
    pub fn new(fields: Vec<FieldDescriptor>) -> AppResult<Self> {
        if fields.is_empty() {
            return Err(AppError::Validation(
                "forms must include at least one field".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(AppError::Validation(format!(
                    "duplicate field '{}' in form",
                    field.name()
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Returns descriptors in display order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Finds one descriptor by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns the first file field, used for the image preview.
    #[must_use]
    pub fn first_file_field(&self) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.field_type() == FieldType::File)
    }
}

#[derive(Deserialize)]
struct SelectOptionRepr {
    value: Value,
    label: String,
}

impl<'de> Deserialize<'de> for SelectOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = SelectOptionRepr::deserialize(deserializer)?;
        Self::new(repr.value, repr.label).map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
struct FieldDescriptorRepr {
    name: String,
    field_type: FieldType,
    label: String,
    #[serde(default)]
    options: Vec<SelectOption>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    grid: Option<u8>,
    #[serde(default)]
    placeholder: Option<String>,
}

impl<'de> Deserialize<'de> for FieldDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = FieldDescriptorRepr::deserialize(deserializer)?;
        let descriptor = Self::new(
            repr.name,
            repr.field_type,
            repr.label,
            repr.options,
            repr.required,
            repr.grid,
        )
        .map_err(<D::Error as serde::de::Error>::custom)?;

        Ok(match repr.placeholder {
            Some(placeholder) => descriptor.with_placeholder(placeholder),
            None => descriptor,
        })
    }
}

#[derive(Deserialize)]
struct FormSchemaRepr {
    fields: Vec<FieldDescriptor>,
}

impl<'de> Deserialize<'de> for FormSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = FormSchemaRepr::deserialize(deserializer)?;
        Self::new(repr.fields).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
