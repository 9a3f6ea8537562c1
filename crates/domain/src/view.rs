use medadmin_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column of a screen's tabular listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumn {
    field: NonEmptyString,
    label: String,
}

impl ListColumn {
    /// Creates a validated list column.
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> AppResult<Self> {
        let field = NonEmptyString::new(field)?;
        let label = label.into();
        let label = if label.trim().is_empty() {
            field.as_str().to_owned()
        } else {
            label.trim().to_owned()
        };

        Ok(Self { field, label })
    }

    /// Returns the record field shown in this column.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Returns the header label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Formats this column's cell for a record JSON object.
    #[must_use]
    pub fn cell(&self, record: &Value) -> String {
        match record.get(self.field()) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(Value::Bool(true)) => "Yes".to_owned(),
            Some(Value::Bool(false)) => "No".to_owned(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ListColumn;

    #[test]
    fn blank_label_falls_back_to_field_name() {
        let column = ListColumn::new("email", "  ").unwrap_or_else(|_| unreachable!());
        assert_eq!(column.label(), "email");
    }

    #[test]
    fn cells_format_scalars() {
        let record = json!({"name": "Clinic A", "status": 1, "active": true, "note": null});
        let cell = |field: &str| {
            ListColumn::new(field, field)
                .unwrap_or_else(|_| unreachable!())
                .cell(&record)
        };

        assert_eq!(cell("name"), "Clinic A");
        assert_eq!(cell("status"), "1");
        assert_eq!(cell("active"), "Yes");
        assert_eq!(cell("note"), "");
        assert_eq!(cell("missing"), "");
    }
}
