use std::sync::Arc;

use medadmin_core::{AppError, AppResult};
use medadmin_domain::{FieldChange, FieldValue, FormSchema, FormValues};
use serde_json::Value;

use crate::field_renderer::{RenderedField, render_form};

/// Label of the idle submit button.
pub const SUBMIT_LABEL: &str = "Submit";

/// Label of the submit button while the caller's submission is running.
pub const BUSY_LABEL: &str = "Submitting...";

/// Purpose the modal was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    /// Blank form for a new record.
    Create,
    /// Form seeded from an existing record's JSON object.
    Edit(Value),
}

/// Submit affordance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    /// Button label.
    pub label: &'static str,
    /// Whether the button ignores clicks.
    pub disabled: bool,
}

/// Descriptor-driven create/edit modal.
///
/// The modal owns its form values only while open. Callers supply submit,
/// delete and close callbacks per call. Async submits go through
/// `begin_submit`/`finish_submit`, which hold the `submitting` flag.
#[derive(Debug, Clone)]
pub struct FormModal {
    entity_name: String,
    schema: Arc<FormSchema>,
    mode: Option<FormMode>,
    values: FormValues,
    has_submitted: bool,
    image_preview: Option<String>,
    submitting: bool,
}

impl FormModal {
    /// Creates a closed modal for one entity form.
    #[must_use]
    pub fn new(entity_name: impl Into<String>, schema: Arc<FormSchema>) -> Self {
        Self {
            entity_name: entity_name.into(),
            schema,
            mode: None,
            values: FormValues::new(),
            has_submitted: false,
            image_preview: None,
            submitting: false,
        }
    }

    /// Opens the modal, re-deriving values from the schema.
    ///
    /// Calling this again while open replaces every value, so no state from
    /// an earlier mode or target survives.
    pub fn open(&mut self, mode: FormMode) {
        self.values = match &mode {
            FormMode::Create => FormValues::defaults(&self.schema),
            FormMode::Edit(target) => FormValues::seeded(&self.schema, target),
        };
        self.image_preview = match &mode {
            FormMode::Create => None,
            FormMode::Edit(target) => self
                .schema
                .first_file_field()
                .and_then(|field| target.get(field.name()))
                .and_then(Value::as_str)
                .filter(|url| !url.trim().is_empty())
                .map(str::to_owned),
        };
        self.has_submitted = false;
        self.mode = Some(mode);
    }

    /// Returns whether the modal is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    /// Returns the current mode while open.
    #[must_use]
    pub fn mode(&self) -> Option<&FormMode> {
        self.mode.as_ref()
    }

    /// Returns the current form values. Empty while closed.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns the schema driving this modal.
    #[must_use]
    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    /// Returns the image preview source: a stored URL or a picked file name.
    #[must_use]
    pub fn image_preview(&self) -> Option<&str> {
        self.image_preview.as_deref()
    }

    /// Returns the modal title.
    #[must_use]
    pub fn title(&self) -> String {
        match self.mode {
            Some(FormMode::Edit(_)) => format!("Edit {}", self.entity_name),
            _ => format!("Add {}", self.entity_name),
        }
    }

    /// Renders every field against the current values.
    #[must_use]
    pub fn fields(&self) -> Vec<RenderedField<'_>> {
        render_form(&self.schema, &self.values, self.has_submitted)
    }

    /// Merges one normalised change. Ignored while closed.
    pub fn handle_change(&mut self, change: FieldChange) -> bool {
        if self.mode.is_none() {
            return false;
        }

        if self
            .schema
            .first_file_field()
            .is_some_and(|field| field.name() == change.name)
        {
            self.image_preview = match &change.value {
                FieldValue::File(handle) => Some(handle.name().to_owned()),
                FieldValue::Text(url) if !url.trim().is_empty() => Some(url.clone()),
                _ => None,
            };
        }

        self.values.apply(change);
        true
    }

    /// Flags required fields and reports the ones left empty.
    ///
    /// Submission itself never calls this; callers that want hard validation
    /// gate their submit on it.
    pub fn validate(&mut self) -> AppResult<()> {
        self.has_submitted = true;
        let missing = self.values.missing_required(&self.schema);
        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "required fields are empty: {}",
            missing.join(", ")
        )))
    }

    /// Names of required fields that are currently empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&str> {
        self.values.missing_required(&self.schema)
    }

    /// Hands the full value snapshot to `on_submit`, then closes.
    pub fn handle_submit(
        &mut self,
        on_submit: impl FnOnce(&FormMode, FormValues),
        on_close: impl FnOnce(),
    ) -> AppResult<()> {
        let Some(mode) = self.mode.as_ref() else {
            return Err(AppError::Validation("form is not open".to_owned()));
        };

        self.has_submitted = true;
        on_submit(mode, self.values.clone());
        self.close(on_close);
        Ok(())
    }

    /// Takes the value snapshot for an async submission and marks the modal busy.
    ///
    /// The modal stays open until [`FormModal::finish_submit`], so the submit
    /// button reads "Submitting..." while the caller's request is in flight.
    pub fn begin_submit(&mut self) -> AppResult<(FormMode, FormValues)> {
        let Some(mode) = self.mode.clone() else {
            return Err(AppError::Validation("form is not open".to_owned()));
        };
        if self.submitting {
            return Err(AppError::Conflict(
                "a submission is already in progress".to_owned(),
            ));
        }

        self.has_submitted = true;
        self.submitting = true;
        Ok((mode, self.values.clone()))
    }

    /// Ends a submission started with [`FormModal::begin_submit`] and closes.
    pub fn finish_submit(&mut self, on_close: impl FnOnce()) {
        self.close(on_close);
    }

    /// Hands the edit target to `on_delete`, then closes.
    pub fn handle_delete(
        &mut self,
        on_delete: impl FnOnce(&Value),
        on_close: impl FnOnce(),
    ) -> AppResult<()> {
        let Some(FormMode::Edit(target)) = self.mode.as_ref() else {
            return Err(AppError::Validation(
                "only records opened for editing can be deleted".to_owned(),
            ));
        };

        on_delete(target);
        self.close(on_close);
        Ok(())
    }

    /// Discards the form values and notifies the caller.
    pub fn close(&mut self, on_close: impl FnOnce()) {
        self.mode = None;
        self.values = FormValues::new();
        self.has_submitted = false;
        self.image_preview = None;
        self.submitting = false;
        on_close();
    }

    /// Sets the caller-owned busy flag.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Returns the submit affordance for the current busy flag.
    #[must_use]
    pub fn submit_button(&self) -> SubmitButton {
        if self.submitting {
            SubmitButton {
                label: BUSY_LABEL,
                disabled: true,
            }
        } else {
            SubmitButton {
                label: SUBMIT_LABEL,
                disabled: false,
            }
        }
    }
}
