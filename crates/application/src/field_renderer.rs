//! Maps field descriptors and current form values to widget view models.
//!
//! Rendering is pure. User edits come back through [`RenderedField::input`],
//! which normalises them into a [`FieldChange`] for the form controller.

use chrono::NaiveDate;
use medadmin_domain::{
    FieldChange, FieldDescriptor, FieldType, FieldValue, FileHandle, FormSchema, FormValues,
};

/// Message shown under a required field left empty after a submit attempt.
pub const REQUIRED_MESSAGE: &str = "this field is required";

/// Toolbar items handed to the rich-text editor.
pub const RICH_TEXT_TOOLBAR: &[&str] = &[
    "heading",
    "bold",
    "italic",
    "link",
    "bulletedList",
    "numberedList",
    "blockQuote",
    "undo",
    "redo",
];

/// HTML-style input flavour of a single-line text widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputKind {
    /// Plain text.
    Text,
    /// Numeric keypad.
    Number,
    /// Email address.
    Email,
    /// Masked input.
    Password,
}

/// Entry of a select widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOption {
    /// String form of the option value.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Whether the operator can pick this entry.
    pub selectable: bool,
}

/// Initial configuration of the external rich-text editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Initial HTML content.
    pub data: String,
    /// Placeholder shown while empty.
    pub placeholder: String,
    /// Toolbar item identifiers.
    pub toolbar: Vec<&'static str>,
}

/// Widget view model for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Single-line input.
    TextInput {
        /// Input flavour.
        kind: TextInputKind,
        /// Current raw value.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// Multi-line input.
    TextArea {
        /// Current raw value.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// Boolean toggle.
    Checkbox {
        /// Current state.
        checked: bool,
    },
    /// Drop-down.
    Select {
        /// Entries in display order.
        options: Vec<WidgetOption>,
        /// String form of the selected value.
        selected: String,
    },
    /// Date picker.
    DatePicker {
        /// Current raw value.
        value: String,
        /// Parsed date, when the raw value is `YYYY-MM-DD`.
        date: Option<NaiveDate>,
    },
    /// File picker.
    FilePicker {
        /// Name of the picked file or URL of the stored one.
        current: Option<String>,
    },
    /// External rich-text editor.
    RichText(EditorConfig),
}

/// Change payload emitted by the rich-text editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorChange {
    /// Full editor content after the edit.
    pub data: String,
}

/// Raw user input delivered to a rendered field.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// New raw string of a text-like widget or select.
    Text(String),
    /// New checkbox state.
    Checked(bool),
    /// Files picked in the file dialog.
    Files(Vec<FileHandle>),
    /// Rich-text editor change.
    Editor(EditorChange),
}

/// One rendered field: descriptor metadata, widget and validation flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField<'a> {
    descriptor: &'a FieldDescriptor,
    widget: Widget,
    error: Option<&'static str>,
}

impl RenderedField<'_> {
    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    /// Returns the grid column span.
    #[must_use]
    pub fn grid(&self) -> Option<u8> {
        self.descriptor.grid()
    }

    /// Returns whether the label carries a required marker.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.descriptor.is_required()
    }

    /// Returns the widget view model.
    #[must_use]
    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Returns the validation message, if the field is flagged.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Normalises a user edit and forwards it to `on_change`.
    ///
    /// Returns `false` when the event does not belong to this widget kind, in
    /// which case `on_change` is not called. Validation never blocks changes.
    pub fn input(&self, event: InputEvent, on_change: impl FnOnce(FieldChange)) -> bool {
        let value = match (self.descriptor.field_type(), event) {
            (FieldType::Checkbox, InputEvent::Checked(checked)) => FieldValue::Bool(checked),
            (FieldType::File, InputEvent::Files(files)) => files
                .into_iter()
                .next()
                .map_or(FieldValue::Null, FieldValue::File),
            (FieldType::RichText, InputEvent::Editor(change)) => FieldValue::Text(change.data),
            (FieldType::Checkbox | FieldType::File | FieldType::RichText, _) => return false,
            (_, InputEvent::Text(text)) => FieldValue::Text(text),
            _ => return false,
        };

        on_change(FieldChange::new(self.descriptor.name(), value));
        true
    }
}

/// Renders one descriptor against the current form values.
#[must_use]
pub fn render<'a>(
    descriptor: &'a FieldDescriptor,
    values: &FormValues,
    has_submitted: bool,
) -> RenderedField<'a> {
    let current = values.get(descriptor.name());
    let text = current
        .and_then(FieldValue::as_text)
        .unwrap_or_default()
        .to_owned();
    let placeholder = descriptor.placeholder().map(str::to_owned);

    let widget = match descriptor.field_type() {
        FieldType::Text => text_input(TextInputKind::Text, text, placeholder),
        FieldType::Number => text_input(TextInputKind::Number, text, placeholder),
        FieldType::Email => text_input(TextInputKind::Email, text, placeholder),
        FieldType::Password => text_input(TextInputKind::Password, text, placeholder),
        FieldType::Textarea => Widget::TextArea {
            value: text,
            placeholder,
        },
        FieldType::Checkbox => Widget::Checkbox {
            checked: matches!(current, Some(FieldValue::Bool(true))),
        },
        FieldType::Select | FieldType::Option => Widget::Select {
            options: select_options(descriptor),
            selected: text,
        },
        FieldType::Date => Widget::DatePicker {
            date: NaiveDate::parse_from_str(text.as_str(), "%Y-%m-%d").ok(),
            value: text,
        },
        FieldType::File => Widget::FilePicker {
            current: match current {
                Some(FieldValue::File(handle)) => Some(handle.name().to_owned()),
                Some(FieldValue::Text(url)) if !url.trim().is_empty() => Some(url.clone()),
                _ => None,
            },
        },
        FieldType::RichText => Widget::RichText(EditorConfig {
            data: text,
            placeholder: placeholder.unwrap_or_else(|| descriptor.label().to_owned()),
            toolbar: RICH_TEXT_TOOLBAR.to_vec(),
        }),
    };

    let flagged = has_submitted
        && descriptor.is_required()
        && current.is_none_or(FieldValue::is_empty);

    RenderedField {
        descriptor,
        widget,
        error: flagged.then_some(REQUIRED_MESSAGE),
    }
}

/// Renders every descriptor of a schema in display order.
#[must_use]
pub fn render_form<'a>(
    schema: &'a FormSchema,
    values: &FormValues,
    has_submitted: bool,
) -> Vec<RenderedField<'a>> {
    schema
        .fields()
        .iter()
        .map(|descriptor| render(descriptor, values, has_submitted))
        .collect()
}

fn text_input(kind: TextInputKind, value: String, placeholder: Option<String>) -> Widget {
    Widget::TextInput {
        kind,
        value,
        placeholder,
    }
}

fn select_options(descriptor: &FieldDescriptor) -> Vec<WidgetOption> {
    let placeholder = (descriptor.field_type() == FieldType::Option).then(|| WidgetOption {
        value: String::new(),
        label: descriptor.placeholder().unwrap_or_default().to_owned(),
        selectable: false,
    });

    placeholder
        .into_iter()
        .chain(descriptor.options().iter().map(|option| WidgetOption {
            value: option.value_text(),
            label: option.label().to_owned(),
            selectable: true,
        }))
        .collect()
}
