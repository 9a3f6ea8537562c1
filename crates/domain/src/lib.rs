//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod entities;
mod form;
mod form_values;
mod record;
mod view;

pub use entities::{AdminUser, Doctor, Hospital, NewsCategory};
pub use form::{FieldDescriptor, FieldType, FormSchema, GRID_COLUMNS, SelectOption};
pub use form_values::{FieldChange, FieldValue, FileHandle, FormValues};
pub use record::{Entity, Page, RecordKey};
pub use view::ListColumn;
