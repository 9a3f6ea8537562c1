//! Form, listing and CRUD state services of the admin dashboard.

#![forbid(unsafe_code)]

mod crud_ports;
mod crud_slice;
mod entity_screen;
mod field_renderer;
mod form_modal;
mod screen_catalog;
mod store;

#[cfg(test)]
mod test_support;

pub use crud_ports::{CrudGateway, GatewayReply, ListScope};
pub use crud_slice::{CreatePolicy, CrudSlice, SliceState};
pub use entity_screen::{
    EntityScreen, Notification, NotificationLevel, PendingSubmit, ScreenConfig, SubmitKind,
    SubmitOutcome, ValidationPolicy,
};
pub use field_renderer::{
    EditorChange, EditorConfig, InputEvent, REQUIRED_MESSAGE, RICH_TEXT_TOOLBAR, RenderedField,
    TextInputKind, Widget, WidgetOption, render, render_form,
};
pub use form_modal::{BUSY_LABEL, FormMode, FormModal, SUBMIT_LABEL, SubmitButton};
pub use screen_catalog::{
    doctor_form, doctor_screen, hospital_form, hospital_screen, news_category_form,
    news_category_screen, user_form, user_screen,
};
pub use store::{SliceSummary, Store, StoreGateways};
