//! Form and listing definitions of the dashboard's management screens.

use std::sync::Arc;

use medadmin_core::{AppResult, Session, SessionRole};
use medadmin_domain::{
    AdminUser, Doctor, FieldDescriptor, FieldType, FormSchema, Hospital, ListColumn, NewsCategory,
    SelectOption,
};

use crate::crud_slice::CrudSlice;
use crate::entity_screen::{EntityScreen, ScreenConfig};

fn field(
    name: &str,
    field_type: FieldType,
    label: &str,
    required: bool,
    grid: u8,
) -> AppResult<FieldDescriptor> {
    FieldDescriptor::new(name, field_type, label, Vec::new(), required, Some(grid))
}

fn status_field() -> AppResult<FieldDescriptor> {
    let options = vec![
        SelectOption::new(1, "Active")?,
        SelectOption::new(0, "Inactive")?,
    ];
    Ok(
        FieldDescriptor::new("status", FieldType::Option, "Status", options, true, Some(6))?
            .with_placeholder("Select status"),
    )
}

fn columns(pairs: &[(&str, &str)]) -> AppResult<Vec<ListColumn>> {
    pairs
        .iter()
        .map(|(field, label)| ListColumn::new(*field, *label))
        .collect()
}

/// Hospital form fields.
pub fn hospital_form() -> AppResult<FormSchema> {
    FormSchema::new(vec![
        field("name", FieldType::Text, "Name", true, 6)?.with_placeholder("Hospital name"),
        field("email", FieldType::Email, "Email", false, 6)?,
        field("phone", FieldType::Text, "Phone", false, 6)?,
        status_field()?,
        field("address", FieldType::Textarea, "Address", false, 12)?,
        field("image", FieldType::File, "Image", false, 12)?,
    ])
}

/// Doctor form fields; the hospital picker lists `hospitals` when known.
pub fn doctor_form(hospitals: &[Hospital]) -> AppResult<FormSchema> {
    let hospital_field = if hospitals.is_empty() {
        field("hospital_id", FieldType::Text, "Hospital ID", true, 6)?
    } else {
        let options = hospitals
            .iter()
            .map(|hospital| {
                let value = serde_json::to_value(&hospital.id).unwrap_or_default();
                SelectOption::new(value, hospital.name.clone())
            })
            .collect::<AppResult<Vec<_>>>()?;
        FieldDescriptor::new(
            "hospital_id",
            FieldType::Option,
            "Hospital",
            options,
            true,
            Some(6),
        )?
        .with_placeholder("Select hospital")
    };

    FormSchema::new(vec![
        field("name", FieldType::Text, "Name", true, 6)?,
        hospital_field,
        field("specialty", FieldType::Text, "Specialty", false, 6)?,
        field("email", FieldType::Email, "Email", false, 6)?,
        field("phone", FieldType::Text, "Phone", false, 6)?,
        status_field()?,
        field("image", FieldType::File, "Portrait", false, 12)?,
    ])
}

/// News category form fields.
pub fn news_category_form() -> AppResult<FormSchema> {
    FormSchema::new(vec![
        field("name", FieldType::Text, "Name", true, 6)?,
        field("slug", FieldType::Text, "Slug", false, 6)?,
        status_field()?,
        field("description", FieldType::RichText, "Description", false, 12)?
            .with_placeholder("Describe the category"),
    ])
}

/// User form fields.
pub fn user_form() -> AppResult<FormSchema> {
    let roles = [SessionRole::Admin, SessionRole::Editor, SessionRole::Viewer]
        .into_iter()
        .map(|role| SelectOption::new(role.as_str(), role.as_str()))
        .collect::<AppResult<Vec<_>>>()?;

    FormSchema::new(vec![
        field("username", FieldType::Text, "Username", true, 6)?,
        field("email", FieldType::Email, "Email", true, 6)?,
        field("password", FieldType::Password, "Password", false, 6)?,
        FieldDescriptor::new("role", FieldType::Select, "Role", roles, true, Some(6))?,
        field("is_active", FieldType::Checkbox, "Active", false, 12)?,
    ])
}

/// Hospital management screen.
pub fn hospital_screen(
    session: Arc<Session>,
    slice: Arc<CrudSlice<Hospital>>,
    config: ScreenConfig,
) -> AppResult<EntityScreen<Hospital>> {
    Ok(EntityScreen::new(
        session,
        slice,
        hospital_form()?,
        columns(&[
            ("id", "ID"),
            ("name", "Name"),
            ("phone", "Phone"),
            ("email", "Email"),
            ("status", "Status"),
        ])?,
        config,
    ))
}

/// Doctor management screen.
pub fn doctor_screen(
    session: Arc<Session>,
    slice: Arc<CrudSlice<Doctor>>,
    hospitals: &[Hospital],
    config: ScreenConfig,
) -> AppResult<EntityScreen<Doctor>> {
    Ok(EntityScreen::new(
        session,
        slice,
        doctor_form(hospitals)?,
        columns(&[
            ("id", "ID"),
            ("name", "Name"),
            ("specialty", "Specialty"),
            ("hospital_id", "Hospital"),
            ("status", "Status"),
        ])?,
        config,
    ))
}

/// News category management screen.
pub fn news_category_screen(
    session: Arc<Session>,
    slice: Arc<CrudSlice<NewsCategory>>,
    config: ScreenConfig,
) -> AppResult<EntityScreen<NewsCategory>> {
    Ok(EntityScreen::new(
        session,
        slice,
        news_category_form()?,
        columns(&[("id", "ID"), ("name", "Name"), ("slug", "Slug"), ("status", "Status")])?,
        config,
    ))
}

/// User management screen.
pub fn user_screen(
    session: Arc<Session>,
    slice: Arc<CrudSlice<AdminUser>>,
    config: ScreenConfig,
) -> AppResult<EntityScreen<AdminUser>> {
    Ok(EntityScreen::new(
        session,
        slice,
        user_form()?,
        columns(&[
            ("id", "ID"),
            ("username", "Username"),
            ("email", "Email"),
            ("role", "Role"),
            ("is_active", "Active"),
        ])?,
        config,
    ))
}
