use std::sync::Arc;

use medadmin_core::{AppError, Session, SessionRole};
use medadmin_domain::{FieldChange, FieldValue, Hospital, RecordKey};

use crate::crud_slice::{CreatePolicy, CrudSlice};
use crate::form_modal::BUSY_LABEL;
use crate::screen_catalog::hospital_screen;
use crate::test_support::{FakeHospitalGateway, hospital, names};

use super::{EntityScreen, NotificationLevel, ScreenConfig, ValidationPolicy};

fn admin() -> Arc<Session> {
    Arc::new(Session::new("u-1", "Ada", SessionRole::Admin, None))
}

fn screen_with(
    gateway: &Arc<FakeHospitalGateway>,
    session: Arc<Session>,
    config: ScreenConfig,
) -> EntityScreen<Hospital> {
    let slice = Arc::new(CrudSlice::new(gateway.clone()));
    hospital_screen(session, slice, config).unwrap_or_else(|error| panic!("screen: {error}"))
}

fn text(name: &str, value: &str) -> FieldChange {
    FieldChange::new(name, FieldValue::Text(value.to_owned()))
}

#[tokio::test]
async fn created_record_appears_after_refetch() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    assert!(screen.refresh().await);

    assert!(screen.open_create());
    screen.change(text("name", "Clinic A"));
    screen.change(text("status", "1"));
    assert!(screen.submit().await);

    let state = screen.slice().snapshot().await;
    assert_eq!(state.error, None);
    assert_eq!(names(state.data.as_ref()), vec!["Clinic A"]);
    let created = state
        .data
        .as_ref()
        .and_then(|page| page.items().first().cloned())
        .unwrap_or_else(|| panic!("created hospital missing"));
    assert_eq!(created.status, Some(1));
    assert!(!screen.modal().is_open());
    assert_eq!(
        screen.notifications().last().map(|n| n.level),
        Some(NotificationLevel::Success)
    );
}

#[tokio::test]
async fn failed_create_surfaces_server_message_and_keeps_data() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![hospital(1, "Clinic B")]));
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    screen.refresh().await;
    gateway
        .fail_next(AppError::Request("hospital name already exists".to_owned()))
        .await;

    screen.open_create();
    screen.change(text("name", "Clinic B"));
    assert!(!screen.submit().await);

    let state = screen.slice().snapshot().await;
    assert_eq!(state.error.as_deref(), Some("hospital name already exists"));
    assert_eq!(names(state.data.as_ref()), vec!["Clinic B"]);
    let last = screen
        .notifications()
        .last()
        .cloned()
        .unwrap_or_else(|| panic!("notification missing"));
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.message, "hospital name already exists");
}

#[tokio::test]
async fn edit_submit_replaces_the_listed_record() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![
        hospital(1, "Clinic A"),
        hospital(2, "Clinic B"),
    ]));
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    screen.refresh().await;

    assert!(screen.open_edit(&RecordKey::Number(2)).await);
    assert_eq!(
        screen.modal().values().get("name"),
        Some(&FieldValue::Text("Clinic B".to_owned()))
    );
    screen.change(text("name", "Clinic B East"));
    assert!(screen.submit().await);

    let rows = screen.rows().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "2");
    assert_eq!(rows[1][1], "Clinic B East");
}

#[tokio::test]
async fn editing_an_unlisted_record_is_reported() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    screen.refresh().await;

    assert!(!screen.open_edit(&RecordKey::Number(42)).await);
    assert!(!screen.modal().is_open());
    assert_eq!(
        screen.notifications().last().map(|n| n.level),
        Some(NotificationLevel::Error)
    );
}

#[tokio::test]
async fn strict_validation_keeps_the_modal_open() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let config = ScreenConfig {
        validation: ValidationPolicy::Strict,
        ..ScreenConfig::default()
    };
    let mut screen = screen_with(&gateway, admin(), config);

    screen.open_create();
    assert!(!screen.submit().await);

    assert!(screen.modal().is_open());
    assert!(screen.modal().fields().iter().any(|field| field.error().is_some()));
    assert_eq!(screen.slice().snapshot().await.data, None);
}

#[tokio::test]
async fn advisory_validation_submits_incomplete_forms() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let config = ScreenConfig {
        create_policy: CreatePolicy::Manual,
        ..ScreenConfig::default()
    };
    let mut screen = screen_with(&gateway, admin(), config);
    screen.refresh().await;

    screen.open_create();
    assert!(screen.submit().await);
    assert!(!screen.modal().is_open());
    assert_eq!(screen.rows().await.len(), 0);
}

#[tokio::test]
async fn viewers_cannot_open_forms() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let viewer = Arc::new(Session::new("u-2", "Bo", SessionRole::Viewer, None));
    let mut screen = screen_with(&gateway, viewer, ScreenConfig::default());

    assert!(!screen.open_create());
    assert!(!screen.modal().is_open());
    let drained = screen.drain_notifications();
    assert_eq!(drained.len(), 1);
    assert!(screen.notifications().is_empty());
}

#[tokio::test]
async fn delete_from_modal_removes_the_record() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![
        hospital(1, "Clinic A"),
        hospital(2, "Clinic B"),
    ]));
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    screen.refresh().await;

    screen.open_edit(&RecordKey::Number(1)).await;
    assert!(screen.delete_from_modal().await);

    assert!(!screen.modal().is_open());
    assert_eq!(
        names(screen.slice().snapshot().await.data.as_ref()),
        vec!["Clinic B"]
    );
    assert_eq!(
        screen.notifications().last().map(|n| n.message.as_str()),
        Some("Hospital deleted")
    );
}

#[tokio::test]
async fn submit_button_is_busy_while_the_create_is_in_flight() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let mut screen = screen_with(&gateway, admin(), ScreenConfig::default());
    screen.refresh().await;
    let gate = gateway.gate_create().await;

    screen.open_create();
    screen.change(text("name", "Clinic A"));
    let pending = screen
        .begin_submit()
        .unwrap_or_else(|| panic!("submission refused"));

    let (outcome, observed) = tokio::join!(pending.dispatch(), async {
        let button = screen.modal().submit_button();
        let open = screen.modal().is_open();
        let loading = screen.slice().snapshot().await.loading;
        let _ = gate.send(());
        (button, open, loading)
    });
    let (button, open, loading) = observed;

    assert!(button.disabled);
    assert_eq!(button.label, BUSY_LABEL);
    assert!(open);
    assert!(loading);

    assert!(screen.finish_submit(outcome).await);
    assert!(!screen.modal().is_open());
    assert!(!screen.modal().submit_button().disabled);
    assert_eq!(names(screen.slice().snapshot().await.data.as_ref()), vec!["Clinic A"]);
}

#[tokio::test]
async fn submitting_a_closed_form_reports_it_is_not_open() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let config = ScreenConfig {
        validation: ValidationPolicy::Strict,
        ..ScreenConfig::default()
    };
    let mut screen = screen_with(&gateway, admin(), config);

    assert!(!screen.submit().await);

    assert_eq!(
        screen.notifications().last().map(|n| n.message.as_str()),
        Some("form is not open")
    );
}
