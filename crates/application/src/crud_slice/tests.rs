use std::sync::Arc;

use medadmin_core::AppError;
use medadmin_domain::{Hospital, Page, RecordKey};
use serde_json::{Map, json};

use crate::crud_ports::ListScope;
use crate::test_support::{FakeHospitalGateway, hospital, names};

use super::{CreatePolicy, CrudSlice};

fn slice_with(gateway: &Arc<FakeHospitalGateway>) -> CrudSlice<Hospital> {
    CrudSlice::new(gateway.clone())
}

#[tokio::test]
async fn list_success_sets_data_and_clears_loading() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![
        hospital(1, "Clinic A"),
        hospital(2, "Clinic B"),
    ]));
    let slice = slice_with(&gateway);

    let result = slice.list(&ListScope::all()).await;
    let state = slice.snapshot().await;

    assert!(result.is_ok());
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(names(state.data.as_ref()), vec!["Clinic A", "Clinic B"]);
}

#[tokio::test]
async fn list_failure_keeps_data_and_records_message() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![hospital(1, "Clinic A")]));
    let slice = slice_with(&gateway);
    let _ = slice.list(&ListScope::all()).await;

    gateway
        .fail_next(AppError::Unauthorized("session expired".to_owned()))
        .await;
    let result = slice.list(&ListScope::all()).await;
    let state = slice.snapshot().await;

    assert!(result.is_err());
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("session expired"));
    assert_eq!(names(state.data.as_ref()), vec!["Clinic A"]);
}

#[tokio::test]
async fn loading_is_set_while_a_list_is_in_flight() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let slice = slice_with(&gateway);
    let gate = gateway.gate_page(1).await;
    let scope = ListScope::all().with_page(1, 10);

    let (result, observed) = tokio::join!(slice.list(&scope), async {
        let observed = slice.snapshot().await.loading;
        let _ = gate.send(Page::new(vec![hospital(1, "Clinic A")]));
        observed
    });

    assert!(result.is_ok());
    assert!(observed);
    assert!(!slice.snapshot().await.loading);
}

#[tokio::test]
async fn stale_list_result_is_discarded() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let slice = slice_with(&gateway);
    let older = gateway.gate_page(1).await;
    let newer = gateway.gate_page(2).await;
    let first_scope = ListScope::all().with_page(1, 10);
    let second_scope = ListScope::all().with_page(2, 10);

    let (first, second, ()) = tokio::join!(
        slice.list(&first_scope),
        slice.list(&second_scope),
        async {
            let _ = newer.send(Page::new(vec![hospital(2, "Newer")]));
            tokio::task::yield_now().await;
            let _ = older.send(Page::new(vec![hospital(1, "Older")]));
        }
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    let state = slice.snapshot().await;
    assert!(!state.loading);
    assert_eq!(names(state.data.as_ref()), vec!["Newer"]);
}

#[tokio::test]
async fn list_settling_after_a_newer_mutation_is_kept() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![hospital(1, "Clinic A")]));
    let slice = slice_with(&gateway);
    let gate = gateway.gate_page(1).await;
    let scope = ListScope::all().with_page(1, 10);
    let key = RecordKey::Number(1);

    let (listed, updated) = tokio::join!(slice.list(&scope), async {
        let mut payload = Map::new();
        payload.insert("name".to_owned(), json!("Clinic A2"));
        let updated = slice.update(&key, payload).await;
        let _ = gate.send(Page::new(vec![
            hospital(1, "Clinic A"),
            hospital(2, "Clinic B"),
        ]));
        updated
    });

    assert!(listed.is_ok());
    assert!(updated.is_ok());
    let state = slice.snapshot().await;
    assert!(state.data.is_some());
    assert_eq!(names(state.data.as_ref()), vec!["Clinic A", "Clinic B"]);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn delete_removes_the_matching_record() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![
        hospital(1, "Clinic A"),
        hospital(2, "Clinic B"),
    ]));
    let slice = slice_with(&gateway);
    let _ = slice.list(&ListScope::all()).await;

    let result = slice.delete(&RecordKey::Number(2)).await;
    let state = slice.snapshot().await;

    assert!(result.is_ok());
    let keys: Vec<RecordKey> = state
        .data
        .as_ref()
        .map(|page| page.items().iter().map(|item| item.id.clone()).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec![RecordKey::Number(1)]);
}

#[tokio::test]
async fn failed_delete_leaves_data_untouched() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![hospital(1, "Clinic A")]));
    let slice = slice_with(&gateway);
    let _ = slice.list(&ListScope::all()).await;
    gateway
        .fail_next(AppError::NotFound("hospital 1 does not exist".to_owned()))
        .await;

    let result = slice.delete(&RecordKey::Number(1)).await;
    let state = slice.snapshot().await;

    assert!(result.is_err());
    assert_eq!(state.error.as_deref(), Some("hospital 1 does not exist"));
    assert_eq!(names(state.data.as_ref()), vec!["Clinic A"]);
}

#[tokio::test]
async fn update_replaces_the_record_in_place() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![
        hospital(1, "Clinic A"),
        hospital(2, "Clinic B"),
    ]));
    let slice = slice_with(&gateway);
    let _ = slice.list(&ListScope::all()).await;

    let mut payload = Map::new();
    payload.insert("name".to_owned(), json!("Clinic A North"));
    let result = slice.update(&RecordKey::Number(1), payload).await;

    assert!(result.is_ok());
    let state = slice.snapshot().await;
    assert_eq!(
        names(state.data.as_ref()),
        vec!["Clinic A North", "Clinic B"]
    );
}

#[tokio::test]
async fn create_only_touches_the_list_when_appending() {
    let gateway = Arc::new(FakeHospitalGateway::with_records(vec![hospital(1, "Clinic A")]));
    let slice = slice_with(&gateway);
    let _ = slice.list(&ListScope::all()).await;

    let mut payload = Map::new();
    payload.insert("name".to_owned(), json!("Clinic B"));
    let result = slice.create(payload.clone(), CreatePolicy::Manual).await;
    assert!(result.is_ok());
    assert_eq!(names(slice.snapshot().await.data.as_ref()), vec!["Clinic A"]);

    payload.insert("name".to_owned(), json!("Clinic C"));
    let result = slice.create(payload, CreatePolicy::Append).await;
    assert!(result.is_ok());
    assert_eq!(
        names(slice.snapshot().await.data.as_ref()),
        vec!["Clinic A", "Clinic C"]
    );
}

#[tokio::test]
async fn reset_turns_in_flight_results_into_no_ops() {
    let gateway = Arc::new(FakeHospitalGateway::default());
    let slice = slice_with(&gateway);
    let gate = gateway.gate_page(1).await;
    let scope = ListScope::all().with_page(1, 10);

    let (result, ()) = tokio::join!(slice.list(&scope), async {
        slice.reset().await;
        let _ = gate.send(Page::new(vec![hospital(1, "Late")]));
    });

    assert!(result.is_ok());
    let state = slice.snapshot().await;
    assert_eq!(state.data, None);
    assert!(!state.loading);
}
