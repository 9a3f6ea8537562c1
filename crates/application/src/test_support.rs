//! Fakes shared by the service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use medadmin_core::{AppError, AppResult};
use medadmin_domain::{Hospital, Page, RecordKey};
use serde_json::{Map, Value, json};
use tokio::sync::{Mutex, oneshot};

use crate::crud_ports::{CrudGateway, GatewayReply, ListScope};

pub(crate) fn hospital(id: i64, name: &str) -> Hospital {
    serde_json::from_value(json!({"id": id, "name": name}))
        .unwrap_or_else(|error| panic!("hospital fixture: {error}"))
}

pub(crate) fn names(page: Option<&Page<Hospital>>) -> Vec<String> {
    page.map(|page| page.items().iter().map(|item| item.name.clone()).collect())
        .unwrap_or_default()
}

#[derive(Default)]
pub(crate) struct FakeHospitalGateway {
    records: Mutex<Vec<Hospital>>,
    failure: Mutex<Option<AppError>>,
    gated_lists: Mutex<HashMap<u32, oneshot::Receiver<Page<Hospital>>>>,
    gated_create: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeHospitalGateway {
    pub(crate) fn with_records(records: Vec<Hospital>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(crate) async fn fail_next(&self, error: AppError) {
        *self.failure.lock().await = Some(error);
    }

    pub(crate) async fn gate_page(&self, page: u32) -> oneshot::Sender<Page<Hospital>> {
        let (sender, receiver) = oneshot::channel();
        self.gated_lists.lock().await.insert(page, receiver);
        sender
    }

    pub(crate) async fn gate_create(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.gated_create.lock().await = Some(receiver);
        sender
    }

    async fn take_failure(&self) -> AppResult<()> {
        match self.failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CrudGateway<Hospital> for FakeHospitalGateway {
    async fn list(&self, scope: &ListScope) -> AppResult<GatewayReply<Page<Hospital>>> {
        let gate = match scope.page() {
            Some(page) => self.gated_lists.lock().await.remove(&page),
            None => None,
        };
        if let Some(gate) = gate {
            let page = gate
                .await
                .map_err(|_| AppError::Internal("gate dropped".to_owned()))?;
            return Ok(GatewayReply::new(page, None));
        }

        self.take_failure().await?;
        Ok(GatewayReply::new(
            Page::new(self.records.lock().await.clone()),
            None,
        ))
    }

    async fn create(&self, payload: Map<String, Value>) -> AppResult<GatewayReply<Hospital>> {
        let gate = self.gated_create.lock().await.take();
        if let Some(gate) = gate {
            gate.await
                .map_err(|_| AppError::Internal("gate dropped".to_owned()))?;
        }
        self.take_failure().await?;
        let mut records = self.records.lock().await;
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX) + 100;
        let mut object = payload;
        object.insert("id".to_owned(), json!(id));
        let created: Hospital = serde_json::from_value(Value::Object(object))
            .map_err(|error| AppError::Validation(error.to_string()))?;
        records.push(created.clone());
        Ok(GatewayReply::new(created, Some("Hospital created".to_owned())))
    }

    async fn update(
        &self,
        key: &RecordKey,
        payload: Map<String, Value>,
    ) -> AppResult<GatewayReply<Hospital>> {
        self.take_failure().await?;
        let mut object = payload;
        object.insert("id".to_owned(), serde_json::to_value(key).unwrap_or(Value::Null));
        let updated: Hospital = serde_json::from_value(Value::Object(object))
            .map_err(|error| AppError::Validation(error.to_string()))?;
        let mut records = self.records.lock().await;
        for record in records.iter_mut().filter(|record| &record.id == key) {
            *record = updated.clone();
        }
        Ok(GatewayReply::new(updated, None))
    }

    async fn delete(&self, key: &RecordKey) -> AppResult<GatewayReply<()>> {
        self.take_failure().await?;
        self.records.lock().await.retain(|record| &record.id != key);
        Ok(GatewayReply::new((), Some("Hospital deleted".to_owned())))
    }
}
