use std::marker::PhantomData;

use async_trait::async_trait;
use medadmin_application::{CrudGateway, GatewayReply, ListScope};
use medadmin_core::{AppError, AppResult};
use medadmin_domain::{Entity, Page, RecordKey};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[derive(Debug)]
struct Table {
    rows: Vec<Map<String, Value>>,
    next_id: i64,
}

impl Table {
    fn position(&self, key: &RecordKey) -> Option<usize> {
        let wanted = key.to_string();
        self.rows.iter().position(|row| {
            row.get("id")
                .and_then(RecordKey::from_value)
                .is_some_and(|id| id.to_string() == wanted)
        })
    }
}

/// Process-local CRUD gateway used offline and in tests.
pub struct InMemoryCrudGateway<E> {
    table: RwLock<Table>,
    failure: Mutex<Option<AppError>>,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for InMemoryCrudGateway<E> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
            failure: Mutex::new(None),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> InMemoryCrudGateway<E> {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway holding `records`; records without an id get one.
    pub fn with_records(records: Vec<E>) -> AppResult<Self> {
        let mut table = Table {
            rows: Vec::with_capacity(records.len()),
            next_id: 1,
        };
        for record in records {
            let Value::Object(mut row) = serde_json::to_value(&record).map_err(|error| {
                AppError::Internal(format!("failed to store {} seed: {error}", E::RESOURCE))
            })?
            else {
                return Err(AppError::Validation(format!(
                    "{} seed records must be JSON objects",
                    E::RESOURCE
                )));
            };

            match row.get("id").and_then(RecordKey::from_value) {
                Some(RecordKey::Number(id)) => {
                    table.next_id = table.next_id.max(id.saturating_add(1));
                }
                Some(RecordKey::Text(_)) => {}
                None => {
                    row.insert("id".to_owned(), Value::from(table.next_id));
                    table.next_id = table.next_id.saturating_add(1);
                }
            }
            table.rows.push(row);
        }

        Ok(Self {
            table: RwLock::new(table),
            ..Self::default()
        })
    }

    /// Makes the next operation fail with `error`.
    pub async fn fail_next(&self, error: AppError) {
        *self.failure.lock().await = Some(error);
    }

    async fn take_failure(&self) -> AppResult<()> {
        match self.failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn typed(row: &Map<String, Value>) -> AppResult<E> {
        serde_json::from_value(Value::Object(row.clone())).map_err(|error| {
            AppError::Validation(format!("invalid {} record: {error}", E::DISPLAY_NAME))
        })
    }

    fn not_found(key: &RecordKey) -> AppError {
        AppError::NotFound(format!("{} '{key}' does not exist", E::DISPLAY_NAME))
    }
}

#[async_trait]
impl<E: Entity> CrudGateway<E> for InMemoryCrudGateway<E> {
    async fn list(&self, scope: &ListScope) -> AppResult<GatewayReply<Page<E>>> {
        self.take_failure().await?;
        let table = self.table.read().await;

        let matching = table
            .rows
            .iter()
            .filter(|row| match scope.parent() {
                Some((field, value)) => row.get(field).is_some_and(|cell| match cell {
                    Value::String(text) => text == value,
                    Value::Null => false,
                    other => other.to_string() == value,
                }),
                None => true,
            })
            .map(Self::typed)
            .collect::<AppResult<Vec<E>>>()?;

        let page = match (scope.page(), scope.limit()) {
            (Some(page), Some(limit)) => {
                let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
                let skip = usize::try_from(u64::from(page.saturating_sub(1)) * u64::from(limit))
                    .unwrap_or(usize::MAX);
                let limit_items = usize::try_from(limit).unwrap_or(usize::MAX);
                let items = matching.into_iter().skip(skip).take(limit_items).collect();
                Page::paginated(items, total, page, limit)
            }
            _ => Page::new(matching),
        };

        debug!(
            resource = E::RESOURCE,
            count = page.items().len(),
            "in-memory list served"
        );
        Ok(GatewayReply::new(page, None))
    }

    async fn create(&self, payload: Map<String, Value>) -> AppResult<GatewayReply<E>> {
        self.take_failure().await?;
        let mut table = self.table.write().await;

        let id = table.next_id;
        if table.position(&RecordKey::Number(id)).is_some() {
            return Err(AppError::Conflict(format!(
                "no {} ids left to assign",
                E::RESOURCE
            )));
        }

        let mut row = payload;
        row.insert("id".to_owned(), Value::from(id));
        let created = Self::typed(&row)?;
        table.next_id = id.saturating_add(1);
        table.rows.push(row);

        debug!(resource = E::RESOURCE, key = %created.key(), "in-memory record created");
        Ok(GatewayReply::new(
            created,
            Some(format!("{} created", E::DISPLAY_NAME)),
        ))
    }

    async fn update(
        &self,
        key: &RecordKey,
        payload: Map<String, Value>,
    ) -> AppResult<GatewayReply<E>> {
        self.take_failure().await?;
        let mut table = self.table.write().await;
        let index = table.position(key).ok_or_else(|| Self::not_found(key))?;

        let mut row = table.rows[index].clone();
        for (field, value) in payload {
            if field != "id" {
                row.insert(field, value);
            }
        }
        let updated = Self::typed(&row)?;
        table.rows[index] = row;

        debug!(resource = E::RESOURCE, key = %key, "in-memory record updated");
        Ok(GatewayReply::new(
            updated,
            Some(format!("{} updated", E::DISPLAY_NAME)),
        ))
    }

    async fn delete(&self, key: &RecordKey) -> AppResult<GatewayReply<()>> {
        self.take_failure().await?;
        let mut table = self.table.write().await;
        let index = table.position(key).ok_or_else(|| Self::not_found(key))?;
        table.rows.remove(index);

        debug!(resource = E::RESOURCE, key = %key, "in-memory record deleted");
        Ok(GatewayReply::new(
            (),
            Some(format!("{} deleted", E::DISPLAY_NAME)),
        ))
    }
}
