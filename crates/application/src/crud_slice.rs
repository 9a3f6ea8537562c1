//! Request-status-tagged state for one entity resource.
//!
//! Every dispatch runs three phases: `pending` marks the slice as loading,
//! the gateway call runs without holding the state lock, and the settlement
//! either applies the result or records the error message.
//!
//! Each dispatch carries a generation token. A list result is discarded when a
//! newer list has been dispatched since, and only the newest dispatch of any
//! kind may clear `loading` or set `error`. Record mutations (update, delete,
//! append) are applied in place whatever their token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use medadmin_core::AppResult;
use medadmin_domain::{Entity, Page, RecordKey};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::crud_ports::{CrudGateway, GatewayReply, ListScope};

#[cfg(test)]
mod tests;

/// What a successful create does to the listed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Leave the list alone; the screen refetches it.
    Refetch,
    /// Append the created record to the listed page.
    Append,
    /// Leave the list alone; the caller decides what to do.
    Manual,
}

/// Snapshot of a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<E> {
    /// Last listed page, if any list succeeded.
    pub data: Option<Page<E>>,
    /// Whether the newest dispatch is still in flight.
    pub loading: bool,
    /// Message of the newest failed dispatch.
    pub error: Option<String>,
}

impl<E> Default for SliceState<E> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Monotonic identifier of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DispatchToken(u64);

#[derive(Debug, Clone, Copy)]
enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Async CRUD state container for one entity.
pub struct CrudSlice<E: Entity> {
    gateway: Arc<dyn CrudGateway<E>>,
    state: RwLock<SliceState<E>>,
    generation: AtomicU64,
    latest_list: AtomicU64,
    reset_floor: AtomicU64,
}

impl<E: Entity> CrudSlice<E> {
    /// Creates an idle slice backed by `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn CrudGateway<E>>) -> Self {
        Self {
            gateway,
            state: RwLock::new(SliceState::default()),
            generation: AtomicU64::new(0),
            latest_list: AtomicU64::new(0),
            reset_floor: AtomicU64::new(0),
        }
    }

    /// Returns the resource name of this slice.
    #[must_use]
    pub fn name(&self) -> &'static str {
        E::RESOURCE
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> SliceState<E> {
        self.state.read().await.clone()
    }

    /// Finds a listed record by key.
    pub async fn find(&self, key: &RecordKey) -> Option<E> {
        self.state
            .read()
            .await
            .data
            .as_ref()
            .and_then(|page| page.find(key))
            .cloned()
    }

    /// Fetches the records in `scope` and replaces `data` on success.
    pub async fn list(&self, scope: &ListScope) -> AppResult<GatewayReply<Page<E>>> {
        let token = self.begin(Operation::List).await;
        let result = self.gateway.list(scope).await;

        self.settle(token, Operation::List, &result, |state, reply| {
            state.data = Some(reply.data.clone());
        })
        .await;
        result
    }

    /// Creates a record; the listed data changes only under [`CreatePolicy::Append`].
    pub async fn create(
        &self,
        payload: Map<String, Value>,
        policy: CreatePolicy,
    ) -> AppResult<GatewayReply<E>> {
        let token = self.begin(Operation::Create).await;
        let result = self.gateway.create(payload).await;

        self.settle(token, Operation::Create, &result, |state, reply| {
            if policy == CreatePolicy::Append
                && let Some(page) = &state.data
            {
                state.data = Some(page.with_appended(reply.data.clone()));
            }
        })
        .await;
        result
    }

    /// Updates a record and replaces the listed copy with the returned one.
    pub async fn update(
        &self,
        key: &RecordKey,
        payload: Map<String, Value>,
    ) -> AppResult<GatewayReply<E>> {
        let token = self.begin(Operation::Update).await;
        let result = self.gateway.update(key, payload).await;

        self.settle(token, Operation::Update, &result, |state, reply| {
            if let Some(page) = &state.data {
                state.data = Some(page.with_replaced(reply.data.clone()));
            }
        })
        .await;
        result
    }

    /// Deletes a record and removes it from the listed data.
    pub async fn delete(&self, key: &RecordKey) -> AppResult<GatewayReply<()>> {
        let token = self.begin(Operation::Delete).await;
        let result = self.gateway.delete(key).await;

        self.settle(token, Operation::Delete, &result, |state, _| {
            if let Some(page) = &state.data {
                state.data = Some(page.without(key));
            }
        })
        .await;
        result
    }

    /// Clears the state and turns every in-flight settlement into a no-op.
    pub async fn reset(&self) {
        let floor = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.reset_floor.store(floor, Ordering::SeqCst);
        *self.state.write().await = SliceState::default();
        debug!(slice = E::RESOURCE, floor, "slice reset");
    }

    async fn begin(&self, operation: Operation) -> DispatchToken {
        let mut state = self.state.write().await;
        let token = DispatchToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        if matches!(operation, Operation::List) {
            self.latest_list.store(token.0, Ordering::SeqCst);
        }
        state.loading = true;
        state.error = None;
        debug!(
            slice = E::RESOURCE,
            operation = operation.as_str(),
            token = token.0,
            "dispatch pending"
        );
        token
    }

    async fn settle<T>(
        &self,
        token: DispatchToken,
        operation: Operation,
        result: &AppResult<GatewayReply<T>>,
        apply: impl FnOnce(&mut SliceState<E>, &GatewayReply<T>),
    ) {
        let mut state = self.state.write().await;
        if token.0 <= self.reset_floor.load(Ordering::SeqCst) {
            debug!(
                slice = E::RESOURCE,
                operation = operation.as_str(),
                token = token.0,
                "settlement after reset ignored"
            );
            return;
        }

        let is_latest = token.0 == self.generation.load(Ordering::SeqCst);
        let superseded = matches!(operation, Operation::List)
            && token.0 < self.latest_list.load(Ordering::SeqCst);
        match result {
            Ok(reply) => {
                if !superseded {
                    apply(&mut state, reply);
                } else {
                    debug!(
                        slice = E::RESOURCE,
                        token = token.0,
                        "stale list result discarded"
                    );
                }
                if is_latest {
                    state.loading = false;
                }
            }
            Err(error) => {
                warn!(
                    slice = E::RESOURCE,
                    operation = operation.as_str(),
                    token = token.0,
                    error = %error,
                    "dispatch rejected"
                );
                if is_latest {
                    state.loading = false;
                    state.error = Some(error.message().to_owned());
                }
            }
        }
    }
}
