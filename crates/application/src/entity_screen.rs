//! One entity's management page: listing, create/edit modal and feedback.

use std::sync::Arc;

use medadmin_core::{AppError, AppResult, Session};
use medadmin_domain::{Entity, FieldChange, FormSchema, ListColumn, RecordKey};
use serde_json::{Map, Value};
use tracing::info;

use crate::crud_ports::{GatewayReply, ListScope};
use crate::crud_slice::{CreatePolicy, CrudSlice};
use crate::form_modal::{FormMode, FormModal};

#[cfg(test)]
mod tests;

/// Whether required-field validation can block a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Required fields are flagged but the submit goes through.
    Advisory,
    /// Submits with empty required fields are refused.
    Strict,
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// Transient feedback shown after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Human-readable message.
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Per-screen behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    /// What a successful create does to the listing.
    pub create_policy: CreatePolicy,
    /// Whether required fields block a submit.
    pub validation: ValidationPolicy,
    /// Scope used by `refresh`.
    pub scope: ListScope,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            create_policy: CreatePolicy::Refetch,
            validation: ValidationPolicy::Advisory,
            scope: ListScope::all(),
        }
    }
}

#[derive(Debug)]
enum SubmitRequest {
    Create {
        payload: Map<String, Value>,
        policy: CreatePolicy,
    },
    Update {
        key: RecordKey,
        payload: Map<String, Value>,
    },
}

/// Whether a submission created or updated a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    /// New record.
    Create,
    /// Existing record.
    Update,
}

/// Submission taken from the modal, ready to be sent.
///
/// Dispatching does not borrow the screen, so the busy modal can be rendered
/// while the request is in flight.
pub struct PendingSubmit<E: Entity> {
    slice: Arc<CrudSlice<E>>,
    request: SubmitRequest,
}

impl<E: Entity> PendingSubmit<E> {
    /// Sends the submission through the shared slice.
    pub async fn dispatch(self) -> SubmitOutcome<E> {
        match self.request {
            SubmitRequest::Create { payload, policy } => {
                let slice_policy = match policy {
                    CreatePolicy::Append => CreatePolicy::Append,
                    CreatePolicy::Refetch | CreatePolicy::Manual => CreatePolicy::Manual,
                };
                SubmitOutcome {
                    kind: SubmitKind::Create,
                    result: self.slice.create(payload, slice_policy).await,
                }
            }
            SubmitRequest::Update { key, payload } => SubmitOutcome {
                kind: SubmitKind::Update,
                result: self.slice.update(&key, payload).await,
            },
        }
    }
}

/// Settled submission handed back to [`EntityScreen::finish_submit`].
#[derive(Debug)]
pub struct SubmitOutcome<E> {
    /// Create or update.
    pub kind: SubmitKind,
    /// Gateway result.
    pub result: AppResult<GatewayReply<E>>,
}

/// Management page for one entity.
pub struct EntityScreen<E: Entity> {
    session: Arc<Session>,
    slice: Arc<CrudSlice<E>>,
    modal: FormModal,
    columns: Vec<ListColumn>,
    config: ScreenConfig,
    notifications: Vec<Notification>,
}

impl<E: Entity> EntityScreen<E> {
    /// Creates a screen over a shared slice.
    #[must_use]
    pub fn new(
        session: Arc<Session>,
        slice: Arc<CrudSlice<E>>,
        schema: FormSchema,
        columns: Vec<ListColumn>,
        config: ScreenConfig,
    ) -> Self {
        Self {
            session,
            slice,
            modal: FormModal::new(E::DISPLAY_NAME, Arc::new(schema)),
            columns,
            config,
            notifications: Vec::new(),
        }
    }

    /// Returns the shared slice.
    #[must_use]
    pub fn slice(&self) -> &Arc<CrudSlice<E>> {
        &self.slice
    }

    /// Returns the modal for rendering.
    #[must_use]
    pub fn modal(&self) -> &FormModal {
        &self.modal
    }

    /// Returns the listing columns.
    #[must_use]
    pub fn columns(&self) -> &[ListColumn] {
        &self.columns
    }

    /// Returns the screen configuration.
    #[must_use]
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Returns pending notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Removes and returns pending notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Reloads the listing with the screen scope.
    pub async fn refresh(&mut self) -> bool {
        match self.slice.list(&self.config.scope).await {
            Ok(_) => true,
            Err(error) => {
                self.notify_failure(&error);
                false
            }
        }
    }

    /// Table rows, one cell per column, for the listed records.
    pub async fn rows(&self) -> Vec<Vec<String>> {
        let state = self.slice.snapshot().await;
        let Some(page) = state.data else {
            return Vec::new();
        };

        page.items()
            .iter()
            .map(|item| {
                let record = serde_json::to_value(item).unwrap_or(Value::Null);
                self.columns
                    .iter()
                    .map(|column| column.cell(&record))
                    .collect()
            })
            .collect()
    }

    /// Opens the modal for a new record.
    pub fn open_create(&mut self) -> bool {
        if !self.ensure_can_write() {
            return false;
        }
        self.modal.open(FormMode::Create);
        true
    }

    /// Opens the modal seeded from a listed record.
    pub async fn open_edit(&mut self, key: &RecordKey) -> bool {
        if !self.ensure_can_write() {
            return false;
        }

        let Some(record) = self.slice.find(key).await else {
            self.notify_failure(&AppError::NotFound(format!(
                "{} '{key}' is not in the current listing",
                E::DISPLAY_NAME
            )));
            return false;
        };

        match serde_json::to_value(&record) {
            Ok(target) => {
                self.modal.open(FormMode::Edit(target));
                true
            }
            Err(error) => {
                self.notify_failure(&AppError::Internal(format!(
                    "failed to prepare {} for editing: {error}",
                    E::DISPLAY_NAME
                )));
                false
            }
        }
    }

    /// Forwards a normalised field change to the modal.
    pub fn change(&mut self, change: FieldChange) -> bool {
        self.modal.handle_change(change)
    }

    /// Closes the modal without submitting.
    pub fn close(&mut self) {
        self.modal.close(|| {});
    }

    /// Submits the open modal and dispatches create or update.
    pub async fn submit(&mut self) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let outcome = pending.dispatch().await;
        self.finish_submit(outcome).await
    }

    /// Takes the modal snapshot and marks the modal busy.
    ///
    /// Returns `None` when nothing should be dispatched; the reason is pushed
    /// as a notification. The modal stays open until
    /// [`EntityScreen::finish_submit`].
    pub fn begin_submit(&mut self) -> Option<PendingSubmit<E>> {
        if !self.modal.is_open() {
            self.notify_failure(&AppError::Validation("form is not open".to_owned()));
            return None;
        }
        if self.config.validation == ValidationPolicy::Strict
            && let Err(error) = self.modal.validate()
        {
            self.notify_failure(&error);
            return None;
        }

        let (mode, values) = match self.modal.begin_submit() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.notify_failure(&error);
                return None;
            }
        };
        let payload = values.to_payload(self.modal.schema());

        let request = match mode {
            FormMode::Create => SubmitRequest::Create {
                payload,
                policy: self.config.create_policy,
            },
            FormMode::Edit(target) => match target.get("id").and_then(RecordKey::from_value) {
                Some(key) => SubmitRequest::Update { key, payload },
                None => {
                    self.modal.set_submitting(false);
                    self.notify_failure(&AppError::Validation(format!(
                        "{} being edited has no id",
                        E::DISPLAY_NAME
                    )));
                    return None;
                }
            },
        };

        Some(PendingSubmit {
            slice: Arc::clone(&self.slice),
            request,
        })
    }

    /// Applies a dispatched submission: closes the modal and reports the result.
    pub async fn finish_submit(&mut self, outcome: SubmitOutcome<E>) -> bool {
        self.modal.finish_submit(|| {});

        let reply = match outcome.result {
            Ok(reply) => reply,
            Err(error) => {
                self.notify_failure(&error);
                return false;
            }
        };

        let verb = match outcome.kind {
            SubmitKind::Create => "created",
            SubmitKind::Update => "updated",
        };
        info!(
            actor = self.session.subject(),
            resource = E::RESOURCE,
            key = %reply.data.key(),
            "record {verb}"
        );
        self.notifications.push(Notification::success(
            reply
                .message
                .unwrap_or_else(|| format!("{} {verb}", E::DISPLAY_NAME)),
        ));

        if outcome.kind == SubmitKind::Create && self.config.create_policy == CreatePolicy::Refetch
        {
            self.refresh().await;
        }
        true
    }

    /// Deletes a listed record.
    pub async fn delete(&mut self, key: &RecordKey) -> bool {
        if !self.ensure_can_write() {
            return false;
        }

        match self.slice.delete(key).await {
            Ok(reply) => {
                info!(
                    actor = self.session.subject(),
                    resource = E::RESOURCE,
                    key = %key,
                    "record deleted"
                );
                self.notifications.push(Notification::success(
                    reply
                        .message
                        .unwrap_or_else(|| format!("{} deleted", E::DISPLAY_NAME)),
                ));
                true
            }
            Err(error) => {
                self.notify_failure(&error);
                false
            }
        }
    }

    /// Deletes the record currently open in the modal.
    pub async fn delete_from_modal(&mut self) -> bool {
        let mut key = None;
        if let Err(error) = self.modal.handle_delete(
            |target| key = target.get("id").and_then(RecordKey::from_value),
            || {},
        ) {
            self.notify_failure(&error);
            return false;
        }

        match key {
            Some(key) => self.delete(&key).await,
            None => {
                self.notify_failure(&AppError::Validation(format!(
                    "{} being edited has no id",
                    E::DISPLAY_NAME
                )));
                false
            }
        }
    }

    fn ensure_can_write(&mut self) -> bool {
        if self.session.role().can_write() {
            return true;
        }
        self.notify_failure(&AppError::Forbidden(format!(
            "role '{}' cannot modify {} records",
            self.session.role(),
            E::DISPLAY_NAME
        )));
        false
    }

    fn notify_failure(&mut self, error: &AppError) {
        self.notifications
            .push(Notification::error(error.message().to_owned()));
    }
}
