use async_trait::async_trait;
use medadmin_core::AppResult;
use medadmin_domain::{Entity, Page, RecordKey};
use serde_json::{Map, Value};

/// Successful backend reply with the envelope's feedback message.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    /// Unwrapped `data`/`result` payload.
    pub data: T,
    /// Envelope message meant for a toast, if any.
    pub message: Option<String>,
}

impl<T> GatewayReply<T> {
    /// Creates a reply.
    #[must_use]
    pub fn new(data: T, message: Option<String>) -> Self {
        Self { data, message }
    }
}

/// Server-side filter and pagination for list requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListScope {
    parent: Option<(String, String)>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl ListScope {
    /// Unfiltered, unpaginated scope.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Scope restricted to children of one parent record.
    #[must_use]
    pub fn by_parent(field: impl Into<String>, key: &RecordKey) -> Self {
        Self {
            parent: Some((field.into(), key.to_string())),
            ..Self::default()
        }
    }

    /// Returns the scope with pagination applied.
    #[must_use]
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page.max(1));
        self.limit = Some(limit.max(1));
        self
    }

    /// Returns the parent filter as `(field, value)`.
    #[must_use]
    pub fn parent(&self) -> Option<(&str, &str)> {
        self.parent
            .as_ref()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    /// Returns the one-based page.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Returns the scope as query-string pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some((field, value)) = &self.parent {
            pairs.push((field.clone(), value.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_owned(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        pairs
    }
}

/// Port for the backend API serving one entity resource.
#[async_trait]
pub trait CrudGateway<E: Entity>: Send + Sync {
    /// Lists records in scope.
    async fn list(&self, scope: &ListScope) -> AppResult<GatewayReply<Page<E>>>;

    /// Creates a record from a form payload.
    async fn create(&self, payload: Map<String, Value>) -> AppResult<GatewayReply<E>>;

    /// Updates the record with `key` from a form payload.
    async fn update(
        &self,
        key: &RecordKey,
        payload: Map<String, Value>,
    ) -> AppResult<GatewayReply<E>>;

    /// Deletes the record with `key`.
    async fn delete(&self, key: &RecordKey) -> AppResult<GatewayReply<()>>;
}

#[cfg(test)]
mod tests {
    use medadmin_domain::RecordKey;

    use super::ListScope;

    #[test]
    fn scope_serialises_parent_and_pagination() {
        let scope = ListScope::by_parent("hospital_id", &RecordKey::Number(3)).with_page(0, 20);

        assert_eq!(scope.parent(), Some(("hospital_id", "3")));
        assert_eq!(
            scope.query_pairs(),
            vec![
                ("hospital_id".to_owned(), "3".to_owned()),
                ("page".to_owned(), "1".to_owned()),
                ("limit".to_owned(), "20".to_owned()),
            ]
        );
        assert!(ListScope::all().query_pairs().is_empty());
    }
}
