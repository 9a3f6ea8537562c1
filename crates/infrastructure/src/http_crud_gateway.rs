use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use medadmin_application::{CrudGateway, GatewayReply, ListScope};
use medadmin_core::{AppError, AppResult, Session};
use medadmin_domain::{Entity, Page, RecordKey};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::envelope::{self, Decoded};

/// REST implementation of the CRUD gateway for one entity resource.
pub struct HttpCrudGateway<E> {
    http_client: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpCrudGateway<E> {
    /// Creates a gateway rooted at `base_url` that authenticates as `session`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url, session: Arc<Session>) -> Self {
        Self {
            http_client,
            base_url,
            session,
            entity: PhantomData,
        }
    }

    fn resource_url(&self, key: Option<&RecordKey>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AppError::Internal(format!(
                    "API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push(E::RESOURCE);
            if let Some(key) = key {
                segments.push(&key.to_string());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: Url,
        body: Option<&Map<String, Value>>,
    ) -> AppResult<Decoded> {
        let path = url.path().to_owned();
        let mut builder = self.http_client.request(method.clone(), url);
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Request(format!("{} request could not be sent: {error}", E::DISPLAY_NAME))
        })?;
        let status = response.status();
        debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "backend responded"
        );

        let text = response.text().await.map_err(|error| {
            AppError::Request(format!("failed to read backend response: {error}"))
        })?;
        envelope::decode(status.as_u16(), &text)
    }

    fn typed<T: DeserializeOwned>(decoded: Decoded) -> AppResult<GatewayReply<T>> {
        let data = serde_json::from_value(decoded.data).map_err(|error| {
            AppError::Internal(format!(
                "backend returned an unexpected {} payload: {error}",
                E::RESOURCE
            ))
        })?;
        Ok(GatewayReply::new(data, decoded.message))
    }
}

#[async_trait]
impl<E: Entity> CrudGateway<E> for HttpCrudGateway<E> {
    async fn list(&self, scope: &ListScope) -> AppResult<GatewayReply<Page<E>>> {
        let mut url = self.resource_url(None)?;
        let pairs = scope.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let decoded = self.send(reqwest::Method::GET, url, None).await?;
        Self::typed(decoded)
    }

    async fn create(&self, payload: Map<String, Value>) -> AppResult<GatewayReply<E>> {
        let url = self.resource_url(None)?;
        let decoded = self
            .send(reqwest::Method::POST, url, Some(&payload))
            .await?;
        Self::typed(decoded)
    }

    async fn update(
        &self,
        key: &RecordKey,
        payload: Map<String, Value>,
    ) -> AppResult<GatewayReply<E>> {
        let url = self.resource_url(Some(key))?;
        let decoded = self
            .send(reqwest::Method::PUT, url, Some(&payload))
            .await?;
        Self::typed(decoded)
    }

    async fn delete(&self, key: &RecordKey) -> AppResult<GatewayReply<()>> {
        let url = self.resource_url(Some(key))?;
        let decoded = self.send(reqwest::Method::DELETE, url, None).await?;
        Ok(GatewayReply::new((), decoded.message))
    }
}
