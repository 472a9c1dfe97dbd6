//! HTTP implementation of the backend notification service interface.

use async_trait::async_trait;
use carlink_config::ClientConfig;
use carlink_protocol::{
    ApiError, Credential, EventByteStream, NotificationApi, NotificationId,
    NotificationListResponse, NotificationRecord, OwnerId, UnreadCountResponse,
};
use futures_util::StreamExt;
use log::{debug, info};
use std::time::Duration;

/// `NotificationApi` backed by the marketplace HTTP backend.
pub struct HttpNotificationApi {
    /// Client for request/response calls, with the configured timeout.
    requests: reqwest::Client,
    /// Client for the push stream. Carries no timeout: a total-request
    /// timeout would sever the long-lived stream mid-subscription.
    stream: reqwest::Client,
    base_url: String,
    stream_endpoint: String,
    credential: Credential,
}

impl HttpNotificationApi {
    /// Build an API client from config plus the session credential.
    pub fn new(
        config: &ClientConfig,
        credential: impl Into<Credential>,
    ) -> Result<Self, ApiError> {
        let requests = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.request_timeout_secs))
            .build()
            .map_err(|err| ApiError::Connection(err.to_string()))?;
        let stream = reqwest::Client::builder()
            .build()
            .map_err(|err| ApiError::Connection(err.to_string()))?;
        Ok(Self {
            requests,
            stream,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            stream_endpoint: config.channel.endpoint.clone(),
            credential: credential.into(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success statuses into the given error variant.
    fn check(
        response: reqwest::Response,
        wrap: fn(String) -> ApiError,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(wrap(format!("backend returned {status}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn fetch_all(&self, owner: &OwnerId) -> Result<Vec<NotificationRecord>, ApiError> {
        debug!("fetching notifications (owner_id={})", owner);
        let response = self
            .requests
            .get(self.url("/api/notifications"))
            .bearer_auth(&self.credential)
            .query(&[("owner", owner.as_str())])
            .send()
            .await
            .map_err(|err| ApiError::Fetch(err.to_string()))?;
        let response = Self::check(response, ApiError::Fetch)?;
        let body: NotificationListResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Fetch(err.to_string()))?;
        Ok(body.notifications)
    }

    async fn fetch_unread_count(&self, owner: &OwnerId) -> Result<usize, ApiError> {
        debug!("fetching unread count (owner_id={})", owner);
        let response = self
            .requests
            .get(self.url("/api/notifications/unread-count"))
            .bearer_auth(&self.credential)
            .query(&[("owner", owner.as_str())])
            .send()
            .await
            .map_err(|err| ApiError::Fetch(err.to_string()))?;
        let response = Self::check(response, ApiError::Fetch)?;
        let body: UnreadCountResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Fetch(err.to_string()))?;
        Ok(body.unread)
    }

    async fn mark_read(&self, owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError> {
        debug!("persisting read transition (owner_id={}, id={})", owner, id);
        let response = self
            .requests
            .post(self.url(&format!("/api/notifications/{id}/read")))
            .bearer_auth(&self.credential)
            .send()
            .await
            .map_err(|err| ApiError::Persistence(err.to_string()))?;
        Self::check(response, ApiError::Persistence)?;
        Ok(())
    }

    async fn mark_all_read(&self, owner: &OwnerId) -> Result<(), ApiError> {
        debug!("persisting bulk read transition (owner_id={})", owner);
        let response = self
            .requests
            .post(self.url("/api/notifications/read-all"))
            .bearer_auth(&self.credential)
            .send()
            .await
            .map_err(|err| ApiError::Persistence(err.to_string()))?;
        Self::check(response, ApiError::Persistence)?;
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: &NotificationId) -> Result<(), ApiError> {
        debug!("persisting removal (owner_id={}, id={})", owner, id);
        let response = self
            .requests
            .delete(self.url(&format!("/api/notifications/{id}")))
            .bearer_auth(&self.credential)
            .send()
            .await
            .map_err(|err| ApiError::Persistence(err.to_string()))?;
        Self::check(response, ApiError::Persistence)?;
        Ok(())
    }

    async fn open_stream(&self, credential: &Credential) -> Result<EventByteStream, ApiError> {
        info!("opening push stream (endpoint={})", self.stream_endpoint);
        let response = self
            .stream
            .get(self.url(&self.stream_endpoint))
            .bearer_auth(credential)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| ApiError::Connection(err.to_string()))?;
        let response = Self::check(response, ApiError::Connection)?;
        let bytes = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|err| ApiError::Connection(err.to_string()))
        });
        Ok(Box::pin(bytes))
    }
}
