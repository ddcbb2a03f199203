//! Notification service client.
//!
//! The widget only sees the `NotificationService` trait. `HttpNotificationClient`
//! is the production implementation over reqwest:
//! - `GET    /notifications`
//! - `PUT    /notifications/:id/read`
//! - `PUT    /notifications/read-all`
//! - `DELETE /notifications/:id`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::Session;
use crate::domain::notifications::{Ack, NotificationId, NotificationPayload};
use crate::error::{ClientError, ClientResult, ErrorResponse};

/// Header carrying a per-call correlation id
pub const X_REQUEST_ID: &str = "x-request-id";

/// Remote notification operations consumed by the widget.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<NotificationPayload>>;

    async fn mark_read(&self, id: &NotificationId) -> ClientResult<Ack>;

    async fn mark_all_read(&self) -> ClientResult<Ack>;

    async fn delete(&self, id: &NotificationId) -> ClientResult<Ack>;
}

/// List responses come either bare or wrapped in a `data` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

/// Client for the notification service.
#[derive(Clone)]
pub struct HttpNotificationClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpNotificationClient {
    /// Create a new notification service client.
    pub fn new(base_url: &Url, session: Session, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.clone();
        tracing::info!(base_url = %base_url, "Notification client initialized");

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Append `segments` to the base path. Each segment is percent-encoded,
    /// so an id containing `/`, `?` or `#` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut target = self.base_url.clone();
        target
            .path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(target)
    }

    /// Send a request and map non-2xx statuses to `ClientError`.
    async fn request(&self, method: Method, segments: &[&str]) -> ClientResult<Response> {
        let url = self.endpoint(segments)?;
        let request_id = Uuid::new_v4().to_string();

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .header(X_REQUEST_ID, &request_id);

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        debug!(method = %method, url = %url, request_id = %request_id, "Notification service request");

        let response = req.send().await.map_err(|e| {
            debug!(error = %e, request_id = %request_id, "Notification service unreachable");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorResponse>().await.ok();
        if let Some(remote_id) = body.as_ref().and_then(|b| b.request_id.as_deref()) {
            debug!(request_id = %request_id, remote_request_id = %remote_id, "Service echoed request id");
        }

        Err(ClientError::from_status(status, body))
    }

    /// Write endpoints may answer with an empty body.
    async fn ack(&self, method: Method, segments: &[&str]) -> ClientResult<Ack> {
        let bytes = self.request(method, segments).await?.bytes().await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ack::default());
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("Invalid acknowledgement: {}", e)))
    }

    /// Check notification service reachability.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.endpoint(&["health"]).context("Invalid health URL")?;

        self.client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Notification service health check failed")?
            .error_for_status()
            .context("Notification service unhealthy")?;

        Ok(())
    }
}

#[async_trait]
impl NotificationService for HttpNotificationClient {
    #[instrument(skip(self))]
    async fn list(&self) -> ClientResult<Vec<NotificationPayload>> {
        let envelope: ListEnvelope = self
            .request(Method::GET, &["notifications"])
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("Invalid notification list: {}", e)))?;

        let records = match envelope {
            ListEnvelope::Bare(records) | ListEnvelope::Wrapped { data: records } => records,
        };

        let payloads = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!(error = %e, "Skipping notification record that is not an object");
                    None
                }
            })
            .collect();

        Ok(payloads)
    }

    #[instrument(skip(self, id), fields(notification_id = %id))]
    async fn mark_read(&self, id: &NotificationId) -> ClientResult<Ack> {
        self.ack(Method::PUT, &["notifications", id.as_str(), "read"])
            .await
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self) -> ClientResult<Ack> {
        self.ack(Method::PUT, &["notifications", "read-all"]).await
    }

    #[instrument(skip(self, id), fields(notification_id = %id))]
    async fn delete(&self, id: &NotificationId) -> ClientResult<Ack> {
        self.ack(Method::DELETE, &["notifications", id.as_str()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard, session: Session) -> HttpNotificationClient {
        let base = Url::parse(&format!("{}/api", server.url())).unwrap();
        HttpNotificationClient::new(&base, session, 5).unwrap()
    }

    #[tokio::test]
    async fn list_sends_bearer_and_request_id_and_accepts_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/notifications")
            .match_header("authorization", "Bearer secret-token")
            .match_header(X_REQUEST_ID, Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[{"id":1,"title":"Booked","status":"UNREAD"},42,{"id":"2"}]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, Session::with_token("secret-token"));
        let payloads = client.list().await.expect("list should succeed");

        mock.assert_async().await;
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].id.as_deref(), Some("1"));
        assert_eq!(payloads[1].id.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn list_accepts_bare_array() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/notifications")
            .with_status(200)
            .with_body(r#"[{"id":7,"message":"hi"}]"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let payloads = client.list().await.unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].message.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn mark_read_tolerates_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/notifications/9/read")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let ack = client.mark_read(&NotificationId::from(9)).await.unwrap();

        mock.assert_async().await;
        assert!(ack.success);
    }

    #[tokio::test]
    async fn ids_with_reserved_characters_stay_in_one_path_segment() {
        let mut server = mockito::Server::new_async().await;
        let read = server
            .mock("PUT", "/api/notifications/a%3Fb%2Fc%23d/read")
            .match_query(Matcher::Missing)
            .with_status(204)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/notifications/a%3Fb%2Fc%23d")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let id = NotificationId::from("a?b/c#d");
        client.mark_read(&id).await.unwrap();
        client.delete(&id).await.unwrap();

        read.assert_async().await;
        delete.assert_async().await;
    }

    #[test]
    fn endpoint_percent_encodes_segments() {
        let base = Url::parse("http://localhost/api/").unwrap();
        let client = HttpNotificationClient::new(&base, Session::new(), 5).unwrap();
        let url = client
            .endpoint(&["notifications", "a?b", "read"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/notifications/a%3Fb/read");
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn mark_all_read_reports_marked_count() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/api/notifications/read-all")
            .with_status(200)
            .with_body(r#"{"success":true,"marked_count":4}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let ack = client.mark_all_read().await.unwrap();
        assert_eq!(ack.marked_count, Some(4));
    }

    #[tokio::test]
    async fn delete_maps_not_found_with_service_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/notifications/3")
            .with_status(404)
            .with_body(r#"{"code":"NOT_FOUND","message":"Notification not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let err = client.delete(&NotificationId::from(3)).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "Notification not found"));
    }

    #[tokio::test]
    async fn server_error_maps_to_service_variant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/notifications")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server, Session::new());
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Service { status: 500, .. }));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let base = Url::parse("http://127.0.0.1:9/").unwrap();
        let client = HttpNotificationClient::new(&base, Session::new(), 1).unwrap();
        let err = client.list().await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }
}
