//! HTTP implementation of the order service
//!
//! `PATCH {base}/{id}/status`, `GET {base}?status=..`, `POST {base}`. Each
//! request is sent once; there is no retry loop.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{OrderPayload, OrderService, ServiceError};
use crate::config::ServiceConfig;
use crate::domain::{DeliveryStatus, RawOrder};

/// reqwest-backed order service client
pub struct HttpOrderService {
    base_url: String,
    base: Url,
    http: Client,
}

impl HttpOrderService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, ?timeout, "HttpOrderService::new: called");
        let base = Url::parse(&base_url).map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(format!("{}: cannot be a base", base_url)));
        }
        let http = Client::builder().timeout(timeout).build().map_err(ServiceError::Network)?;
        Ok(Self { base_url, base, http })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::new(config.base_url.clone(), Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{id}/status` with the id pushed as one escaped path segment
    fn status_url(&self, id: &str) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(id)
            .push("status");
        Ok(url)
    }

    /// Turn non-2xx responses into `ApiError`
    async fn check(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %message, "check: non-success status");
        Err(ServiceError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Read a list response; anything but a JSON array counts as empty
    async fn read_list(response: Response) -> Result<Vec<RawOrder>, ServiceError> {
        let body: Value = response.json().await?;
        match body {
            Value::Array(items) => Ok(items.into_iter().map(RawOrder).collect()),
            other => {
                warn!(kind = %json_kind(&other), "order list response is not an array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn get_by_statuses(&self, statuses: &[DeliveryStatus]) -> Result<Vec<RawOrder>, ServiceError> {
        let query: Vec<(&str, &str)> = statuses.iter().map(|s| ("status", s.as_wire())).collect();
        let response = self.http.get(self.base.clone()).query(&query).send().await?;
        Self::read_list(Self::check(response).await?).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn update_status(&self, id: &str, status: DeliveryStatus) -> Result<(), ServiceError> {
        debug!(%id, %status, "update_status: called");
        let url = self.status_url(id)?;
        let response = self
            .http
            .patch(url)
            .json(&serde_json::json!({ "status": status.as_wire() }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn find_by_statuses(&self, statuses: &[DeliveryStatus]) -> Result<Vec<RawOrder>, ServiceError> {
        debug!(?statuses, "find_by_statuses: called");
        self.get_by_statuses(statuses).await
    }

    async fn find_by_status(&self, status: DeliveryStatus) -> Result<Vec<RawOrder>, ServiceError> {
        debug!(%status, "find_by_status: called");
        self.get_by_statuses(&[status]).await
    }

    async fn create(&self, payload: &OrderPayload) -> Result<RawOrder, ServiceError> {
        debug!(status = %payload.status, items = payload.items.len(), "create: called");
        let response = self.http.post(self.base.clone()).json(payload).send().await?;
        let body: Value = Self::check(response).await?.json().await?;
        if !body.is_object() {
            return Err(ServiceError::InvalidResponse(format!(
                "expected created order object, got {}",
                json_kind(&body)
            )));
        }
        Ok(RawOrder(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> HttpOrderService {
        HttpOrderService::new(format!("{}/orders", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_statuses_sends_repeated_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("status", "ON_THE_WAY"))
            .and(query_param("status", "READY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "status": "READY"}, {"id": 2}])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = service_for(&mock_server);
        let records = service
            .find_by_statuses(&[DeliveryStatus::OnTheWay, DeliveryStatus::Ready])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "1");

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("status=ON_THE_WAY&status=READY"));
    }

    #[tokio::test]
    async fn test_non_array_list_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("status", "READY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let records = service_for(&mock_server).find_by_status(DeliveryStatus::Ready).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_patches_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/orders/42/status"))
            .and(body_json(json!({"status": "DELIVERED"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        service_for(&mock_server)
            .update_status("42", DeliveryStatus::Delivered)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_escapes_id_segment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/orders/7%2Fx%3Fy/status"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        service_for(&mock_server)
            .update_status("7/x?y", DeliveryStatus::OnTheWay)
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/orders/1/status"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&mock_server)
            .await;

        let err = service_for(&mock_server)
            .update_status("1", DeliveryStatus::OnTheWay)
            .await
            .unwrap_err();
        match err {
            ServiceError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("boom"));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_requires_object_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let payload = OrderPayload::new(chrono::Utc::now(), "READY");
        let err = service_for(&mock_server).create(&payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpOrderService::new(format!("http://{}/orders", addr), Duration::from_secs(2)).unwrap();
        let err = service.find_by_status(DeliveryStatus::Ready).await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = HttpOrderService::new("http://localhost:8080/orders/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8080/orders");
        assert_eq!(
            service.status_url("9").unwrap().as_str(),
            "http://localhost:8080/orders/9/status"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpOrderService::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ServiceError::InvalidUrl(_))));
    }
}
