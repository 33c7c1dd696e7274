//! reqwest-backed clients for the monitoring and attendance services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use workday_core::EmployeeId;

use crate::error::{ErrorBody, Rejection, Result, ServiceError};
use crate::trait_::{AttendanceService, MonitoringService};
use crate::wire::{
    Acknowledgement, AttendanceDay, EmployeeRef, MonitoringSession, StartSessionRequest,
    VerifyEnvelope,
};

/// Shared HTTP plumbing for both services.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,

    /// API root, without a trailing slash
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for `segments` under the API root. Each segment is
    /// percent-encoded, so an id cannot reach another endpoint.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let invalid = |reason: String| {
            ServiceError::Transport(format!("invalid base URL {}: {}", self.base_url, reason))
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON body. A 404 or a `null` body reads as `None`.
    async fn get(&self, segments: &[&str]) -> Result<Option<Value>> {
        let url = self.url(segments)?;
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("GET {} -> 404", url);
            return Ok(None);
        }

        let value = read_body(response).await?;
        Ok((!value.is_null()).then_some(value))
    }

    /// POST a JSON body and read the JSON answer.
    async fn post<B>(&self, segments: &[&str], body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(segments)?;
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        read_body(response).await
    }
}

async fn read_body(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        warn!("Upstream answered {}: {}", status, text);
        return Err(ServiceError::Rejected(Rejection::from_text(
            Some(status.as_u16()),
            &text,
        )));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Some endpoints wrap their payload as `{success, data: {...}}`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("status") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Turn a write response into an acknowledgement, or a rejection when the
/// body says `success: false`.
fn acknowledge(value: Value) -> Result<Acknowledgement> {
    let ack = Acknowledgement::from_value(&value);
    if ack.success {
        return Ok(ack);
    }

    let body: ErrorBody = serde_json::from_value(value).unwrap_or_default();
    Err(ServiceError::Rejected(Rejection::from_body(None, body)))
}

/// Monitoring service over HTTP.
#[derive(Clone)]
pub struct HttpMonitoringService {
    api: ApiClient,
}

impl HttpMonitoringService {
    /// Create a monitoring client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn post_for_employee(&self, action: &str, employee: &EmployeeId) -> Result<Acknowledgement> {
        let value = self
            .api
            .post(
                &["monitoring", "work-session", action],
                &EmployeeRef { employee_id: employee },
            )
            .await?;
        acknowledge(value)
    }
}

#[async_trait]
impl MonitoringService for HttpMonitoringService {
    async fn current_session(&self, employee: &EmployeeId) -> Result<Option<MonitoringSession>> {
        match self
            .api
            .get(&["monitoring", "work-session", employee.as_str()])
            .await?
        {
            Some(value) => match unwrap_data(value) {
                Value::Null => Ok(None),
                session => decode(session).map(Some),
            },
            None => Ok(None),
        }
    }

    async fn start_session(&self, request: &StartSessionRequest) -> Result<MonitoringSession> {
        let value = self
            .api
            .post(&["monitoring", "work-session", "start"], request)
            .await?;
        decode(unwrap_data(value))
    }

    async fn pause_session(&self, employee: &EmployeeId) -> Result<Acknowledgement> {
        self.post_for_employee("pause", employee).await
    }

    async fn resume_session(&self, employee: &EmployeeId) -> Result<Acknowledgement> {
        self.post_for_employee("resume", employee).await
    }

    async fn end_session(&self, employee: &EmployeeId) -> Result<Acknowledgement> {
        self.post_for_employee("end", employee).await
    }
}

/// Attendance service over HTTP.
#[derive(Clone)]
pub struct HttpAttendanceService {
    api: ApiClient,
}

impl HttpAttendanceService {
    /// Create an attendance client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AttendanceService for HttpAttendanceService {
    async fn verify_day(&self, employee: &EmployeeId) -> Result<Option<AttendanceDay>> {
        match self
            .api
            .get(&["attendance", "verify", employee.as_str()])
            .await?
        {
            Some(value) => Ok(decode::<VerifyEnvelope>(value)?.into_day()),
            None => Ok(None),
        }
    }

    async fn end_day(&self, employee: &EmployeeId) -> Result<Acknowledgement> {
        let value = self
            .api
            .post(&["attendance", "end-day", employee.as_str()], &json!({}))
            .await?;
        acknowledge(value)
    }
}
