//! Authoritative task source
//!
//! Read-only lookup of task records by numeric id. The HTTP
//! implementation talks to the tracker's work-package endpoint with an
//! opaque session cookie; tests substitute an in-memory [`TaskSource`].
//!
//! Every payload field the validator consumes is modeled in the typed
//! payload structs, so a missing or malformed key surfaces as a
//! [`LookupError::Payload`] the caller must handle, never a panic.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup failure taxonomy. Fatal for the record being checked, never
/// for the batch.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Payload(String),
}

/// The authoritative record for one task, as the tracker reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthoritativeTaskRecord {
    pub id: u64,
    pub subject: String,
    pub status: String,
    pub project: String,
    pub responsible: String,
    pub category: String,
    /// ISO-8601-style duration, empty when the tracker carries null.
    pub estimated_time_iso: String,
    /// `YYYY-MM-DD`, empty when absent.
    pub start_date: String,
    /// `YYYY-MM-DD`, empty when absent.
    pub due_date: String,
    /// Numeric-as-string custom field; 0.0 when absent or malformed.
    pub completed_hours: f64,
    pub description_html: String,
}

/// Capability to fetch authoritative task records by id.
pub trait TaskSource {
    fn fetch(&self, id: u64) -> Result<AuthoritativeTaskRecord, LookupError>;
}

/// Wire shape of the tracker's work-package payload.
#[derive(Debug, Deserialize)]
struct WorkPackagePayload {
    id: u64,
    subject: String,
    #[serde(rename = "estimatedTime")]
    estimated_time: Option<String>,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "dueDate")]
    due_date: Option<String>,
    #[serde(rename = "customField1")]
    completed_hours: Option<String>,
    description: Option<DescriptionPayload>,
    #[serde(rename = "_embedded")]
    embedded: EmbeddedPayload,
}

#[derive(Debug, Deserialize)]
struct DescriptionPayload {
    #[serde(default)]
    html: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddedPayload {
    status: NamedPayload,
    project: NamedPayload,
    responsible: NamedPayload,
    #[serde(rename = "type")]
    category: Option<NamedPayload>,
}

#[derive(Debug, Deserialize)]
struct NamedPayload {
    name: String,
}

impl From<WorkPackagePayload> for AuthoritativeTaskRecord {
    fn from(payload: WorkPackagePayload) -> Self {
        let completed_hours = payload
            .completed_hours
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0.0);

        AuthoritativeTaskRecord {
            id: payload.id,
            subject: payload.subject,
            status: payload.embedded.status.name,
            project: payload.embedded.project.name,
            responsible: payload.embedded.responsible.name,
            category: payload
                .embedded
                .category
                .map(|named| named.name)
                .unwrap_or_default(),
            estimated_time_iso: payload.estimated_time.unwrap_or_default(),
            start_date: payload.start_date.unwrap_or_default(),
            due_date: payload.due_date.unwrap_or_default(),
            completed_hours,
            description_html: payload
                .description
                .map(|description| description.html)
                .unwrap_or_default(),
        }
    }
}

/// Parse a raw JSON payload into an authoritative record.
pub fn parse_payload(body: &str) -> Result<AuthoritativeTaskRecord, LookupError> {
    let payload: WorkPackagePayload =
        serde_json::from_str(body).map_err(|err| LookupError::Payload(err.to_string()))?;
    Ok(payload.into())
}

/// Blocking HTTP task source: GET `{base_url}/{id}` with a session cookie.
pub struct HttpTaskSource {
    client: reqwest::blocking::Client,
    base_url: String,
    cookie: String,
}

impl HttpTaskSource {
    pub fn new(base_url: &str, cookie: &str, timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: cookie.to_string(),
        })
    }
}

impl TaskSource for HttpTaskSource {
    fn fetch(&self, id: u64) -> Result<AuthoritativeTaskRecord, LookupError> {
        let url = format!("{}/{id}", self.base_url);
        tracing::debug!(%url, "fetching task record");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::COOKIE, &self.cookie)
            .send()
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        parse_payload(&body)
    }
}

/// In-memory task source for tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticTaskSource {
    records: HashMap<u64, AuthoritativeTaskRecord>,
}

impl StaticTaskSource {
    pub fn new(records: impl IntoIterator<Item = AuthoritativeTaskRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id, record))
                .collect(),
        }
    }
}

impl TaskSource for StaticTaskSource {
    fn fetch(&self, id: u64) -> Result<AuthoritativeTaskRecord, LookupError> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(LookupError::Status(404))
    }
}
