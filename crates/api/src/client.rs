//! Trellis REST client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers the grid's collection verbs: list → patch → create → delete.

use std::collections::HashMap;
use std::time::Duration;

use trellis_core::{Record, RecordId, Value};
use trellis_engine::{RecordSource, SourceError};

/// Trellis API client (blocking).
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
}

/// Error type for API operations.
#[derive(Debug)]
pub enum ApiError {
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// Server returned a validation error (4xx with message)
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// A server-side collection the grid can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Campaigns,
    Contracts,
    Users,
}

impl EntityKind {
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Campaigns => "campaigns",
            EntityKind::Contracts => "contracts",
            EntityKind::Users => "users",
        }
    }
}

impl RestClient {
    /// Create a new client. `token` is attached as a bearer header when set.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("trellis/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.into(),
            token,
        }
    }

    /// Fetch every record in a collection.
    ///
    /// Accepts both a bare JSON array and a `{"data": [...]}` envelope.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<Record>, ApiError> {
        let url = format!("{}/api/{}", self.api_base, kind.path());
        let resp = self.get(&url)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;

        let items = json
            .as_array()
            .or_else(|| json["data"].as_array())
            .ok_or_else(|| ApiError::Parse("Expected an array of records".into()))?;

        items.iter().map(record_from_json).collect()
    }

    /// Partially update one record. Returns the server's copy.
    pub fn patch(
        &self,
        kind: EntityKind,
        id: RecordId,
        fields: &HashMap<String, Value>,
    ) -> Result<Record, ApiError> {
        let url = format!("{}/api/{}/{}", self.api_base, kind.path(), id);
        let resp = self.patch_json(&url, fields)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        record_from_json(&json)
    }

    /// Create a record. Returns the server's copy, id included.
    pub fn create(
        &self,
        kind: EntityKind,
        fields: &HashMap<String, Value>,
    ) -> Result<Record, ApiError> {
        let url = format!("{}/api/{}", self.api_base, kind.path());
        let resp = self.post_json(&url, fields)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        record_from_json(&json)
    }

    /// Delete a record.
    pub fn remove(&self, kind: EntityKind, id: RecordId) -> Result<(), ApiError> {
        let url = format!("{}/api/{}/{}", self.api_base, kind.path(), id);
        self.delete(&url)?;
        Ok(())
    }

    /// A `RecordSource` bound to one collection, for handing to the engine.
    pub fn entity(&self, kind: EntityKind) -> EntityClient {
        EntityClient {
            client: self.clone(),
            kind,
        }
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }

    fn patch_json<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.patch(url).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }

    fn delete(&self, url: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.delete(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(ApiError::Validation(body));
        }
        return Err(ApiError::Http(status, body));
    }
    Ok(response)
}

/// Build a `Record` from one JSON object.
///
/// `id` may arrive as a number or a numeric string. Scalar fields map onto
/// `Value`; nested arrays and objects are not cell data and are skipped.
pub fn record_from_json(json: &serde_json::Value) -> Result<Record, ApiError> {
    let obj = json
        .as_object()
        .ok_or_else(|| ApiError::Parse("Expected a record object".into()))?;

    let id = json["id"]
        .as_i64()
        .or_else(|| json["id"].as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ApiError::Parse("Missing id in record".into()))?;

    let mut record = Record::new(RecordId(id));
    for (key, value) in obj {
        if key == "id" {
            continue;
        }
        match value {
            serde_json::Value::Null => {
                record.set(key, Value::Null);
            }
            serde_json::Value::Bool(b) => {
                record.set(key, Value::Bool(*b));
            }
            serde_json::Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    record.set(key, Value::Number(f));
                }
            }
            serde_json::Value::String(s) => {
                record.set(key, Value::Text(s.clone()));
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                log::debug!("skipping non-scalar field {:?} on record {}", key, id);
            }
        }
    }
    Ok(record)
}

/// One collection's view of the API, usable as a grid `RecordSource`.
#[derive(Clone)]
pub struct EntityClient {
    client: RestClient,
    kind: EntityKind,
}

impl EntityClient {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl RecordSource for EntityClient {
    fn list(&self) -> Result<Vec<Record>, SourceError> {
        self.client
            .list(self.kind)
            .map_err(|e| SourceError::new(e.to_string()))
    }

    fn patch(
        &self,
        id: RecordId,
        fields: &HashMap<String, Value>,
    ) -> Result<Record, SourceError> {
        self.client
            .patch(self.kind, id, fields)
            .map_err(|e| SourceError::new(e.to_string()))
    }

    fn create(&self, fields: &HashMap<String, Value>) -> Result<Record, SourceError> {
        self.client
            .create(self.kind, fields)
            .map_err(|e| SourceError::new(e.to_string()))
    }

    fn remove(&self, id: RecordId) -> Result<(), SourceError> {
        self.client
            .remove(self.kind, id)
            .map_err(|e| SourceError::new(e.to_string()))
    }
}
