//! HTTP client for the generation backend.
//!
//! One thin `request` wrapper handles the transport rules — JSON content
//! type on the way out, JSON-or-text sniffing on the way back, error
//! messages lifted from the response body — and typed wrappers validate
//! each endpoint's shape at the boundary.  No retries and no timeouts here;
//! that policy belongs to callers (the poll loop).

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{MediaKind, ModelCatalog};
use crate::job::{GenerationRequest, JobResult, SubmitResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-2xx status; the message is the
    /// response body (raw text, or the serialized JSON).
    #[error("{message}")]
    Status { status: u16, message: String },
    /// A 2xx response did not match the endpoint's documented shape.
    #[error("unexpected response shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Credit balance for one user, from `/api/me`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub tg_id: i64,
    #[serde(default)]
    pub free_credits: f64,
    #[serde(default)]
    pub pro_credits: f64,
}

/// `/api/chat` response.  `text` may be absent; the UI shows a placeholder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Issue a request and return the parsed body.
    ///
    /// The response `Content-Type` decides parsing: JSON is decoded, anything
    /// else comes back as a string value.  A non-2xx status turns into
    /// [`ApiError::Status`] carrying the body as its message.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let parsed = if is_json {
            resp.json::<Value>().await?
        } else {
            Value::String(resp.text().await?)
        };

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&parsed),
            });
        }
        Ok(parsed)
    }

    // ── Typed endpoints ───────────────────────────────────────────────────────

    pub async fn models(&self) -> Result<ModelCatalog, ApiError> {
        let v = self.request(Method::GET, "/api/models", None).await?;
        Ok(serde_json::from_value(v)?)
    }

    pub async fn me(&self, tg_id: i64) -> Result<UserInfo, ApiError> {
        let v = self
            .request(Method::GET, &format!("/api/me?tg_id={tg_id}"), None)
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    pub async fn chat(&self, model: &str, message: &str) -> Result<ChatReply, ApiError> {
        let body = serde_json::json!({ "model": model, "message": message });
        let v = self
            .request(Method::POST, "/api/chat", Some(&body))
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    pub async fn submit(
        &self,
        kind: MediaKind,
        request: &GenerationRequest,
    ) -> Result<SubmitResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        let v = self
            .request(Method::POST, &kind.submit_path(), Some(&body))
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    pub async fn result(&self, kind: MediaKind, job_id: &str) -> Result<JobResult, ApiError> {
        let v = self
            .request(Method::GET, &kind.result_path(job_id), None)
            .await?;
        Ok(serde_json::from_value(v)?)
    }
}

/// Error text from a failed response body: raw text stays as-is, JSON is
/// serialized so structured backend errors remain readable.
fn error_message(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_keeps_raw_text() {
        assert_eq!(
            error_message(&Value::String("upstream down".into())),
            "upstream down"
        );
    }

    #[test]
    fn test_error_message_serializes_json_bodies() {
        let body = serde_json::json!({ "detail": "user not found" });
        assert_eq!(error_message(&body), r#"{"detail":"user not found"}"#);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080///");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
