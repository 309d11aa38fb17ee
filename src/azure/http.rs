//! HTTP utilities for ARM REST API calls

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Error body returned by ARM: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Error from an ARM request
#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    #[error("ARM request failed: {status} {code}{}", detail(.message))]
    Status {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to get access token: {0:#}")]
    Auth(anyhow::Error),

    #[error("pagination loop detected at {0}")]
    PaginationLoop(String),

    #[error("invalid ARM url: {0}")]
    InvalidUrl(String),
}

/// `: message` suffix for status errors, empty when ARM sent none
fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

impl ArmError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ArmError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// HTTP client wrapper for ARM API calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, ArmError> {
        let client = Client::builder()
            .user_agent(concat!("azure-discovery/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to an ARM API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, ArmError> {
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!("GET {} (request id {})", url, request_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("x-ms-client-request-id", request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            let (code, message) = match serde_json::from_str::<ArmErrorBody>(&body) {
                Ok(parsed) => (parsed.error.code, sanitize_for_log(&parsed.error.message)),
                Err(_) => (String::new(), String::new()),
            };
            return Err(ArmError::Status {
                status,
                code,
                message,
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// POST a form and parse the JSON response (used for token requests)
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Value, ArmError> {
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Token endpoint error: {} - {}", status, sanitize_for_log(&body));
            let code = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_default();
            return Err(ArmError::Status {
                status,
                code,
                message: String::new(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Format an ARM error for display
/// Keeps messages short and avoids echoing raw API payloads
pub fn format_arm_error(error: &ArmError) -> String {
    match error {
        ArmError::Status { status, code, .. } => match status.as_u16() {
            401 => "Authentication failed. Run 'az login' or set AZURE_CLIENT_SECRET.".to_string(),
            403 => "Permission denied. Check your Azure RBAC role assignments.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. The resource may be in a transitional state.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 if !code.is_empty() => format!("Invalid request ({}).", code),
            400 => "Invalid request. Check your parameters.".to_string(),
            500..=599 => "Azure service temporarily unavailable. Please try again.".to_string(),
            _ => format!("Request failed with status {}.", status),
        },
        ArmError::Transport(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        ArmError::Decode(_) => "Azure returned a response that could not be parsed.".to_string(),
        ArmError::Auth(_) => {
            "Could not get an Azure access token. Run 'az login' or set AZURE_CLIENT_SECRET."
                .to_string()
        }
        ArmError::PaginationLoop(_) => "Azure returned a repeating page link.".to_string(),
        ArmError::InvalidUrl(_) => "Invalid management endpoint or resource path.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_status_error_shows_message() {
        let err = ArmError::Status {
            status: StatusCode::FORBIDDEN,
            code: "AuthorizationFailed".to_string(),
            message: sanitize_for_log("The client does not have authorization\nto read disks"),
        };
        assert_eq!(
            err.to_string(),
            "ARM request failed: 403 Forbidden AuthorizationFailed: The client does not have authorizationto read disks"
        );

        let err = ArmError::Status {
            status: StatusCode::BAD_GATEWAY,
            code: String::new(),
            message: String::new(),
        };
        assert_eq!(err.to_string(), "ARM request failed: 502 Bad Gateway ");
    }

    #[test]
    fn test_format_status_errors() {
        let err = ArmError::Status {
            status: StatusCode::FORBIDDEN,
            code: "AuthorizationFailed".to_string(),
            message: String::new(),
        };
        assert!(format_arm_error(&err).contains("Permission denied"));
        assert!(!err.is_not_found());

        let err = ArmError::Status {
            status: StatusCode::NOT_FOUND,
            code: "ResourceNotFound".to_string(),
            message: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(format_arm_error(&err), "Resource not found.");

        let err = ArmError::Status {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidApiVersionParameter".to_string(),
            message: String::new(),
        };
        assert_eq!(
            format_arm_error(&err),
            "Invalid request (InvalidApiVersionParameter)."
        );
    }
}
