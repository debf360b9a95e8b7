//! Gateway errors and their classification.

use serde::Deserialize;
use thiserror::Error;

/// Why a remote call did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("remote collection is not available")]
    SchemaUnavailable,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("remote call failed: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Whether the failure is transient or environmental, so local storage
    /// can stand in for the backend.
    ///
    /// A policy rejection is not: the backend answered and refused.
    #[must_use]
    pub const fn falls_back_locally(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::SchemaUnavailable | Self::Unknown(_)
        )
    }

    /// Whether a row-level policy rejected the call.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

/// Classify a failed response from its status code and body.
#[must_use]
pub fn classify_failure(status: u16, body: &str) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code.as_deref().unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .unwrap_or_else(|| body.trim().to_string());
    let lowered = message.to_lowercase();

    if status == 401 || code == "PGRST301" {
        return GatewayError::NotAuthenticated;
    }

    if status == 403
        || code == "42501"
        || lowered.contains("row-level security")
        || lowered.contains("permission denied")
    {
        return GatewayError::PermissionDenied(message);
    }

    if status == 404 || matches!(code, "42P01" | "PGRST205" | "PGRST106") {
        return GatewayError::SchemaUnavailable;
    }

    GatewayError::Unknown(format!("status {status}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorised_is_not_authenticated() {
        assert_eq!(classify_failure(401, ""), GatewayError::NotAuthenticated);
        assert_eq!(
            classify_failure(400, r#"{"code":"PGRST301","message":"JWT expired"}"#),
            GatewayError::NotAuthenticated
        );
    }

    #[test]
    fn policy_rejection_is_permission_denied() {
        let body = r#"{"code":"42501","message":"new row violates row-level security policy for table \"addresses\""}"#;

        let error = classify_failure(400, body);

        assert!(
            matches!(&error, GatewayError::PermissionDenied(message) if message.contains("row-level security")),
            "expected PermissionDenied, got {error:?}"
        );
        assert!(
            !error.falls_back_locally(),
            "policy rejections are not transient, got {error:?}"
        );
        assert!(
            GatewayError::SchemaUnavailable.falls_back_locally(),
            "a missing table falls back"
        );
    }

    #[test]
    fn permission_denied_is_detected_from_message_alone() {
        let error = classify_failure(500, "permission denied for table bookings");

        assert!(error.is_permission_denied(), "got {error:?}");
    }

    #[test]
    fn missing_table_is_schema_unavailable() {
        assert_eq!(
            classify_failure(400, r#"{"code":"42P01","message":"relation does not exist"}"#),
            GatewayError::SchemaUnavailable
        );
        assert_eq!(
            classify_failure(404, r#"{"code":"PGRST205"}"#),
            GatewayError::SchemaUnavailable
        );
    }

    #[test]
    fn anything_else_is_unknown_with_status() {
        let error = classify_failure(503, "upstream unavailable");

        assert_eq!(
            error,
            GatewayError::Unknown("status 503: upstream unavailable".to_string())
        );
        assert!(error.falls_back_locally(), "unknown failures fall back");
    }
}
