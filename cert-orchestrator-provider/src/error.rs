use serde::{Deserialize, Serialize};

/// Unified error type for all certificate manager and DNS adapter operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
///
/// The built-in HTTP client automatically retries these with exponential backoff.
/// [`ValidationTimeout`](Self::ValidationTimeout) is *not* retryable: it reports that the
/// provider never observed the validation records within the configured wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    ///
    /// This is a transient error and is automatically retried.
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provided credentials are invalid or expired.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A DNS record with the same name/type already exists with different content.
    RecordExists {
        /// Provider that produced the error.
        provider: String,
        /// Name of the conflicting record.
        record_name: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (e.g., malformed domain name, bad record type).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// No hosted zone managed by the DNS provider covers the requested name.
    DomainNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Domain name that was not found.
        domain: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The certificate identified by `arn` does not exist.
    CertificateNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Certificate identifier.
        arn: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The certificate reached a terminal state other than issued.
    ValidationFailed {
        /// Provider that produced the error.
        provider: String,
        /// Certificate identifier.
        arn: String,
        /// Provider-reported status or failure reason.
        reason: String,
    },

    /// The certificate was still pending validation when the wait deadline passed.
    ValidationTimeout {
        /// Provider that produced the error.
        provider: String,
        /// Certificate identifier.
        arn: String,
        /// How long the waiter polled, in seconds.
        waited_secs: u64,
    },

    /// The account's resource quota has been exceeded.
    ///
    /// Unlike [`RateLimited`](Self::RateLimited), this is not a transient condition.
    QuotaExceeded {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded (HTTP 429 or equivalent).
    ///
    /// This is a transient error. Unlike [`QuotaExceeded`](Self::QuotaExceeded),
    /// the request should succeed after waiting.
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    ///
    /// This is a transient error and is automatically retried.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The authenticated principal lacks permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether the error is expected behavior (user input, missing resources, ...).
    ///
    /// Returning `true` means the error should be logged at `warn`, `false` at `error`.
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::InvalidParameter { .. }
                | Self::DomainNotFound { .. }
                | Self::CertificateNotFound { .. }
                | Self::ValidationFailed { .. }
                | Self::QuotaExceeded { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Name of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::CertificateNotFound { provider, .. }
            | Self::ValidationFailed { provider, .. }
            | Self::ValidationTimeout { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::RecordExists {
                provider,
                record_name,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_name}' already exists")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::DomainNotFound {
                provider,
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Domain '{domain}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Domain '{domain}' not found")
                }
            }
            Self::CertificateNotFound { provider, arn, .. } => {
                write!(f, "[{provider}] Certificate '{arn}' not found")
            }
            Self::ValidationFailed {
                provider,
                arn,
                reason,
            } => {
                write!(f, "[{provider}] Certificate '{arn}' failed validation: {reason}")
            }
            Self::ValidationTimeout {
                provider,
                arn,
                waited_secs,
            } => {
                write!(
                    f,
                    "[{provider}] Certificate '{arn}' still pending validation after {waited_secs}s"
                )
            }
            Self::QuotaExceeded { provider, .. } => {
                write!(f, "[{provider}] Quota exceeded")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "test".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[test] Network error: connection refused");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "acm".to_string(),
            raw_message: Some("bad key".to_string()),
        };
        assert_eq!(e.to_string(), "[acm] Invalid credentials: bad key");
    }

    #[test]
    fn display_record_exists() {
        let e = ProviderError::RecordExists {
            provider: "cloudflare".to_string(),
            record_name: "_abc.example.com".to_string(),
            raw_message: None,
        };
        assert_eq!(
            e.to_string(),
            "[cloudflare] Record '_abc.example.com' already exists"
        );
    }

    #[test]
    fn display_validation_failed() {
        let e = ProviderError::ValidationFailed {
            provider: "acm".to_string(),
            arn: "arn:aws:acm:us-east-1:1:certificate/x".to_string(),
            reason: "CAA_ERROR".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "[acm] Certificate 'arn:aws:acm:us-east-1:1:certificate/x' failed validation: CAA_ERROR"
        );
    }

    #[test]
    fn display_validation_timeout() {
        let e = ProviderError::ValidationTimeout {
            provider: "acm".to_string(),
            arn: "arn".to_string(),
            waited_secs: 90,
        };
        assert_eq!(
            e.to_string(),
            "[acm] Certificate 'arn' still pending validation after 90s"
        );
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            provider: "cloudflare".to_string(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[cloudflare] Rate limited (retry after 30s)");
    }

    #[test]
    fn display_domain_not_found_without_message() {
        let e = ProviderError::DomainNotFound {
            provider: "test".to_string(),
            domain: "example.com".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[test] Domain 'example.com' not found");
    }

    #[test]
    fn display_unknown() {
        let e = ProviderError::Unknown {
            provider: "test".to_string(),
            raw_code: Some("E001".to_string()),
            raw_message: "something broke".to_string(),
        };
        assert_eq!(e.to_string(), "[test] something broke");
    }

    #[test]
    fn serialize_carries_code_tag() {
        let e = ProviderError::ValidationTimeout {
            provider: "acm".to_string(),
            arn: "arn".to_string(),
            waited_secs: 60,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"ValidationTimeout\""));
        assert!(json.contains("\"waited_secs\":60"));
    }

    #[test]
    fn expected_errors_are_warn_level() {
        assert!(
            ProviderError::InvalidParameter {
                provider: "acm".into(),
                param: "DomainName".into(),
                detail: "bad".into(),
            }
            .is_expected()
        );
        assert!(
            !ProviderError::ValidationTimeout {
                provider: "acm".into(),
                arn: "x".into(),
                waited_secs: 1,
            }
            .is_expected()
        );
        assert!(
            !ProviderError::NetworkError {
                provider: "acm".into(),
                detail: "x".into(),
            }
            .is_expected()
        );
    }

    #[test]
    fn provider_accessor() {
        let e = ProviderError::CertificateNotFound {
            provider: "memory".into(),
            arn: "x".into(),
            raw_message: None,
        };
        assert_eq!(e.provider(), "memory");
    }
}
