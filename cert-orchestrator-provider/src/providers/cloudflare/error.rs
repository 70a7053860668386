//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareDnsAdapter;

/// Cloudflare error code mapping
/// Reference: <https://api.cloudflare.com/#getting-started-responses>
impl ProviderErrorMapper for CloudflareDnsAdapter {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // Authentication error
            // 6003: Invalid request headers
            // 6111: Invalid format for Authorization header
            // 9109: Unauthorized to access requested resource
            // 10000: Authentication error
            Some("6003" | "6111" | "9109" | "10000") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Invalid parameter
            // 1004: DNS Validation Error
            // 9000: Invalid or missing name
            // 9007: Content for CNAME record is invalid
            // 9021: Invalid TTL
            Some(code @ ("1004" | "9000" | "9007" | "9021")) => {
                let param = match code {
                    "9000" => "name",
                    "9007" => "value",
                    "9021" => "ttl",
                    _ => "general",
                };
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: param.to_string(),
                    detail: raw.message,
                }
            }

            // record already exists
            // 81053: An A, AAAA or CNAME record already exists with that host
            // 81054: A CNAME record with that host already exists
            // 81057: The record already exists
            // 81058: A record with those settings already exists
            Some("81053" | "81054" | "81057" | "81058") => ProviderError::RecordExists {
                provider: self.provider_name().to_string(),
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 81045: The record quota has been exceeded
            Some("81045") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Zone does not exist
            // 7000: No route for that URI
            // 7003: Could not route to /path, perhaps your object identifier is invalid?
            Some("7000" | "7003") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 9103 / 10001: token lacks the required permission
            Some("9103" | "10001") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> CloudflareDnsAdapter {
        CloudflareDnsAdapter::new(String::new()).unwrap()
    }

    fn ctx_with_record() -> ErrorContext {
        ErrorContext {
            record_name: Some("_abc.example.com".to_string()),
            arn: None,
            domain: Some("example.com".to_string()),
        }
    }

    #[test]
    fn auth_errors() {
        let a = adapter();
        for code in ["6003", "6111", "9109", "10000"] {
            let err = a.map_error(RawApiError::with_code(code, "auth"), ErrorContext::default());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code}"
            );
        }
    }

    #[test]
    fn invalid_param_names_field() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("9007", "bad CNAME content"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "value"
        ));
    }

    #[test]
    fn record_exists_uses_context_name() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("81053", "already exists"),
            ctx_with_record(),
        );
        assert!(matches!(
            err,
            ProviderError::RecordExists { record_name, .. } if record_name == "_abc.example.com"
        ));
    }

    #[test]
    fn record_exists_default_context() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("81057", "already exists"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::RecordExists { record_name, .. } if record_name == "<unknown>"
        ));
    }

    #[test]
    fn zone_not_found() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("7003", "no route"), ctx_with_record());
        assert!(matches!(
            err,
            ProviderError::DomainNotFound { domain, .. } if domain == "example.com"
        ));
    }

    #[test]
    fn fallback_unknown_code() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("99999", "something unexpected"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code, raw_message, .. }
                if raw_code.as_deref() == Some("99999") && raw_message == "something unexpected"
        ));
    }

    #[test]
    fn fallback_no_code() {
        let a = adapter();
        let err = a.map_error(RawApiError::new("no code at all"), ErrorContext::default());
        assert!(matches!(err, ProviderError::Unknown { raw_code: None, .. }));
    }
}
