//! ACM error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::AcmCertificateManager;

/// ACM / AWS common error code mapping
/// Reference: <https://docs.aws.amazon.com/acm/latest/APIReference/CommonErrors.html>
impl ProviderErrorMapper for AcmCertificateManager {
    fn provider_name(&self) -> &'static str {
        "acm"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            Some(
                "UnrecognizedClientException"
                | "InvalidClientTokenId"
                | "InvalidSignatureException"
                | "IncompleteSignature"
                | "MissingAuthenticationToken"
                | "ExpiredTokenException",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("AccessDeniedException") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some(
                code @ ("ValidationException"
                | "InvalidParameterException"
                | "InvalidDomainValidationOptionsException"
                | "InvalidArnException"
                | "TooManyTagsException"),
            ) => {
                let param = match code {
                    "InvalidDomainValidationOptionsException" => "DomainValidationOptions",
                    "InvalidArnException" => "CertificateArn",
                    "TooManyTagsException" => "Tags",
                    _ => context.domain.as_deref().map_or("general", |_| "DomainName"),
                };
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: param.to_string(),
                    detail: raw.message,
                }
            }

            Some("ResourceNotFoundException") => ProviderError::CertificateNotFound {
                provider: self.provider_name().to_string(),
                arn: context.arn.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            Some("LimitExceededException") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("ThrottlingException" | "RequestLimitExceeded") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            Some("ServiceUnavailable" | "InternalFailure") => ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AwsConfig;

    fn manager() -> AcmCertificateManager {
        AcmCertificateManager::new(AwsConfig {
            region: "us-east-1".into(),
            access_key_id: "AKID".into(),
            secret_access_key: "secret".into(),
            session_token: None,
        })
        .unwrap()
    }

    #[test]
    fn credential_errors() {
        let m = manager();
        for code in ["UnrecognizedClientException", "InvalidSignatureException"] {
            let err = m.map_error(RawApiError::with_code(code, "nope"), ErrorContext::default());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code}"
            );
        }
    }

    #[test]
    fn validation_exception_with_domain_context() {
        let m = manager();
        let err = m.map_error(
            RawApiError::with_code("ValidationException", "1 validation error detected"),
            ErrorContext {
                domain: Some("bad_domain".into()),
                ..ErrorContext::default()
            },
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "DomainName"
        ));
    }

    #[test]
    fn not_found_carries_arn() {
        let m = manager();
        let err = m.map_error(
            RawApiError::with_code("ResourceNotFoundException", "missing"),
            ErrorContext {
                arn: Some("arn:x".into()),
                ..ErrorContext::default()
            },
        );
        assert!(matches!(
            err,
            ProviderError::CertificateNotFound { arn, .. } if arn == "arn:x"
        ));
    }

    #[test]
    fn throttling_is_retryable_rate_limit() {
        let m = manager();
        let err = m.map_error(
            RawApiError::with_code("ThrottlingException", "Rate exceeded"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(crate::http_client::is_retryable(&err));
    }

    #[test]
    fn limit_exceeded_is_quota() {
        let m = manager();
        let err = m.map_error(
            RawApiError::with_code("LimitExceededException", "too many certificates"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::QuotaExceeded { .. }));
    }

    #[test]
    fn unknown_code_falls_back() {
        let m = manager();
        let err = m.map_error(
            RawApiError::with_code("SomethingNew", "?"),
            ErrorContext::default(),
        );
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code, .. } if raw_code.as_deref() == Some("SomethingNew")
        ));
    }
}
