use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============ Certificate Types ============

/// How the certificate authority verifies domain ownership.
///
/// Only DNS validation is driven by this crate; `Email` exists so that
/// certificates described by the provider can still be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMethod {
    /// Prove ownership by publishing a provider-issued DNS record.
    Dns,
    /// Prove ownership by answering an email sent to the domain contacts.
    Email,
}

impl ValidationMethod {
    /// Wire representation (`"DNS"` / `"EMAIL"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dns => "DNS",
            Self::Email => "EMAIL",
        }
    }
}

/// Request for a new certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    /// Fully qualified primary domain name (e.g., `"example.com"`).
    pub domain_name: String,
    /// Additional names covered by the certificate. Empty when none were given.
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    /// Validation method; the component always requests [`ValidationMethod::Dns`].
    pub validation_method: ValidationMethod,
}

impl CertificateRequest {
    /// DNS-validated request for `domain_name` plus `subject_alternative_names`.
    pub fn dns(domain_name: impl Into<String>, subject_alternative_names: Vec<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            subject_alternative_names,
            validation_method: ValidationMethod::Dns,
        }
    }

    /// Every name the certificate covers: primary first, then alternatives.
    ///
    /// A name already listed is not repeated; domain names compare without
    /// regard to ASCII case.
    pub fn covered_names(&self) -> Vec<&str> {
        let mut names = vec![self.domain_name.as_str()];
        for name in &self.subject_alternative_names {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name);
            }
        }
        names
    }
}

/// A DNS challenge the requester must publish for one covered domain name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainValidationOption {
    /// Domain name this option proves ownership of.
    pub domain_name: String,
    /// Record type to publish (ACM always uses `"CNAME"`).
    pub resource_record_type: String,
    /// Fully qualified record name.
    pub resource_record_name: String,
    /// Record value.
    pub resource_record_value: String,
}

impl DomainValidationOption {
    /// The adapter request publishing this option.
    pub fn to_record_request(&self) -> RecordRequest {
        RecordRequest {
            record_type: self.resource_record_type.clone(),
            name: self.resource_record_name.clone(),
            value: self.resource_record_value.clone(),
        }
    }
}

/// Result of requesting a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCertificate {
    /// Certificate identifier (an ARN for ACM).
    pub arn: String,
    /// One option per covered domain name.
    pub domain_validation_options: Vec<DomainValidationOption>,
}

/// Lifecycle status of a certificate, owned by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    /// Waiting for the validation records to be observed.
    PendingValidation,
    /// Validated and issued.
    Issued,
    /// Not in use.
    Inactive,
    /// Past its validity period.
    Expired,
    /// Validation was not completed within the provider's own deadline.
    ValidationTimedOut,
    /// Revoked by the issuer.
    Revoked,
    /// Issuance failed.
    Failed,
}

impl CertificateStatus {
    /// Parse the provider's status string. Unknown strings map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_VALIDATION" => Some(Self::PendingValidation),
            "ISSUED" => Some(Self::Issued),
            "INACTIVE" => Some(Self::Inactive),
            "EXPIRED" => Some(Self::Expired),
            "VALIDATION_TIMED_OUT" => Some(Self::ValidationTimedOut),
            "REVOKED" => Some(Self::Revoked),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// A status the certificate can never leave towards `Issued`.
    pub fn is_terminal_failure(self) -> bool {
        !matches!(self, Self::PendingValidation | Self::Issued)
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PendingValidation => "PENDING_VALIDATION",
            Self::Issued => "ISSUED",
            Self::Inactive => "INACTIVE",
            Self::Expired => "EXPIRED",
            Self::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            Self::Revoked => "REVOKED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Current view of a certificate as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetail {
    /// Certificate identifier.
    pub arn: String,
    /// Primary domain name.
    pub domain_name: String,
    /// Current status.
    pub status: CertificateStatus,
    /// Validation options known so far (may be incomplete right after the request).
    pub domain_validation_options: Vec<DomainValidationOption>,
    /// Provider failure reason, when the status is a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Polling behaviour of [`CertificateManager::wait_until_validated`](crate::CertificateManager::wait_until_validated).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between two status checks.
    pub poll_interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for WaitConfig {
    /// Poll every 10s, give up after 75 minutes.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(75 * 60),
        }
    }
}

// ============ DNS Record Types ============

/// Arguments of the DNS adapter's record-creation capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    /// Record type (e.g., `"CNAME"`).
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name, with or without a trailing dot.
    pub name: String,
    /// Record value.
    pub value: String,
}

/// A record created by a DNS adapter.
///
/// The adapter owns the record; callers keep the handle to sequence work after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordHandle {
    /// Provider-specific record identifier.
    pub id: String,
    /// Zone the record lives in.
    pub zone_id: String,
    /// Fully qualified record name (no trailing dot).
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value.
    pub value: String,
}

// ============ Provider Configuration ============

/// Which DNS adapter to build, and with which credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum DnsAdapterConfig {
    /// Cloudflare DNS. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    Cloudflare {
        /// API token with `Zone.DNS:Edit` permission.
        api_token: String,
        /// Skip zone discovery and always use this zone.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zone_id: Option<String>,
        /// TTL of created records, seconds (1 = automatic).
        #[serde(default = "default_record_ttl")]
        ttl: u32,
    },
    /// In-process adapter; records only live as long as the process.
    Memory,
}

/// TTL of validation records when none is configured, seconds.
pub const DEFAULT_RECORD_TTL: u32 = 60;

#[cfg(feature = "cloudflare")]
fn default_record_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}

/// AWS credentials and region for the ACM certificate manager.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region the certificate is created in (e.g., `"us-east-1"`).
    pub region: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}
