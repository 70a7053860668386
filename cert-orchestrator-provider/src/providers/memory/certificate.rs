use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, sha256_hex};
use crate::traits::CertificateManager;
use crate::types::{
    CertificateDetail, CertificateRequest, CertificateStatus, DomainValidationOption,
    IssuedCertificate, WaitConfig,
};

use super::{CallLog, ProviderCall, RecordStore};

const ARN_PREFIX: &str = "arn:aws:acm:us-east-1:000000000000:certificate/";
const VALIDATION_SUFFIX: &str = "acm-validations.aws.";

#[derive(Debug, Clone)]
struct StoredCertificate {
    domain_name: String,
    options: Vec<DomainValidationOption>,
}

/// Certificate manager that issues certificates in memory.
///
/// Without a [`RecordStore`] every requested certificate is reported as
/// issued. With [`observing`](Self::observing) it stays pending until every
/// validation record exists in the store.
#[derive(Debug)]
pub struct InMemoryCertificateManager {
    certificates: RwLock<HashMap<String, StoredCertificate>>,
    observed: Option<RecordStore>,
    log: CallLog,
    wait: WaitConfig,
}

impl Default for InMemoryCertificateManager {
    fn default() -> Self {
        Self {
            certificates: RwLock::new(HashMap::new()),
            observed: None,
            log: CallLog::new(),
            wait: WaitConfig {
                poll_interval: Duration::from_millis(5),
                timeout: Duration::from_millis(50),
            },
        }
    }
}

impl InMemoryCertificateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only issue once the validation records exist in `store`.
    #[must_use]
    pub fn observing(mut self, store: RecordStore) -> Self {
        self.observed = Some(store);
        self
    }

    /// Append calls to `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Number of certificates requested so far.
    pub async fn certificate_count(&self) -> usize {
        self.certificates.read().await.len()
    }

    async fn status_of(&self, certificate: &StoredCertificate) -> CertificateStatus {
        let Some(store) = &self.observed else {
            return CertificateStatus::Issued;
        };
        for option in &certificate.options {
            if !store.contains(&option.to_record_request()).await {
                return CertificateStatus::PendingValidation;
            }
        }
        CertificateStatus::Issued
    }
}

#[async_trait]
impl CertificateManager for InMemoryCertificateManager {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn request_certificate(&self, req: &CertificateRequest) -> Result<IssuedCertificate> {
        self.log
            .push(ProviderCall::RequestCertificate {
                domain_name: req.domain_name.clone(),
            })
            .await;

        let names = req.covered_names();
        for name in &names {
            check_domain_name(name).map_err(|detail| ProviderError::InvalidParameter {
                provider: self.id().to_string(),
                param: "DomainName".to_string(),
                detail,
            })?;
        }

        let options: Vec<_> = names.iter().map(|name| validation_option(name)).collect();
        let arn = format!("{ARN_PREFIX}{}", uuid::Uuid::new_v4());
        log::info!("[memory] Requested certificate {arn} for {}", req.domain_name);

        self.certificates.write().await.insert(
            arn.clone(),
            StoredCertificate {
                domain_name: req.domain_name.clone(),
                options: options.clone(),
            },
        );

        Ok(IssuedCertificate {
            arn,
            domain_validation_options: options,
        })
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail> {
        self.log
            .push(ProviderCall::DescribeCertificate {
                arn: arn.to_string(),
            })
            .await;

        let certificate = self
            .certificates
            .read()
            .await
            .get(arn)
            .cloned()
            .ok_or_else(|| ProviderError::CertificateNotFound {
                provider: self.id().to_string(),
                arn: arn.to_string(),
                raw_message: None,
            })?;

        Ok(CertificateDetail {
            arn: arn.to_string(),
            status: self.status_of(&certificate).await,
            domain_name: certificate.domain_name,
            domain_validation_options: certificate.options,
            failure_reason: None,
        })
    }

    fn wait_config(&self) -> WaitConfig {
        self.wait
    }
}

/// Deterministic option for `name`. A wildcard shares the record of its base name.
fn validation_option(name: &str) -> DomainValidationOption {
    let normalized = normalize_domain_name(name);
    let base = normalized.strip_prefix("*.").unwrap_or(&normalized);
    let digest = sha256_hex(base.as_bytes());
    DomainValidationOption {
        domain_name: name.to_string(),
        resource_record_type: "CNAME".to_string(),
        resource_record_name: format!("_{}.{base}.", &digest[..32]),
        resource_record_value: format!("_{}.{VALIDATION_SUFFIX}", &digest[32..]),
    }
}

/// Basic hostname syntax, with an optional leading `*.` label.
fn check_domain_name(name: &str) -> std::result::Result<(), String> {
    let normalized = normalize_domain_name(name);
    let host = normalized.strip_prefix("*.").unwrap_or(&normalized);

    if host.is_empty() || normalized.len() > 253 {
        return Err(format!("invalid domain name length: {name:?}"));
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Err(format!("domain name must have at least two labels: {name:?}"));
    }
    for label in labels {
        let valid = !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(format!("invalid label {label:?} in {name:?}"));
        }
    }
    Ok(())
}
