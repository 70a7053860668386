//! ACM `CertificateManager` 实现

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::sha256_hex;
use crate::traits::{CertificateManager, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CertificateDetail, CertificateRequest, CertificateStatus, DomainValidationOption,
    IssuedCertificate, WaitConfig,
};

use super::AcmCertificateManager;
use super::types::{
    AcmCertificate, AcmDomainValidation, DescribeCertificateInput, DescribeCertificateOutput,
    RequestCertificateInput, RequestCertificateOutput,
};

/// ACM accepts at most 32 word characters.
const IDEMPOTENCY_TOKEN_LEN: usize = 32;

#[async_trait]
impl CertificateManager for AcmCertificateManager {
    fn id(&self) -> &'static str {
        "acm"
    }

    async fn request_certificate(&self, req: &CertificateRequest) -> Result<IssuedCertificate> {
        let token = idempotency_token(req);
        let input = RequestCertificateInput {
            domain_name: &req.domain_name,
            validation_method: req.validation_method.as_str(),
            subject_alternative_names: &req.subject_alternative_names,
            idempotency_token: &token,
        };

        let output: RequestCertificateOutput = self
            .call(
                "RequestCertificate",
                &input,
                ErrorContext {
                    domain: Some(req.domain_name.clone()),
                    ..ErrorContext::default()
                },
            )
            .await?;
        let arn = output.certificate_arn;
        log::info!("[acm] Requested certificate {arn} for {}", req.domain_name);

        // ACM publishes the resource records asynchronously
        let expected = req.covered_names();
        let started = tokio::time::Instant::now();
        loop {
            let certificate = self.describe(&arn).await?;
            let options = validation_options(&certificate.domain_validation_options);
            if options_complete(&expected, &options) {
                return Ok(IssuedCertificate {
                    arn,
                    domain_validation_options: options,
                });
            }

            let elapsed = started.elapsed();
            if elapsed >= self.options_wait.timeout {
                return Err(self.records_not_published(&arn, elapsed));
            }
            log::debug!(
                "[acm] {}/{} validation records published for {arn}",
                options.len(),
                expected.len()
            );
            tokio::time::sleep(
                self.options_wait
                    .poll_interval
                    .min(self.options_wait.timeout - elapsed),
            )
            .await;
        }
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail> {
        let certificate = self.describe(arn).await?;
        self.to_detail(certificate)
    }

    fn wait_config(&self) -> WaitConfig {
        self.wait
    }
}

impl AcmCertificateManager {
    async fn describe(&self, arn: &str) -> Result<AcmCertificate> {
        let output: DescribeCertificateOutput = self
            .call(
                "DescribeCertificate",
                &DescribeCertificateInput {
                    certificate_arn: arn,
                },
                ErrorContext {
                    arn: Some(arn.to_string()),
                    ..ErrorContext::default()
                },
            )
            .await?;
        Ok(output.certificate)
    }

    /// ACM never attached resource records; validation has not started yet.
    fn records_not_published(&self, arn: &str, waited: Duration) -> ProviderError {
        ProviderError::Timeout {
            provider: self.provider_name().to_string(),
            detail: format!(
                "validation records of {arn} not published after {}s",
                waited.as_secs()
            ),
        }
    }

    fn to_detail(&self, certificate: AcmCertificate) -> Result<CertificateDetail> {
        let status = CertificateStatus::parse(&certificate.status).ok_or_else(|| {
            self.parse_error(format!("未知的证书状态: {}", certificate.status))
        })?;
        Ok(CertificateDetail {
            domain_validation_options: validation_options(&certificate.domain_validation_options),
            arn: certificate.certificate_arn,
            domain_name: certificate.domain_name,
            status,
            failure_reason: certificate.failure_reason,
        })
    }
}

/// Same request, same token: a retried `RequestCertificate` returns the
/// certificate created by the first attempt.
fn idempotency_token(req: &CertificateRequest) -> String {
    let material = format!(
        "{}|{}|{}",
        req.domain_name,
        req.validation_method.as_str(),
        req.subject_alternative_names.join(",")
    );
    let mut token = sha256_hex(material.as_bytes());
    token.truncate(IDEMPOTENCY_TOKEN_LEN);
    token
}

/// Options that already carry a resource record.
fn validation_options(raw: &[AcmDomainValidation]) -> Vec<DomainValidationOption> {
    raw.iter()
        .filter_map(|v| {
            v.resource_record.as_ref().map(|r| DomainValidationOption {
                domain_name: v.domain_name.clone(),
                resource_record_type: r.record_type.clone(),
                resource_record_name: r.name.clone(),
                resource_record_value: r.value.clone(),
            })
        })
        .collect()
}

fn options_complete(expected: &[&str], options: &[DomainValidationOption]) -> bool {
    expected.iter().all(|name| {
        options
            .iter()
            .any(|o| o.domain_name.eq_ignore_ascii_case(name))
    })
}
