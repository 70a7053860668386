//! DNS-validated ACM certificate
//!
//! Three resources, chained through their outputs:
//!
//! ```text
//! {name}Certificate ──options──▶ {name}Record-{domain} (one per option) ──▶ {name}Validation ──▶ arn()
//! ```
//!
//! The record resources are declared once the certificate's validation
//! options are known, and the validation resource depends on all of them, so
//! the certificate manager is never asked to validate before every record
//! has been created.

use std::collections::HashSet;
use std::sync::Arc;

use cert_orchestrator_provider::{
    CertificateRequest, DnsAdapter, DnsRecordHandle, DomainValidationOption, IssuedCertificate,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{CoreError, CoreResult};
use crate::output::Output;
use crate::resource::{Resource, ResourceOptions, Urn};

/// Type token of the component itself.
pub const CERTIFICATE_COMPONENT_TYPE: &str = "certorch:aws:Certificate";
pub const ACM_CERTIFICATE_TYPE: &str = "aws:acm/certificate:Certificate";
pub const CERTIFICATE_VALIDATION_TYPE: &str = "aws:acm/certificateValidation:CertificateValidation";
pub const DNS_RECORD_TYPE: &str = "certorch:dns:Record";

/// Inputs of [`DnsValidatedCertificate`].
#[derive(Clone)]
pub struct DnsValidatedCertificateArgs {
    /// The fully qualified domain name in the certificate.
    pub domain_name: Output<String>,
    /// Additional names (SANs). `None` is the same as an empty list.
    pub alternative_names: Option<Output<Vec<String>>>,
    /// Adapter that publishes the validation records.
    pub dns: Output<Arc<dyn DnsAdapter>>,
}

impl DnsValidatedCertificateArgs {
    pub fn new(domain_name: impl Into<Output<String>>, dns: Arc<dyn DnsAdapter>) -> Self {
        Self {
            domain_name: domain_name.into(),
            alternative_names: None,
            dns: Output::new(dns),
        }
    }

    #[must_use]
    pub fn alternative_names(mut self, names: impl Into<Output<Vec<String>>>) -> Self {
        self.alternative_names = Some(names.into());
        self
    }
}

/// Inputs of the validation resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateValidation {
    pub certificate_arn: String,
}

/// A certificate managed by AWS Certificate Manager, validated through DNS
/// records created by a [`DnsAdapter`].
#[derive(Debug, Clone)]
pub struct DnsValidatedCertificate {
    urn: Urn,
    certificate: Resource<IssuedCertificate>,
    records: Output<Vec<DnsRecordHandle>>,
    validation: Resource<CertificateValidation>,
}

impl DnsValidatedCertificate {
    pub fn new(
        engine: &Engine,
        name: &str,
        args: DnsValidatedCertificateArgs,
        opts: ResourceOptions,
    ) -> CoreResult<Self> {
        let urn = engine.register_component(CERTIFICATE_COMPONENT_TYPE, name, &opts)?;
        let child = ResourceOptions {
            parent: Some(urn.clone()),
            depends_on: Vec::new(),
            certificate_manager: opts.certificate_manager.clone(),
        };

        let certificate = create_certificate(engine, name, &args, &child, opts.depends_on)?;
        let records = create_dns_records(engine, name, &args.dns, &certificate, &child);
        let validation = validate_certificate(engine, name, &certificate, &records, child)?;

        Ok(Self {
            urn,
            certificate,
            records,
            validation,
        })
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// ARN of the certificate, available once it is validated.
    pub fn arn(&self) -> Output<String> {
        self.validation.output().apply(|v| v.certificate_arn)
    }

    /// One option per covered domain name, as published by the manager.
    pub fn validation_options(&self) -> Output<Vec<DomainValidationOption>> {
        self.certificate
            .output()
            .apply(|c| c.domain_validation_options)
    }

    /// Handles of the created validation records (order carries no meaning).
    pub fn records(&self) -> Output<Vec<DnsRecordHandle>> {
        self.records.clone()
    }
}

fn create_certificate(
    engine: &Engine,
    name: &str,
    args: &DnsValidatedCertificateArgs,
    child: &ResourceOptions,
    depends_on: Vec<Output<()>>,
) -> CoreResult<Resource<IssuedCertificate>> {
    let alternative_names = args
        .alternative_names
        .clone()
        .unwrap_or_else(|| Output::new(Vec::new()));
    let request = args
        .domain_name
        .zip(&alternative_names)
        .apply(|(domain_name, names)| CertificateRequest::dns(domain_name, names));

    engine.register_resource(
        ACM_CERTIFICATE_TYPE,
        &format!("{name}Certificate"),
        ResourceOptions {
            depends_on,
            ..child.clone()
        },
        request,
        |ctx, request| async move {
            let manager = ctx.certificate_manager()?;
            manager
                .request_certificate(&request)
                .await
                .map_err(CoreError::from)
        },
    )
}

fn create_dns_records(
    engine: &Engine,
    name: &str,
    dns: &Output<Arc<dyn DnsAdapter>>,
    certificate: &Resource<IssuedCertificate>,
    child: &ResourceOptions,
) -> Output<Vec<DnsRecordHandle>> {
    let engine = engine.clone();
    let name = name.to_string();
    let child = child.clone();

    dns.zip(certificate.output())
        .and_then(move |(dns, issued)| async move {
            let options = &issued.domain_validation_options;
            let records = options
                .iter()
                .zip(record_resource_names(&name, options))
                .map(|(option, resource_name)| {
                    let dns = Arc::clone(&dns);
                    engine.register_resource(
                        DNS_RECORD_TYPE,
                        &resource_name,
                        child.clone(),
                        Output::new(option.to_record_request()),
                        move |_ctx, request| async move {
                            dns.create_record(&request).await.map_err(CoreError::from)
                        },
                    )
                })
                .collect::<CoreResult<Vec<_>>>()?;

            log::debug!(
                "Creating {} validation record(s) for {name} with {}",
                records.len(),
                dns.id()
            );
            try_join_all(records.iter().map(|r| r.output().resolve())).await
        })
}

fn validate_certificate(
    engine: &Engine,
    name: &str,
    certificate: &Resource<IssuedCertificate>,
    records: &Output<Vec<DnsRecordHandle>>,
    child: ResourceOptions,
) -> CoreResult<Resource<CertificateValidation>> {
    let inputs = certificate.output().apply(|c| CertificateValidation {
        certificate_arn: c.arn,
    });

    engine.register_resource(
        CERTIFICATE_VALIDATION_TYPE,
        &format!("{name}Validation"),
        child.depends_on(records.void()),
        inputs,
        |ctx, inputs: CertificateValidation| async move {
            let manager = ctx.certificate_manager()?;
            manager
                .wait_until_validated(&inputs.certificate_arn)
                .await
                .map(|detail| CertificateValidation {
                    certificate_arn: detail.arn,
                })
                .map_err(CoreError::from)
        },
    )
}

/// Named after the covered domain, not the record: an apex and its wildcard
/// share one validation record.
fn record_resource_name(component: &str, option: &DomainValidationOption) -> String {
    format!("{component}Record-{}", option.domain_name.to_ascii_lowercase())
}

/// One name per option, in order. Options whose domains differ only in case
/// get a numeric suffix so every record keeps its own URN.
fn record_resource_names(component: &str, options: &[DomainValidationOption]) -> Vec<String> {
    let mut taken = HashSet::new();
    options
        .iter()
        .map(|option| {
            let base = record_resource_name(component, option);
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{base}-{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(domain: &str) -> DomainValidationOption {
        DomainValidationOption {
            domain_name: domain.into(),
            resource_record_type: "CNAME".into(),
            resource_record_name: "_a.example.com.".into(),
            resource_record_value: "_b.acm-validations.aws.".into(),
        }
    }

    #[test]
    fn record_names_follow_domain() {
        assert_eq!(
            record_resource_name("site", &option("Example.com")),
            "siteRecord-example.com"
        );
        assert_ne!(
            record_resource_name("site", &option("example.com")),
            record_resource_name("site", &option("*.example.com"))
        );
    }

    #[test]
    fn case_variants_get_distinct_record_names() {
        let options = [
            option("example.com"),
            option("Example.com"),
            option("www.example.com"),
            option("EXAMPLE.COM"),
        ];
        assert_eq!(
            record_resource_names("site", &options),
            vec![
                "siteRecord-example.com",
                "siteRecord-example.com-2",
                "siteRecord-www.example.com",
                "siteRecord-example.com-3",
            ]
        );
    }
}
