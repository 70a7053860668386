//! # cert-orchestrator-provider
//!
//! Provider abstractions for DNS-validated certificates: a certificate
//! manager that issues certificates and publishes validation challenges, and
//! a DNS adapter that creates the challenge records.
//!
//! ## Supported Providers
//!
//! | Provider | Capability | Feature Flag | Auth Method |
//! |----------|------------|-------------|-------------|
//! | [AWS Certificate Manager](https://aws.amazon.com/certificate-manager/) | [`CertificateManager`] | `acm` | AWS `SigV4` |
//! | [Cloudflare](https://www.cloudflare.com/) | [`DnsAdapter`] | `cloudflare` | Bearer Token |
//! | In-memory | both | *(always)* | none |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: `acm` and `cloudflare`.
//! - **`native-tls`** *(default)* / **`rustls`**: TLS backend of `reqwest`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cert_orchestrator_provider::{
//!     create_certificate_manager, create_dns_adapter, AwsConfig, CertificateRequest,
//!     DnsAdapterConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = create_certificate_manager(&AwsConfig {
//!         region: "us-east-1".to_string(),
//!         access_key_id: "AKID".to_string(),
//!         secret_access_key: "secret".to_string(),
//!         session_token: None,
//!     })?;
//!     let dns = create_dns_adapter(DnsAdapterConfig::Cloudflare {
//!         api_token: "your-token".to_string(),
//!         zone_id: None,
//!         ttl: 60,
//!     })?;
//!
//!     let issued = manager
//!         .request_certificate(&CertificateRequest::dns("example.com", vec![]))
//!         .await?;
//!     for option in &issued.domain_validation_options {
//!         dns.create_record(&option.to_record_request()).await?;
//!     }
//!     manager.wait_until_validated(&issued.arn).await?;
//!     println!("{}", issued.arn);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError).
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are retried with
//! exponential backoff before they surface.

mod error;
mod factory;
#[cfg(any(feature = "acm", feature = "cloudflare"))]
mod http_client;
mod providers;
mod traits;
mod types;
#[cfg(any(feature = "acm", feature = "cloudflare"))]
mod utils;

pub use error::{ProviderError, Result};

#[cfg(feature = "acm")]
pub use factory::create_certificate_manager;
pub use factory::create_dns_adapter;

// Internal traits (error mapping) are not exported
pub use traits::{CertificateManager, DnsAdapter};

pub use types::{
    AwsConfig, CertificateDetail, CertificateRequest, CertificateStatus, DnsAdapterConfig,
    DnsRecordHandle, DomainValidationOption, IssuedCertificate, RecordRequest, ValidationMethod,
    WaitConfig, DEFAULT_RECORD_TTL,
};

pub use providers::{
    CallLog, InMemoryCertificateManager, InMemoryDnsAdapter, ProviderCall, RecordStore,
};

#[cfg(feature = "acm")]
pub use providers::{AcmCertificateManager, AcmCertificateManagerBuilder};

#[cfg(feature = "cloudflare")]
pub use providers::{CloudflareDnsAdapter, CloudflareDnsAdapterBuilder};
