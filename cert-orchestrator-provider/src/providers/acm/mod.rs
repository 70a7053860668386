//! AWS Certificate Manager

mod error;
mod http;
mod manager;
mod sign;
/// ACM JSON 1.1 request/response types.
pub(crate) mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::types::{AwsConfig, WaitConfig};

pub(crate) use sign::SigV4Signer;

/// Signing name of the ACM service.
pub(crate) const ACM_SERVICE: &str = "acm";
/// `X-Amz-Target` prefix of every ACM operation.
pub(crate) const ACM_TARGET_PREFIX: &str = "CertificateManager";

/// AWS Certificate Manager client.
///
/// Speaks the AWS JSON 1.1 protocol and signs every request with
/// Signature Version 4.
///
/// # Construction
///
/// ```rust,no_run
/// use cert_orchestrator_provider::{AcmCertificateManager, AwsConfig};
///
/// # fn main() -> cert_orchestrator_provider::Result<()> {
/// let manager = AcmCertificateManager::new(AwsConfig {
///     region: "us-east-1".to_string(),
///     access_key_id: "AKID".to_string(),
///     secret_access_key: "secret".to_string(),
///     session_token: None,
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct AcmCertificateManager {
    pub(crate) client: Client,
    pub(crate) signer: SigV4Signer,
    pub(crate) endpoint: String,
    pub(crate) host: String,
    pub(crate) max_retries: u32,
    /// Validation wait (after the records exist)
    pub(crate) wait: WaitConfig,
    /// Wait for ACM to publish validation options right after the request
    pub(crate) options_wait: WaitConfig,
}

/// Builder for [`AcmCertificateManager`].
pub struct AcmCertificateManagerBuilder {
    config: AwsConfig,
    endpoint: Option<String>,
    max_retries: u32,
    wait: WaitConfig,
    options_wait: WaitConfig,
}

impl AcmCertificateManagerBuilder {
    fn new(config: AwsConfig) -> Self {
        Self {
            config,
            endpoint: None,
            max_retries: 2,
            wait: WaitConfig::default(),
            options_wait: WaitConfig {
                poll_interval: Duration::from_secs(2),
                timeout: Duration::from_secs(120),
            },
        }
    }

    /// Override the endpoint (e.g. `http://localhost:4566` for a local emulator).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Polling used while waiting for validation.
    pub fn wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Polling used while waiting for validation options to be published.
    pub fn options_wait_config(mut self, wait: WaitConfig) -> Self {
        self.options_wait = wait;
        self
    }

    /// Build the [`AcmCertificateManager`] instance.
    pub fn build(self) -> Result<AcmCertificateManager> {
        let default_host = format!("acm.{}.amazonaws.com", self.config.region);
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| format!("https://{default_host}"));
        let host = endpoint
            .split_once("://")
            .map_or(endpoint.as_str(), |(_, rest)| rest)
            .trim_end_matches('/')
            .to_string();

        log::debug!(
            "[acm] Using endpoint {endpoint} in {} as {}",
            self.config.region,
            crate::utils::log_sanitizer::mask_secret(&self.config.access_key_id)
        );

        Ok(AcmCertificateManager {
            client: create_http_client(ACM_SERVICE)?,
            signer: SigV4Signer::new(&self.config, ACM_SERVICE),
            endpoint,
            host,
            max_retries: self.max_retries,
            wait: self.wait,
            options_wait: self.options_wait,
        })
    }
}

impl AcmCertificateManager {
    /// Creates a client with default settings.
    pub fn new(config: AwsConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Returns a builder for customizing the client.
    pub fn builder(config: AwsConfig) -> AcmCertificateManagerBuilder {
        AcmCertificateManagerBuilder::new(config)
    }
}
