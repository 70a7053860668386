//! Factory functions building providers from configuration.

use std::sync::Arc;

use crate::error::Result;
#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareDnsAdapter;
use crate::providers::InMemoryDnsAdapter;
use crate::traits::DnsAdapter;
use crate::types::DnsAdapterConfig;
#[cfg(feature = "acm")]
use crate::{providers::AcmCertificateManager, traits::CertificateManager, types::AwsConfig};

/// Creates a [`DnsAdapter`] from its configuration.
///
/// # Examples
///
/// ```rust
/// use cert_orchestrator_provider::{create_dns_adapter, DnsAdapter, DnsAdapterConfig};
///
/// let adapter = create_dns_adapter(DnsAdapterConfig::Memory).unwrap();
/// assert_eq!(adapter.id(), "memory");
/// ```
pub fn create_dns_adapter(config: DnsAdapterConfig) -> Result<Arc<dyn DnsAdapter>> {
    match config {
        #[cfg(feature = "cloudflare")]
        DnsAdapterConfig::Cloudflare {
            api_token,
            zone_id,
            ttl,
        } => {
            let mut builder = CloudflareDnsAdapter::builder(api_token).ttl(ttl);
            if let Some(zone_id) = zone_id {
                builder = builder.zone_id(zone_id);
            }
            Ok(Arc::new(builder.build()?))
        }
        DnsAdapterConfig::Memory => Ok(Arc::new(InMemoryDnsAdapter::new())),
    }
}

/// Creates the ACM [`CertificateManager`] for `config.region`.
#[cfg(feature = "acm")]
pub fn create_certificate_manager(config: &AwsConfig) -> Result<Arc<dyn CertificateManager>> {
    Ok(Arc::new(AcmCertificateManager::new(config.clone())?))
}
