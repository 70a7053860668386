//! Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "acm")]
mod acm;
#[cfg(feature = "cloudflare")]
mod cloudflare;
mod memory;

#[cfg(feature = "acm")]
pub use acm::{AcmCertificateManager, AcmCertificateManagerBuilder};
#[cfg(feature = "cloudflare")]
pub use cloudflare::{CloudflareDnsAdapter, CloudflareDnsAdapterBuilder};
pub use memory::{CallLog, InMemoryCertificateManager, InMemoryDnsAdapter, ProviderCall, RecordStore};
