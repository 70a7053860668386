//! Cloudflare DNS adapter

mod adapter;
mod error;
mod http;
mod types;

use std::collections::HashMap;

use reqwest::Client;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::providers::common::create_http_client;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone, CreateRecordBody};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Comment attached to every record created by the adapter
pub(crate) const RECORD_COMMENT: &str = "certificate validation (cert-orchestrator)";

/// Cloudflare DNS adapter.
///
/// Authenticates with a Bearer API token. The zone of each record is discovered
/// by looking up successively shorter suffixes of the record name, unless a
/// fixed zone id is configured.
///
/// ```rust,no_run
/// use cert_orchestrator_provider::CloudflareDnsAdapter;
///
/// # fn main() -> cert_orchestrator_provider::Result<()> {
/// let adapter = CloudflareDnsAdapter::builder("your-token".to_string())
///     .ttl(120)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CloudflareDnsAdapter {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) zone_id: Option<String>,
    pub(crate) ttl: u32,
    pub(crate) max_retries: u32,
    /// zone name -> zone id
    pub(crate) zone_cache: RwLock<HashMap<String, String>>,
}

/// Builder for [`CloudflareDnsAdapter`].
pub struct CloudflareDnsAdapterBuilder {
    api_token: String,
    zone_id: Option<String>,
    ttl: u32,
    max_retries: u32,
}

impl CloudflareDnsAdapterBuilder {
    fn new(api_token: String) -> Self {
        Self {
            api_token,
            zone_id: None,
            ttl: 60,
            max_retries: 2,
        }
    }

    /// Use this zone for every record instead of discovering it.
    pub fn zone_id(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    /// TTL of created records in seconds (default: 60, 1 = automatic).
    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`CloudflareDnsAdapter`] instance.
    pub fn build(self) -> Result<CloudflareDnsAdapter> {
        Ok(CloudflareDnsAdapter {
            client: create_http_client("cloudflare")?,
            api_token: self.api_token,
            zone_id: self.zone_id,
            ttl: self.ttl,
            max_retries: self.max_retries,
            zone_cache: RwLock::new(HashMap::new()),
        })
    }
}

impl CloudflareDnsAdapter {
    /// Creates an adapter with default settings.
    pub fn new(api_token: String) -> Result<Self> {
        Self::builder(api_token).build()
    }

    /// Returns a builder for customizing the adapter.
    pub fn builder(api_token: String) -> CloudflareDnsAdapterBuilder {
        CloudflareDnsAdapterBuilder::new(api_token)
    }
}
