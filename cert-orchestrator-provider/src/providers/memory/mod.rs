//! In-process providers
//!
//! Both providers keep their state in memory and record every call in a
//! shared [`CallLog`], which makes them suitable for dry runs and for
//! asserting the order of provider interactions in tests.

mod certificate;
mod dns;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::providers::common::normalize_domain_name;
use crate::types::{DnsRecordHandle, RecordRequest};

pub use certificate::InMemoryCertificateManager;
pub use dns::InMemoryDnsAdapter;

/// One provider interaction, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `request_certificate` for this primary domain name.
    RequestCertificate { domain_name: String },
    /// `describe_certificate` for this certificate.
    DescribeCertificate { arn: String },
    /// `create_record` for this record name (normalized).
    CreateRecord { name: String },
}

/// Shared, append-only log of provider calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<RwLock<Vec<ProviderCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn push(&self, call: ProviderCall) {
        self.calls.write().await.push(call);
    }

    /// Snapshot of every call so far.
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.read().await.clone()
    }
}

/// Records published by [`InMemoryDnsAdapter`], keyed by (type, name).
///
/// Share one store between the adapter and [`InMemoryCertificateManager::observing`]
/// to simulate a certificate authority that checks DNS.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<HashMap<(String, String), DnsRecordHandle>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(record_type: &str, name: &str) -> (String, String) {
        (record_type.to_ascii_uppercase(), normalize_domain_name(name))
    }

    /// Whether a record with this type, name and value exists.
    pub async fn contains(&self, req: &RecordRequest) -> bool {
        self.records
            .read()
            .await
            .get(&Self::key(&req.record_type, &req.name))
            .is_some_and(|r| normalize_domain_name(&r.value) == normalize_domain_name(&req.value))
    }

    /// Number of distinct records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every record, sorted by name.
    pub async fn records(&self) -> Vec<DnsRecordHandle> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}
