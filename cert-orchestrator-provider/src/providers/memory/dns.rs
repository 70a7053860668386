use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;
use crate::traits::DnsAdapter;
use crate::types::{DnsRecordHandle, RecordRequest};

use super::{CallLog, ProviderCall, RecordStore};

const MEMORY_ZONE_ID: &str = "memory";

/// DNS adapter backed by a [`RecordStore`].
///
/// Creating a record that already exists with the same value returns the
/// existing record; a different value is rejected with
/// [`ProviderError::RecordExists`].
#[derive(Debug, Default)]
pub struct InMemoryDnsAdapter {
    store: RecordStore,
    log: CallLog,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl InMemoryDnsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish into `store` instead of a private one.
    #[must_use]
    pub fn with_store(mut self, store: RecordStore) -> Self {
        self.store = store;
        self
    }

    /// Append calls to `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Make the `k`-th `create_record` call (1-based) fail.
    #[must_use]
    pub fn fail_on_call(mut self, k: usize) -> Self {
        self.fail_on_call = Some(k);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}

#[async_trait]
impl DnsAdapter for InMemoryDnsAdapter {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn create_record(&self, req: &RecordRequest) -> Result<DnsRecordHandle> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let name = normalize_domain_name(&req.name);
        self.log
            .push(ProviderCall::CreateRecord { name: name.clone() })
            .await;

        if self.fail_on_call == Some(call) {
            log::warn!("[memory] Injected failure on create_record #{call} ({name})");
            return Err(ProviderError::PermissionDenied {
                provider: self.id().to_string(),
                raw_message: Some(format!("injected failure on call {call}")),
            });
        }

        let key = RecordStore::key(&req.record_type, &req.name);
        let mut records = self.store.records.write().await;
        if let Some(existing) = records.get(&key) {
            if normalize_domain_name(&existing.value) == normalize_domain_name(&req.value) {
                log::debug!("[memory] Reusing existing {} {name}", existing.record_type);
                return Ok(existing.clone());
            }
            return Err(ProviderError::RecordExists {
                provider: self.id().to_string(),
                record_name: name,
                raw_message: Some(format!("existing value: {}", existing.value)),
            });
        }

        let handle = DnsRecordHandle {
            id: format!("rec-{}", records.len() + 1),
            zone_id: MEMORY_ZONE_ID.to_string(),
            name,
            record_type: key.0.clone(),
            value: req.value.clone(),
        };
        log::info!("[memory] Created {} {}", handle.record_type, handle.name);
        records.insert(key, handle.clone());
        Ok(handle)
    }
}
