//! Cloudflare `DnsAdapter` 实现

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, zone_candidates};
use crate::traits::{DnsAdapter, ErrorContext, ProviderErrorMapper};
use crate::types::{DnsRecordHandle, RecordRequest};

use super::{
    CloudflareDnsAdapter, CloudflareDnsRecord, CloudflareZone, CreateRecordBody, RECORD_COMMENT,
};

impl CloudflareDnsAdapter {
    /// 查找记录所属的 zone id
    ///
    /// Walks the record name's suffixes from most to least specific and returns
    /// the first zone Cloudflare knows about.
    pub(crate) async fn resolve_zone(&self, record_name: &str) -> Result<String> {
        if let Some(zone_id) = &self.zone_id {
            return Ok(zone_id.clone());
        }

        let candidates = zone_candidates(record_name);
        {
            let cache = self.zone_cache.read().await;
            if let Some(id) = candidates.iter().find_map(|c| cache.get(c)) {
                return Ok(id.clone());
            }
        }

        for candidate in &candidates {
            let zones: Vec<CloudflareZone> = self
                .request::<_, ()>(
                    Method::GET,
                    &format!("/zones?name={}", urlencoding::encode(candidate)),
                    None,
                    ErrorContext {
                        domain: Some(candidate.clone()),
                        ..ErrorContext::default()
                    },
                )
                .await?;

            if let Some(zone) = zones.into_iter().find(|z| z.name == *candidate) {
                log::debug!(
                    "[cloudflare] Zone for {record_name}: {} ({}, {})",
                    zone.name,
                    zone.id,
                    zone.status
                );
                self.zone_cache
                    .write()
                    .await
                    .insert(zone.name, zone.id.clone());
                return Ok(zone.id);
            }
        }

        Err(ProviderError::DomainNotFound {
            provider: self.provider_name().to_string(),
            domain: normalize_domain_name(record_name),
            raw_message: None,
        })
    }

    /// 查找同名同类型的已有记录
    async fn find_records(
        &self,
        zone_id: &str,
        record_type: &str,
        name: &str,
    ) -> Result<Vec<CloudflareDnsRecord>> {
        self.request::<_, ()>(
            Method::GET,
            &format!(
                "/zones/{zone_id}/dns_records?type={}&name={}",
                urlencoding::encode(record_type),
                urlencoding::encode(name)
            ),
            None,
            ErrorContext::default(),
        )
        .await
    }

    fn to_handle(record: CloudflareDnsRecord, zone_id: &str) -> DnsRecordHandle {
        DnsRecordHandle {
            id: record.id,
            zone_id: zone_id.to_string(),
            name: normalize_domain_name(&record.name),
            record_type: record.record_type,
            value: record.content,
        }
    }
}

/// Record values compare equal regardless of trailing dot and case.
fn same_content(a: &str, b: &str) -> bool {
    normalize_domain_name(a) == normalize_domain_name(b)
}

#[async_trait]
impl DnsAdapter for CloudflareDnsAdapter {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn create_record(&self, req: &RecordRequest) -> Result<DnsRecordHandle> {
        let name = normalize_domain_name(&req.name);
        let record_type = req.record_type.to_ascii_uppercase();
        let zone_id = self.resolve_zone(&name).await?;

        let body = CreateRecordBody {
            record_type: &record_type,
            name: &name,
            content: req.value.trim_end_matches('.'),
            ttl: self.ttl,
            proxied: false,
            comment: RECORD_COMMENT,
        };

        let created = self
            .request::<CloudflareDnsRecord, _>(
                Method::POST,
                &format!("/zones/{zone_id}/dns_records"),
                Some(&body),
                ErrorContext {
                    record_name: Some(name.clone()),
                    ..ErrorContext::default()
                },
            )
            .await;

        match created {
            Ok(record) => {
                log::info!("[cloudflare] Created {record_type} {name}");
                Ok(Self::to_handle(record, &zone_id))
            }
            // 相同内容的记录已存在：视为成功（upsert）
            Err(err @ ProviderError::RecordExists { .. }) => {
                let existing = self.find_records(&zone_id, &record_type, &name).await?;
                existing
                    .into_iter()
                    .find(|r| same_content(&r.content, &req.value))
                    .map(|record| {
                        log::info!("[cloudflare] Reusing existing {record_type} {name}");
                        Self::to_handle(record, &zone_id)
                    })
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}
