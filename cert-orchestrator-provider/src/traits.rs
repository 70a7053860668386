use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    CertificateDetail, CertificateRequest, CertificateStatus, DnsRecordHandle, IssuedCertificate,
    RecordRequest, WaitConfig,
};

/// 原始 API 错误（内部使用）
#[cfg(any(feature = "acm", feature = "cloudflare"))]
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

#[cfg(any(feature = "acm", feature = "cloudflare"))]
impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[cfg(any(feature = "acm", feature = "cloudflare"))]
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录名称（用于 `RecordExists` 等错误）
    pub record_name: Option<String>,
    /// 证书 ARN（用于 `CertificateNotFound` 等错误）
    pub arn: Option<String>,
    /// 域名（用于 `DomainNotFound` 等错误）
    pub domain: Option<String>,
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
#[cfg(any(feature = "acm", feature = "cloudflare"))]
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS 适配器 Trait
///
/// A uniform record-creation capability over a concrete DNS provider.
/// Implementations are expected to behave as an upsert: creating a record
/// that already exists with identical content returns the existing record.
#[async_trait]
pub trait DnsAdapter: Send + Sync {
    /// 适配器标识符
    fn id(&self) -> &'static str;

    /// 创建 DNS 记录
    async fn create_record(&self, req: &RecordRequest) -> Result<DnsRecordHandle>;
}

/// 证书管理服务 Trait
#[async_trait]
pub trait CertificateManager: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 申请证书
    ///
    /// Returns once the provider has assigned an identifier and published one
    /// validation option per covered domain name.
    async fn request_certificate(&self, req: &CertificateRequest) -> Result<IssuedCertificate>;

    /// 查询证书详情
    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail>;

    /// 轮询配置
    fn wait_config(&self) -> WaitConfig {
        WaitConfig::default()
    }

    /// 等待证书验证完成
    ///
    /// 默认实现按 [`wait_config()`](Self::wait_config) 轮询 `describe_certificate()`：
    /// - `Issued` → 成功
    /// - 其他终止状态 → [`ProviderError::ValidationFailed`]
    /// - 超时 → [`ProviderError::ValidationTimeout`]
    async fn wait_until_validated(&self, arn: &str) -> Result<CertificateDetail> {
        let wait = self.wait_config();
        let started = tokio::time::Instant::now();

        loop {
            let detail = self.describe_certificate(arn).await?;

            if detail.status == CertificateStatus::Issued {
                log::info!("[{}] Certificate {arn} issued", self.id());
                return Ok(detail);
            }
            if detail.status.is_terminal_failure() {
                return Err(ProviderError::ValidationFailed {
                    provider: self.id().to_string(),
                    arn: arn.to_string(),
                    reason: detail
                        .failure_reason
                        .unwrap_or_else(|| detail.status.to_string()),
                });
            }

            let elapsed = started.elapsed();
            if elapsed >= wait.timeout {
                return Err(ProviderError::ValidationTimeout {
                    provider: self.id().to_string(),
                    arn: arn.to_string(),
                    waited_secs: elapsed.as_secs(),
                });
            }

            log::debug!(
                "[{}] Certificate {arn} is {}, checking again in {:.1}s",
                self.id(),
                detail.status,
                wait.poll_interval.as_secs_f32()
            );
            tokio::time::sleep(wait.poll_interval.min(wait.timeout - elapsed)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::types::ValidationMethod;

    /// Replays a fixed sequence of statuses, repeating the last one.
    struct ScriptedManager {
        statuses: Mutex<Vec<CertificateStatus>>,
        calls: Mutex<u32>,
    }

    impl ScriptedManager {
        fn new(mut statuses: Vec<CertificateStatus>) -> Self {
            statuses.reverse();
            Self {
                statuses: Mutex::new(statuses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl CertificateManager for ScriptedManager {
        fn id(&self) -> &'static str {
            "scripted"
        }

        async fn request_certificate(&self, req: &CertificateRequest) -> Result<IssuedCertificate> {
            assert_eq!(req.validation_method, ValidationMethod::Dns);
            Ok(IssuedCertificate {
                arn: "arn:test".into(),
                domain_validation_options: Vec::new(),
            })
        }

        async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail> {
            *self.calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop().unwrap()
            } else {
                statuses[0]
            };
            Ok(CertificateDetail {
                arn: arn.to_string(),
                domain_name: "example.com".into(),
                status,
                domain_validation_options: Vec::new(),
                failure_reason: None,
            })
        }

        fn wait_config(&self) -> WaitConfig {
            WaitConfig {
                poll_interval: Duration::from_secs(5),
                timeout: Duration::from_secs(30),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_once_issued() {
        let manager = ScriptedManager::new(vec![
            CertificateStatus::PendingValidation,
            CertificateStatus::PendingValidation,
            CertificateStatus::Issued,
        ]);
        let detail = manager.wait_until_validated("arn:test").await.unwrap();
        assert_eq!(detail.status, CertificateStatus::Issued);
        assert_eq!(manager.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_fails_on_terminal_status() {
        let manager = ScriptedManager::new(vec![
            CertificateStatus::PendingValidation,
            CertificateStatus::Failed,
        ]);
        let err = manager.wait_until_validated("arn:test").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ValidationFailed { reason, .. } if reason == "FAILED"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_while_pending() {
        let manager = ScriptedManager::new(vec![CertificateStatus::PendingValidation]);
        let err = manager.wait_until_validated("arn:test").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ValidationTimeout { waited_secs, .. } if waited_secs >= 30
        ));
        // t = 0, 5, ..., 30
        assert_eq!(manager.calls(), 7);
    }
}
