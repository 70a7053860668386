//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use cert_orchestrator_provider::{
    AwsConfig, CertificateManager, DnsAdapter, DnsAdapterConfig, create_certificate_manager,
    create_dns_adapter,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name(domain: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}.{domain}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装 Provider 和测试域名
pub struct TestContext {
    pub manager: Option<Arc<dyn CertificateManager>>,
    pub dns: Option<Arc<dyn DnsAdapter>>,
    pub domain: String,
}

impl TestContext {
    /// 创建 ACM 测试上下文
    pub fn acm() -> Option<Self> {
        let config = AwsConfig {
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok()?,
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok()?,
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        };
        let domain = env::var("TEST_DOMAIN").ok()?;

        Some(Self {
            manager: Some(create_certificate_manager(&config).ok()?),
            dns: None,
            domain,
        })
    }

    /// 创建 Cloudflare 测试上下文
    pub fn cloudflare() -> Option<Self> {
        let api_token = env::var("CLOUDFLARE_API_TOKEN").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;

        let dns = create_dns_adapter(DnsAdapterConfig::Cloudflare {
            api_token,
            zone_id: env::var("CLOUDFLARE_ZONE_ID").ok(),
            ttl: 60,
        })
        .ok()?;

        Some(Self {
            manager: None,
            dns: Some(dns),
            domain,
        })
    }
}
