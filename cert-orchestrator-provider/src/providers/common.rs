//! Provider 公共工具函数

#[cfg(any(feature = "acm", feature = "cloudflare"))]
use std::time::Duration;

#[cfg(feature = "acm")]
use hmac::{Hmac, Mac};
#[cfg(any(feature = "acm", feature = "cloudflare"))]
use reqwest::Client;
use sha2::{Digest, Sha256};

#[cfg(any(feature = "acm", feature = "cloudflare"))]
use crate::error::{ProviderError, Result};

#[cfg(feature = "acm")]
type HmacSha256 = Hmac<Sha256>;

// ============ HTTP Client ============

/// 默认连接超时（秒）
#[cfg(any(feature = "acm", feature = "cloudflare"))]
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
#[cfg(any(feature = "acm", feature = "cloudflare"))]
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
#[cfg(any(feature = "acm", feature = "cloudflare"))]
pub fn create_http_client(provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

// ============ Hashing ============

/// HMAC-SHA256 计算（供 `SigV4` 签名使用）
#[cfg(feature = "acm")]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// SHA-256 的十六进制小写摘要
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点并转为小写
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// 候选 zone 名称，从最具体到最宽泛
/// 如: "_x.www.example.com." -> ["_x.www.example.com", "www.example.com", "example.com"]
///
/// The bare TLD is never a candidate.
#[cfg(feature = "cloudflare")]
pub fn zone_candidates(name: &str) -> Vec<String> {
    let normalized = normalize_domain_name(name);
    let labels: Vec<&str> = normalized.split('.').filter(|l| !l.is_empty()).collect();
    (0..labels.len().saturating_sub(1))
        .map(|i| labels[i..].join("."))
        .collect()
}
