//! ACM API 类型定义（AWS JSON 1.1，字段为 `PascalCase`）

use serde::{Deserialize, Serialize};

/// AWS JSON 错误响应
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// e.g. `"com.amazonaws.acm#ValidationException"` or `"ValidationException"`
    #[serde(rename = "__type")]
    pub error_type: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// 去掉命名空间前缀的错误码
    pub fn code(&self) -> Option<&str> {
        self.error_type
            .as_deref()
            .map(|t| t.rsplit_once('#').map_or(t, |(_, code)| code))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestCertificateInput<'a> {
    pub domain_name: &'a str,
    pub validation_method: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub subject_alternative_names: &'a [String],
    pub idempotency_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestCertificateOutput {
    pub certificate_arn: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificateInput<'a> {
    pub certificate_arn: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificateOutput {
    pub certificate: AcmCertificate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcmCertificate {
    pub certificate_arn: String,
    pub domain_name: String,
    pub status: String,
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub domain_validation_options: Vec<AcmDomainValidation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcmDomainValidation {
    pub domain_name: String,
    #[allow(dead_code)]
    pub validation_status: Option<String>,
    pub resource_record: Option<AcmResourceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcmResourceRecord {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub value: String,
}
