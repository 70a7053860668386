//! ACM HTTP 请求方法（AWS JSON 1.1 + `SigV4`）

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::types::ErrorResponse;
use super::{ACM_TARGET_PREFIX, AcmCertificateManager};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

impl AcmCertificateManager {
    /// 调用一个 ACM 操作
    ///
    /// Every attempt is signed with its own timestamp.
    pub(crate) async fn call<B, T>(
        &self,
        operation: &str,
        input: &B,
        context: ErrorContext,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(input).map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;
        let target = format!("{ACM_TARGET_PREFIX}.{operation}");

        let response = HttpUtils::execute_with_retry(
            || Ok(self.signed_request(&target, &payload)),
            self.provider_name(),
            operation,
            self.max_retries,
        )
        .await?;

        if !response.is_success() {
            let raw = match serde_json::from_str::<ErrorResponse>(&response.body) {
                Ok(body) => match body.code() {
                    Some(code) => RawApiError::with_code(
                        code,
                        body.message.clone().unwrap_or_default(),
                    ),
                    None => RawApiError::new(body.message.unwrap_or_default()),
                },
                Err(_) => RawApiError::new(format!("HTTP {}: {}", response.status, response.body)),
            };
            let err = self.map_error(raw, context);
            if err.is_expected() {
                log::warn!("{err}");
            } else {
                log::error!("{err}");
            }
            return Err(err);
        }

        HttpUtils::parse_json(&response.body, self.provider_name())
    }

    fn signed_request(&self, target: &str, payload: &str) -> reqwest::RequestBuilder {
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("content-type".to_string(), CONTENT_TYPE.to_string()),
            ("host".to_string(), self.host.clone()),
            ("x-amz-date".to_string(), amz_date.clone()),
            ("x-amz-target".to_string(), target.to_string()),
        ];
        if let Some(token) = &self.signer.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let authorization = self
            .signer
            .authorization("POST", "/", "", &headers, payload, &amz_date);

        let mut builder = self.client.post(&self.endpoint);
        for (name, value) in headers.into_iter().filter(|(name, _)| name != "host") {
            builder = builder.header(name, value);
        }
        builder
            .header("Authorization", authorization)
            .body(payload.to_string())
    }
}
