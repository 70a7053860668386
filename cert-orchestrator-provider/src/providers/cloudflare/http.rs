//! Cloudflare HTTP 请求方法

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareDnsAdapter, CloudflareResponse};

impl CloudflareDnsAdapter {
    /// 执行请求并解包 Cloudflare 响应信封
    ///
    /// `path_and_query` is appended to the API base, e.g. `/zones?name=example.com`.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{CF_API_BASE}{path_and_query}");
        let action = format!("{method} {path_and_query}");

        let body_json = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;

        let response = HttpUtils::execute_with_retry(
            || {
                let mut builder = self
                    .client
                    .request(method.clone(), &url)
                    .bearer_auth(&self.api_token);
                if let Some(json) = &body_json {
                    builder = builder
                        .header("Content-Type", "application/json")
                        .body(json.clone());
                }
                Ok(builder)
            },
            self.provider_name(),
            &action,
            self.max_retries,
        )
        .await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&response.body, self.provider_name())?;

        if !cf_response.success {
            let (code, message) = cf_response.first_error();
            let err = self.map_error(RawApiError::with_code(code, message), context);
            if err.is_expected() {
                log::warn!("{err}");
            } else {
                log::error!("{err}");
            }
            return Err(err);
        }

        cf_response
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }
}
