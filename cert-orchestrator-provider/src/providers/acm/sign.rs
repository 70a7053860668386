//! AWS Signature Version 4

use std::fmt::Write;

use crate::providers::common::{hmac_sha256, sha256_hex};
use crate::types::AwsConfig;
use crate::utils::log_sanitizer::truncate_for_log;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one service in one region.
/// Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html>
#[derive(Clone)]
pub(crate) struct SigV4Signer {
    pub(crate) access_key_id: String,
    secret_access_key: String,
    pub(crate) session_token: Option<String>,
    pub(crate) region: String,
    service: &'static str,
}

impl SigV4Signer {
    pub(crate) fn new(config: &AwsConfig, service: &'static str) -> Self {
        Self {
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            session_token: config.session_token.clone(),
            region: config.region.clone(),
            service,
        }
    }

    /// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
    fn signing_key(&self, date: &str) -> Vec<u8> {
        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"aws4_request")
    }

    /// Value of the `Authorization` header.
    ///
    /// `headers` must contain every header to sign, including `host` and
    /// `x-amz-date`; `amz_date` is the same `YYYYMMDD'T'HHMMSS'Z'` value.
    pub(crate) fn authorization(
        &self,
        method: &str,
        uri: &str,
        query: &str,
        headers: &[(String, String)],
        payload: &str,
        amz_date: &str,
    ) -> String {
        // 1. Query String sorting (already URI-encoded by the caller)
        let canonical_query = if query.is_empty() {
            String::new()
        } else {
            let mut params: Vec<&str> = query.split('&').collect();
            params.sort_unstable();
            params.join("&")
        };

        // 2. Canonical headers: lowercase names, trimmed values, sorted by name
        let mut sorted_headers: Vec<(String, &str)> = headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.trim()))
            .collect();
        sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));

        let canonical_headers = sorted_headers
            .iter()
            .fold(String::new(), |mut acc, (k, v)| {
                let _ = writeln!(acc, "{k}:{v}");
                acc
            });

        let signed_headers = sorted_headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        // 3. Canonical request
        let canonical_uri = if uri.is_empty() { "/" } else { uri };
        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{}",
            sha256_hex(payload.as_bytes())
        );

        log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

        // 4. String to sign
        let date = amz_date.get(..8).unwrap_or(amz_date);
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        log::debug!("StringToSign:\n{string_to_sign}");

        // 5. Signature
        let signature = hex::encode(hmac_sha256(
            &self.signing_key(date),
            string_to_sign.as_bytes(),
        ));

        format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key_id
        )
    }
}
