//! Shared HTTP plumbing for providers
//!
//! Providers build their own `RequestBuilder` (URL, auth header, body); this
//! module sends it once, classifies transport-level failures and hands back the
//! status code and body for provider-specific envelope decoding.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request exactly once and return `(status_code, response_text)`.
    ///
    /// * 429 becomes [`ProviderError::RateLimited`] (with `Retry-After` when given)
    /// * 502/503/504 become [`ProviderError::NetworkError`]
    /// * every other status is returned to the caller, whose envelope decides
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(truncate_for_log(&body)),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Gateway error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Decode a JSON body, mapping failures to [`ProviderError::ParseError`].
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] JSON parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug)]
    struct Envelope {
        success: bool,
    }

    #[test]
    fn parse_json_decodes_envelope() {
        let result: Result<Envelope, ProviderError> =
            HttpUtils::parse_json(r#"{"success":true,"errors":[]}"#, "cloudflare");
        assert!(
            matches!(&result, Ok(Envelope { success: true })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_json_html_error_page() {
        let result: Result<Envelope, ProviderError> =
            HttpUtils::parse_json("<html>Bad gateway</html>", "cloudflare");
        assert!(
            matches!(&result, Err(ProviderError::ParseError { provider, .. }) if provider == "cloudflare"),
            "unexpected parse result: {result:?}"
        );
    }
}
