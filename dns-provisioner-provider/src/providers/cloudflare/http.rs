//! Cloudflare HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_token))
    }

    /// Send once, decode the envelope and branch on `success`.
    ///
    /// Cloudflare reports validation failures as 4xx with a structured body, so
    /// the envelope is decoded before the status is looked at.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &str,
        url: &str,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let (status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), method, url).await?;

        let response = match HttpUtils::parse_json::<CloudflareResponse<T>>(
            &text,
            self.provider_name(),
        ) {
            Ok(response) => response,
            Err(_) if status >= 400 => {
                let err = self.status_error(status, &text, context);
                log::warn!("[cloudflare] {method} {url} failed: {err}");
                return Err(err);
            }
            Err(e) => return Err(e),
        };

        if !response.success {
            let raw = response.errors.first().map_or_else(
                || RawApiError::new(format!("HTTP {status} with no error detail")),
                |e| RawApiError::with_code(e.code.to_string(), e.message.clone()),
            );
            let err = self.envelope_error(status, raw, context);
            if err.is_expected() {
                log::warn!("[cloudflare] {method} {url} rejected: {err}");
            } else {
                log::error!("[cloudflare] {method} {url} failed: {err}");
            }
            return Err(err);
        }

        Ok(response)
    }

    fn require_result<T>(&self, response: CloudflareResponse<T>) -> Result<T> {
        response
            .result
            .ok_or_else(|| self.parse_error("response is missing the result field"))
    }

    /// GET a single object.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.authorized(self.client.get(&url));
        let response = self.send(builder, "GET", &url, context).await?;
        self.require_result(response)
    }

    /// GET a list, returning the items and the provider's total count.
    ///
    /// A missing `result_info` is treated as "this page is everything".
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        context: ErrorContext,
    ) -> Result<(Vec<T>, u32)> {
        let url = format!("{}{path_and_query}", self.base_url);
        let builder = self.authorized(self.client.get(&url));
        let response: CloudflareResponse<Vec<T>> = self.send(builder, "GET", &url, context).await?;

        let items = response.result.unwrap_or_default();
        let total_count = response.result_info.map_or_else(
            || u32::try_from(items.len()).unwrap_or(u32::MAX),
            |info| info.total_count,
        );
        Ok((items, total_count))
    }

    /// POST a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let body_json = serde_json::to_string(body).map_err(|e| ProviderError::InvalidParameter {
            provider: self.provider_name().to_string(),
            param: "body".to_string(),
            detail: e.to_string(),
        })?;
        log::debug!("[cloudflare] Request Body: {}", truncate_for_log(&body_json));

        let builder = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(body_json);
        let response = self.send(builder, "POST", &url, context).await?;
        self.require_result(response)
    }

    /// DELETE; the result payload (`{"id": ...}`) is ignored.
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.authorized(self.client.delete(&url));
        let _: CloudflareResponse<serde_json::Value> =
            self.send(builder, "DELETE", &url, context).await?;
        Ok(())
    }
}
