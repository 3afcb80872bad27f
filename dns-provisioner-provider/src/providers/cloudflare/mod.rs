//! Cloudflare DNS Provider

mod error;
mod http;
mod provider;
mod types;

use std::fmt;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use types::{
    CloudflareDnsRecord, CloudflareResponse, CloudflareSrvData, CloudflareZone, CreateRecordBody,
};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare DNS Provider
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) base_url: String,
}

impl CloudflareProvider {
    pub fn new(api_token: String) -> Result<Self> {
        Self::with_base_url(api_token, CF_API_BASE)
    }

    /// Point the client at another API root (a mock server in tests).
    pub fn with_base_url(api_token: String, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client("cloudflare")?,
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &mask_secret(&self.api_token))
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
