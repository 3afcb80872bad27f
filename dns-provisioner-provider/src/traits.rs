use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecord, PaginatedResponse, RecordQuery, Zone};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

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
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录名称（用于 `RecordExists`）
    pub record_name: Option<String>,
    /// 记录 ID（用于 `RecordNotFound`）
    pub record_id: Option<String>,
    /// Zone ID 或域名（用于 `DomainNotFound`）
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn record(record_id: &str) -> Self {
        Self {
            record_id: Some(record_id.to_string()),
            ..Self::default()
        }
    }

    pub fn zone(zone: &str) -> Self {
        Self {
            domain: Some(zone.to_string()),
            ..Self::default()
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
pub(crate) trait ProviderErrorMapper {
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// A DNS provider's record management API.
///
/// Record names coming back from a provider are relative to the zone (`@` for
/// the apex). Names going in may be relative or fully qualified.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Fetch a zone by its provider id.
    async fn get_zone(&self, zone_id: &str) -> Result<Zone>;

    /// Resolve a domain name to the zone that hosts it.
    async fn find_zone(&self, domain: &str) -> Result<Zone>;

    /// One page of records.
    async fn list_records(
        &self,
        zone_id: &str,
        query: &RecordQuery,
    ) -> Result<PaginatedResponse<DnsRecord>>;

    /// Fetch a single record by its provider id.
    async fn get_record(&self, zone_id: &str, record_id: &str) -> Result<DnsRecord>;

    /// Create a record; the returned value carries the assigned `provider_id`.
    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord>;

    /// Delete by id. A missing id surfaces as [`ProviderError::RecordNotFound`].
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    /// Walk every page starting at `query.page` and collect all records.
    ///
    /// Pages are requested one after another; the first failing page aborts the walk.
    async fn list_all_records(&self, zone_id: &str, query: &RecordQuery) -> Result<Vec<DnsRecord>> {
        let mut records = Vec::new();
        let mut page = query.page.max(1);

        loop {
            let response = self.list_records(zone_id, &query.with_page(page)).await?;
            // a page may come back empty when it only held unsupported types
            let last_page = response.total_count.div_ceil(response.per_page.max(1));
            records.extend(response.items);

            if !response.has_more || page >= last_page {
                break;
            }
            page += 1;
        }

        log::debug!(
            "[{}] Listed {} record(s) in zone {zone_id}",
            self.id(),
            records.len()
        );
        Ok(records)
    }
}
