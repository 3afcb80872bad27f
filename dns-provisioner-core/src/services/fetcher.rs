//! Current record set of a zone.

use std::sync::Arc;

use dns_provisioner_provider::ProviderError;

use crate::error::CoreResult;
use crate::services::ZoneContext;
use crate::types::{DnsRecord, DnsRecordType, RecordQuery};

/// Records fetched from the provider, or the API error that prevented it.
///
/// An API-level rejection leaves `records` empty and sets `error`; the caller
/// decides whether an empty zone view is good enough to continue.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub records: Vec<DnsRecord>,
    pub error: Option<ProviderError>,
}

impl FetchResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Provider State Fetcher
pub struct RecordFetcher {
    ctx: Arc<ZoneContext>,
}

impl RecordFetcher {
    #[must_use]
    pub fn new(ctx: Arc<ZoneContext>) -> Self {
        Self { ctx }
    }

    /// Every record in the zone, all pages.
    pub async fn fetch_all(&self) -> CoreResult<FetchResult> {
        self.fetch(&RecordQuery::default()).await
    }

    /// Records of one type, optionally with one owner name.
    pub async fn fetch_filtered(
        &self,
        record_type: Option<DnsRecordType>,
        name: Option<&str>,
    ) -> CoreResult<FetchResult> {
        let query = RecordQuery {
            record_type,
            name: name.map(|n| self.ctx.qualify(n)),
            ..RecordQuery::default()
        };
        self.fetch(&query).await
    }

    /// Walk every page of `query`.
    ///
    /// Only transport failures are returned as errors.
    pub async fn fetch(&self, query: &RecordQuery) -> CoreResult<FetchResult> {
        match self
            .ctx
            .provider
            .list_all_records(self.ctx.zone_id(), query)
            .await
        {
            Ok(records) => {
                log::info!(
                    "Found {} DNS record(s) in {}",
                    records.len(),
                    self.ctx.zone_name()
                );
                Ok(FetchResult {
                    records,
                    error: None,
                })
            }
            Err(e) if e.is_transport() => Err(e.into()),
            Err(e) => {
                self.ctx.log_provider_error("Listing records", &e);
                Ok(FetchResult {
                    records: Vec::new(),
                    error: Some(e),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::{context, mx, MockProvider};

    #[tokio::test]
    async fn fetch_all_returns_records() {
        let provider = MockProvider::with_records(vec![mx("@", "mx.contoso.com", 0)]);
        let fetcher = RecordFetcher::new(context(&provider));

        let result = fetcher.fetch_all().await.unwrap();
        assert!(result.is_complete());
        assert_eq!(result.records.len(), 1);
    }

    #[tokio::test]
    async fn api_error_yields_empty_list() {
        let provider = MockProvider::new();
        provider
            .fail_list(ProviderError::PermissionDenied {
                provider: "mock".into(),
                raw_message: Some("Authentication error".into()),
            })
            .await;
        let fetcher = RecordFetcher::new(context(&provider));

        let result = fetcher.fetch_all().await.unwrap();
        assert!(result.records.is_empty());
        assert!(matches!(
            result.error,
            Some(ProviderError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let provider = MockProvider::new();
        provider
            .fail_list(ProviderError::Timeout {
                provider: "mock".into(),
                detail: "30s".into(),
            })
            .await;
        let fetcher = RecordFetcher::new(context(&provider));

        assert!(matches!(
            fetcher.fetch_all().await,
            Err(CoreError::Provider(ProviderError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn filters_by_type_and_name() {
        let provider = MockProvider::with_records(vec![
            mx("@", "mx.contoso.com", 0),
            DnsRecord::new(DnsRecordType::Txt, "@", "v=spf1 -all", 3600),
            DnsRecord::new(DnsRecordType::Txt, "www", "hello", 3600),
        ]);
        let fetcher = RecordFetcher::new(context(&provider));

        let result = fetcher
            .fetch_filtered(Some(DnsRecordType::Txt), Some("contoso.com"))
            .await
            .unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].content, "v=spf1 -all");
    }
}
