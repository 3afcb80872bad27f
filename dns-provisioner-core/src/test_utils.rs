//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dns_provisioner_provider::{
    qualify_name, DnsProvider, DnsRecord, DnsRecordType, PaginatedResponse, ProviderError,
    RecordQuery, Result, Zone,
};
use dns_provisioner_resolver::{
    PropagationResult, QueryType, ResolverError, ResolverResult, ResolverServer, ServerAnswer,
    ServerOutcome,
};

use crate::services::ZoneContext;
use crate::traits::PublicDnsProbe;

pub const ZONE_ID: &str = "zone-1";
pub const ZONE_NAME: &str = "contoso.com";

pub fn zone() -> Zone {
    Zone {
        id: ZONE_ID.to_string(),
        name: ZONE_NAME.to_string(),
        status: "active".to_string(),
    }
}

pub fn mx(name: &str, host: &str, priority: u16) -> DnsRecord {
    DnsRecord::new(DnsRecordType::Mx, name, host, 3600).with_priority(priority)
}

/// Zone context over a shared mock provider.
pub fn context(provider: &MockProvider) -> Arc<ZoneContext> {
    Arc::new(ZoneContext::new(Arc::new(provider.clone()), zone()))
}

// ===== MockProvider =====

#[derive(Default)]
struct MockState {
    records: RwLock<Vec<DnsRecord>>,
    /// "list" / "get <id>" / "create <record>" / "delete <id>", in call order
    calls: RwLock<Vec<String>>,
    list_error: RwLock<Option<ProviderError>>,
    create_error: RwLock<Option<ProviderError>>,
    /// Creates whose content equals the key fail with the error.
    rejected_contents: RwLock<Vec<(String, ProviderError)>>,
    next_id: AtomicUsize,
}

/// In-memory zone. Clones share state, so a test can keep a handle while the
/// services own another.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<MockState>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the zone; records without an id get one.
    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let mut issued = 0;
        let seeded: Vec<DnsRecord> = records
            .into_iter()
            .map(|r| match r.provider_id {
                Some(_) => r,
                None => {
                    issued += 1;
                    r.with_provider_id(format!("rec-{issued}"))
                }
            })
            .collect();
        Self {
            state: Arc::new(MockState {
                records: RwLock::new(seeded),
                next_id: AtomicUsize::new(issued),
                ..MockState::default()
            }),
        }
    }

    fn next_id(&self) -> String {
        format!("rec-{}", self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn records(&self) -> Vec<DnsRecord> {
        self.state.records.read().await.clone()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.calls.read().await.clone()
    }

    /// Make every listing fail with `err`.
    pub async fn fail_list(&self, err: ProviderError) {
        *self.state.list_error.write().await = Some(err);
    }

    /// Make every create fail with `err`.
    pub async fn fail_create(&self, err: ProviderError) {
        *self.state.create_error.write().await = Some(err);
    }

    /// Make creates of records with this content fail with `err`.
    pub async fn reject_content(&self, content: &str, err: ProviderError) {
        self.state
            .rejected_contents
            .write()
            .await
            .push((content.to_string(), err));
    }

    async fn record_call(&self, call: String) {
        self.state.calls.write().await.push(call);
    }

    fn not_found(record_id: &str) -> ProviderError {
        ProviderError::RecordNotFound {
            provider: "mock".to_string(),
            record_id: record_id.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        if zone_id == ZONE_ID {
            Ok(zone())
        } else {
            Err(ProviderError::DomainNotFound {
                provider: "mock".to_string(),
                domain: zone_id.to_string(),
                raw_message: None,
            })
        }
    }

    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        if qualify_name(domain, ZONE_NAME).eq_ignore_ascii_case(ZONE_NAME) {
            Ok(zone())
        } else {
            Err(ProviderError::DomainNotFound {
                provider: "mock".to_string(),
                domain: domain.to_string(),
                raw_message: None,
            })
        }
    }

    async fn list_records(
        &self,
        _zone_id: &str,
        query: &RecordQuery,
    ) -> Result<PaginatedResponse<DnsRecord>> {
        self.record_call("list".to_string()).await;
        if let Some(err) = self.state.list_error.read().await.clone() {
            return Err(err);
        }

        let matching: Vec<DnsRecord> = self
            .state
            .records
            .read()
            .await
            .iter()
            .filter(|r| query.record_type.is_none_or(|t| t == r.record_type))
            .filter(|r| {
                query.name.as_deref().is_none_or(|n| {
                    qualify_name(n, ZONE_NAME).eq_ignore_ascii_case(&qualify_name(&r.name, ZONE_NAME))
                })
            })
            .cloned()
            .collect();

        let page = query.page.max(1);
        let per_page = query.per_page.clamp(1, 100);
        let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);
        let items = matching
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    async fn get_record(&self, _zone_id: &str, record_id: &str) -> Result<DnsRecord> {
        self.record_call(format!("get {record_id}")).await;
        self.state
            .records
            .read()
            .await
            .iter()
            .find(|r| r.provider_id.as_deref() == Some(record_id))
            .cloned()
            .ok_or_else(|| Self::not_found(record_id))
    }

    async fn create_record(&self, _zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        self.record_call(format!("create {record}")).await;
        if let Some(err) = self.state.create_error.read().await.clone() {
            return Err(err);
        }
        if let Some((_, err)) = self
            .state
            .rejected_contents
            .read()
            .await
            .iter()
            .find(|(content, _)| *content == record.content)
        {
            return Err(err.clone());
        }
        let created = record.clone().with_provider_id(self.next_id());
        self.state.records.write().await.push(created.clone());
        Ok(created)
    }

    async fn delete_record(&self, _zone_id: &str, record_id: &str) -> Result<()> {
        self.record_call(format!("delete {record_id}")).await;
        let mut records = self.state.records.write().await;
        let before = records.len();
        records.retain(|r| r.provider_id.as_deref() != Some(record_id));
        if records.len() == before {
            return Err(Self::not_found(record_id));
        }
        Ok(())
    }
}

// ===== MockProbe =====

/// Canned resolver answers, handed out to the default servers in order.
pub struct MockProbe {
    outcomes: std::result::Result<Vec<ServerOutcome>, ResolverError>,
}

impl MockProbe {
    pub fn answers(outcomes: Vec<ServerOutcome>) -> Self {
        Self {
            outcomes: Ok(outcomes),
        }
    }

    /// Every resolver says NXDOMAIN.
    pub fn nxdomain() -> Self {
        Self::answers(vec![ServerOutcome::NxDomain; 3])
    }

    pub fn failing(err: ResolverError) -> Self {
        Self { outcomes: Err(err) }
    }
}

#[async_trait]
impl PublicDnsProbe for MockProbe {
    async fn probe(&self, name: &str, query_type: QueryType) -> ResolverResult<PropagationResult> {
        let outcomes = self.outcomes.clone()?;
        let answers = ResolverServer::defaults()
            .into_iter()
            .zip(outcomes)
            .map(|(server, outcome)| ServerAnswer {
                server,
                outcome,
                response_time_ms: 1,
            })
            .collect::<Vec<_>>();
        Ok(PropagationResult {
            name: name.to_string(),
            query_type,
            total_time_ms: answers.len() as u64,
            answers,
        })
    }
}
