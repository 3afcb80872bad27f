//! 业务逻辑服务层
//!
//! Every service works on one zone at a time through a shared [`ZoneContext`].
//! All provider and resolver calls are awaited one after another.

mod fetcher;
mod matcher;
mod mutator;
mod reconciler;
mod verifier;

pub use fetcher::{FetchResult, RecordFetcher};
pub use matcher::{Disposition, RecordMatcher};
pub use mutator::{DeleteOutcome, RecordMutator};
pub use reconciler::{ApprovalPolicy, Reconciler};
pub use verifier::PropagationVerifier;

use std::sync::Arc;

use dns_provisioner_provider::{qualify_name, DnsProvider, ProviderError, Zone};

use crate::error::CoreResult;

/// The provider client and the zone it operates on.
pub struct ZoneContext {
    pub provider: Arc<dyn DnsProvider>,
    pub zone: Zone,
}

impl ZoneContext {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>, zone: Zone) -> Self {
        Self { provider, zone }
    }

    /// Look the zone up by id.
    pub async fn for_zone_id(provider: Arc<dyn DnsProvider>, zone_id: &str) -> CoreResult<Self> {
        let zone = provider.get_zone(zone_id).await?;
        log::debug!("Using zone {} ({})", zone.name, zone.id);
        Ok(Self::new(provider, zone))
    }

    /// Look the zone up by its domain name.
    pub async fn for_domain(provider: Arc<dyn DnsProvider>, domain: &str) -> CoreResult<Self> {
        let zone = provider.find_zone(domain).await?;
        log::debug!("Resolved {domain} to zone {}", zone.id);
        Ok(Self::new(provider, zone))
    }

    pub fn zone_id(&self) -> &str {
        &self.zone.id
    }

    pub fn zone_name(&self) -> &str {
        &self.zone.name
    }

    /// Fully qualified form of an owner name in this zone.
    pub fn qualify(&self, name: &str) -> String {
        qualify_name(name, &self.zone.name).to_ascii_lowercase()
    }

    /// Log a provider error at the level its classification calls for.
    pub(crate) fn log_provider_error(&self, action: &str, err: &ProviderError) {
        if err.is_expected() {
            log::warn!("[{}] {action} failed: {err}", self.provider.id());
        } else {
            log::error!("[{}] {action} failed: {err}", self.provider.id());
        }
    }
}
