//! Reconciliation pipeline: fetch, classify, approve, mutate, verify.

use std::fmt;
use std::sync::Arc;

use dns_provisioner_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::services::{
    Disposition, PropagationVerifier, RecordFetcher, RecordMatcher, RecordMutator, ZoneContext,
};
use crate::traits::PublicDnsProbe;
use crate::types::{
    ChangeKind, DnsRecord, DnsRecordType, PlannedChange, ReconcileAction, ReconcileOutcome,
    RecordDiff,
};

/// Decides whether a planned change may be applied.
pub enum ApprovalPolicy {
    /// Apply every change.
    AutoApprove,
    /// Apply nothing; report what would change.
    AutoReject,
    /// Ask, once per change.
    Callback(Box<dyn Fn(&PlannedChange) -> bool + Send + Sync>),
}

impl ApprovalPolicy {
    pub fn approves(&self, change: &PlannedChange) -> bool {
        match self {
            Self::AutoApprove => true,
            Self::AutoReject => false,
            Self::Callback(ask) => ask(change),
        }
    }
}

impl fmt::Debug for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoApprove => f.write_str("AutoApprove"),
            Self::AutoReject => f.write_str("AutoReject"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Brings desired records into the zone, one at a time.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use dns_provisioner_core::services::{ApprovalPolicy, Reconciler, ZoneContext};
/// # use dns_provisioner_core::source::templates;
/// # use dns_provisioner_resolver::PublicDnsClient;
/// # async fn demo(ctx: Arc<ZoneContext>) -> dns_provisioner_core::CoreResult<()> {
/// let reconciler = Reconciler::new(ctx, Arc::new(PublicDnsClient::new()), ApprovalPolicy::AutoApprove);
/// let outcome = reconciler.reconcile(&templates::m365_mx("contoso.com")).await?;
/// println!("{:?}", outcome.action);
/// # Ok(())
/// # }
/// ```
pub struct Reconciler {
    fetcher: RecordFetcher,
    matcher: RecordMatcher,
    mutator: RecordMutator,
    verifier: PropagationVerifier,
    policy: ApprovalPolicy,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        ctx: Arc<ZoneContext>,
        probe: Arc<dyn PublicDnsProbe>,
        policy: ApprovalPolicy,
    ) -> Self {
        Self {
            matcher: RecordMatcher::for_zone(ctx.zone_name()),
            fetcher: RecordFetcher::new(Arc::clone(&ctx)),
            mutator: RecordMutator::new(Arc::clone(&ctx)),
            verifier: PropagationVerifier::new(ctx, probe),
            policy,
        }
    }

    pub fn verifier(&self) -> &PropagationVerifier {
        &self.verifier
    }

    pub fn mutator(&self) -> &RecordMutator {
        &self.mutator
    }

    /// The change needed to bring `desired` into `existing`, if any.
    pub fn plan(&self, desired: &DnsRecord, existing: &[DnsRecord]) -> Option<PlannedChange> {
        match self.matcher.classify(desired, existing) {
            Disposition::InSync(_) => None,
            Disposition::Stale { existing, diff } => Some(PlannedChange {
                kind: ChangeKind::Replace,
                desired: desired.clone(),
                existing: Some(existing),
                diff,
            }),
            Disposition::Missing => Some(PlannedChange {
                kind: ChangeKind::Create,
                desired: desired.clone(),
                existing: None,
                diff: RecordDiff::new(),
            }),
        }
    }

    /// Reconcile one record against the provider's records of its type.
    ///
    /// Only CNAME and SRV records are replaced when a record with the same name
    /// differs. Other types are added next to what is already there unless an
    /// identical record exists.
    pub async fn reconcile(&self, desired: &DnsRecord) -> CoreResult<ReconcileOutcome> {
        desired.validate()?;
        let mut current = self.fetch_current(Some(desired)).await?;
        if !replaces_in_place(desired.record_type) {
            current.retain(|existing| self.matcher.matches(desired, existing));
        }
        self.apply(desired, &current).await
    }

    /// Reconcile several records against a single fetch of the zone.
    ///
    /// Only validation and the initial fetch abort the batch; a rejected change
    /// becomes a [`ReconcileAction::Failed`] outcome and the next record is
    /// attempted. A record that exactly matches another desired record in the
    /// batch is never picked as the one to replace.
    pub async fn reconcile_all(&self, desired: &[DnsRecord]) -> CoreResult<Vec<ReconcileOutcome>> {
        for record in desired {
            record.validate()?;
        }
        let mut current = self.fetch_current(None).await?;
        let mut outcomes = Vec::with_capacity(desired.len());

        for (i, record) in desired.iter().enumerate() {
            let candidates: Vec<DnsRecord> = current
                .iter()
                .filter(|existing| {
                    desired
                        .iter()
                        .enumerate()
                        .all(|(j, other)| j == i || !self.matcher.matches(other, existing))
                })
                .cloned()
                .collect();

            let outcome = self.apply(record, &candidates).await?;
            match &outcome.action {
                ReconcileAction::Created { provider_id } => {
                    current.push(record.clone().with_provider_id(provider_id));
                }
                ReconcileAction::Replaced {
                    deleted_id,
                    provider_id,
                } => {
                    current.retain(|r| r.provider_id.as_deref() != Some(deleted_id.as_str()));
                    current.push(record.clone().with_provider_id(provider_id));
                }
                ReconcileAction::Failed {
                    deleted_id: Some(deleted_id),
                    ..
                } => {
                    current.retain(|r| r.provider_id.as_deref() != Some(deleted_id.as_str()));
                }
                ReconcileAction::InSync { .. }
                | ReconcileAction::Skipped { .. }
                | ReconcileAction::Failed { .. } => {}
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn fetch_current(&self, desired: Option<&DnsRecord>) -> CoreResult<Vec<DnsRecord>> {
        let fetched = match desired {
            Some(record) => self.fetcher.fetch_filtered(Some(record.record_type), None).await?,
            None => self.fetcher.fetch_all().await?,
        };
        // reconciling against an unknown zone could create duplicates
        match fetched.error {
            Some(e) => Err(e.into()),
            None => Ok(fetched.records),
        }
    }

    async fn apply(
        &self,
        desired: &DnsRecord,
        candidates: &[DnsRecord],
    ) -> CoreResult<ReconcileOutcome> {
        let Some(change) = self.plan(desired, candidates) else {
            let existing_id = candidates
                .iter()
                .find(|c| self.matcher.matches(desired, c))
                .and_then(|c| c.provider_id.clone());
            log::info!("Record already exists, no changes needed: {desired}");
            return Ok(ReconcileOutcome {
                desired: desired.clone(),
                action: ReconcileAction::InSync { existing_id },
                change: None,
                verification: None,
            });
        };

        if !self.policy.approves(&change) {
            log::info!("{:?} of {desired} not approved", change.kind);
            return Ok(ReconcileOutcome {
                desired: desired.clone(),
                action: ReconcileAction::Skipped { kind: change.kind },
                change: Some(change),
                verification: None,
            });
        }

        let (action, provider_id) = match self.mutate(desired, &change).await {
            Ok(done) => done,
            Err(e) => {
                if e.is_expected() {
                    log::warn!("{:?} of {desired} failed: {e}", change.kind);
                } else {
                    log::error!("{:?} of {desired} failed: {e}", change.kind);
                }
                let deleted_id = match &e {
                    CoreError::IncompleteReplace { deleted_id, .. } => Some(deleted_id.clone()),
                    _ => None,
                };
                return Ok(ReconcileOutcome {
                    desired: desired.clone(),
                    action: ReconcileAction::Failed {
                        kind: change.kind,
                        error: e.to_string(),
                        deleted_id,
                    },
                    change: Some(change),
                    verification: None,
                });
            }
        };

        let applied = desired.clone().with_provider_id(provider_id);
        let report = self.verifier.verify(&applied).await?;

        Ok(ReconcileOutcome {
            desired: desired.clone(),
            action,
            change: Some(change),
            verification: Some(report),
        })
    }

    async fn mutate(
        &self,
        desired: &DnsRecord,
        change: &PlannedChange,
    ) -> CoreResult<(ReconcileAction, String)> {
        let Some(existing) = &change.existing else {
            let provider_id = self.mutator.add(desired).await?;
            return Ok((
                ReconcileAction::Created {
                    provider_id: provider_id.clone(),
                },
                provider_id,
            ));
        };

        let deleted_id = existing.provider_id.clone().ok_or_else(|| {
            CoreError::Provider(ProviderError::ParseError {
                provider: "core".to_string(),
                detail: format!("existing record {existing} has no id"),
            })
        })?;
        log::info!("Replacing record {deleted_id} ({existing}) with {desired}");
        let provider_id = self.mutator.replace(&deleted_id, desired).await?;
        Ok((
            ReconcileAction::Replaced {
                deleted_id,
                provider_id: provider_id.clone(),
            },
            provider_id,
        ))
    }
}

/// Types an owner name holds one of, so a differing record is stale.
fn replaces_in_place(record_type: DnsRecordType) -> bool {
    matches!(record_type, DnsRecordType::Cname | DnsRecordType::Srv)
}
