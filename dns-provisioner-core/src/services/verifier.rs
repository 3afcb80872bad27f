//! Propagation Verifier
//!
//! A record is confirmed through two channels: the provider API, re-read
//! after the change, and public recursive resolvers. Each channel has its own
//! comparison rules.

use std::sync::Arc;

use chrono::Utc;

use dns_provisioner_provider::{normalize_domain_name, ProviderError};
use dns_provisioner_resolver::{ObservedRecord, QueryType};

use crate::error::CoreResult;
use crate::services::{RecordMatcher, ZoneContext};
use crate::traits::PublicDnsProbe;
use crate::types::{
    ChannelStatus, DnsRecord, DnsRecordType, ProviderCheck, PublicCheck, RecordQuery, SrvContent,
    VerificationDisposition, VerificationReport,
};

fn query_type(record_type: DnsRecordType) -> QueryType {
    match record_type {
        DnsRecordType::A => QueryType::A,
        DnsRecordType::Mx => QueryType::Mx,
        DnsRecordType::Txt => QueryType::Txt,
        DnsRecordType::Cname => QueryType::Cname,
        DnsRecordType::Srv => QueryType::Srv,
    }
}

/// Host names compare without case or trailing dot.
fn same_host(a: &str, b: &str) -> bool {
    normalize_domain_name(a).eq_ignore_ascii_case(&normalize_domain_name(b))
}

/// Confirms records through the provider API and public resolvers.
pub struct PropagationVerifier {
    ctx: Arc<ZoneContext>,
    probe: Arc<dyn PublicDnsProbe>,
    matcher: RecordMatcher,
}

impl PropagationVerifier {
    #[must_use]
    pub fn new(ctx: Arc<ZoneContext>, probe: Arc<dyn PublicDnsProbe>) -> Self {
        let matcher = RecordMatcher::for_zone(ctx.zone_name());
        Self {
            ctx,
            probe,
            matcher,
        }
    }

    /// Check `expected` through both channels.
    ///
    /// Only an invalid `expected` is an error; channel failures are recorded in
    /// the report as [`ChannelStatus::Unknown`].
    pub async fn verify(&self, expected: &DnsRecord) -> CoreResult<VerificationReport> {
        expected.validate()?;

        let provider = self.check_provider(expected).await;
        let queried_name = self.ctx.qualify(&expected.name);
        let public = self.check_public(expected, &queried_name).await;
        let disposition = VerificationDisposition::from_channels(provider.status, public.status);

        match disposition {
            VerificationDisposition::FullyVerified => {
                log::info!("{queried_name} {} verified via provider and public DNS", expected.record_type);
            }
            VerificationDisposition::PartiallyVerified => log::info!(
                "{queried_name} {} present at provider, not yet visible in public DNS",
                expected.record_type
            ),
            VerificationDisposition::Failed => log::warn!(
                "{queried_name} {} not confirmed by provider: {}",
                expected.record_type,
                provider.detail.as_deref().unwrap_or("no matching record")
            ),
        }

        Ok(VerificationReport {
            expected: expected.clone(),
            queried_name,
            provider,
            public,
            disposition,
            checked_at: Utc::now(),
        })
    }

    /// Provider-channel comparison.
    ///
    /// SRV compares only the target; MX and CNAME compare hosts; A and TXT
    /// compare literally. MX also needs the same priority.
    pub fn provider_matches(&self, expected: &DnsRecord, observed: &DnsRecord) -> bool {
        if expected.record_type != observed.record_type
            || !self.matcher.same_name(&expected.name, &observed.name)
        {
            return false;
        }
        match expected.record_type {
            DnsRecordType::Srv => {
                let observed_target = SrvContent::target_of(&observed.content).unwrap_or_default();
                same_host(&expected.content, observed_target)
            }
            DnsRecordType::Cname => same_host(&expected.content, &observed.content),
            DnsRecordType::Mx => {
                same_host(&expected.content, &observed.content)
                    && expected.priority == observed.priority
            }
            DnsRecordType::A | DnsRecordType::Txt => {
                expected.content.trim() == observed.content.trim()
            }
        }
    }

    async fn check_provider(&self, expected: &DnsRecord) -> ProviderCheck {
        match &expected.provider_id {
            Some(id) => self.check_provider_by_id(expected, id).await,
            None => self.check_provider_by_listing(expected).await,
        }
    }

    async fn check_provider_by_id(&self, expected: &DnsRecord, id: &str) -> ProviderCheck {
        match self.ctx.provider.get_record(self.ctx.zone_id(), id).await {
            Ok(observed) if self.provider_matches(expected, &observed) => ProviderCheck {
                status: ChannelStatus::Confirmed,
                observed: Some(observed),
                detail: None,
            },
            Ok(observed) => ProviderCheck {
                status: ChannelStatus::NotConfirmed,
                detail: Some(format!("provider has {observed}")),
                observed: Some(observed),
            },
            Err(ProviderError::RecordNotFound { .. }) => ProviderCheck {
                status: ChannelStatus::NotConfirmed,
                observed: None,
                detail: Some(format!("record {id} not found")),
            },
            Err(e) => self.provider_unknown(&e),
        }
    }

    async fn check_provider_by_listing(&self, expected: &DnsRecord) -> ProviderCheck {
        let query = RecordQuery::of_type(expected.record_type);
        match self
            .ctx
            .provider
            .list_all_records(self.ctx.zone_id(), &query)
            .await
        {
            Ok(records) => match records
                .into_iter()
                .find(|r| self.provider_matches(expected, r))
            {
                Some(observed) => ProviderCheck {
                    status: ChannelStatus::Confirmed,
                    observed: Some(observed),
                    detail: None,
                },
                None => ProviderCheck {
                    status: ChannelStatus::NotConfirmed,
                    observed: None,
                    detail: Some("no matching record at provider".to_string()),
                },
            },
            Err(e) => self.provider_unknown(&e),
        }
    }

    fn provider_unknown(&self, err: &ProviderError) -> ProviderCheck {
        self.ctx.log_provider_error("Provider verification", err);
        ProviderCheck {
            status: ChannelStatus::Unknown,
            observed: None,
            detail: Some(format!("provider API: {err}")),
        }
    }

    async fn check_public(&self, expected: &DnsRecord, name: &str) -> PublicCheck {
        let result = match self
            .probe
            .probe(name, query_type(expected.record_type))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Public DNS query for {name} could not be issued: {e}");
                return PublicCheck {
                    status: ChannelStatus::Unknown,
                    matched_by: None,
                    propagation: None,
                    detail: Some(format!("public DNS: {e}")),
                };
            }
        };

        for answer in &result.answers {
            log::debug!("{}: {}", answer.server, answer.outcome);
        }

        let matched_by = result
            .observed()
            .find(|(_, record)| public_matches(expected, record))
            .map(|(server, _)| server.to_string());

        let (status, detail) = match &matched_by {
            Some(_) => (ChannelStatus::Confirmed, None),
            None => (
                ChannelStatus::NotConfirmed,
                Some("no resolver returned the expected value yet".to_string()),
            ),
        };
        PublicCheck {
            status,
            matched_by,
            propagation: Some(result),
            detail,
        }
    }
}

/// Public-channel comparison.
///
/// MX on (priority, host); SRV on all four fields; CNAME on host; TXT and A exact.
fn public_matches(expected: &DnsRecord, observed: &ObservedRecord) -> bool {
    match (expected.record_type, observed) {
        (DnsRecordType::A, ObservedRecord::A { address }) => {
            address.to_string() == expected.content.trim()
        }
        (DnsRecordType::Mx, ObservedRecord::Mx { preference, exchange }) => {
            expected.priority == Some(*preference) && same_host(&expected.content, exchange)
        }
        (DnsRecordType::Txt, ObservedRecord::Txt { text }) => *text == expected.content,
        (DnsRecordType::Cname, ObservedRecord::Cname { target }) => {
            same_host(&expected.content, target)
        }
        (
            DnsRecordType::Srv,
            ObservedRecord::Srv {
                priority,
                weight,
                port,
                target,
            },
        ) => {
            expected.priority == Some(*priority)
                && expected.weight == Some(*weight)
                && expected.port == Some(*port)
                && same_host(&expected.content, target)
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{context, mx, MockProbe, MockProvider};
    use dns_provisioner_resolver::{ResolverError, ServerOutcome};

    fn verifier(provider: &MockProvider, probe: MockProbe) -> PropagationVerifier {
        PropagationVerifier::new(context(provider), Arc::new(probe))
    }

    fn m365_mx() -> DnsRecord {
        mx("@", "contoso-com.mail.protection.outlook.com", 0)
    }

    fn observed_mx(preference: u16, exchange: &str) -> ObservedRecord {
        ObservedRecord::Mx {
            preference,
            exchange: exchange.to_string(),
        }
    }

    #[test]
    fn srv_provider_check_uses_target_only() {
        let provider = MockProvider::new();
        let v = verifier(&provider, MockProbe::nxdomain());
        let expected = DnsRecord::new(DnsRecordType::Srv, "_sip._tls", "sipdir.online.lync.com", 3600)
            .with_srv(100, 1, 443);
        let mut observed = expected.clone();
        observed.content = "1 443 sipdir.online.lync.com.".to_string();
        observed.port = Some(5061);
        assert!(v.provider_matches(&expected, &observed));
    }

    #[test]
    fn mx_provider_check_needs_priority() {
        let provider = MockProvider::new();
        let v = verifier(&provider, MockProbe::nxdomain());
        assert!(v.provider_matches(&m365_mx(), &mx("contoso.com", "CONTOSO-com.mail.protection.outlook.com.", 0)));
        assert!(!v.provider_matches(&m365_mx(), &mx("@", "contoso-com.mail.protection.outlook.com", 10)));
    }

    #[test]
    fn txt_provider_check_is_literal() {
        let provider = MockProvider::new();
        let v = verifier(&provider, MockProbe::nxdomain());
        let expected = DnsRecord::new(DnsRecordType::Txt, "@", "MS=ms123", 3600);
        let observed = DnsRecord::new(DnsRecordType::Txt, "@", "ms=ms123", 3600);
        assert!(!v.provider_matches(&expected, &observed));
    }

    #[test]
    fn public_comparison_rules() {
        let expected = m365_mx();
        assert!(public_matches(&expected, &observed_mx(0, "contoso-com.mail.protection.outlook.com.")));
        assert!(!public_matches(&expected, &observed_mx(10, "contoso-com.mail.protection.outlook.com")));

        let srv = DnsRecord::new(DnsRecordType::Srv, "_sip._tls", "sipdir.online.lync.com", 3600)
            .with_srv(100, 1, 443);
        let answer = ObservedRecord::Srv {
            priority: 100,
            weight: 1,
            port: 443,
            target: "sipdir.online.lync.com.".to_string(),
        };
        assert!(public_matches(&srv, &answer));
        let wrong_port = ObservedRecord::Srv {
            priority: 100,
            weight: 1,
            port: 5061,
            target: "sipdir.online.lync.com".to_string(),
        };
        assert!(!public_matches(&srv, &wrong_port));

        let a = DnsRecord::new(DnsRecordType::A, "contoso.com", "76.76.21.21", 60);
        assert!(public_matches(
            &a,
            &ObservedRecord::A {
                address: "76.76.21.21".parse().unwrap()
            }
        ));
        assert!(!public_matches(&a, &observed_mx(0, "76.76.21.21")));
    }

    #[tokio::test]
    async fn absent_at_provider_but_public_match_is_failed() {
        let provider = MockProvider::new();
        let probe = MockProbe::answers(vec![
            ServerOutcome::NxDomain,
            ServerOutcome::Answered {
                records: vec![observed_mx(0, "contoso-com.mail.protection.outlook.com")],
            },
            ServerOutcome::Timeout,
        ]);
        let report = verifier(&provider, probe).verify(&m365_mx()).await.unwrap();

        assert_eq!(report.public.status, ChannelStatus::Confirmed);
        assert_eq!(report.public.matched_by.as_deref(), Some("Cloudflare DNS (1.1.1.1)"));
        assert_eq!(report.provider.status, ChannelStatus::NotConfirmed);
        assert_eq!(report.disposition, VerificationDisposition::Failed);
        assert_eq!(report.queried_name, "contoso.com");
    }

    #[tokio::test]
    async fn provider_only_is_partially_verified() {
        let provider = MockProvider::with_records(vec![m365_mx()]);
        let expected = provider.records().await[0].clone();
        let probe = MockProbe::answers(vec![ServerOutcome::NoRecords, ServerOutcome::Timeout]);

        let report = verifier(&provider, probe).verify(&expected).await.unwrap();
        assert_eq!(report.provider.status, ChannelStatus::Confirmed);
        assert_eq!(report.public.status, ChannelStatus::NotConfirmed);
        assert_eq!(report.disposition, VerificationDisposition::PartiallyVerified);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn both_channels_is_fully_verified() {
        let provider = MockProvider::with_records(vec![m365_mx()]);
        let probe = MockProbe::answers(vec![ServerOutcome::Answered {
            records: vec![observed_mx(0, "contoso-com.mail.protection.outlook.com.")],
        }]);

        // no provider id: found by listing
        let report = verifier(&provider, probe).verify(&m365_mx()).await.unwrap();
        assert_eq!(report.disposition, VerificationDisposition::FullyVerified);
        assert!(report.provider.observed.is_some());
    }

    #[tokio::test]
    async fn unreachable_channels_are_unknown() {
        let provider = MockProvider::new();
        provider
            .fail_list(ProviderError::NetworkError {
                provider: "mock".into(),
                detail: "connection refused".into(),
            })
            .await;
        let probe = MockProbe::failing(ResolverError::ValidationError("bad name".into()));

        let report = verifier(&provider, probe).verify(&m365_mx()).await.unwrap();
        assert_eq!(report.provider.status, ChannelStatus::Unknown);
        assert_eq!(report.public.status, ChannelStatus::Unknown);
        assert_eq!(report.disposition, VerificationDisposition::Failed);
    }

    #[tokio::test]
    async fn deleted_id_is_not_confirmed() {
        let provider = MockProvider::new();
        let expected = m365_mx().with_provider_id("gone");
        let report = verifier(&provider, MockProbe::nxdomain())
            .verify(&expected)
            .await
            .unwrap();
        assert_eq!(report.provider.status, ChannelStatus::NotConfirmed);
        assert!(report.provider.detail.unwrap().contains("gone"));
    }

    #[tokio::test]
    async fn invalid_expected_record_is_rejected() {
        let provider = MockProvider::new();
        let no_priority = DnsRecord::new(DnsRecordType::Mx, "@", "mx.contoso.com", 3600);
        assert!(verifier(&provider, MockProbe::nxdomain())
            .verify(&no_priority)
            .await
            .is_err());
    }
}
