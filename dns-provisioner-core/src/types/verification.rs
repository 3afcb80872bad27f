//! Verification report types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dns_provisioner_provider::DnsRecord;
use dns_provisioner_resolver::PropagationResult;

/// Result of one observation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// The channel shows the expected record.
    Confirmed,
    /// The channel answered and the record is not (yet) there.
    NotConfirmed,
    /// The channel could not be asked.
    Unknown,
}

impl ChannelStatus {
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

/// Combined outcome of both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDisposition {
    /// Provider and at least one public resolver agree.
    FullyVerified,
    /// Provider has the record; public resolvers do not show it yet.
    PartiallyVerified,
    /// Provider does not show the record, whatever the resolvers say.
    Failed,
}

impl VerificationDisposition {
    pub fn from_channels(provider: ChannelStatus, public: ChannelStatus) -> Self {
        match (provider, public) {
            (ChannelStatus::Confirmed, ChannelStatus::Confirmed) => Self::FullyVerified,
            (ChannelStatus::Confirmed, _) => Self::PartiallyVerified,
            _ => Self::Failed,
        }
    }

    /// Fully and partially verified both count as success.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// What the provider API showed.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCheck {
    pub status: ChannelStatus,
    /// The record the provider returned, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<DnsRecord>,
    /// Why the record was not confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// What the public resolvers showed.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCheck {
    pub status: ChannelStatus,
    /// First resolver whose answer matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<String>,
    /// Per-resolver outcomes, in query order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation: Option<PropagationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of verifying one expected record through both channels.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub expected: DnsRecord,
    /// Fully qualified name sent to the resolvers.
    pub queried_name: String,
    pub provider: ProviderCheck,
    pub public: PublicCheck,
    pub disposition: VerificationDisposition,
    pub checked_at: DateTime<Utc>,
}

impl VerificationReport {
    pub fn is_success(&self) -> bool {
        self.disposition.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_table() {
        use ChannelStatus::{Confirmed, NotConfirmed, Unknown};
        use VerificationDisposition::{Failed, FullyVerified, PartiallyVerified};

        let cases = [
            (Confirmed, Confirmed, FullyVerified),
            (Confirmed, NotConfirmed, PartiallyVerified),
            (Confirmed, Unknown, PartiallyVerified),
            (NotConfirmed, Confirmed, Failed),
            (NotConfirmed, NotConfirmed, Failed),
            (Unknown, Confirmed, Failed),
        ];
        for (provider, public, expected) in cases {
            assert_eq!(
                VerificationDisposition::from_channels(provider, public),
                expected,
                "{provider:?}/{public:?}"
            );
        }
        assert!(PartiallyVerified.is_success());
        assert!(!Failed.is_success());
    }
}
