//! Reconciliation plan and outcome types.

use serde::Serialize;

use dns_provisioner_provider::DnsRecord;

use super::diff::RecordDiff;
use super::verification::VerificationReport;

/// What a mutation would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The record is added; nothing is removed.
    Create,
    /// A record with this type and name exists with different values.
    Replace,
}

/// A mutation awaiting approval.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedChange {
    pub kind: ChangeKind,
    pub desired: DnsRecord,
    /// The record that would be deleted (replace only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<DnsRecord>,
    /// Empty for creates.
    pub diff: RecordDiff,
}

/// What the reconciler did for one desired record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// An identical record already exists; nothing was changed.
    InSync { existing_id: Option<String> },
    Created { provider_id: String },
    Replaced { deleted_id: String, provider_id: String },
    /// The change was not approved.
    Skipped { kind: ChangeKind },
    /// The provider rejected the change.
    ///
    /// `deleted_id` is set when a replace removed the old record but could not
    /// create the new one.
    Failed {
        kind: ChangeKind,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        deleted_id: Option<String>,
    },
}

/// Result of reconciling one desired record.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub desired: DnsRecord,
    #[serde(flatten)]
    pub action: ReconcileAction,
    /// The change that was proposed, approved or not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<PlannedChange>,
    /// Present when a mutation was applied and then verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

impl ReconcileOutcome {
    /// False when the change failed, or was applied and then failed verification.
    pub fn is_success(&self) -> bool {
        !matches!(self.action, ReconcileAction::Failed { .. })
            && self
                .verification
                .as_ref()
                .is_none_or(VerificationReport::is_success)
    }

    /// Whether the provider was changed.
    pub fn mutated(&self) -> bool {
        matches!(
            self.action,
            ReconcileAction::Created { .. } | ReconcileAction::Replaced { .. }
        )
    }
}
