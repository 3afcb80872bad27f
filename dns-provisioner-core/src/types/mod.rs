//! Type definitions

mod diff;
mod reconcile;
mod verification;

pub use diff::{DiffField, FieldDiff, RecordDiff, MISSING};
pub use reconcile::{ChangeKind, PlannedChange, ReconcileAction, ReconcileOutcome};
pub use verification::{
    ChannelStatus, ProviderCheck, PublicCheck, VerificationDisposition, VerificationReport,
};

// Re-export provider library types
pub use dns_provisioner_provider::{
    DnsRecord, DnsRecordType, PaginatedResponse, RecordQuery, SrvContent, Zone,
};
