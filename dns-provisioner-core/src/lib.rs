//! DNS Provisioner Core Library
//!
//! Record reconciliation and verification:
//! - desired-record sources (JSON blocks or `Key : Value` listings in noisy text)
//! - matching against the provider's records, with field-level diffs
//! - add / delete / replace through the provider API
//! - confirmation through the provider API and public resolvers
//!
//! The provider is reached through [`DnsProvider`](dns_provisioner_provider::DnsProvider)
//! and public DNS through [`PublicDnsProbe`], so both can be replaced in tests.

pub mod error;
pub mod services;
pub mod source;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    ApprovalPolicy, DeleteOutcome, Disposition, FetchResult, PropagationVerifier, Reconciler,
    RecordFetcher, RecordMatcher, RecordMutator, ZoneContext,
};
pub use source::{DesiredRecordSource, RecordSourceStrategy};
pub use traits::PublicDnsProbe;
