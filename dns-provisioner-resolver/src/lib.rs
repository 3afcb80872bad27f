//! Public recursive resolver queries for dns-provisioner.
//!
//! 向公共 DNS 服务器（Google、Cloudflare、Quad9）逐个查询记录，用于确认记录已传播。
//! 每个服务器的结果（应答、NXDOMAIN、无记录、超时、错误）单独记录，不视为整体失败。

mod error;
mod services;
mod types;

pub use error::{ResolverError, ResolverResult};
pub use services::{DEFAULT_TIMEOUT_SECS, PublicDnsClient};
pub use types::{
    ObservedRecord, PropagationResult, QueryType, ResolverServer, ServerAnswer, ServerOutcome,
};
