//! Public DNS probe abstract Trait

use async_trait::async_trait;

use dns_provisioner_resolver::{PropagationResult, PublicDnsClient, QueryType, ResolverResult};

/// Asks public recursive resolvers about a name.
///
/// [`PublicDnsClient`] is the production implementation; tests substitute
/// canned answers.
#[async_trait]
pub trait PublicDnsProbe: Send + Sync {
    /// Query every configured resolver, one after another.
    async fn probe(&self, name: &str, query_type: QueryType) -> ResolverResult<PropagationResult>;
}

#[async_trait]
impl PublicDnsProbe for PublicDnsClient {
    async fn probe(&self, name: &str, query_type: QueryType) -> ResolverResult<PropagationResult> {
        self.query(name, query_type).await
    }
}
