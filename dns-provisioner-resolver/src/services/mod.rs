//! Public resolver client.

mod lookup;
mod propagation;
mod resolver;

use std::time::Duration;

use hickory_resolver::proto::rr::Name;

use crate::error::{ResolverError, ResolverResult};
use crate::types::{PropagationResult, QueryType, ResolverServer};

/// Default per-server query timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Validate and normalise a record name before it is sent anywhere.
///
/// Trims whitespace and the trailing root dot, rejects empty and overlong
/// inputs and anything hickory cannot parse as a DNS name.
fn validate_name(name: &str) -> ResolverResult<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() {
        return Err(ResolverError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }
    if name.len() > 253 {
        return Err(ResolverError::ValidationError(format!(
            "Domain name exceeds maximum length of 253 characters (got {})",
            name.len()
        )));
    }
    if name.contains(char::is_whitespace) {
        return Err(ResolverError::ValidationError(format!(
            "Invalid domain name: {name}"
        )));
    }
    Name::from_ascii(name)
        .map_err(|e| ResolverError::ValidationError(format!("Invalid domain name: {name} ({e})")))?;
    Ok(name.to_ascii_lowercase())
}

/// Queries an ordered list of public recursive resolvers.
///
/// Servers are asked strictly one after another; each query is bounded by the
/// configured timeout, and a server that does not answer in time is recorded as
/// [`ServerOutcome::Timeout`](crate::ServerOutcome::Timeout).
///
/// ```rust,no_run
/// use dns_provisioner_resolver::{PublicDnsClient, QueryType};
/// # async fn demo() -> dns_provisioner_resolver::ResolverResult<()> {
/// let result = PublicDnsClient::new()
///     .query("contoso.com", QueryType::Mx)
///     .await?;
/// for answer in &result.answers {
///     println!("{}: {}", answer.server, answer.outcome);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PublicDnsClient {
    servers: Vec<ResolverServer>,
    timeout: Duration,
}

impl Default for PublicDnsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicDnsClient {
    /// Google, Cloudflare and Quad9 with a 5 second timeout.
    pub fn new() -> Self {
        Self {
            servers: ResolverServer::defaults(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replace the server list; an empty list is rejected.
    pub fn with_servers(mut self, servers: Vec<ResolverServer>) -> ResolverResult<Self> {
        if servers.is_empty() {
            return Err(ResolverError::InvalidServer(
                "at least one resolver is required".to_string(),
            ));
        }
        self.servers = servers;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn servers(&self) -> &[ResolverServer] {
        &self.servers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask every configured server for `name` records of `query_type`.
    ///
    /// Only an invalid name is an error; per-server failures are outcomes.
    pub async fn query(&self, name: &str, query_type: QueryType) -> ResolverResult<PropagationResult> {
        let name = validate_name(name)?;
        log::debug!(
            "Querying {} resolver(s) for {query_type} {name}",
            self.servers.len()
        );
        Ok(propagation::propagation_check(&self.servers, &name, query_type, self.timeout).await)
    }
}
