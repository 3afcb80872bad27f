//! Resolver construction.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::{
    TokioResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};

/// Build a resolver that talks only to `ns_ip` on port 53.
///
/// One attempt per query, bounded by `timeout`, and no cache: every
/// verification must observe the resolver's current answer.
pub(crate) fn build_resolver_for_ns(ns_ip: IpAddr, timeout: Duration) -> TokioResolver {
    let config = ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from_ips_clear(&[ns_ip], 53, true),
    );
    let provider = TokioConnectionProvider::default();
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.cache_size = 0;
    TokioResolver::builder_with_config(config, provider)
        .with_options(opts)
        .build()
}
