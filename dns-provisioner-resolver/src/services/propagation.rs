//! DNS propagation check module.

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::types::{PropagationResult, QueryType, ResolverServer, ServerAnswer, ServerOutcome};

use super::lookup::lookup;
use super::resolver::build_resolver_for_ns;

/// Ask one server, bounded by `limit`.
async fn query_server(
    server: ResolverServer,
    name: &str,
    query_type: QueryType,
    limit: Duration,
) -> ServerAnswer {
    let resolver = build_resolver_for_ns(server.ip, limit);
    let query_start = Instant::now();
    let outcome = timeout(limit, lookup(&resolver, name, query_type))
        .await
        .unwrap_or(ServerOutcome::Timeout);
    // u128 -> u64: elapsed millis for a DNS query will never exceed u64::MAX
    #[allow(clippy::cast_possible_truncation)]
    let response_time_ms = query_start.elapsed().as_millis() as u64;

    log::debug!("{server}: {query_type} {name} -> {outcome} ({response_time_ms} ms)");

    ServerAnswer {
        server,
        outcome,
        response_time_ms,
    }
}

/// Query every server, one after another, in list order.
pub(crate) async fn propagation_check(
    servers: &[ResolverServer],
    name: &str,
    query_type: QueryType,
    limit: Duration,
) -> PropagationResult {
    let start_time = Instant::now();

    let mut answers = Vec::with_capacity(servers.len());
    for server in servers {
        answers.push(query_server(server.clone(), name, query_type, limit).await);
    }

    // u128 -> u64: elapsed millis for a propagation check will never exceed u64::MAX
    #[allow(clippy::cast_possible_truncation)]
    let total_time_ms = start_time.elapsed().as_millis() as u64;

    PropagationResult {
        name: name.to_string(),
        query_type,
        answers,
        total_time_ms,
    }
}
