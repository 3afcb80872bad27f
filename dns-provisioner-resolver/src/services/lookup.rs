//! DNS 查询模块

use hickory_resolver::{ResolveError, TokioResolver, proto::rr::RecordType};

use crate::types::{ObservedRecord, QueryType, ServerOutcome};

fn host(name: &impl ToString) -> String {
    name.to_string().trim_end_matches('.').to_string()
}

/// Classify a failed lookup. NXDOMAIN is checked first since hickory also
/// reports it as "no records found".
fn classify_error(e: &ResolveError) -> ServerOutcome {
    if e.is_nx_domain() {
        ServerOutcome::NxDomain
    } else if e.is_no_records_found() {
        ServerOutcome::NoRecords
    } else {
        ServerOutcome::Failed {
            error: e.to_string(),
        }
    }
}

fn answered(records: Vec<ObservedRecord>) -> ServerOutcome {
    if records.is_empty() {
        ServerOutcome::NoRecords
    } else {
        ServerOutcome::Answered { records }
    }
}

/// Query one resolver for `name`.
pub(crate) async fn lookup(
    resolver: &TokioResolver,
    name: &str,
    query_type: QueryType,
) -> ServerOutcome {
    let result = match query_type {
        QueryType::A => lookup_a(resolver, name).await,
        QueryType::Mx => lookup_mx(resolver, name).await,
        QueryType::Txt => lookup_txt(resolver, name).await,
        QueryType::Cname => lookup_cname(resolver, name).await,
        QueryType::Srv => lookup_srv(resolver, name).await,
    };
    match result {
        Ok(records) => answered(records),
        Err(e) => classify_error(&e),
    }
}

async fn lookup_a(resolver: &TokioResolver, name: &str) -> Result<Vec<ObservedRecord>, ResolveError> {
    let response = resolver.ipv4_lookup(name).await?;
    Ok(response
        .iter()
        .map(|ip| ObservedRecord::A { address: ip.0 })
        .collect())
}

async fn lookup_mx(resolver: &TokioResolver, name: &str) -> Result<Vec<ObservedRecord>, ResolveError> {
    let response = resolver.mx_lookup(name).await?;
    Ok(response
        .iter()
        .map(|mx| ObservedRecord::Mx {
            preference: mx.preference(),
            exchange: host(mx.exchange()),
        })
        .collect())
}

async fn lookup_txt(resolver: &TokioResolver, name: &str) -> Result<Vec<ObservedRecord>, ResolveError> {
    let response = resolver.txt_lookup(name).await?;
    Ok(response
        .iter()
        .map(|txt| ObservedRecord::Txt {
            text: txt
                .iter()
                .map(|data| String::from_utf8_lossy(data).to_string())
                .collect::<String>(),
        })
        .collect())
}

/// CNAME needs a generic lookup; the typed helpers would follow the alias.
async fn lookup_cname(resolver: &TokioResolver, name: &str) -> Result<Vec<ObservedRecord>, ResolveError> {
    let response = resolver.lookup(name, RecordType::CNAME).await?;
    Ok(response
        .record_iter()
        .filter_map(|record| record.data().as_cname())
        .map(|cname| ObservedRecord::Cname {
            target: host(&cname.0),
        })
        .collect())
}

async fn lookup_srv(resolver: &TokioResolver, name: &str) -> Result<Vec<ObservedRecord>, ResolveError> {
    let response = resolver.srv_lookup(name).await?;
    Ok(response
        .iter()
        .map(|srv| ObservedRecord::Srv {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: host(srv.target()),
        })
        .collect())
}
