//! Subcommand handlers.
//!
//! Each handler returns `Ok(true)` when the step succeeded (fully or partially
//! verified), `Ok(false)` when it ran but did not succeed.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use dns_provisioner_core::source::templates;
use dns_provisioner_core::types::{DnsRecord, DnsRecordType, ReconcileOutcome};
use dns_provisioner_core::{
    ApprovalPolicy, CoreError, DesiredRecordSource, PropagationVerifier, PublicDnsProbe, Reconciler,
    RecordFetcher, RecordMutator, ZoneContext,
};
use dns_provisioner_provider::{create_provider, DnsProvider, ProviderCredentials};
use dns_provisioner_resolver::{PublicDnsClient, ResolverServer};

use crate::cli::{Cli, Command, Config};
use crate::prompt::{confirm, terminal_approval};
use crate::render;

fn provider(config: &Config) -> anyhow::Result<Arc<dyn DnsProvider>> {
    let api_token = config
        .api_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .context("CLOUDFLARE_API_TOKEN is not set")?;
    Ok(create_provider(ProviderCredentials::Cloudflare {
        api_token: api_token.to_string(),
    })?)
}

/// Zone from `--zone-id`, or looked up from the command's domain.
async fn zone_context(cli: &Cli) -> anyhow::Result<Arc<ZoneContext>> {
    let provider = provider(&cli.config)?;
    let ctx = match (cli.config.zone_id.as_deref(), cli.command.domain()) {
        (Some(zone_id), _) => ZoneContext::for_zone_id(provider, zone_id).await?,
        (None, Some(domain)) => ZoneContext::for_domain(provider, domain).await?,
        (None, None) => bail!("CLOUDFLARE_ZONE_ID is not set"),
    };
    log::info!("Zone: {} ({})", ctx.zone_name(), ctx.zone_id());
    Ok(Arc::new(ctx))
}

fn probe(config: &Config) -> anyhow::Result<Arc<dyn PublicDnsProbe>> {
    let mut client =
        PublicDnsClient::new().with_timeout(Duration::from_secs(config.dns_timeout.max(1)));
    if let Some(list) = &config.resolvers {
        client = client.with_servers(ResolverServer::parse_list(list)?)?;
    }
    Ok(Arc::new(client))
}

fn policy(cli: &Cli) -> ApprovalPolicy {
    if cli.dry_run {
        ApprovalPolicy::AutoReject
    } else if cli.yes {
        ApprovalPolicy::AutoApprove
    } else {
        terminal_approval()
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("reading stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub async fn run(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Command::Sync { file } => sync(cli, file).await,
        Command::Add(args) => reconcile_one(cli, &args.to_record()).await,
        Command::Delete { id } => delete(cli, id).await,
        Command::Verify { record, id } => {
            let mut expected = record.to_record();
            expected.provider_id.clone_from(id);
            verify(cli, &expected).await
        }
        Command::List { record_type } => list(cli, *record_type).await,
        Command::M365Mx { domain } => reconcile_one(cli, &templates::m365_mx(domain)).await,
        Command::Vercel { domain } => {
            let record = templates::vercel_apex(domain).map_err(CoreError::from)?;
            reconcile_one(cli, &record).await
        }
        Command::Cname {
            zone,
            label,
            target,
        } => reconcile_one(cli, &templates::cname(zone, label, target)).await,
    }
}

fn report_outcomes(cli: &Cli, outcomes: &[ReconcileOutcome]) -> anyhow::Result<bool> {
    if cli.json {
        render::print_json(outcomes)?;
    } else {
        for outcome in outcomes {
            render::print_outcome(outcome);
        }
    }
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        log::error!("{failed} of {} record(s) failed", outcomes.len());
    }
    Ok(failed == 0)
}

async fn sync(cli: &Cli, file: &Path) -> anyhow::Result<bool> {
    let text = read_document(file)?;
    let desired = DesiredRecordSource::default().parse(&text)?;
    log::info!("Parsed {} desired record(s)", desired.len());

    let reconciler = Reconciler::new(zone_context(cli).await?, probe(&cli.config)?, policy(cli));
    let outcomes = reconciler.reconcile_all(&desired).await?;
    report_outcomes(cli, &outcomes)
}

async fn reconcile_one(cli: &Cli, desired: &DnsRecord) -> anyhow::Result<bool> {
    desired.validate().map_err(CoreError::from)?;
    let reconciler = Reconciler::new(zone_context(cli).await?, probe(&cli.config)?, policy(cli));
    let outcome = reconciler.reconcile(desired).await?;
    report_outcomes(cli, std::slice::from_ref(&outcome))
}

async fn verify(cli: &Cli, expected: &DnsRecord) -> anyhow::Result<bool> {
    let verifier = PropagationVerifier::new(zone_context(cli).await?, probe(&cli.config)?);
    let report = verifier.verify(expected).await?;
    if cli.json {
        render::print_json(&report)?;
    } else {
        render::print_report(&report);
    }
    Ok(report.is_success())
}

async fn delete(cli: &Cli, id: &str) -> anyhow::Result<bool> {
    let mutator = RecordMutator::new(zone_context(cli).await?);

    if cli.dry_run {
        println!("Would delete record {id}");
        return Ok(true);
    }
    if !cli.yes && !confirm(&format!("Delete record {id}?")) {
        println!("Deletion cancelled.");
        return Ok(true);
    }

    let outcome = mutator.delete(id).await?;
    let confirmed = mutator.verify_deleted(id).await?;
    if cli.json {
        render::print_json(&serde_json::json!({
            "id": id,
            "outcome": outcome,
            "confirmed": confirmed,
        }))?;
    } else {
        render::print_delete(id, outcome, confirmed);
    }
    Ok(confirmed)
}

async fn list(cli: &Cli, record_type: Option<DnsRecordType>) -> anyhow::Result<bool> {
    let fetcher = RecordFetcher::new(zone_context(cli).await?);
    let fetched = fetcher.fetch_filtered(record_type, None).await?;
    if let Some(err) = &fetched.error {
        eprintln!("Cloudflare API error: {err}");
    }
    if cli.json {
        render::print_json(&fetched.records)?;
    } else {
        render::print_records(&fetched.records);
    }
    Ok(fetched.is_complete())
}
