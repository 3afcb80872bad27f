//! `dns-provisioner` entry point.
//!
//! Configuration comes from flags or the environment (`CLOUDFLARE_API_TOKEN`,
//! `CLOUDFLARE_ZONE_ID`, `DNS_PROVISIONER_RESOLVERS`, `DNS_PROVISIONER_DNS_TIMEOUT`).
//! Logs go to stderr; reports go to stdout. Exit status is 0 when the step
//! succeeded and 1 otherwise.

mod cli;
mod commands;
mod prompt;
mod render;

use std::process::ExitCode;

use clap::Parser;
use dns_provisioner_core::CoreError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;

const VERBOSE_FILTER: &str = "info,dns_provisioner=debug,dns_provisioner_core=debug,\
dns_provisioner_provider=debug,dns_provisioner_resolver=debug";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // `log` records from the library crates are bridged by tracing-log
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(verbose),
        )
        .with(filter)
        .init();
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<CoreError>() {
        Some(core) if core.is_expected() => tracing::warn!("{err:#}"),
        _ => tracing::error!("{err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match commands::run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
