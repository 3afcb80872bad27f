//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dns_provisioner_core::types::{DnsRecord, DnsRecordType};

/// Provision DNS records at Cloudflare and confirm they propagate.
#[derive(Parser, Debug)]
#[command(name = "dns-provisioner", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// Apply every change without asking
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Show what would change; change nothing
    #[arg(long, global = true, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials and resolver settings, normally from the environment.
#[derive(Args, Debug)]
pub struct Config {
    /// Cloudflare API token with Zone.DNS edit permission
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Cloudflare zone id
    #[arg(long, env = "CLOUDFLARE_ZONE_ID", global = true)]
    pub zone_id: Option<String>,

    /// Comma-separated public resolver IPs [default: 8.8.8.8,1.1.1.1,9.9.9.9]
    #[arg(long, env = "DNS_PROVISIONER_RESOLVERS", global = true)]
    pub resolvers: Option<String>,

    /// Per-resolver query timeout in seconds
    #[arg(
        long,
        env = "DNS_PROVISIONER_DNS_TIMEOUT",
        default_value_t = 5,
        global = true
    )]
    pub dns_timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile every record found in a document ("-" reads stdin)
    Sync { file: PathBuf },

    /// Add one record (replacing a stale one with the same type and name), then verify
    Add(RecordArgs),

    /// Delete a record by provider id, then confirm it is gone
    Delete { id: String },

    /// Verify one record through the provider API and public resolvers
    Verify {
        #[command(flatten)]
        record: RecordArgs,

        /// Provider id to re-fetch instead of searching the zone
        #[arg(long)]
        id: Option<String>,
    },

    /// List the zone's records
    List {
        #[arg(long = "type", value_name = "TYPE")]
        record_type: Option<DnsRecordType>,
    },

    /// Reconcile the Microsoft 365 MX record for a domain
    #[command(name = "m365-mx")]
    M365Mx { domain: String },

    /// Reconcile the Vercel apex A record for a domain
    Vercel { domain: String },

    /// Reconcile `<LABEL>.<ZONE> CNAME <TARGET>`
    Cname {
        zone: String,
        label: String,
        target: String,
    },
}

impl Command {
    /// Domain named on the command line, used to find the zone when no id is set.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::M365Mx { domain } | Self::Vercel { domain } => Some(domain),
            Self::Cname { zone, .. } => Some(zone),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long = "type", value_name = "TYPE")]
    pub record_type: DnsRecordType,

    /// Owner name: `@`, a label, or fully qualified
    #[arg(long)]
    pub name: String,

    /// Address, host or text; for SRV the target host
    #[arg(long)]
    pub content: String,

    #[arg(long, default_value_t = 3600)]
    pub ttl: u32,

    /// Required for MX and SRV
    #[arg(long)]
    pub priority: Option<u16>,

    /// SRV only [default: 1]
    #[arg(long)]
    pub weight: Option<u16>,

    /// SRV only [default: 443]
    #[arg(long)]
    pub port: Option<u16>,

    /// A and CNAME only
    #[arg(long)]
    pub proxied: bool,
}

impl RecordArgs {
    pub fn to_record(&self) -> DnsRecord {
        let mut record = DnsRecord::new(self.record_type, &self.name, &self.content, self.ttl);
        record.priority = self.priority;
        if self.record_type == DnsRecordType::Srv {
            record.weight = Some(self.weight.unwrap_or(1));
            record.port = Some(self.port.unwrap_or(443));
        }
        if self.record_type.is_proxiable() {
            record.proxied = self.proxied;
        }
        record
    }
}
