//! Human-readable and JSON output.

use serde::Serialize;

use dns_provisioner_core::types::{
    ChangeKind, ChannelStatus, DnsRecord, PlannedChange, ReconcileAction, ReconcileOutcome,
    VerificationDisposition, VerificationReport,
};
use dns_provisioner_core::DeleteOutcome;

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn record_line(record: &DnsRecord) -> String {
    let mut line = record.to_string();
    if record.proxied {
        line.push_str(" (proxied)");
    }
    if let Some(id) = &record.provider_id {
        line = format!("{id:<34} {line}");
    }
    line
}

pub fn print_records(records: &[DnsRecord]) {
    if records.is_empty() {
        println!("No DNS records found.");
        return;
    }
    for record in records {
        println!("{}", record_line(record));
    }
    println!("{} record(s)", records.len());
}

/// The change a prompt is about to ask for.
pub fn describe_change(change: &PlannedChange) -> String {
    let mut text = match change.kind {
        ChangeKind::Create => format!("Create: {}\n", change.desired),
        ChangeKind::Replace => format!(
            "Replace (delete then add): {}\n",
            change
                .existing
                .as_ref()
                .map_or_else(String::new, record_line)
        ),
    };
    for (field, diff) in &change.diff {
        text.push_str(&format!(
            "  {field:<9} {} -> {}\n",
            diff.existing, diff.proposed
        ));
    }
    text
}

fn channel(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Confirmed => "confirmed",
        ChannelStatus::NotConfirmed => "not confirmed",
        ChannelStatus::Unknown => "unknown",
    }
}

pub fn print_report(report: &VerificationReport) {
    println!(
        "Verification of {} {} {}",
        report.queried_name, report.expected.record_type, report.expected.content
    );
    println!(
        "  provider API:   {}{}",
        channel(report.provider.status),
        report
            .provider
            .detail
            .as_deref()
            .map_or_else(String::new, |d| format!(" ({d})"))
    );
    println!(
        "  public DNS:     {}{}",
        channel(report.public.status),
        report
            .public
            .matched_by
            .as_deref()
            .map_or_else(String::new, |s| format!(" (via {s})"))
    );
    if let Some(propagation) = &report.public.propagation {
        for answer in &propagation.answers {
            println!(
                "    {:<28} {} [{} ms]",
                answer.server.to_string(),
                answer.outcome,
                answer.response_time_ms
            );
        }
    }
    let verdict = match report.disposition {
        VerificationDisposition::FullyVerified => "fully verified",
        VerificationDisposition::PartiallyVerified => {
            "partially verified (public DNS may take time to update)"
        }
        VerificationDisposition::Failed => "FAILED",
    };
    println!("  result:         {verdict}");
}

pub fn print_outcome(outcome: &ReconcileOutcome) {
    match &outcome.action {
        ReconcileAction::InSync { .. } => {
            println!("= {} (already in place)", outcome.desired);
        }
        ReconcileAction::Created { provider_id } => {
            println!("+ {} (id {provider_id})", outcome.desired);
        }
        ReconcileAction::Replaced {
            deleted_id,
            provider_id,
        } => {
            println!(
                "~ {} (replaced {deleted_id}, new id {provider_id})",
                outcome.desired
            );
        }
        ReconcileAction::Skipped { .. } => {
            println!("- {} (not applied)", outcome.desired);
            if let Some(change) = &outcome.change {
                print!("{}", describe_change(change));
            }
        }
        ReconcileAction::Failed {
            error, deleted_id, ..
        } => {
            println!("! {} (failed: {error})", outcome.desired);
            if let Some(id) = deleted_id {
                println!("  record {id} was deleted and not replaced");
            }
        }
    }
    if let Some(report) = &outcome.verification {
        print_report(report);
    }
}

pub fn print_delete(id: &str, outcome: DeleteOutcome, confirmed: bool) {
    match outcome {
        DeleteOutcome::Deleted => println!("Deleted record {id}"),
        DeleteOutcome::AlreadyAbsent => println!("Record {id} was already absent"),
    }
    if confirmed {
        println!("Provider no longer returns {id}");
    } else {
        println!("Provider still returns {id}");
    }
}
