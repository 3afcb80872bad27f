//! Terminal approval.

use std::io::{self, BufRead, Write};

use dns_provisioner_core::ApprovalPolicy;

use crate::render::describe_change;

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask on stderr, read one line from stdin. Anything but y/yes is a no,
/// including end of input.
pub fn confirm(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            log::warn!("Could not read answer: {e}");
            false
        }
    }
}

/// Approval policy that shows each planned change and asks.
pub fn terminal_approval() -> ApprovalPolicy {
    ApprovalPolicy::Callback(Box::new(|change| {
        eprint!("{}", describe_change(change));
        confirm("Apply this change?")
    }))
}
