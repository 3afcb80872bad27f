//! Desired-record sources.
//!
//! Desired records arrive as free-form text (PowerShell transcripts, log
//! captures) with one structured block somewhere inside. [`DesiredRecordSource`]
//! cleans the text and runs its strategies in order; the first one that yields
//! records wins.

mod pattern;
mod structured;
pub mod templates;

use std::sync::LazyLock;

use regex::Regex;

use dns_provisioner_provider::DnsRecord;

use crate::error::{CoreError, CoreResult};

pub use pattern::PatternParser;
pub use structured::StructuredParser;

/// One way of reading desired records out of text.
pub trait RecordSourceStrategy: Send + Sync {
    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;

    /// Extract records. `Ok(vec![])` means "nothing recognisable here".
    fn parse(&self, text: &str) -> CoreResult<Vec<DnsRecord>>;
}

static ANSI_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").ok());

/// Remove ANSI escapes and PowerShell `VERBOSE:` lines.
pub fn strip_noise(raw: &str) -> String {
    let without_ansi = match ANSI_ESCAPE.as_ref() {
        Some(re) => re.replace_all(raw, ""),
        None => raw.into(),
    };
    without_ansi
        .lines()
        .filter(|line| !line.trim_start().starts_with("VERBOSE:"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs [`StructuredParser`] then [`PatternParser`] (by default) over cleaned text.
///
/// Every returned record has passed [`DnsRecord::validate`]. When no strategy
/// yields a record the result is [`CoreError::ParseError`]; nothing is ever
/// made up to fill the gap.
pub struct DesiredRecordSource {
    strategies: Vec<Box<dyn RecordSourceStrategy>>,
}

impl Default for DesiredRecordSource {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StructuredParser),
            Box::new(PatternParser::new()),
        ])
    }
}

impl DesiredRecordSource {
    pub fn new(strategies: Vec<Box<dyn RecordSourceStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn parse(&self, raw: &str) -> CoreResult<Vec<DnsRecord>> {
        let text = strip_noise(raw);
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.parse(&text) {
                Ok(records) if records.is_empty() => {
                    log::debug!("{} parser found no records", strategy.name());
                    failures.push(format!("{}: no records", strategy.name()));
                }
                Ok(records) => {
                    for (i, record) in records.iter().enumerate() {
                        record.validate().map_err(|e| {
                            CoreError::ParseError(format!(
                                "{} parser, record {}: {e}",
                                strategy.name(),
                                i + 1
                            ))
                        })?;
                    }
                    log::info!(
                        "{} parser found {} record(s)",
                        strategy.name(),
                        records.len()
                    );
                    return Ok(records);
                }
                Err(e) => {
                    log::debug!("{} parser failed: {e}", strategy.name());
                    failures.push(format!("{}: {e}", strategy.name()));
                }
            }
        }

        Err(CoreError::ParseError(format!(
            "no DNS records found ({})",
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dns_provisioner_provider::DnsRecordType;

    use super::*;

    #[test]
    fn strips_ansi_and_verbose_lines() {
        let raw = "\u{1b}[32mOK\u{1b}[0m\nVERBOSE: loading module\n  VERBOSE: more\n[{}]";
        assert_eq!(strip_noise(raw), "OK\n[{}]");
    }

    #[test]
    fn structured_wins_over_pattern() {
        let raw = r#"Connecting...
{"type": "TXT", "name": "@", "value": "MS=ms12345678", "ttl": 3600}"#;
        let records = DesiredRecordSource::default().parse(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, DnsRecordType::Txt);
        assert_eq!(records[0].content, "MS=ms12345678");
    }

    #[test]
    fn falls_back_to_pattern() {
        let raw = "RecordType : MX\nName : @\nValue : contoso-com.mail.protection.outlook.com\nPriority : 0\nTTL : 3600\n";
        let records = DesiredRecordSource::default().parse(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].priority, Some(0));
    }

    #[test]
    fn missing_closing_brace_is_a_parse_error() {
        let raw = r#"{"type": "TXT", "name": "@", "value": "MS=ms12345678", "ttl": 3600"#;
        let err = DesiredRecordSource::default().parse(raw).unwrap_err();
        assert!(matches!(err, CoreError::ParseError(_)));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(
            DesiredRecordSource::default().parse("   \n"),
            Err(CoreError::ParseError(_))
        ));
    }

    #[test]
    fn invalid_record_is_rejected_not_repaired() {
        // MX without priority in the flat shape
        let raw = r#"{"type": "MX", "name": "@", "value": "mx.contoso.com", "ttl": 3600}"#;
        assert!(matches!(
            DesiredRecordSource::default().parse(raw),
            Err(CoreError::ParseError(_))
        ));
    }
}
