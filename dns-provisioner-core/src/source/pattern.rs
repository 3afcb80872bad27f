//! `Key : Value` listings, as printed by PowerShell's default formatter.

use regex::Regex;

use dns_provisioner_provider::{DnsRecord, DnsRecordType};

use crate::error::{CoreError, CoreResult};

use super::RecordSourceStrategy;

const RECORD_PATTERN: &str = r"RecordType\s*:\s*(\w+)\s*Name\s*:\s*([^\n]+)\s*Value\s*:\s*([^\n]+)(?:\s*Priority\s*:\s*(\d+))?\s*TTL\s*:\s*(\d+)";

/// SRV weight when the listing does not show one.
const DEFAULT_SRV_WEIGHT: u16 = 1;

/// Matches blocks of the form
///
/// ```text
/// RecordType : MX
/// Name       : @
/// Value      : contoso-com.mail.protection.outlook.com
/// Priority   : 0
/// TTL        : 3600
/// ```
///
/// `Priority` is optional in the listing. SRV blocks carry no weight or port,
/// so weight is 1 and the port is guessed from the service label.
#[derive(Debug, Clone)]
pub struct PatternParser {
    regex: Option<Regex>,
}

impl Default for PatternParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternParser {
    pub fn new() -> Self {
        Self {
            regex: Regex::new(RECORD_PATTERN).ok(),
        }
    }
}

/// `_sipfederationtls._tcp` listens on 5061; everything else on 443.
pub(crate) fn guess_srv_port(name: &str) -> u16 {
    if name.to_ascii_lowercase().contains("_sipfederationtls._tcp") {
        5061
    } else {
        443
    }
}

impl RecordSourceStrategy for PatternParser {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn parse(&self, text: &str) -> CoreResult<Vec<DnsRecord>> {
        let Some(re) = &self.regex else {
            return Err(CoreError::ParseError(
                "record pattern failed to compile".to_string(),
            ));
        };

        let mut records = Vec::new();
        for caps in re.captures_iter(text) {
            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());

            let Ok(record_type) = field(1).parse::<DnsRecordType>() else {
                log::warn!("Skipping unsupported record type: {} ({})", field(1), field(2));
                continue;
            };
            let name = field(2);
            let ttl: u32 = field(5)
                .parse()
                .map_err(|e| CoreError::ParseError(format!("TTL of '{name}': {e}")))?;

            let mut record = DnsRecord::new(record_type, name, field(3), ttl);
            if caps.get(4).is_some() {
                let priority = field(4)
                    .parse::<u16>()
                    .map_err(|e| CoreError::ParseError(format!("priority of '{name}': {e}")))?;
                record.priority = Some(priority);
            }
            if record_type == DnsRecordType::Srv {
                record.weight = Some(DEFAULT_SRV_WEIGHT);
                record.port = Some(guess_srv_port(name));
            }

            log::debug!("Found record {}: {record_type} - {name}", records.len() + 1);
            records.push(record);
        }
        Ok(records)
    }
}
