//! JSON blocks embedded in free-form text.

use serde::Deserialize;
use serde_json::{Map, Value};

use dns_provisioner_provider::{DnsRecord, DnsRecordType};

use crate::error::{CoreError, CoreResult};

use super::RecordSourceStrategy;

/// TTL used when a provisioning record carries none.
const DEFAULT_TTL: u32 = 3600;
/// SRV defaults applied only when the document leaves them out.
const DEFAULT_SRV_PRIORITY: u16 = 0;
const DEFAULT_SRV_WEIGHT: u16 = 1;
const DEFAULT_SRV_PORT: u16 = 443;

/// Reads either a provisioning record array or a flat verification object.
///
/// The array (first `[` to last `]`) is tried first. If there is none, or it
/// does not decode, the text between the last `{` and the last `}` is read as
/// a flat object.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredParser;

/// `{type, name, value, ttl}` as written by verification tooling.
#[derive(Debug, Deserialize)]
struct FlatRecord {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[serde(alias = "content")]
    value: Value,
    ttl: u32,
    #[serde(default)]
    priority: Option<u16>,
    #[serde(default)]
    weight: Option<u16>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    proxied: bool,
}

/// One entry of the mail provider's domain service record export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProvisioningRecord {
    record_type: String,
    label: String,
    #[serde(default)]
    ttl: Option<u32>,
    #[serde(default)]
    additional_properties: Map<String, Value>,
}

fn parse_error(detail: impl std::fmt::Display) -> CoreError {
    CoreError::ParseError(detail.to_string())
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u16_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Slice from the first `open` to the last `close`, inclusive.
fn first_to_last(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Slice from the last `open` to the last `close`, inclusive.
fn last_to_last(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.rfind(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

impl StructuredParser {
    fn parse_array(block: &str) -> CoreResult<Vec<DnsRecord>> {
        let entries: Vec<ProvisioningRecord> =
            serde_json::from_str(block).map_err(|e| parse_error(format!("record array: {e}")))?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(record) = Self::translate(&entry)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Map one export entry; `None` for types this system does not provision.
    fn translate(entry: &ProvisioningRecord) -> CoreResult<Option<DnsRecord>> {
        let props = &entry.additional_properties;
        let prop = |key: &str| props.get(key);
        let required_text = |key: &str| {
            prop(key).and_then(text_value).ok_or_else(|| {
                parse_error(format!(
                    "{} record '{}' has no '{key}'",
                    entry.record_type, entry.label
                ))
            })
        };
        let ttl = entry.ttl.unwrap_or(DEFAULT_TTL);

        let record_type = match entry.record_type.parse::<DnsRecordType>() {
            Ok(t) if t != DnsRecordType::A => t,
            _ => {
                log::warn!(
                    "Skipping unsupported record type: {} ({})",
                    entry.record_type,
                    entry.label
                );
                return Ok(None);
            }
        };

        let record = match record_type {
            DnsRecordType::Mx => {
                let preference = prop("preference").and_then(u16_value).ok_or_else(|| {
                    parse_error(format!("MX record '{}' has no 'preference'", entry.label))
                })?;
                DnsRecord::new(record_type, &entry.label, required_text("mailExchange")?, ttl)
                    .with_priority(preference)
            }
            DnsRecordType::Txt => {
                DnsRecord::new(record_type, &entry.label, required_text("text")?, ttl)
            }
            DnsRecordType::Cname => {
                DnsRecord::new(record_type, &entry.label, required_text("canonicalName")?, ttl)
            }
            DnsRecordType::Srv => DnsRecord::new(
                record_type,
                &entry.label,
                required_text("nameTarget")?,
                ttl,
            )
            .with_srv(
                prop("priority")
                    .and_then(u16_value)
                    .unwrap_or(DEFAULT_SRV_PRIORITY),
                prop("weight").and_then(u16_value).unwrap_or(DEFAULT_SRV_WEIGHT),
                prop("port").and_then(u16_value).unwrap_or(DEFAULT_SRV_PORT),
            ),
            DnsRecordType::A => return Ok(None),
        };
        Ok(Some(record))
    }

    fn parse_object(block: &str) -> CoreResult<DnsRecord> {
        let flat: FlatRecord =
            serde_json::from_str(block).map_err(|e| parse_error(format!("record object: {e}")))?;

        let record_type: DnsRecordType = flat.record_type.parse().map_err(parse_error)?;
        let content = text_value(&flat.value)
            .ok_or_else(|| parse_error(format!("record '{}' has a non-text value", flat.name)))?;

        let mut record = DnsRecord::new(record_type, flat.name.trim(), content, flat.ttl);
        if record_type.has_priority() {
            let priority = flat.priority.ok_or_else(|| {
                parse_error(format!("{record_type} record '{}' has no priority", flat.name))
            })?;
            record.priority = Some(priority);
        }
        if record_type == DnsRecordType::Srv {
            record.weight = Some(flat.weight.unwrap_or(DEFAULT_SRV_WEIGHT));
            record.port = Some(flat.port.unwrap_or(DEFAULT_SRV_PORT));
        }
        if record_type.is_proxiable() {
            record.proxied = flat.proxied;
        }
        Ok(record)
    }
}

impl RecordSourceStrategy for StructuredParser {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn parse(&self, text: &str) -> CoreResult<Vec<DnsRecord>> {
        if let Some(block) = first_to_last(text, '[', ']') {
            match Self::parse_array(block) {
                Ok(records) => return Ok(records),
                Err(e) => log::debug!("No usable record array: {e}"),
            }
        }

        let block = last_to_last(text, '{', '}')
            .ok_or_else(|| parse_error("no JSON object or array found"))?;
        Ok(vec![Self::parse_object(block)?])
    }
}
