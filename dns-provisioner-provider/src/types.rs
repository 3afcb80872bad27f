use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::log_sanitizer::mask_secret;

// ============ Pagination ============

/// Filter and paging parameters for record listing.
///
/// Pages are 1-indexed. `name` may be relative (`www`, `@`) or fully
/// qualified; providers qualify it against the zone before querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page; providers clamp this to their own maximum.
    pub per_page: u32,
    /// Only records of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<DnsRecordType>,
    /// Only records with exactly this owner name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
            record_type: None,
            name: None,
        }
    }
}

impl RecordQuery {
    /// Query for every record of one type.
    pub fn of_type(record_type: DnsRecordType) -> Self {
        Self {
            record_type: Some(record_type),
            ..Self::default()
        }
    }

    /// Same filters, different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// One page of a listing plus the provider's total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_count: u32,
    /// Whether more pages follow this one.
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Create a page, computing [`has_more`](Self::has_more) from the totals.
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total_count: u32) -> Self {
        let has_more = page.saturating_mul(per_page) < total_count;
        Self {
            items,
            page,
            per_page,
            total_count,
            has_more,
        }
    }
}

// ============ Zone ============

/// A zone as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific opaque zone identifier.
    pub id: String,
    /// Apex domain, without trailing dot.
    pub name: String,
    /// Provider status string (`active`, `pending`, ...).
    pub status: String,
}

// ============ DNS Record Types ============

/// The record types this system provisions.
///
/// Serialized as uppercase strings (`"A"`, `"MX"`, `"CNAME"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Mx,
    Txt,
    Cname,
    Srv,
}

impl DnsRecordType {
    /// Uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Cname => "CNAME",
            Self::Srv => "SRV",
        }
    }

    /// MX and SRV carry a priority that takes part in equality.
    pub fn has_priority(self) -> bool {
        matches!(self, Self::Mx | Self::Srv)
    }

    /// Only address and alias records can sit behind Cloudflare's proxy.
    pub fn is_proxiable(self) -> bool {
        matches!(self, Self::A | Self::Cname)
    }

    /// Content is a host name, compared without case or trailing dot.
    pub fn content_is_hostname(self) -> bool {
        matches!(self, Self::Mx | Self::Cname | Self::Srv)
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported record type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported record type: {0}")]
pub struct ParseRecordTypeError(pub String);

impl FromStr for DnsRecordType {
    type Err = ParseRecordTypeError;

    /// Case-insensitive; accepts provisioning-system spellings such as `Mx` and `CName`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "MX" => Ok(Self::Mx),
            "TXT" => Ok(Self::Txt),
            "CNAME" => Ok(Self::Cname),
            "SRV" => Ok(Self::Srv),
            _ => Err(ParseRecordTypeError(s.to_string())),
        }
    }
}

// ============ DNS Record ============

/// A DNS record, either desired (no `provider_id`) or observed at the provider.
///
/// For SRV records `content` holds only the target host; `priority`, `weight`
/// and `port` are carried separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Owner name: bare label, `@` for the apex, or fully qualified.
    pub name: String,
    pub content: String,
    /// Seconds; `1` is Cloudflare's "automatic".
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub proxied: bool,
    /// Opaque id assigned by the provider on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl DnsRecord {
    pub fn new(
        record_type: DnsRecordType,
        name: impl Into<String>,
        content: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl,
            priority: None,
            weight: None,
            port: None,
            proxied: false,
            provider_id: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_srv(mut self, priority: u16, weight: u16, port: u16) -> Self {
        self.priority = Some(priority);
        self.weight = Some(weight);
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    #[must_use]
    pub fn with_provider_id(mut self, id: impl Into<String>) -> Self {
        self.provider_id = Some(id.into());
        self
    }

    /// Check the per-type field requirements before anything is sent.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.name.trim().is_empty() {
            return Err(RecordValidationError::Empty {
                record_type: self.record_type,
                name: self.name.clone(),
                field: "name",
            });
        }
        if self.content.trim().is_empty() {
            return Err(RecordValidationError::Empty {
                record_type: self.record_type,
                name: self.name.clone(),
                field: "content",
            });
        }
        if self.ttl == 0 {
            return Err(RecordValidationError::InvalidTtl {
                name: self.name.clone(),
                ttl: self.ttl,
            });
        }

        let missing = |field: &'static str| RecordValidationError::MissingField {
            record_type: self.record_type,
            name: self.name.clone(),
            field,
        };

        match self.record_type {
            DnsRecordType::A => {
                if self.content.trim().parse::<Ipv4Addr>().is_err() {
                    return Err(RecordValidationError::InvalidAddress {
                        name: self.name.clone(),
                        content: self.content.clone(),
                    });
                }
            }
            DnsRecordType::Mx => {
                if self.priority.is_none() {
                    return Err(missing("priority"));
                }
            }
            DnsRecordType::Srv => {
                if self.priority.is_none() {
                    return Err(missing("priority"));
                }
                if self.weight.is_none() {
                    return Err(missing("weight"));
                }
                if self.port.is_none() {
                    return Err(missing("port"));
                }
            }
            DnsRecordType::Txt | DnsRecordType::Cname => {}
        }
        Ok(())
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.ttl, self.record_type)?;
        match (self.record_type, self.priority, self.weight, self.port) {
            (DnsRecordType::Srv, Some(p), Some(w), Some(port)) => {
                write!(f, " {p} {w} {port}")?;
            }
            (_, Some(p), _, _) => write!(f, " {p}")?,
            _ => {}
        }
        write!(f, " {}", self.content)
    }
}

/// Why a record was rejected before reaching the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordValidationError {
    #[error("{record_type} record '{name}' is missing required field '{field}'")]
    MissingField {
        record_type: DnsRecordType,
        name: String,
        field: &'static str,
    },

    #[error("{record_type} record '{name}' has an empty {field}")]
    Empty {
        record_type: DnsRecordType,
        name: String,
        field: &'static str,
    },

    #[error("record '{name}' has ttl {ttl}; must be at least 1")]
    InvalidTtl { name: String, ttl: u32 },

    #[error("A record '{name}' content '{content}' is not an IPv4 address")]
    InvalidAddress { name: String, content: String },

    #[error("'{domain}' is not an apex domain: {reason}")]
    NotApexDomain { domain: String, reason: &'static str },
}

// ============ SRV compound content ============

/// SRV fields packed into Cloudflare's single `content` string.
///
/// Cloudflare renders SRV content as `"<weight> <port> <target>"`; some API
/// versions prefix the priority as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvContent {
    pub priority: Option<u16>,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl SrvContent {
    /// Parse a 3-token or 4-token compound string.
    pub fn parse(content: &str) -> Option<Self> {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        match tokens.as_slice() {
            [weight, port, target] => Some(Self {
                priority: None,
                weight: weight.parse().ok()?,
                port: port.parse().ok()?,
                target: (*target).to_string(),
            }),
            [priority, weight, port, target] => Some(Self {
                priority: Some(priority.parse().ok()?),
                weight: weight.parse().ok()?,
                port: port.parse().ok()?,
                target: (*target).to_string(),
            }),
            _ => None,
        }
    }

    /// The trailing target token, whatever precedes it.
    ///
    /// A bare host (no weight/port prefix) is its own target.
    pub fn target_of(content: &str) -> Option<&str> {
        content.split_whitespace().last()
    }
}

impl fmt::Display for SrvContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(priority) = self.priority {
            write!(f, "{priority} ")?;
        }
        write!(f, "{} {} {}", self.weight, self.port, self.target)
    }
}

// ============ Credentials ============

/// Credentials for a provider.
///
/// Serialized as `{ "provider": "cloudflare", "credentials": { "api_token": "..." } }`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Cloudflare API token with `Zone.DNS` edit permission.
        api_token: String,
    },
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloudflare { api_token } => f
                .debug_struct("Cloudflare")
                .field("api_token", &mask_secret(api_token))
                .finish(),
        }
    }
}
