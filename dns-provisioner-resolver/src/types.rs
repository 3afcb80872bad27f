//! Public resolver query types.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// Record types that can be checked at public resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    /// IPv4 address record.
    A,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Canonical name (alias) record.
    Cname,
    /// Service locator record.
    Srv,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Mx => write!(f, "MX"),
            Self::Txt => write!(f, "TXT"),
            Self::Cname => write!(f, "CNAME"),
            Self::Srv => write!(f, "SRV"),
        }
    }
}

impl FromStr for QueryType {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "MX" => Ok(Self::Mx),
            "TXT" => Ok(Self::Txt),
            "CNAME" => Ok(Self::Cname),
            "SRV" => Ok(Self::Srv),
            _ => Err(ResolverError::ValidationError(format!(
                "Unsupported DNS query type: {s}"
            ))),
        }
    }
}

/// One record as answered by a public resolver.
///
/// Host names are stored without the trailing root dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ObservedRecord {
    A {
        address: Ipv4Addr,
    },
    Mx {
        preference: u16,
        exchange: String,
    },
    /// Character-strings concatenated in order.
    Txt {
        text: String,
    },
    Cname {
        target: String,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
}

impl fmt::Display for ObservedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A { address } => write!(f, "A {address}"),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "MX {preference} {exchange}"),
            Self::Txt { text } => write!(f, "TXT \"{text}\""),
            Self::Cname { target } => write!(f, "CNAME {target}"),
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "SRV {priority} {weight} {port} {target}"),
        }
    }
}

/// A public recursive resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverServer {
    /// Display name (e.g. "Google DNS").
    pub name: String,
    /// Resolver address, queried on port 53.
    pub ip: IpAddr,
}

/// Well-known resolvers, in the order they are consulted by default.
const WELL_KNOWN: &[(&str, IpAddr)] = &[
    ("Google DNS", IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))),
    ("Cloudflare DNS", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
    ("Quad9 DNS", IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9))),
];

impl ResolverServer {
    pub fn new(name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }

    /// Name a bare address, using the well-known label when there is one.
    pub fn from_ip(ip: IpAddr) -> Self {
        let name = WELL_KNOWN
            .iter()
            .find(|(_, known)| *known == ip)
            .map_or_else(|| format!("Resolver {ip}"), |(name, _)| (*name).to_string());
        Self { name, ip }
    }

    /// Google, Cloudflare and Quad9.
    pub fn defaults() -> Vec<Self> {
        WELL_KNOWN
            .iter()
            .map(|(name, ip)| Self::new(*name, *ip))
            .collect()
    }

    /// Parse a comma-separated address list (`"8.8.8.8, 1.1.1.1"`).
    pub fn parse_list(list: &str) -> Result<Vec<Self>, ResolverError> {
        let servers = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpAddr>()
                    .map(Self::from_ip)
                    .map_err(|_| ResolverError::InvalidServer(format!("无效的 DNS 服务器地址: {s}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if servers.is_empty() {
            return Err(ResolverError::InvalidServer(
                "resolver list is empty".to_string(),
            ));
        }
        Ok(servers)
    }
}

impl fmt::Display for ResolverServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ip)
    }
}

/// What a single resolver said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ServerOutcome {
    /// At least one record of the requested type.
    Answered { records: Vec<ObservedRecord> },
    /// The name does not exist.
    NxDomain,
    /// The name exists but has no records of this type.
    NoRecords,
    /// No response within the per-server timeout.
    Timeout,
    /// Any other resolution failure.
    Failed { error: String },
}

impl ServerOutcome {
    /// Records answered, empty for every non-answer.
    pub fn records(&self) -> &[ObservedRecord] {
        match self {
            Self::Answered { records } => records,
            _ => &[],
        }
    }
}

impl fmt::Display for ServerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answered { records } => write!(f, "{} record(s)", records.len()),
            Self::NxDomain => write!(f, "NXDOMAIN"),
            Self::NoRecords => write!(f, "no records"),
            Self::Timeout => write!(f, "timeout"),
            Self::Failed { error } => write!(f, "error: {error}"),
        }
    }
}

/// One resolver's outcome with timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerAnswer {
    pub server: ResolverServer,
    #[serde(flatten)]
    pub outcome: ServerOutcome,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

/// Outcome of asking every configured resolver about one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationResult {
    /// The queried name (validated, no trailing dot).
    pub name: String,
    pub query_type: QueryType,
    /// Per-server outcomes in query order.
    pub answers: Vec<ServerAnswer>,
    /// Total time in milliseconds.
    pub total_time_ms: u64,
}

impl PropagationResult {
    /// Every record answered by any resolver, paired with the server.
    pub fn observed(&self) -> impl Iterator<Item = (&ResolverServer, &ObservedRecord)> {
        self.answers
            .iter()
            .flat_map(|a| a.outcome.records().iter().map(move |r| (&a.server, r)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_round_trip() {
        for t in ["a", "MX", "Txt", "cname", "SRV"] {
            let parsed: QueryType = t.parse().unwrap();
            assert_eq!(parsed.to_string(), t.to_uppercase());
        }
        assert!("AAAA".parse::<QueryType>().is_err());
    }

    #[test]
    fn test_defaults_are_google_cloudflare_quad9() {
        let ips: Vec<String> = ResolverServer::defaults()
            .iter()
            .map(|s| s.ip.to_string())
            .collect();
        assert_eq!(ips, ["8.8.8.8", "1.1.1.1", "9.9.9.9"]);
    }

    #[test]
    fn test_parse_list_names_known_servers() {
        let servers = ResolverServer::parse_list(" 9.9.9.9 ,208.67.222.222").unwrap();
        assert_eq!(servers[0].name, "Quad9 DNS");
        assert_eq!(servers[1].name, "Resolver 208.67.222.222");
    }

    #[test]
    fn test_parse_list_rejects_bad_input() {
        assert!(matches!(
            ResolverServer::parse_list("8.8.8.8,dns.google"),
            Err(ResolverError::InvalidServer(_))
        ));
        assert!(matches!(
            ResolverServer::parse_list(" , "),
            Err(ResolverError::InvalidServer(_))
        ));
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let answer = ServerAnswer {
            server: ResolverServer::from_ip("1.1.1.1".parse().unwrap()),
            outcome: ServerOutcome::Answered {
                records: vec![ObservedRecord::Mx {
                    preference: 0,
                    exchange: "contoso-com.mail.protection.outlook.com".into(),
                }],
            },
            response_time_ms: 12,
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["status"], "answered");
        assert_eq!(json["records"][0]["type"], "MX");
        assert_eq!(json["server"]["name"], "Cloudflare DNS");
        assert_eq!(json["responseTimeMs"], 12);

        let timeout = serde_json::to_value(ServerOutcome::Timeout).unwrap();
        assert_eq!(timeout["status"], "timeout");
    }

    #[test]
    fn test_observed_skips_non_answers() {
        let server = ResolverServer::from_ip("8.8.8.8".parse().unwrap());
        let result = PropagationResult {
            name: "contoso.com".into(),
            query_type: QueryType::A,
            answers: vec![
                ServerAnswer {
                    server: server.clone(),
                    outcome: ServerOutcome::NxDomain,
                    response_time_ms: 3,
                },
                ServerAnswer {
                    server,
                    outcome: ServerOutcome::Answered {
                        records: vec![ObservedRecord::A {
                            address: Ipv4Addr::new(76, 76, 21, 21),
                        }],
                    },
                    response_time_ms: 4,
                },
            ],
            total_time_ms: 7,
        };
        let observed: Vec<_> = result.observed().collect();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].1.to_string(), "A 76.76.21.21");
    }
}
