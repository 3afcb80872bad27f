//! Record Matcher
//!
//! Provider names come back zone-relative (`@`, `www`) while desired records
//! may be written either way, so names are qualified against the zone before
//! they are compared.

use dns_provisioner_provider::{normalize_domain_name, qualify_name};

use crate::types::{DiffField, DnsRecord, FieldDiff, RecordDiff, MISSING};

/// Where a desired record stands against the provider's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// An identical record exists.
    InSync(DnsRecord),
    /// A record with the same type and name exists with other values.
    Stale {
        existing: DnsRecord,
        diff: RecordDiff,
    },
    /// Nothing with this type and name.
    Missing,
}

/// Compares desired records with existing ones.
#[derive(Debug, Clone, Default)]
pub struct RecordMatcher {
    zone: Option<String>,
}

/// Lowercase, no surrounding whitespace, no trailing root dot.
fn canonical(value: &str) -> String {
    normalize_domain_name(value).to_ascii_lowercase()
}

fn render_priority(priority: Option<u16>) -> String {
    priority.map_or_else(|| MISSING.to_string(), |p| p.to_string())
}

impl RecordMatcher {
    /// Matcher that compares names as written.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher that treats `@`, `www` and `www.<zone>` as names in `zone`.
    pub fn for_zone(zone: &str) -> Self {
        Self {
            zone: Some(canonical(zone)),
        }
    }

    fn canonical_name(&self, name: &str) -> String {
        match &self.zone {
            Some(zone) => canonical(&qualify_name(name, zone)),
            None => canonical(name),
        }
    }

    /// Same owner name, ignoring case, trailing dot and relative/qualified form.
    pub fn same_name(&self, a: &str, b: &str) -> bool {
        self.canonical_name(a) == self.canonical_name(b)
    }

    /// Type, name and content equal; priority too for MX and SRV. TTL is ignored.
    ///
    /// A priority missing on either side of an MX or SRV comparison is a mismatch.
    pub fn matches(&self, desired: &DnsRecord, existing: &DnsRecord) -> bool {
        if desired.record_type != existing.record_type {
            return false;
        }
        if !self.same_name(&desired.name, &existing.name) {
            return false;
        }
        if canonical(&desired.content) != canonical(&existing.content) {
            return false;
        }
        if desired.record_type.has_priority() {
            return match (desired.priority, existing.priority) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
        }
        true
    }

    /// Fields that differ between `existing` and `desired`.
    pub fn diff(&self, existing: &DnsRecord, desired: &DnsRecord) -> RecordDiff {
        let mut diff = RecordDiff::new();

        if existing.record_type != desired.record_type {
            diff.insert(
                DiffField::Type,
                FieldDiff::new(existing.record_type.as_str(), desired.record_type.as_str()),
            );
        }
        if !self.same_name(&existing.name, &desired.name) {
            diff.insert(
                DiffField::Name,
                FieldDiff::new(&existing.name, &desired.name),
            );
        }
        if canonical(&existing.content) != canonical(&desired.content) {
            diff.insert(
                DiffField::Content,
                FieldDiff::new(&existing.content, &desired.content),
            );
        }
        if existing.ttl != desired.ttl {
            diff.insert(
                DiffField::Ttl,
                FieldDiff::new(existing.ttl.to_string(), desired.ttl.to_string()),
            );
        }
        let priority_relevant =
            existing.record_type.has_priority() || desired.record_type.has_priority();
        if priority_relevant && existing.priority != desired.priority {
            diff.insert(
                DiffField::Priority,
                FieldDiff::new(
                    render_priority(existing.priority),
                    render_priority(desired.priority),
                ),
            );
        }
        diff
    }

    /// First candidate with the same type and name that does not match.
    pub fn find_similar<'a>(
        &self,
        desired: &DnsRecord,
        candidates: &'a [DnsRecord],
    ) -> Option<&'a DnsRecord> {
        candidates.iter().find(|c| {
            c.record_type == desired.record_type
                && self.same_name(&c.name, &desired.name)
                && !self.matches(desired, c)
        })
    }

    /// Exact match wins; otherwise the first similar record is stale; otherwise missing.
    pub fn classify(&self, desired: &DnsRecord, candidates: &[DnsRecord]) -> Disposition {
        if let Some(existing) = candidates.iter().find(|c| self.matches(desired, c)) {
            return Disposition::InSync(existing.clone());
        }
        match self.find_similar(desired, candidates) {
            Some(existing) => Disposition::Stale {
                existing: existing.clone(),
                diff: self.diff(existing, desired),
            },
            None => Disposition::Missing,
        }
    }
}
