//! Field-level differences between an existing and a proposed record.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Placeholder rendered when one side has no value for a field.
pub const MISSING: &str = "missing";

/// Compared fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffField {
    Type,
    Name,
    Content,
    Ttl,
    Priority,
}

impl DiffField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Name => "name",
            Self::Content => "content",
            Self::Ttl => "ttl",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for DiffField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One differing field, both sides rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub existing: String,
    pub proposed: String,
}

impl FieldDiff {
    pub fn new(existing: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self {
            existing: existing.into(),
            proposed: proposed.into(),
        }
    }
}

/// Differing fields keyed in [`DiffField`] order.
pub type RecordDiff = BTreeMap<DiffField, FieldDiff>;
