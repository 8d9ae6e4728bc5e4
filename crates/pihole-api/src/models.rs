// Domain types for Pi-hole resources.
//
// These are locally-owned plain records -- the wire shapes (nested JSON,
// delimited strings, api.php envelopes) are declared next to the
// operations that parse them and converted into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custom DNS host entry. One record per domain name; the domain is the
/// natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub domain: String,
    pub ip: String,
}

/// A CNAME alias. The aliased domain is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRecord {
    pub domain: String,
    pub target: String,
}

/// A gravity database group.
///
/// Named by the appliance (the name is the natural key for mutations)
/// but also carries a numeric id. Timestamps are unix seconds on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub enabled: bool,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub description: String,
}

/// Attributes for creating a group. The name must not contain whitespace;
/// this is checked locally before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCreateRequest {
    pub name: String,
    pub description: String,
}

/// Attributes for updating a group, addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUpdateRequest {
    pub name: String,
    pub enabled: Option<bool>,
    pub description: String,
}

/// The global ad-blocking toggle. Derived only from the literal wire
/// strings `"enabled"` / `"disabled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingStatus {
    pub enabled: bool,
}

/// Convert an appliance unix-seconds timestamp into a `DateTime<Utc>`.
pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
