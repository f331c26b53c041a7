//! DNS providers that serve the managed zone.
//!
//! A provider only needs two capabilities: an exact-match lookup of the
//! record set at a (name, type) pair, and a single-record upsert. Everything
//! else (zone discovery, pagination, authentication) is an implementation
//! detail of the concrete provider.

mod cloudflare;

pub use self::cloudflare::{CloudflareProvider, CloudflareProviderConfig};

use std::{
    fmt::Display,
    net::{Ipv4Addr, Ipv6Addr},
};

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub type TTL = u32;

/// The record types managed by this application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::A => write!(f, "A"),
            RecordKind::Aaaa => write!(f, "AAAA"),
            RecordKind::Cname => write!(f, "CNAME"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordContent {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
}

impl RecordContent {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordContent::A(_) => RecordKind::A,
            RecordContent::Aaaa(_) => RecordKind::Aaaa,
            RecordContent::Cname(_) => RecordKind::Cname,
        }
    }
}

impl Display for RecordContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordContent::A(a) => write!(f, "A {}", a),
            RecordContent::Aaaa(aaaa) => write!(f, "AAAA {}", aaaa),
            RecordContent::Cname(target) => write!(f, "CNAME {}", target),
        }
    }
}

/// A single desired record: the name/type/value triple this application
/// wants the zone to contain. Built fresh every cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsRecord {
    /// Canonical FQDN (lower-case, trailing dot)
    pub name: String,
    pub content: RecordContent,
}

impl Display for DnsRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.content)
    }
}

/// The provider's current view of the record set at one (name, type) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub name: String,
    pub kind: RecordKind,
    pub values: Vec<RecordContent>,
    /// Record whose value is managed by the provider itself (for Cloudflare:
    /// a proxied record). Must never be overwritten by this application.
    pub alias: bool,
}

// Generic error returned by a provider action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider API request failed: {0}")]
    Api(String),
    #[error("zone {0} was not found at the provider (check credentials and zone name)")]
    UnknownZone(String),
    #[error("{0}")]
    Internal(String),
}

/// A provider is any DNS service provider, such as Cloudflare, Route53, etc...
/// They implement exactly the two operations record reconciliation needs.
#[cfg_attr(test, automock)]
pub trait Provider: Send + Sync {
    /// Look up the record set whose name AND type match exactly, or `None`
    /// if the zone has no such record set. Implementations backed by
    /// list/scan style APIs must verify equality of both fields before
    /// trusting an answer.
    fn find_record(
        &self,
        name: &str,
        kind: RecordKind,
    ) -> Result<Option<ZoneRecord>, ProviderError>;

    /// Create-or-replace the record set at the record's (name, type) with
    /// this single value and the given TTL.
    fn upsert_record(&self, record: &DnsRecord, ttl: TTL) -> Result<(), ProviderError>;
}
