//! A way to discover the public addresses to publish in A and AAAA records.
//! Each source implements the [`IpSource`] trait.
//!
//! The following sources are currently available:
//! - [`HttpSource`]: Queries a prioritized list of external lookup endpoints
//! - [`FixedSource`]: Returns statically configured addresses

mod fixed;
mod http;

pub use fixed::FixedSource;
pub use http::{HttpSource, HttpSourceConfig};

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;

/// An `IpSource` can be used to retrieve the host's current public addresses
/// for use in DNS records.
///
/// IPv4 is mandatory: without it there is nothing to reconcile and the
/// update cycle fails. IPv6 is best-effort, hosts without IPv6 connectivity
/// report `Ok(None)` and the AAAA record is simply skipped for that cycle.
pub trait IpSource: Send + Sync {
    fn ipv4(&self) -> Result<Ipv4Addr, SourceError>;
    fn ipv6(&self) -> Result<Option<Ipv6Addr>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Every configured IPv4 lookup endpoint was unreachable or returned an
    /// unusable answer. This is transport-class and worth retrying.
    #[error("unable to discover a public IPv4 address from any lookup endpoint")]
    Ipv4Exhausted,
    #[error("invalid source configuration: {0}")]
    Config(String),
}

impl SourceError {
    /// Whether this error is transient enough to retry with backoff.
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Ipv4Exhausted)
    }
}
