//! Compares a desired record against the provider's current state and
//! applies the smallest change that makes them agree, which is often none.
//!
//! The reconciler holds no state of its own: every call re-reads the
//! provider, so a previous cycle's outcome (or a failed write it never
//! learned about) cannot poison the next one.

use std::fmt::Display;

use log::{error, info, warn};

use crate::{
    names,
    provider::{DnsRecord, Provider, RecordContent, RecordKind, TTL},
};

/// Per-record outcome of one reconciliation. Only used for logging and
/// cycle summaries, never retained.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReconcileStatus {
    /// Provider already serves the desired value, nothing written
    Unchanged,
    /// A single-record upsert was issued
    Updated,
    /// Existing record is provider-managed (alias), left untouched
    SkippedAlias,
    /// Target would be a CNAME on the zone apex, never attempted
    SkippedApex,
    /// The provider call failed; other records are unaffected
    Failed,
}

impl Display for ReconcileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileStatus::Unchanged => write!(f, "unchanged"),
            ReconcileStatus::Updated => write!(f, "updated"),
            ReconcileStatus::SkippedAlias => write!(f, "skipped-alias"),
            ReconcileStatus::SkippedApex => write!(f, "skipped-apex"),
            ReconcileStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Reconciles desired records against a [`Provider`], one record at a time.
pub struct Reconciler<'a> {
    provider: &'a dyn Provider,
    ttl: TTL,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn Provider, ttl: TTL) -> Self {
        Reconciler { provider, ttl }
    }

    /// Bring the record set at the desired record's (name, type) in line
    /// with the desired value. Provider errors are logged and reported as
    /// [`ReconcileStatus::Failed`]; they never propagate, so one bad record
    /// cannot abort the rest of a cycle.
    pub fn reconcile(&self, desired: &DnsRecord) -> ReconcileStatus {
        let kind = desired.content.kind();

        let existing = match self.provider.find_record(&desired.name, kind) {
            Ok(e) => e,
            Err(e) => {
                error!("Error checking existing {} record {}: {}", kind, desired.name, e);
                return ReconcileStatus::Failed;
            }
        };

        if let Some(existing) = existing {
            if existing.alias {
                warn!(
                    "{} record {} is managed by the provider (alias), leaving it alone",
                    kind, desired.name
                );
                return ReconcileStatus::SkippedAlias;
            }
            if existing
                .values
                .iter()
                .any(|v| content_equal(v, &desired.content))
            {
                info!("{} record {} is already up-to-date", kind, desired.name);
                return ReconcileStatus::Unchanged;
            }
        }

        match self.provider.upsert_record(desired, self.ttl) {
            Ok(()) => {
                info!("Upserted {} record: {}", kind, desired);
                ReconcileStatus::Updated
            }
            Err(e) => {
                error!("Failed to upsert {} record {}: {}", kind, desired.name, e);
                ReconcileStatus::Failed
            }
        }
    }
}

// A and AAAA values compare as addresses, CNAME targets as DNS names
// (case and trailing dot carry no meaning).
fn content_equal(existing: &RecordContent, desired: &RecordContent) -> bool {
    match (existing, desired) {
        (RecordContent::A(a), RecordContent::A(b)) => a == b,
        (RecordContent::Aaaa(a), RecordContent::Aaaa(b)) => a == b,
        (RecordContent::Cname(a), RecordContent::Cname(b)) => names::names_equal(a, b),
        _ => false,
    }
}
