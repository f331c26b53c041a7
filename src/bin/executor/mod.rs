use dyndns_helper::{
    ipsource::{IpSource, SourceError},
    plan::Plan,
    provider::{Provider, ProviderError, TTL},
    reconciler::{ReconcileStatus, Reconciler},
};
use itertools::Itertools;
use log::{info, warn};
use thiserror::Error;

/// An executor performs one complete update cycle: discover the current
/// public addresses, derive the desired record set, and reconcile every
/// record against the provider.
pub struct Executor {
    source: Box<dyn IpSource>,
    provider: Box<dyn Provider>,
    hostname: String,
    zone: String,
    cnames: Vec<String>,
    ttl: TTL,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("`{0}`")]
    Source(#[from] SourceError),
    #[error("`{0}`")]
    Provider(#[from] ProviderError),
}

/// Per-record outcomes of one cycle, in reconciliation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub outcomes: Vec<(String, ReconcileStatus)>,
}

impl RunResult {
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, s)| *s == ReconcileStatus::Failed)
    }

    /// One-line cycle summary, e.g. "3 updated, 1 unchanged, 1 skipped-apex"
    pub fn summary(&self) -> String {
        if self.outcomes.is_empty() {
            return "no records to reconcile".to_string();
        }
        let counts = self.outcomes.iter().counts_by(|(_, s)| *s);
        [
            ReconcileStatus::Updated,
            ReconcileStatus::Unchanged,
            ReconcileStatus::SkippedAlias,
            ReconcileStatus::SkippedApex,
            ReconcileStatus::Failed,
        ]
        .iter()
        .filter_map(|s| counts.get(s).map(|n| format!("{} {}", n, s)))
        .join(", ")
    }
}

impl Executor {
    pub fn new(
        source: Box<dyn IpSource>,
        provider: Box<dyn Provider>,
        hostname: String,
        zone: String,
        cnames: Vec<String>,
        ttl: TTL,
    ) -> Executor {
        Executor {
            source,
            provider,
            hostname,
            zone,
            cnames,
            ttl,
        }
    }

    /// Run one cycle. Returns an error only when the cycle could not happen
    /// at all (no IPv4 address to publish); individual record failures are
    /// part of the [`RunResult`].
    pub fn run_cycle(&self) -> Result<RunResult, ExecutorError> {
        let ipv4 = self.source.ipv4()?;
        let ipv6 = match self.source.ipv6() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("IPv6 discovery failed, continuing with IPv4 only: {}", e);
                None
            }
        };

        let plan = Plan::generate(&self.hostname, &self.zone, &self.cnames, ipv4, ipv6);
        let reconciler = Reconciler::new(self.provider.as_ref(), self.ttl);

        let mut outcomes: Vec<(String, ReconcileStatus)> = plan
            .apex_skips
            .iter()
            .map(|name| (format!("{} CNAME", name), ReconcileStatus::SkippedApex))
            .collect();
        for record in &plan.records {
            outcomes.push((record.to_string(), reconciler.reconcile(record)));
        }

        info!("Cycle complete: {}", RunResult { outcomes: outcomes.clone() }.summary());
        Ok(RunResult { outcomes })
    }
}
