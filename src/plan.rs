use std::net::{Ipv4Addr, Ipv6Addr};

use log::{error, trace, warn};

use crate::{
    names,
    provider::{DnsRecord, RecordContent},
};

/// The desired record set for one update cycle, together with the targets
/// that were rejected before ever reaching the provider.
///
/// A plan holds no provider state; it is derived purely from configuration
/// and the addresses resolved this cycle, and is discarded when the cycle
/// ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub records: Vec<DnsRecord>,
    /// CNAME targets that would sit on the zone apex. Most providers forbid
    /// a CNAME there, so these are reported and never sent to the provider.
    pub apex_skips: Vec<String>,
}

impl Plan {
    /// Build the target record set: one A record for the managed hostname,
    /// one AAAA record if an IPv6 address was resolved, and one CNAME per
    /// alias entry pointing back at the managed hostname.
    ///
    /// Malformed (empty) alias entries are logged and skipped without
    /// failing the cycle.
    pub fn generate(
        hostname: &str,
        zone: &str,
        aliases: &[String],
        ipv4: Ipv4Addr,
        ipv6: Option<Ipv6Addr>,
    ) -> Plan {
        let fqdn = names::to_fqdn(hostname);
        let mut plan = Plan {
            records: Vec::new(),
            apex_skips: Vec::new(),
        };

        plan.records.push(DnsRecord {
            name: fqdn.clone(),
            content: RecordContent::A(ipv4),
        });
        match ipv6 {
            Some(addr) => plan.records.push(DnsRecord {
                name: fqdn.clone(),
                content: RecordContent::Aaaa(addr),
            }),
            None => trace!("No IPv6 address this cycle, not planning an AAAA record"),
        }

        for entry in aliases {
            let alias_fqdn = match names::expand_alias(entry, zone) {
                Ok(n) => n,
                Err(e) => {
                    error!("Ignoring CNAME entry {:?}: {}", entry, e);
                    continue;
                }
            };
            if names::names_equal(&alias_fqdn, zone) {
                warn!("Skipping CNAME for {}: a CNAME cannot live on the zone apex", alias_fqdn);
                plan.apex_skips.push(alias_fqdn);
                continue;
            }
            plan.records.push(DnsRecord {
                name: alias_fqdn,
                content: RecordContent::Cname(fqdn.clone()),
            });
        }

        plan
    }
}
