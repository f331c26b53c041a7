use std::net::{Ipv4Addr, Ipv6Addr};

use super::{IpSource, SourceError};

/// An [`IpSource`] that always returns statically configured addresses.
/// Useful for hosts with a known stable address and for testing.
pub struct FixedSource {
    ipv4: Ipv4Addr,
    ipv6: Option<Ipv6Addr>,
}

impl IpSource for FixedSource {
    fn ipv4(&self) -> Result<Ipv4Addr, SourceError> {
        Ok(self.ipv4)
    }

    fn ipv6(&self) -> Result<Option<Ipv6Addr>, SourceError> {
        Ok(self.ipv6)
    }
}

impl FixedSource {
    pub fn create(ipv4: Ipv4Addr, ipv6: Option<Ipv6Addr>) -> Box<dyn IpSource> {
        Box::new(FixedSource { ipv4, ipv6 })
    }
}
