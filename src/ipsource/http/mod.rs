use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
    time::Duration,
};

use log::{debug, info, warn};

use super::{IpSource, SourceError};
use crate::retry::{retry, RetryPolicy};

/// Lookup endpoints queried for the public IPv4 address, in priority order.
/// All of them return the caller's address as the first token of a
/// plain-text body.
pub const DEFAULT_IPV4_ENDPOINTS: &[&str] = &[
    "https://ipv4.icanhazip.com",
    "https://checkip.amazonaws.com",
    "http://whatismyip.akamai.com",
    "http://ip.42.pl/raw",
    "https://api64.ipify.org",
    "https://ipinfo.io/ip",
    "https://ifconfig.me",
    "https://ident.me",
    "https://ipecho.net/plain",
    "https://wtfismyip.com/text",
    "https://bot.whatismyipaddress.com",
    "https://myexternalip.com/raw",
    "https://ip.seeip.org",
    "https://ip.tyk.nu",
    "https://api.my-ip.io/ip",
    "https://ipwho.is/?format=text",
];

/// Lookup endpoints queried for the public IPv6 address, in priority order.
pub const DEFAULT_IPV6_ENDPOINTS: &[&str] = &[
    "https://api6.ipify.org",
    "https://ipv6.icanhazip.com",
    "https://ifconfig.co/ip",
    "https://ident.me",
    "https://myexternalip.com/raw",
];

const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(3);

/// An [`IpSource`] that asks external HTTP(S) lookup services for the
/// caller's public address.
///
/// Endpoints are tried strictly in order and the first syntactically valid
/// address of the requested family wins; the answer is not cross-checked
/// against the remaining endpoints. Unreachable or malformed endpoints just
/// advance iteration to the next entry.
///
/// If the whole IPv4 list comes up empty the lookup is treated as a
/// transient transport failure and retried with backoff. An exhausted IPv6
/// list is a normal condition (no IPv6 connectivity) and reported as `None`.
///
/// To create a new source, use the [`HttpSource::from_config()`] function.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    ipv4_endpoints: Vec<String>,
    ipv6_endpoints: Vec<String>,
    retry_policy: RetryPolicy,
}

/// Configuration for [`HttpSource`]. Must be supplied when creating a [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Ordered IPv4 lookup endpoints. Must not be empty.
    pub ipv4_endpoints: Vec<String>,
    /// Ordered IPv6 lookup endpoints. May be empty to disable AAAA handling.
    pub ipv6_endpoints: Vec<String>,
    /// Timeout applied to every single endpoint fetch.
    pub timeout: Duration,
    /// Backoff policy for the overall IPv4 lookup.
    pub retry_policy: RetryPolicy,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        HttpSourceConfig {
            ipv4_endpoints: DEFAULT_IPV4_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            ipv6_endpoints: DEFAULT_IPV6_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            timeout: ENDPOINT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl IpSource for HttpSource {
    fn ipv4(&self) -> Result<Ipv4Addr, SourceError> {
        retry(&self.retry_policy, SourceError::is_transport, || {
            self.probe::<Ipv4Addr>(&self.ipv4_endpoints, "IPv4")
                .ok_or(SourceError::Ipv4Exhausted)
        })
    }

    fn ipv6(&self) -> Result<Option<Ipv6Addr>, SourceError> {
        let addr = self.probe::<Ipv6Addr>(&self.ipv6_endpoints, "IPv6");
        if addr.is_none() {
            info!("No external IPv6 detected, skipping AAAA update");
        }
        Ok(addr)
    }
}

impl HttpSource {
    /// Create a new [`HttpSource`] with the supplied configuration.
    /// Returns an error if the configuration is unusable.
    pub fn from_config(config: &HttpSourceConfig) -> Result<Box<dyn IpSource>, SourceError> {
        if config.ipv4_endpoints.is_empty() {
            return Err(SourceError::Config(
                "at least one IPv4 lookup endpoint is required".to_string(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;

        Ok(Box::new(HttpSource {
            client,
            ipv4_endpoints: config.ipv4_endpoints.clone(),
            ipv6_endpoints: config.ipv6_endpoints.clone(),
            retry_policy: config.retry_policy.clone(),
        }))
    }

    // Walk the endpoint list once and return the first answer that parses as
    // an address of the requested family. A body of the wrong family fails
    // the parse and counts as a bad answer from that endpoint.
    fn probe<A: FromStr>(&self, endpoints: &[String], family: &str) -> Option<A> {
        for url in endpoints {
            let body = match self.fetch(url) {
                Ok(b) => b,
                Err(e) => {
                    debug!("Failed to get {} from {}: {}", family, url, e);
                    continue;
                }
            };
            let Some(token) = body.split_whitespace().next() else {
                warn!("Empty response body from {}", url);
                continue;
            };
            match token.parse::<A>() {
                Ok(addr) => {
                    info!("Got external {} from {}: {}", family, url, token);
                    return Some(addr);
                }
                Err(_) => {
                    warn!("Invalid {} format from {}: {}", family, url, token);
                }
            }
        }
        None
    }

    fn fetch(&self, url: &str) -> Result<String, String> {
        let resp = self.client.get(url).send().map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("unexpected status {}", resp.status()));
        }
        resp.text().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(ipv4: Vec<String>, ipv6: Vec<String>) -> HttpSourceConfig {
        HttpSourceConfig {
            ipv4_endpoints: ipv4,
            ipv6_endpoints: ipv6,
            timeout: Duration::from_secs(1),
            retry_policy: RetryPolicy::no_retry(),
        }
    }

    #[test]
    fn first_valid_answer_wins() {
        let mut server = mockito::Server::new();
        let unreachable = server
            .mock("GET", "/down")
            .with_status(500)
            .create();
        let garbage = server
            .mock("GET", "/garbage")
            .with_body("certainly not an ip")
            .create();
        let good = server
            .mock("GET", "/good")
            .with_body("203.0.113.5\n")
            .create();
        let never_hit = server
            .mock("GET", "/late")
            .with_body("198.51.100.1")
            .expect(0)
            .create();

        let source = HttpSource::from_config(&test_config(
            vec![
                format!("{}/down", server.url()),
                format!("{}/garbage", server.url()),
                format!("{}/good", server.url()),
                format!("{}/late", server.url()),
            ],
            vec![],
        ))
        .unwrap();

        assert_eq!(source.ipv4().unwrap(), Ipv4Addr::new(203, 0, 113, 5));
        unreachable.assert();
        garbage.assert();
        good.assert();
        never_hit.assert();
    }

    #[test]
    fn rejects_answers_of_the_wrong_family() {
        let mut server = mockito::Server::new();
        let wrong_family = server
            .mock("GET", "/v6only")
            .with_body("2001:db8::1")
            .create();
        let good = server
            .mock("GET", "/good")
            .with_body("192.0.2.7")
            .create();

        let source = HttpSource::from_config(&test_config(
            vec![
                format!("{}/v6only", server.url()),
                format!("{}/good", server.url()),
            ],
            vec![],
        ))
        .unwrap();

        assert_eq!(source.ipv4().unwrap(), Ipv4Addr::new(192, 0, 2, 7));
        wrong_family.assert();
        good.assert();
    }

    #[test]
    fn tolerates_whitespace_and_trailing_content() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/padded")
            .with_body("  203.0.113.9   some trailing text\n")
            .create();

        let source = HttpSource::from_config(&test_config(
            vec![format!("{}/padded", server.url())],
            vec![],
        ))
        .unwrap();

        assert_eq!(source.ipv4().unwrap(), Ipv4Addr::new(203, 0, 113, 9));
    }

    #[test]
    fn ipv4_exhaustion_is_an_error_and_retried() {
        let mut server = mockito::Server::new();
        // Two attempts with a single endpoint -> two hits
        let down = server
            .mock("GET", "/down")
            .with_status(503)
            .expect(2)
            .create();

        let mut config = test_config(vec![format!("{}/down", server.url())], vec![]);
        config.retry_policy = RetryPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: 2,
        };
        let source = HttpSource::from_config(&config).unwrap();

        assert_eq!(source.ipv4(), Err(SourceError::Ipv4Exhausted));
        down.assert();
    }

    #[test]
    fn ipv6_exhaustion_is_not_an_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/down").with_status(500).create();

        let source = HttpSource::from_config(&test_config(
            vec!["http://192.0.2.1:1/unused".to_string()],
            vec![format!("{}/down", server.url())],
        ))
        .unwrap();

        assert_eq!(source.ipv6(), Ok(None));
    }

    #[test]
    fn resolves_ipv6_when_available() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/v6").with_body("2001:db8::5\n").create();

        let source = HttpSource::from_config(&test_config(
            vec!["http://192.0.2.1:1/unused".to_string()],
            vec![format!("{}/v6", server.url())],
        ))
        .unwrap();

        assert_eq!(
            source.ipv6().unwrap(),
            Some("2001:db8::5".parse::<Ipv6Addr>().unwrap())
        );
    }

    #[test]
    fn requires_at_least_one_ipv4_endpoint() {
        let r = HttpSource::from_config(&test_config(vec![], vec![]));
        assert!(matches!(r, Err(SourceError::Config(_))));
    }
}
