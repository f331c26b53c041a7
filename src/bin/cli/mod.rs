use clap::Parser;
use dyndns_helper::provider::TTL;
use std::net::{Ipv4Addr, Ipv6Addr};

macro_rules! env_prefix {
    () => {
        "DYNDNS_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the DNS zone holding the managed records (e.g. 'example.com')
    #[arg(
        short = 'z',
        long,
        required = true,
        value_name = "ZONE",
        env = concat!(env_prefix!(), "ZONE")
    )]
    pub zone: String,

    /// Hostname to publish the discovered addresses under, as the A/AAAA record name
    #[arg(
        short = 'n',
        long,
        required = true,
        value_name = "HOSTNAME",
        env = concat!(env_prefix!(), "HOSTNAME")
    )]
    pub hostname: String,

    /// CNAME records to point at the managed hostname, as a comma-separated list.
    /// Bare labels are expanded within the zone ('api' -> 'api.<zone>')
    #[arg(
        short = 'c',
        long,
        value_name = "NAME",
        use_value_delimiter = true,
        value_delimiter = ',',
        env = concat!(env_prefix!(), "CNAMES")
    )]
    pub cnames: Vec<String>,

    /// TTL in seconds for records created or replaced by this tool
    #[arg(
        long,
        default_value_t = 300,
        value_name = "TTL",
        env = concat!(env_prefix!(), "RECORD_TTL")
    )]
    pub record_ttl: TTL,

    /// Time to wait between update cycles in seconds
    #[arg(
        short = 'i',
        long,
        default_value_t = 300,
        env = concat!(env_prefix!(), "INTERVAL")
    )]
    pub interval: u64,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// Only run a single update cycle, then exit
    #[arg(long, default_value_t = false, action)]
    pub run_once: bool,

    /// Do not make any changes to the DNS records, only show what would happen
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,

    /// Source of the public addresses to publish
    #[arg(
        value_enum,
        short = 's',
        long,
        default_value_t = IpAddressSource::Http,
        env = concat!(env_prefix!(), "SOURCE")
    )]
    pub source: IpAddressSource,

    /// DNS provider to use
    #[arg(
        value_enum,
        short = 'p',
        long,
        default_value_t = Provider::Cloudflare,
        env = concat!(env_prefix!(), "PROVIDER")
    )]
    pub provider: Provider,

    /// Cloudflare API Token to authenticate with
    #[arg(
        long,
        required_if_eq("provider", "cloudflare"),
        value_name = "API_TOKEN",
        env = concat!(env_prefix!(), "CLOUDFLARE_API_TOKEN")
    )]
    pub cloudflare_api_token: Option<String>,

    /// Override the builtin list of IPv4 lookup endpoints, as a comma-separated
    /// list of URLs tried in order. Only has an effect if 'source' == 'http'
    #[arg(
        long,
        value_name = "URL",
        use_value_delimiter = true,
        value_delimiter = ',',
        env = concat!(env_prefix!(), "IPV4_ENDPOINTS")
    )]
    pub ipv4_endpoints: Vec<String>,

    /// Override the builtin list of IPv6 lookup endpoints.
    /// Only has an effect if 'source' == 'http'
    #[arg(
        long,
        value_name = "URL",
        use_value_delimiter = true,
        value_delimiter = ',',
        env = concat!(env_prefix!(), "IPV6_ENDPOINTS")
    )]
    pub ipv6_endpoints: Vec<String>,

    /// IPv4 address to publish when using the 'fixed' address source
    #[arg(
        long,
        required_if_eq("source", "fixed"),
        value_name = "IPV4_ADDRESS",
        env = concat!(env_prefix!(), "IPV4_FIXED_ADDRESS")
    )]
    pub ipv4_fixed_address: Option<Ipv4Addr>,

    /// IPv6 address to publish when using the 'fixed' address source.
    /// If unset, no AAAA record is managed
    #[arg(
        long,
        value_name = "IPV6_ADDRESS",
        env = concat!(env_prefix!(), "IPV6_FIXED_ADDRESS")
    )]
    pub ipv6_fixed_address: Option<Ipv6Addr>,
}

use clap::ValueEnum;
use log::LevelFilter;

/// Which source to use for our public addresses
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum IpAddressSource {
    Http,
    Fixed,
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log::Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Which dns provider to use. Currently only contains Cloudflare
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Provider {
    Cloudflare,
}
