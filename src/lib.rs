//! Main crate for the `dyndns_helper` application.
//!
//! The binary wires these modules into a long-running update loop, but they
//! can also be used on their own:
//! - [`ipsource`]s discover the host's current public IPv4/IPv6 address
//! - [`provider`]s are DNS providers such as Cloudflare that serve the managed records
//! - [`plan`] builds the desired record set for one update cycle
//! - [`reconciler`] compares desired records against provider state and applies the difference

#![allow(clippy::uninlined_format_args)]

pub mod ipsource;
pub mod names;
pub mod plan;
pub mod provider;
pub mod reconciler;
pub mod retry;
