mod wrapper;

use cloudflare::{endpoints, framework::response::ApiFailure};
use log::{debug, info};
use mockall_double::double;

#[double]
use self::wrapper::CloudflareWrapper;

use super::{DnsRecord, Provider, ProviderError, RecordContent, RecordKind, ZoneRecord, TTL};
use crate::names;

/// A [`Provider`] connecting to the Cloudflare API for finding and upserting DNS records.
///
/// Cloudflare has no alias record type; proxied records are the
/// provider-managed equivalent (clients see Cloudflare's addresses, not the
/// record's literal content), so they are reported with the alias flag set
/// and are never overwritten.
///
/// To create a provider, use the [`CloudflareProvider::from_config()`] function.
#[non_exhaustive]
pub struct CloudflareProvider {
    api: CloudflareWrapper,
    zone_name: String,
    zone_id: String,
    dry_run: bool,
}

/// Configuration object for a [`CloudflareProvider`]. Must be supplied when creating a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CloudflareProviderConfig<'a> {
    /// The API token to authenticate with. API key login is not supported
    pub api_token: &'a str,
    /// Name of the zone holding the managed records
    pub zone: &'a str,
    /// Log intended changes without performing them
    pub dry_run: bool,
}

impl CloudflareProvider {
    /// Authenticates against the Cloudflare API and resolves the configured
    /// zone name to a zone id. A bad token or unknown zone fails here,
    /// before any update loop starts.
    pub fn from_config(
        config: &CloudflareProviderConfig,
    ) -> Result<Box<dyn Provider>, ProviderError> {
        let api = CloudflareWrapper::try_new(config.api_token)?;
        let zone_name = names::normalize(config.zone);

        let zone_id = api
            .list_zones(Some(zone_name.clone()))?
            .result
            .into_iter()
            .find(|z| names::names_equal(&z.name, &zone_name))
            .map(|z| z.id)
            .ok_or_else(|| ProviderError::UnknownZone(zone_name.clone()))?;
        info!("Connected to Cloudflare zone {} ({})", zone_name, zone_id);

        Ok(Box::new(CloudflareProvider {
            api,
            zone_name,
            zone_id,
            dry_run: config.dry_run,
        }))
    }

    // The API's name filter is a convenience, not a contract: only records
    // whose name and type both match exactly are returned.
    fn matching_records(
        &self,
        name: &str,
        kind: RecordKind,
    ) -> Result<Vec<endpoints::dns::DnsRecord>, ProviderError> {
        let api_name = names::normalize(name);
        let records = self
            .api
            .list_records(&self.zone_id, Some(api_name))?
            .result;

        Ok(records
            .into_iter()
            .filter(|r| names::names_equal(&r.name, name) && kind_of(&r.content) == Some(kind))
            .collect())
    }
}

impl Provider for CloudflareProvider {
    fn find_record(
        &self,
        name: &str,
        kind: RecordKind,
    ) -> Result<Option<ZoneRecord>, ProviderError> {
        let matches = self.matching_records(name, kind)?;
        if matches.is_empty() {
            return Ok(None);
        }

        let alias = matches.iter().any(|r| r.proxied);
        let values = matches
            .iter()
            .filter_map(|r| to_record_content(&r.content))
            .collect();

        Ok(Some(ZoneRecord {
            name: names::to_fqdn(name),
            kind,
            values,
            alias,
        }))
    }

    fn upsert_record(&self, record: &DnsRecord, ttl: TTL) -> Result<(), ProviderError> {
        if self.dry_run {
            info!("Would upsert record {} in zone {} (dry-run)", record, self.zone_name);
            return Ok(());
        }

        // The stock API has no replace operation, so an upsert is the
        // existing records' deletion followed by a single create.
        let existing = self.matching_records(&record.name, record.content.kind())?;
        for r in &existing {
            self.api.delete_record(&self.zone_id, &r.id)?;
            debug!("Deleted record {} with id {} from zone {}", r.name, r.id, self.zone_name);
        }

        let api_name = names::normalize(&record.name);
        self.api.create_record(
            &self.zone_id,
            &api_name,
            &Some(ttl),
            to_dns_content(&record.content),
        )?;
        debug!("Created record {} in zone {}", record, self.zone_name);
        Ok(())
    }
}

impl From<ApiFailure> for ProviderError {
    fn from(f: ApiFailure) -> Self {
        match f {
            ApiFailure::Error(s, errs) => ProviderError::Api(format!("[{}] {:?}", s, errs.errors)),
            ApiFailure::Invalid(e) => ProviderError::Api(e.to_string()),
        }
    }
}

fn kind_of(content: &endpoints::dns::DnsContent) -> Option<RecordKind> {
    match content {
        endpoints::dns::DnsContent::A { .. } => Some(RecordKind::A),
        endpoints::dns::DnsContent::AAAA { .. } => Some(RecordKind::Aaaa),
        endpoints::dns::DnsContent::CNAME { .. } => Some(RecordKind::Cname),
        _ => None,
    }
}

fn to_record_content(content: &endpoints::dns::DnsContent) -> Option<RecordContent> {
    match content {
        endpoints::dns::DnsContent::A { content } => Some(RecordContent::A(*content)),
        endpoints::dns::DnsContent::AAAA { content } => Some(RecordContent::Aaaa(*content)),
        endpoints::dns::DnsContent::CNAME { content } => {
            Some(RecordContent::Cname(content.to_owned()))
        }
        _ => None,
    }
}

fn to_dns_content(content: &RecordContent) -> endpoints::dns::DnsContent {
    match content {
        RecordContent::A(a) => endpoints::dns::DnsContent::A { content: *a },
        RecordContent::Aaaa(aaaa) => endpoints::dns::DnsContent::AAAA { content: *aaaa },
        // Cloudflare stores names without the trailing dot
        RecordContent::Cname(target) => endpoints::dns::DnsContent::CNAME {
            content: names::normalize(target),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use chrono::Utc;
    use cloudflare::{
        endpoints::dns::{DnsContent, Meta},
        framework::response::ApiSuccess,
    };

    use super::wrapper::MockCloudflareWrapper;
    use super::*;

    fn provider(api: MockCloudflareWrapper, dry_run: bool) -> CloudflareProvider {
        CloudflareProvider {
            api,
            zone_name: "example.com".to_string(),
            zone_id: "023e105f4ecef8ad9ca31a8372d0c353".to_string(),
            dry_run,
        }
    }

    fn api_success<T>(result: T) -> ApiSuccess<T> {
        ApiSuccess {
            result,
            result_info: None,
            messages: serde_json::json!(null),
            errors: vec![],
        }
    }

    fn api_record(name: &str, content: DnsContent, proxied: bool) -> endpoints::dns::DnsRecord {
        endpoints::dns::DnsRecord {
            meta: Meta { auto_added: false },
            locked: false,
            name: name.to_string(),
            ttl: 300,
            zone_id: "023e105f4ecef8ad9ca31a8372d0c353".to_string(),
            modified_on: Utc::now(),
            created_on: Utc::now(),
            proxiable: true,
            content,
            id: format!("id-{}", name),
            proxied,
            zone_name: "example.com".to_string(),
        }
    }

    #[test]
    fn find_record_requires_exact_name_and_type_match() {
        let mut api = MockCloudflareWrapper::default();
        // A list-style API may hand back neighbors and other types at the
        // filtered name, none of which may be trusted
        api.expect_list_records().returning(|_, _| {
            Ok(api_success(vec![
                api_record(
                    "host2.example.com",
                    DnsContent::A {
                        content: Ipv4Addr::new(192, 0, 2, 1),
                    },
                    false,
                ),
                api_record(
                    "host.example.com",
                    DnsContent::TXT {
                        content: "unrelated".to_string(),
                    },
                    false,
                ),
            ]))
        });

        let p = provider(api, false);
        assert_eq!(p.find_record("host.example.com.", RecordKind::A).unwrap(), None);
    }

    #[test]
    fn find_record_is_case_insensitive_and_reports_values() {
        let mut api = MockCloudflareWrapper::default();
        api.expect_list_records().returning(|_, _| {
            Ok(api_success(vec![api_record(
                "Host.Example.COM",
                DnsContent::A {
                    content: Ipv4Addr::new(203, 0, 113, 5),
                },
                false,
            )]))
        });

        let p = provider(api, false);
        let rec = p
            .find_record("host.example.com.", RecordKind::A)
            .unwrap()
            .unwrap();
        assert_eq!(rec.values, vec![RecordContent::A(Ipv4Addr::new(203, 0, 113, 5))]);
        assert!(!rec.alias);
    }

    #[test]
    fn find_record_flags_proxied_records_as_alias() {
        let mut api = MockCloudflareWrapper::default();
        api.expect_list_records().returning(|_, _| {
            Ok(api_success(vec![api_record(
                "host.example.com",
                DnsContent::A {
                    content: Ipv4Addr::new(203, 0, 113, 5),
                },
                true,
            )]))
        });

        let p = provider(api, false);
        let rec = p
            .find_record("host.example.com.", RecordKind::A)
            .unwrap()
            .unwrap();
        assert!(rec.alias);
    }

    #[test]
    fn upsert_creates_when_no_record_exists() {
        let mut api = MockCloudflareWrapper::default();
        api.expect_list_records()
            .returning(|_, _| Ok(api_success(vec![])));
        api.expect_delete_record().times(0);
        api.expect_create_record()
            .times(1)
            .withf(|_, name, ttl, content| {
                name == "host.example.com"
                    && *ttl == Some(300)
                    && matches!(content, DnsContent::A { content } if *content == Ipv4Addr::new(203, 0, 113, 5))
            })
            .returning(|_, name, _, content| {
                Ok(api_success(api_record(name, content.clone(), false)))
            });

        let p = provider(api, false);
        p.upsert_record(
            &DnsRecord {
                name: "host.example.com.".to_string(),
                content: RecordContent::A(Ipv4Addr::new(203, 0, 113, 5)),
            },
            300,
        )
        .unwrap();
    }

    #[test]
    fn upsert_replaces_all_existing_values_with_one() {
        let mut api = MockCloudflareWrapper::default();
        api.expect_list_records().returning(|_, _| {
            Ok(api_success(vec![
                api_record(
                    "host.example.com",
                    DnsContent::A {
                        content: Ipv4Addr::new(192, 0, 2, 1),
                    },
                    false,
                ),
                api_record(
                    "host.example.com",
                    DnsContent::A {
                        content: Ipv4Addr::new(192, 0, 2, 2),
                    },
                    false,
                ),
            ]))
        });
        api.expect_delete_record()
            .times(2)
            .returning(|_, id| {
                Ok(api_success(endpoints::dns::DeleteDnsRecordResponse {
                    id: id.to_string(),
                }))
            });
        api.expect_create_record()
            .times(1)
            .returning(|_, name, _, content| {
                Ok(api_success(api_record(name, content.clone(), false)))
            });

        let p = provider(api, false);
        p.upsert_record(
            &DnsRecord {
                name: "host.example.com.".to_string(),
                content: RecordContent::A(Ipv4Addr::new(203, 0, 113, 5)),
            },
            300,
        )
        .unwrap();
    }

    #[test]
    fn dry_run_performs_no_api_writes() {
        let mut api = MockCloudflareWrapper::default();
        api.expect_list_records().times(0);
        api.expect_delete_record().times(0);
        api.expect_create_record().times(0);

        let p = provider(api, true);
        p.upsert_record(
            &DnsRecord {
                name: "host.example.com.".to_string(),
                content: RecordContent::Cname("target.example.com.".to_string()),
            },
            300,
        )
        .unwrap();
    }

    #[test]
    fn cname_content_is_written_without_trailing_dot() {
        match to_dns_content(&RecordContent::Cname("host.Example.com.".to_string())) {
            DnsContent::CNAME { content } => assert_eq!(content, "host.example.com"),
            other => panic!("unexpected content {:?}", other),
        }
    }
}
