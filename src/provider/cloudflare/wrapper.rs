#![cfg_attr(test, allow(dead_code))]

use cloudflare::{
    endpoints::{self},
    framework::{
        auth::Credentials,
        response::{ApiFailure, ApiResponse},
        Environment, HttpApiClient, HttpApiClientConfig,
    },
};

use crate::provider::{ProviderError, TTL};

const CLOUDFLARE_ZONE_PAGE_SIZE: u8 = 50;
const CLOUDFLARE_RECORD_PAGE_SIZE: u16 = 5000;

/// Internal wrapper around the Cloudflare API. Provides some convenience features such as paged requests
pub struct CloudflareWrapper {
    client: HttpApiClient,
}

impl CloudflareWrapper {
    // Perform a paged request by repeatedly calling the provided request fun.
    // page_size must match the page_size in the request. The caller is
    // responsible for ensuring that these match
    fn paged_request<R>(
        &self,
        page_size: usize,
        request: &mut dyn FnMut(u32) -> ApiResponse<Vec<R>>,
    ) -> ApiResponse<Vec<R>> {
        let mut page_counter = 1;

        // Initial failures are never good, return quickly
        let mut response = request(page_counter)?;
        let mut current_size = response.result.len();

        while current_size >= page_size {
            page_counter += 1;
            match request(page_counter) {
                Ok(r) => {
                    current_size = r.result.len();
                    let mut previous_results = response.result;
                    response = r;
                    response.result.append(&mut previous_results);
                }
                Err(e) => match e {
                    ApiFailure::Error(code, _) => match code {
                        http::StatusCode::NOT_FOUND => return Ok(response),
                        _ => return Err(e),
                    },
                    ApiFailure::Invalid(e) => return Err(e.into()),
                },
            };
        }
        Ok(response)
    }

    pub fn list_zones(&self, name: Option<String>) -> ApiResponse<Vec<endpoints::zone::Zone>> {
        self.paged_request(
            CLOUDFLARE_ZONE_PAGE_SIZE.into(),
            &mut |page_counter: u32| {
                self.client.request(&endpoints::zone::ListZones {
                    params: endpoints::zone::ListZonesParams {
                        name: name.to_owned(),
                        page: Some(page_counter),
                        per_page: Some(CLOUDFLARE_ZONE_PAGE_SIZE.into()),
                        ..Default::default()
                    },
                })
            },
        )
    }

    pub fn list_records(
        &self,
        zone_id: &str,
        name: Option<String>,
    ) -> ApiResponse<Vec<endpoints::dns::DnsRecord>> {
        self.paged_request(
            CLOUDFLARE_RECORD_PAGE_SIZE.into(),
            &mut |page_counter: u32| {
                self.client.request(&endpoints::dns::ListDnsRecords {
                    zone_identifier: zone_id,
                    params: endpoints::dns::ListDnsRecordsParams {
                        name: name.to_owned(),
                        page: Some(page_counter),
                        per_page: Some(CLOUDFLARE_RECORD_PAGE_SIZE.into()),
                        ..Default::default()
                    },
                })
            },
        )
    }

    pub fn create_record(
        &self,
        zone_id: &str,
        name: &str,
        ttl: &Option<TTL>,
        content: endpoints::dns::DnsContent,
    ) -> ApiResponse<endpoints::dns::DnsRecord> {
        self.client.request(&endpoints::dns::CreateDnsRecord {
            zone_identifier: zone_id,
            params: endpoints::dns::CreateDnsRecordParams {
                priority: None,
                ttl: *ttl,
                proxied: Some(false),
                name,
                content,
            },
        })
    }

    pub fn delete_record(
        &self,
        zone_id: &str,
        record_id: &str,
    ) -> ApiResponse<endpoints::dns::DeleteDnsRecordResponse> {
        self.client.request(&endpoints::dns::DeleteDnsRecord {
            zone_identifier: zone_id,
            identifier: record_id,
        })
    }

    pub fn try_new(api_token: &str) -> Result<CloudflareWrapper, ProviderError> {
        let api = HttpApiClient::new(
            Credentials::UserAuthToken {
                token: api_token.into(),
            },
            HttpApiClientConfig::default(),
            Environment::Production,
        );

        match api {
            Ok(api) => Ok(CloudflareWrapper { client: api }),
            Err(e) => Err(ProviderError::Internal(e.to_string())),
        }
    }
}

#[cfg(test)]
use mockall::mock;

#[cfg(test)]
mock! {
    pub CloudflareWrapper {
        pub fn list_zones(&self, name: Option<String>) -> ApiResponse<Vec<endpoints::zone::Zone>>;
        pub fn list_records(
            &self,
            zone_id: &str,
            name: Option<String>,
        ) -> ApiResponse<Vec<endpoints::dns::DnsRecord>>;
        pub fn create_record(
            &self,
            zone_id: &str,
            name: &str,
            ttl: &Option<TTL>,
            content: endpoints::dns::DnsContent,
        ) -> ApiResponse<endpoints::dns::DnsRecord>;
        pub fn delete_record(
            &self,
            zone_id: &str,
            record_id: &str,
        ) -> ApiResponse<endpoints::dns::DeleteDnsRecordResponse>;
        pub fn try_new(api_token: &str) -> Result<MockCloudflareWrapper, ProviderError>;
    }
}
