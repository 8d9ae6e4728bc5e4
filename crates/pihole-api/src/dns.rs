// Custom DNS host entries
//
// List/get/create/delete against `/api/config/dns/hosts`. The list wire
// format is a flat array of `"<ip> <domain>"` strings; create and
// delete address a record by joining both fields into the URL path with
// an encoded space.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::client::{AuthMode, Client};
use crate::error::Error;
use crate::models::DnsRecord;

#[derive(Debug, Deserialize)]
struct DnsHostsResponse {
    config: DnsHostsConfig,
}

#[derive(Debug, Deserialize)]
struct DnsHostsConfig {
    dns: DnsHostsPayload,
}

#[derive(Debug, Deserialize)]
struct DnsHostsPayload {
    #[serde(default)]
    hosts: Vec<String>,
}

/// Split an `"<ip> <domain>"` list entry. Exactly two space-separated
/// fields, or the whole list call fails.
fn parse_host_entry(entry: &str) -> Result<DnsRecord, Error> {
    match entry.split(' ').collect::<Vec<_>>().as_slice() {
        [ip, domain] => Ok(DnsRecord {
            domain: (*domain).to_string(),
            ip: (*ip).to_string(),
        }),
        _ => Err(Error::MalformedListEntry {
            resource: "dns record",
            entry: entry.to_string(),
        }),
    }
}

fn not_found(domain: &str) -> Error {
    Error::NotFound {
        message: format!("dns record with domain {domain:?} not found"),
    }
}

impl Client {
    /// List the custom DNS records configured on the appliance.
    ///
    /// `GET /api/config/dns/hosts` -> 200. Not available in token mode.
    pub async fn list_dns_records(&self) -> Result<Vec<DnsRecord>, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "list dns records",
            }),
            AuthMode::Session(session) => {
                debug!("listing dns records");
                let res = session
                    .send(Method::GET, "/api/config/dns/hosts", None)
                    .await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "list dns records",
                        status: status.as_u16(),
                    });
                }

                let body = res.text().await?;
                let parsed: DnsHostsResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;

                parsed
                    .config
                    .dns
                    .hosts
                    .iter()
                    .map(|entry| parse_host_entry(entry))
                    .collect()
            }
        }
    }

    /// Look up a custom DNS record by domain.
    ///
    /// Session mode scans the list result; token mode delegates to the
    /// api.php lookup. A miss is a `NotFound` error either way.
    pub async fn get_dns_record(&self, domain: &str) -> Result<DnsRecord, Error> {
        match &self.mode {
            AuthMode::Token(token) => token
                .get_dns_record(domain)
                .await?
                .ok_or_else(|| not_found(domain)),
            AuthMode::Session(_) => {
                let list = self.list_dns_records().await?;
                list.into_iter()
                    .find(|r| r.domain == domain)
                    .ok_or_else(|| not_found(domain))
            }
        }
    }

    /// Create a custom DNS record.
    ///
    /// `PUT /api/config/dns/hosts/<ip>%20<domain>` -> 201
    pub async fn create_dns_record(&self, record: &DnsRecord) -> Result<DnsRecord, Error> {
        match &self.mode {
            AuthMode::Token(token) => {
                token.create_dns_record(&record.domain, &record.ip).await?;
                Ok(record.clone())
            }
            AuthMode::Session(session) => {
                debug!(domain = %record.domain, ip = %record.ip, "creating dns record");
                let path = format!("/api/config/dns/hosts/{}%20{}", record.ip, record.domain);
                let res = session.send(Method::PUT, &path, None).await?;

                let status = res.status();
                if status != StatusCode::CREATED {
                    return Err(Error::UnexpectedStatus {
                        operation: "create dns record",
                        status: status.as_u16(),
                    });
                }

                Ok(record.clone())
            }
        }
    }

    /// Delete a custom DNS record by domain.
    ///
    /// The record is re-read first -- both fields are needed to build
    /// the path. `DELETE /api/config/dns/hosts/<ip>%20<domain>` -> 204
    pub async fn delete_dns_record(&self, domain: &str) -> Result<(), Error> {
        match &self.mode {
            AuthMode::Token(token) => match token.delete_dns_record(domain).await? {
                Some(_) => Ok(()),
                None => Err(not_found(domain)),
            },
            AuthMode::Session(session) => {
                let record = self.get_dns_record(domain).await?;

                debug!(domain = %record.domain, ip = %record.ip, "deleting dns record");
                let path = format!("/api/config/dns/hosts/{}%20{}", record.ip, record.domain);
                let res = session.send(Method::DELETE, &path, None).await?;

                let status = res.status();
                if status != StatusCode::NO_CONTENT {
                    return Err(Error::UnexpectedStatus {
                        operation: "delete dns record",
                        status: status.as_u16(),
                    });
                }

                Ok(())
            }
        }
    }
}
