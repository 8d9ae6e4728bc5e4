// CNAME aliases
//
// Same shape as the DNS host entries, with a comma-delimited wire
// format (`"<domain>,<target>"`) and an encoded comma in mutation
// paths.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::client::{AuthMode, Client};
use crate::error::Error;
use crate::models::CnameRecord;

#[derive(Debug, Deserialize)]
struct CnameRecordsResponse {
    config: CnameRecordsConfig,
}

#[derive(Debug, Deserialize)]
struct CnameRecordsConfig {
    dns: CnameRecordsPayload,
}

#[derive(Debug, Deserialize)]
struct CnameRecordsPayload {
    #[serde(default, rename = "cnameRecords")]
    cname_records: Vec<String>,
}

/// Split a `"<domain>,<target>"` list entry. Exactly two comma-separated
/// fields, or the whole list call fails.
fn parse_cname_entry(entry: &str) -> Result<CnameRecord, Error> {
    match entry.split(',').collect::<Vec<_>>().as_slice() {
        [domain, target] => Ok(CnameRecord {
            domain: (*domain).to_string(),
            target: (*target).to_string(),
        }),
        _ => Err(Error::MalformedListEntry {
            resource: "cname record",
            entry: entry.to_string(),
        }),
    }
}

fn not_found(domain: &str) -> Error {
    Error::NotFound {
        message: format!("cname record with domain {domain:?} not found"),
    }
}

impl Client {
    /// List the CNAME records configured on the appliance.
    ///
    /// `GET /api/config/dns/cnameRecords` -> 200. Not available in
    /// token mode.
    pub async fn list_cname_records(&self) -> Result<Vec<CnameRecord>, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "list cname records",
            }),
            AuthMode::Session(session) => {
                debug!("listing cname records");
                let res = session
                    .send(Method::GET, "/api/config/dns/cnameRecords", None)
                    .await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "list cname records",
                        status: status.as_u16(),
                    });
                }

                let body = res.text().await?;
                let parsed: CnameRecordsResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;

                parsed
                    .config
                    .dns
                    .cname_records
                    .iter()
                    .map(|entry| parse_cname_entry(entry))
                    .collect()
            }
        }
    }

    /// Look up a CNAME record by domain.
    pub async fn get_cname_record(&self, domain: &str) -> Result<CnameRecord, Error> {
        match &self.mode {
            AuthMode::Token(token) => token
                .get_cname_record(domain)
                .await?
                .ok_or_else(|| not_found(domain)),
            AuthMode::Session(_) => {
                let list = self.list_cname_records().await?;
                list.into_iter()
                    .find(|r| r.domain == domain)
                    .ok_or_else(|| not_found(domain))
            }
        }
    }

    /// Create a CNAME record.
    ///
    /// `PUT /api/config/dns/cnameRecords/<domain>%2C<target>` -> 201
    pub async fn create_cname_record(&self, record: &CnameRecord) -> Result<CnameRecord, Error> {
        match &self.mode {
            AuthMode::Token(token) => {
                token
                    .create_cname_record(&record.domain, &record.target)
                    .await?;
                Ok(record.clone())
            }
            AuthMode::Session(session) => {
                debug!(domain = %record.domain, target = %record.target, "creating cname record");
                let path = format!(
                    "/api/config/dns/cnameRecords/{}%2C{}",
                    record.domain, record.target
                );
                let res = session.send(Method::PUT, &path, None).await?;

                let status = res.status();
                if status != StatusCode::CREATED {
                    return Err(Error::UnexpectedStatus {
                        operation: "create cname record",
                        status: status.as_u16(),
                    });
                }

                Ok(record.clone())
            }
        }
    }

    /// Delete a CNAME record by domain.
    ///
    /// The record is re-read first to recover the target.
    /// `DELETE /api/config/dns/cnameRecords/<domain>%2C<target>` -> 204
    pub async fn delete_cname_record(&self, domain: &str) -> Result<(), Error> {
        match &self.mode {
            AuthMode::Token(token) => match token.delete_cname_record(domain).await? {
                Some(_) => Ok(()),
                None => Err(not_found(domain)),
            },
            AuthMode::Session(session) => {
                let record = self.get_cname_record(domain).await?;

                debug!(domain = %record.domain, target = %record.target, "deleting cname record");
                let path = format!(
                    "/api/config/dns/cnameRecords/{}%2C{}",
                    record.domain, record.target
                );
                let res = session.send(Method::DELETE, &path, None).await?;

                let status = res.status();
                if status != StatusCode::NO_CONTENT {
                    return Err(Error::UnexpectedStatus {
                        operation: "delete cname record",
                        status: status.as_u16(),
                    });
                }

                Ok(())
            }
        }
    }
}
