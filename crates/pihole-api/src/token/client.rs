// Token API HTTP client
//
// Wraps `reqwest::Client` with api.php URL construction and the
// `{"data": [...]}` / `{"success", "message"}` response shapes. All
// requests are GETs with the action encoded in query parameters, the way
// the legacy interface works.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::{ServiceToken, apply_service_token};
use crate::error::Error;
use crate::models::{CnameRecord, DnsRecord};
use crate::token::types::{ApiListResponse, ApiResultResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for the legacy token-authenticated `api.php`
/// interface.
///
/// The API token travels as the `auth` query parameter on every call.
/// URLs are therefore never logged.
#[derive(Debug)]
pub struct TokenClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: SecretString,
    service_token: Option<ServiceToken>,
}

impl TokenClient {
    /// Create a new token client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        api_token: SecretString,
        transport: &TransportConfig,
        service_token: Option<ServiceToken>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, api_token, service_token))
    }

    /// Create a token client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        api_token: SecretString,
        service_token: Option<ServiceToken>,
    ) -> Self {
        Self {
            http,
            base_url,
            api_token,
            service_token,
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an `api.php` URL: `{base}/admin/api.php?<module>&k=v&auth=..`
    fn api_url(&self, module: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let full = format!(
            "{}/admin/api.php",
            self.base_url.as_str().trim_end_matches('/')
        );
        let mut url = Url::parse(&full)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_key_only(module);
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("auth", self.api_token.expose_secret());
        }

        Ok(url)
    }

    /// Send a GET and parse the response, requiring HTTP 200.
    async fn call<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<T, Error> {
        debug!("api.php {operation}");

        let req = self.http.get(url);
        let req = apply_service_token(self.service_token.as_ref(), req)?;
        let res = req.send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Require `success: true` from a mutation acknowledgement.
    fn check_result(operation: &'static str, res: ApiResultResponse) -> Result<(), Error> {
        if res.success {
            Ok(())
        } else {
            Err(Error::TokenApi {
                operation,
                message: res.message,
            })
        }
    }

    // ── Local DNS ────────────────────────────────────────────────────

    /// List the custom DNS records.
    ///
    /// `GET /admin/api.php?customdns&action=get`
    pub async fn list_dns_records(&self) -> Result<Vec<DnsRecord>, Error> {
        let url = self.api_url("customdns", &[("action", "get")])?;
        let res: ApiListResponse = self.call(url, "list dns records").await?;

        res.data
            .iter()
            .map(|entry| {
                let (domain, ip) = pair(entry, "dns record")?;
                Ok(DnsRecord { domain, ip })
            })
            .collect()
    }

    /// Look up a custom DNS record by domain. `None` when absent.
    pub async fn get_dns_record(&self, domain: &str) -> Result<Option<DnsRecord>, Error> {
        let list = self.list_dns_records().await?;
        Ok(list.into_iter().find(|r| r.domain == domain))
    }

    /// Create a custom DNS record.
    ///
    /// `GET /admin/api.php?customdns&action=add&ip=..&domain=..`
    pub async fn create_dns_record(&self, domain: &str, ip: &str) -> Result<(), Error> {
        let url = self.api_url(
            "customdns",
            &[("action", "add"), ("ip", ip), ("domain", domain)],
        )?;
        let res: ApiResultResponse = self.call(url, "create dns record").await?;
        Self::check_result("create dns record", res)
    }

    /// Delete a custom DNS record by domain.
    ///
    /// The record is resolved first (the delete action needs both
    /// fields). Returns the deleted record, or `None` when no record
    /// exists for the domain.
    pub async fn delete_dns_record(&self, domain: &str) -> Result<Option<DnsRecord>, Error> {
        let Some(record) = self.get_dns_record(domain).await? else {
            return Ok(None);
        };

        let url = self.api_url(
            "customdns",
            &[
                ("action", "delete"),
                ("ip", &record.ip),
                ("domain", &record.domain),
            ],
        )?;
        let res: ApiResultResponse = self.call(url, "delete dns record").await?;
        Self::check_result("delete dns record", res)?;
        Ok(Some(record))
    }

    // ── Local CNAME ──────────────────────────────────────────────────

    /// List the CNAME records.
    ///
    /// `GET /admin/api.php?customcname&action=get`
    pub async fn list_cname_records(&self) -> Result<Vec<CnameRecord>, Error> {
        let url = self.api_url("customcname", &[("action", "get")])?;
        let res: ApiListResponse = self.call(url, "list cname records").await?;

        res.data
            .iter()
            .map(|entry| {
                let (domain, target) = pair(entry, "cname record")?;
                Ok(CnameRecord { domain, target })
            })
            .collect()
    }

    /// Look up a CNAME record by domain. `None` when absent.
    pub async fn get_cname_record(&self, domain: &str) -> Result<Option<CnameRecord>, Error> {
        let list = self.list_cname_records().await?;
        Ok(list.into_iter().find(|r| r.domain == domain))
    }

    /// Create a CNAME record.
    ///
    /// `GET /admin/api.php?customcname&action=add&domain=..&target=..`
    pub async fn create_cname_record(&self, domain: &str, target: &str) -> Result<(), Error> {
        let url = self.api_url(
            "customcname",
            &[("action", "add"), ("domain", domain), ("target", target)],
        )?;
        let res: ApiResultResponse = self.call(url, "create cname record").await?;
        Self::check_result("create cname record", res)
    }

    /// Delete a CNAME record by domain.
    ///
    /// Returns the deleted record, or `None` when no record exists for
    /// the domain.
    pub async fn delete_cname_record(&self, domain: &str) -> Result<Option<CnameRecord>, Error> {
        let Some(record) = self.get_cname_record(domain).await? else {
            return Ok(None);
        };

        let url = self.api_url(
            "customcname",
            &[
                ("action", "delete"),
                ("domain", &record.domain),
                ("target", &record.target),
            ],
        )?;
        let res: ApiResultResponse = self.call(url, "delete cname record").await?;
        Self::check_result("delete cname record", res)?;
        Ok(Some(record))
    }
}

/// Destructure a two-element api.php list entry, failing the whole list
/// on any other shape.
fn pair(entry: &[String], resource: &'static str) -> Result<(String, String), Error> {
    if let [first, second] = entry {
        Ok((first.clone(), second.clone()))
    } else {
        Err(Error::MalformedListEntry {
            resource,
            entry: entry.join(" "),
        })
    }
}
