// Global ad-blocking toggle
//
// A singleton resource: `GET`/`POST /api/dns/blocking`. The response's
// `blocking` field must be exactly `"enabled"` or `"disabled"`; anything
// else is a protocol violation, never coerced to a boolean.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{AuthMode, Client};
use crate::error::Error;
use crate::models::BlockingStatus;

#[derive(Debug, Deserialize)]
struct BlockingResponse {
    blocking: String,
}

fn parse_blocking(value: &str) -> Result<BlockingStatus, Error> {
    match value {
        "enabled" => Ok(BlockingStatus { enabled: true }),
        "disabled" => Ok(BlockingStatus { enabled: false }),
        other => Err(Error::UnexpectedBlockingStatus {
            value: other.to_string(),
        }),
    }
}

impl Client {
    /// Whether ad blocking is currently enabled.
    ///
    /// `GET /api/dns/blocking` -> 200. Not available in token mode.
    pub async fn get_blocking_status(&self) -> Result<BlockingStatus, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "get blocking status",
            }),
            AuthMode::Session(session) => {
                debug!("reading blocking status");
                let res = session.send(Method::GET, "/api/dns/blocking", None).await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "get blocking status",
                        status: status.as_u16(),
                    });
                }

                let body = res.text().await?;
                let parsed: BlockingResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;

                parse_blocking(&parsed.blocking)
            }
        }
    }

    /// Enable or disable ad blocking.
    ///
    /// `POST /api/dns/blocking` with `{"blocking": bool}` -> 200. The
    /// appliance echoes the resulting state, which is parsed with the
    /// same strict rule as the read path.
    pub async fn set_blocking_status(&self, enable: bool) -> Result<BlockingStatus, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "set blocking status",
            }),
            AuthMode::Session(session) => {
                debug!(enable, "setting blocking status");
                let body = json!({ "blocking": enable });
                let res = session
                    .send(Method::POST, "/api/dns/blocking", Some(&body))
                    .await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "set blocking status",
                        status: status.as_u16(),
                    });
                }

                let body = res.text().await?;
                let parsed: BlockingResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;

                parse_blocking(&parsed.blocking)
            }
        }
    }
}
