// Credential material: the legacy double-hashed web password and the
// optional Cloudflare Access service-token header pair.

use reqwest::RequestBuilder;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header names for the Cloudflare Access service-token pair.
const CF_ACCESS_CLIENT_ID: &str = "CF-Access-Client-Id";
const CF_ACCESS_CLIENT_SECRET: &str = "CF-Access-Client-Secret";

/// Double-hash a password with SHA-256.
///
/// The password is hashed, hex-encoded, and the lowercase hex string is
/// hashed and hex-encoded again. This is the appliance's legacy "web
/// password" scheme, used only for query-parameter authentication; the
/// session login sends the plaintext password as JSON instead.
pub fn double_hash256(data: &str) -> String {
    use sha2::{Digest, Sha256};

    let first = hex::encode(Sha256::digest(data.as_bytes()));
    hex::encode(Sha256::digest(first.as_bytes()))
}

/// Cloudflare Access service token, attached as a header pair to every
/// outbound request when a reverse proxy fronts the appliance.
#[derive(Debug, Clone)]
pub struct ServiceToken {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ServiceToken {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Attach the access headers to a request under construction.
    ///
    /// Fails if either credential cannot be encoded as a header value,
    /// in which case no request is issued at all.
    pub(crate) fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        let id = HeaderValue::from_str(&self.client_id)?;
        let mut secret = HeaderValue::from_str(self.client_secret.expose_secret())?;
        secret.set_sensitive(true);

        Ok(req
            .header(CF_ACCESS_CLIENT_ID, id)
            .header(CF_ACCESS_CLIENT_SECRET, secret))
    }
}

/// Attach service-token headers when configured, pass through otherwise.
pub(crate) fn apply_service_token(
    token: Option<&ServiceToken>,
    req: RequestBuilder,
) -> Result<RequestBuilder, Error> {
    match token {
        Some(t) => t.apply(req),
        None => Ok(req),
    }
}
