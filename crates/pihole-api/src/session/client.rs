// Session-authenticated HTTP client
//
// Wraps `reqwest::Client` with the appliance's login handshake, session
// cookie plumbing, and the three request-construction strategies
// (unauthenticated form, session form, query auth). Resource modules
// (dns, cname, groups, blocking) are implemented as inherent methods on
// the top-level `Client` and drive the JSON endpoints through `send`.

use std::collections::BTreeMap;

use reqwest::header::COOKIE;
use reqwest::{Method, Request, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{ServiceToken, apply_service_token, double_hash256};
use crate::error::Error;
use crate::transport::TransportConfig;

/// CSRF header accompanying cookie-authenticated JSON requests.
const CSRF_HEADER: &str = "X-FTL-CSRF";

/// Appliance-issued session credentials. Transient; they expire server
/// side, and absence of either triggers a fresh login.
#[derive(Debug, Clone)]
pub(crate) struct SessionCredentials {
    pub sid: String,
    pub csrf: String,
}

/// Raw HTTP client for the appliance's session-authenticated API.
///
/// Holds the admin password, the derived legacy web password, and the
/// current session state. Login is lazy: the first session request
/// performs the handshake, guarded by a mutex so concurrent callers
/// produce a single login.
#[derive(Debug)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    password: SecretString,
    web_password: String,
    session: Mutex<Option<SessionCredentials>>,
    service_token: Option<ServiceToken>,
}

impl SessionClient {
    /// Create a new session client from a `TransportConfig`.
    ///
    /// The `base_url` should be the appliance root (e.g.
    /// `http://pi.hole`). The legacy web password is derived here, once.
    pub fn new(
        base_url: Url,
        password: SecretString,
        transport: &TransportConfig,
        service_token: Option<ServiceToken>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, password, service_token))
    }

    /// Create a session client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        password: SecretString,
        service_token: Option<ServiceToken>,
    ) -> Self {
        let web_password = double_hash256(password.expose_secret());
        Self {
            http,
            base_url,
            password,
            web_password,
            session: Mutex::new(None),
            service_token,
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an appliance path like `/api/auth`.
    ///
    /// Paths may carry pre-encoded segments (`%20`, `%2C`); string
    /// concatenation keeps them intact.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Force a login handshake and store the resulting credentials.
    pub async fn login(&self) -> Result<(), Error> {
        let creds = self.handshake().await?;
        *self.session.lock().await = Some(creds);
        Ok(())
    }

    /// Return the held session credentials, logging in first if there
    /// are none. The lock is held across the login round-trip so racing
    /// first calls produce exactly one handshake.
    async fn session(&self) -> Result<SessionCredentials, Error> {
        let mut guard = self.session.lock().await;
        if let Some(creds) = guard.as_ref() {
            return Ok(creds.clone());
        }

        let creds = self.handshake().await?;
        *guard = Some(creds.clone());
        Ok(creds)
    }

    /// POST the plaintext password to `/api/auth` and extract the
    /// session id and csrf token.
    async fn handshake(&self) -> Result<SessionCredentials, Error> {
        #[derive(Deserialize)]
        struct AuthResponse {
            session: SessionPayload,
        }

        #[derive(Deserialize)]
        struct SessionPayload {
            sid: String,
            csrf: String,
            #[serde(default)]
            valid: bool,
            #[serde(default)]
            totp: bool,
            #[serde(default)]
            validity: i64,
            #[serde(default)]
            message: Option<String>,
        }

        let url = self.api_url("/api/auth")?;
        debug!("POST {url}");

        let req = self
            .http
            .post(url)
            .json(&serde_json::json!({ "password": self.password.expose_secret() }));
        let req = apply_service_token(self.service_token.as_ref(), req)?;

        let res = req.send().await.map_err(|e| Error::Login {
            message: format!("login request failed: {e}"),
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| Error::Login {
            message: format!("failed to read login response: {e}"),
        })?;

        if status != StatusCode::OK {
            return Err(Error::Login {
                message: format!("failed to login, got status code {}", status.as_u16()),
            });
        }

        let parsed: AuthResponse = serde_json::from_str(&body).map_err(|e| Error::Login {
            message: format!("unable to parse login response: {e}"),
        })?;

        let session = parsed.session;

        // The appliance's own verdict is not enforced; a session marked
        // invalid (e.g. TOTP pending) is stored anyway.
        if !session.valid {
            warn!(
                totp = session.totp,
                message = session.message.as_deref().unwrap_or(""),
                "appliance reported the new session as invalid"
            );
        }

        if session.sid.is_empty() {
            return Err(Error::ClientValidation {
                message: "session id not set after login".into(),
            });
        }

        if session.csrf.is_empty() {
            return Err(Error::ClientValidation {
                message: "session token not set after login".into(),
            });
        }

        debug!(validity = session.validity, "session established");

        Ok(SessionCredentials {
            sid: session.sid,
            csrf: session.csrf,
        })
    }

    // ── Request builders ─────────────────────────────────────────────

    /// Build an unauthenticated, form-encoded request.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        form: &BTreeMap<String, String>,
    ) -> Result<Request, Error> {
        let url = self.api_url(path)?;
        let req = self.http.request(method, url).form(form);
        let req = apply_service_token(self.service_token.as_ref(), req)?;
        Ok(req.build()?)
    }

    /// Build a session-authenticated, form-encoded request.
    ///
    /// Logs in first when no session is held. The csrf token is merged
    /// into the caller's form values under the `token` key; on
    /// collision, the caller's value wins. The session id travels as
    /// the `sid` cookie.
    pub async fn request_with_session(
        &self,
        method: Method,
        path: &str,
        form: &BTreeMap<String, String>,
    ) -> Result<Request, Error> {
        let creds = self.session().await?;
        let url = self.api_url(path)?;

        let merged = merge_form_values(&creds.csrf, form);
        let req = self
            .http
            .request(method, url)
            .header(COOKIE, format!("sid={}", creds.sid))
            .form(&merged);
        let req = apply_service_token(self.service_token.as_ref(), req)?;
        Ok(req.build()?)
    }

    /// Build a request authenticated by the legacy web password, passed
    /// as the `auth` query parameter.
    pub fn request_with_auth(
        &self,
        method: Method,
        path: &str,
        form: &BTreeMap<String, String>,
    ) -> Result<Request, Error> {
        let mut url = self.api_url(path)?;
        url.query_pairs_mut().append_pair("auth", &self.web_password);

        let req = self.http.request(method, url).form(form);
        let req = apply_service_token(self.service_token.as_ref(), req)?;
        Ok(req.build()?)
    }

    /// Execute a previously built request.
    pub async fn execute(&self, req: Request) -> Result<Response, Error> {
        Ok(self.http.execute(req).await?)
    }

    // ── JSON endpoint sender ─────────────────────────────────────────

    /// Send a session-authenticated request to a JSON endpoint.
    ///
    /// Sets the `sid` cookie and csrf header, logging in first when no
    /// session is held. A request rejected for mid-flight session
    /// expiry is not retried; the caller observes the raw status.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, Error> {
        let creds = self.session().await?;
        let url = self.api_url(path)?;
        debug!("{method} {url}");

        let mut req = self
            .http
            .request(method, url)
            .header(COOKIE, format!("sid={}", creds.sid))
            .header(CSRF_HEADER, &creds.csrf);

        if let Some(body) = body {
            req = req.json(body);
        }

        let req = apply_service_token(self.service_token.as_ref(), req)?;
        Ok(req.send().await?)
    }
}

/// Merge the session csrf token into caller-supplied form values.
///
/// Last value wins per key, with the caller's values applied last, so a
/// caller-supplied `token` overrides the session's.
fn merge_form_values(csrf: &str, form: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    merged.insert("token".to_string(), csrf.to_string());

    for (k, v) in form {
        merged.insert(k.clone(), v.clone());
    }

    merged
}
