// ── Runtime connection configuration ──
//
// These types describe *how* to connect to an appliance. They carry
// credential data and connection tuning, but never touch disk. Host
// tooling typically fills them from environment variables; `from_env`
// reads the conventional names.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::auth::ServiceToken;
use crate::client::Client;
use crate::error::Error;

/// Default appliance URL when `PIHOLE_URL` is not set.
const DEFAULT_URL: &str = "http://pi.hole";

/// How to authenticate with the appliance.
///
/// The two credential kinds are mutually exclusive by construction --
/// there is no way to configure both a password and an API token.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Admin password; drives the session login handshake.
    Password(SecretString),
    /// API token; drives the legacy `api.php` interface. Experimental,
    /// with a reduced capability set.
    ApiToken(SecretString),
}

/// Configuration for connecting to a single appliance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Appliance URL (e.g. `http://pi.hole`).
    pub url: String,
    /// Authentication credentials.
    pub auth: AuthCredentials,
    /// User agent for outbound requests; a crate default applies when
    /// unset.
    pub user_agent: Option<String>,
    /// Custom CA file for TLS trust.
    pub ca_file: Option<PathBuf>,
    /// Request timeout. `None` leaves the transport defaults in place.
    pub timeout: Option<Duration>,
    /// Cloudflare Access service-token pair, attached to every outbound
    /// request when the appliance sits behind a reverse proxy.
    pub service_token: Option<ServiceToken>,
}

impl Config {
    pub fn new(url: impl Into<String>, auth: AuthCredentials) -> Self {
        Self {
            url: url.into(),
            auth,
            user_agent: None,
            ca_file: None,
            timeout: None,
            service_token: None,
        }
    }

    /// Load configuration from the conventional environment variables:
    /// `PIHOLE_URL`, `PIHOLE_PASSWORD`, `PIHOLE_API_TOKEN`,
    /// `PIHOLE_CA_FILE`, `CF_ACCESS_CLIENT_ID`,
    /// `CF_ACCESS_CLIENT_SECRET`.
    ///
    /// Exactly one of the password and API token must be set; a
    /// service-token half without its partner is rejected.
    pub fn from_env() -> Result<Self, Error> {
        let url = env_var("PIHOLE_URL").unwrap_or_else(|| DEFAULT_URL.to_string());

        let auth = match (env_var("PIHOLE_PASSWORD"), env_var("PIHOLE_API_TOKEN")) {
            (Some(_), Some(_)) => {
                return Err(Error::ClientValidation {
                    message: "PIHOLE_PASSWORD and PIHOLE_API_TOKEN are mutually exclusive".into(),
                });
            }
            (None, None) => {
                return Err(Error::ClientValidation {
                    message: "either PIHOLE_PASSWORD or PIHOLE_API_TOKEN must be set".into(),
                });
            }
            (Some(password), None) => AuthCredentials::Password(SecretString::from(password)),
            (None, Some(token)) => AuthCredentials::ApiToken(SecretString::from(token)),
        };

        let service_token = match (
            env_var("CF_ACCESS_CLIENT_ID"),
            env_var("CF_ACCESS_CLIENT_SECRET"),
        ) {
            (Some(id), Some(secret)) => Some(ServiceToken::new(id, secret)),
            (Some(_), None) => {
                return Err(Error::ClientValidation {
                    message: "CF_ACCESS_CLIENT_ID is set but CF_ACCESS_CLIENT_SECRET is not".into(),
                });
            }
            (None, Some(_)) => {
                return Err(Error::ClientValidation {
                    message: "CF_ACCESS_CLIENT_SECRET is set but CF_ACCESS_CLIENT_ID is not".into(),
                });
            }
            (None, None) => None,
        };

        Ok(Self {
            url,
            auth,
            user_agent: None,
            ca_file: env_var("PIHOLE_CA_FILE").map(PathBuf::from),
            timeout: None,
            service_token,
        })
    }

    /// Build a validated `Client` from this configuration.
    pub fn client(self) -> Result<Client, Error> {
        Client::new(self)
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
