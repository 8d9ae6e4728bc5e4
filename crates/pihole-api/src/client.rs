// Top-level client and authentication-mode dispatch.
//
// Every public resource operation matches on `AuthMode` -- a tagged
// variant, not a nullable delegate -- and either drives the session
// client or forwards to the token client. Operations the token
// interface cannot serve fail with a fixed capability-gap error.

use secrecy::ExposeSecret;
use url::Url;

use crate::config::{AuthCredentials, Config};
use crate::error::Error;
use crate::session::SessionClient;
use crate::token::TokenClient;
use crate::transport::{TlsMode, TransportConfig};

/// How the client authenticates against the appliance.
#[derive(Debug)]
pub(crate) enum AuthMode {
    /// Password login with session cookie + csrf token (v6 API).
    Session(SessionClient),
    /// API token on the legacy `api.php` interface.
    Token(TokenClient),
}

/// Pi-hole API client.
///
/// Constructed once per configuration; session state mutates across
/// calls behind the session client's lock. Resource operations live in
/// the `dns`, `cname`, `groups`, and `blocking` modules.
#[derive(Debug)]
pub struct Client {
    pub(crate) mode: AuthMode,
}

impl Client {
    /// Build a client from configuration, validating required fields.
    pub fn new(config: Config) -> Result<Self, Error> {
        if config.url.is_empty() {
            return Err(Error::ClientValidation {
                message: "Pi-hole URL is not set".into(),
            });
        }

        let base_url = Url::parse(&config.url)?;

        let mut transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        if let Some(path) = config.ca_file {
            transport.tls = TlsMode::CustomCa(path);
        }
        if let Some(user_agent) = config.user_agent {
            transport.user_agent = user_agent;
        }

        let mode = match config.auth {
            AuthCredentials::Password(password) => {
                if password.expose_secret().is_empty() {
                    return Err(Error::ClientValidation {
                        message: "password is not set".into(),
                    });
                }

                AuthMode::Session(SessionClient::new(
                    base_url,
                    password,
                    &transport,
                    config.service_token,
                )?)
            }
            AuthCredentials::ApiToken(token) => {
                if token.expose_secret().is_empty() {
                    return Err(Error::ClientValidation {
                        message: "API token is not set".into(),
                    });
                }

                AuthMode::Token(TokenClient::new(
                    base_url,
                    token,
                    &transport,
                    config.service_token,
                )?)
            }
        };

        Ok(Self { mode })
    }

    /// The session client, when password-authenticated. Gives access to
    /// the raw request builders.
    pub fn session_client(&self) -> Option<&SessionClient> {
        match &self.mode {
            AuthMode::Session(session) => Some(session),
            AuthMode::Token(_) => None,
        }
    }

    /// The token client, when token-authenticated.
    pub fn token_client(&self) -> Option<&TokenClient> {
        match &self.mode {
            AuthMode::Token(token) => Some(token),
            AuthMode::Session(_) => None,
        }
    }
}
