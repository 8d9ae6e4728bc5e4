use thiserror::Error;

/// Top-level error type for the `pihole-api` crate.
///
/// Covers every failure mode across both API surfaces: client
/// construction, session authentication, the v6 JSON endpoints, and the
/// legacy `api.php` token interface. Nothing is retried and nothing is
/// swallowed -- every variant propagates to the immediate caller.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction / validation ───────────────────────────────────
    /// Required configuration is missing or inconsistent.
    #[error("client validation failed: {message}")]
    ClientValidation { message: String },

    /// Group names must not contain whitespace; rejected before any
    /// request is issued.
    #[error("invalid group name {name:?}: group names must not contain whitespace")]
    InvalidGroupName { name: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The login handshake failed (transport, status, or parse).
    #[error("login failed: {message}")]
    Login { message: String },

    // ── Capability gaps ─────────────────────────────────────────────
    /// The operation is not available when authenticating with an API
    /// token.
    #[error("not implemented for token client: {operation}")]
    NotImplementedTokenClient { operation: &'static str },

    // ── Lookup ──────────────────────────────────────────────────────
    /// Key lookup miss. Surfaced distinctly so callers can treat
    /// absence as success during reconciliation.
    #[error("{message}")]
    NotFound { message: String },

    // ── HTTP outcomes ───────────────────────────────────────────────
    /// An endpoint returned something other than its documented success
    /// code.
    #[error("{operation} returned unexpected status code {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A service-token credential could not be encoded as a header
    /// value; the request is never issued.
    #[error("invalid service token header: {0}")]
    ServiceToken(#[from] reqwest::header::InvalidHeaderValue),

    /// TLS setup error (unreadable or invalid CA file).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A delimited list entry did not split into exactly two fields.
    /// Fails the entire list call, never skipped per-record.
    #[error("malformed {resource} list entry {entry:?}")]
    MalformedListEntry {
        resource: &'static str,
        entry: String,
    },

    /// The blocking endpoint reported something other than the literal
    /// `"enabled"` / `"disabled"`.
    #[error("unexpected blocking status {value:?}")]
    UnexpectedBlockingStatus { value: String },

    /// The legacy `api.php` interface reported `success: false`.
    #[error("{operation} failed: {message}")]
    TokenApi {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    /// Returns `true` if this error is a "not found" lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the operation is unavailable in token mode.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplementedTokenClient { .. })
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
