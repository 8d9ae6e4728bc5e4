// pihole-api: Async Rust client for the Pi-hole management API
// (session-authenticated v6 endpoints + legacy token interface)

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod token;
pub mod transport;

mod blocking;
mod cname;
mod dns;
mod groups;

pub use auth::ServiceToken;
pub use client::Client;
pub use config::{AuthCredentials, Config};
pub use error::Error;
pub use models::{
    BlockingStatus, CnameRecord, DnsRecord, Group, GroupCreateRequest, GroupUpdateRequest,
};
pub use session::SessionClient;
pub use token::TokenClient;
pub use transport::{TlsMode, TransportConfig};
