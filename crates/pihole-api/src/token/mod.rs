// Token-authenticated API client
//
// Hand-written client for the pre-v6 `/admin/api.php` interface, which
// authenticates with an `auth=<token>` query parameter. Only the local
// DNS and CNAME surfaces exist here; everything else is a deliberate
// capability gap in token mode.

pub mod client;
pub mod types;

pub use client::TokenClient;
