// Wire shapes for the legacy `api.php` interface.

use serde::Deserialize;

/// List payload from `api.php` read endpoints: an array of string pairs
/// (`[domain, ip]` for customdns, `[domain, target]` for customcname).
#[derive(Debug, Deserialize)]
pub(crate) struct ApiListResponse {
    #[serde(default)]
    pub data: Vec<Vec<String>>,
}

/// Mutation acknowledgement from `api.php` write endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResultResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
