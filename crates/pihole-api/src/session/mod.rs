// Session-authenticated API client
//
// Hand-written client for the appliance's v6 JSON API. Performs the
// password login handshake and holds the resulting session credentials
// behind a mutex so concurrent first calls trigger exactly one login.

pub mod client;

pub use client::SessionClient;
