// Integration tests for the session-authenticated `Client` using wiremock.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pihole_api::auth::double_hash256;
use pihole_api::{
    AuthCredentials, Client, CnameRecord, Config, DnsRecord, Error, GroupCreateRequest,
    GroupUpdateRequest, ServiceToken,
};

const PASSWORD: &str = "sw0rdf1sh";
const SID: &str = "sid-123";
const CSRF: &str = "csrf-456";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Config::new(
        server.uri(),
        AuthCredentials::Password(SecretString::from(PASSWORD)),
    )
    .client()
    .expect("client builds from config");
    (server, client)
}

/// Mount the login handshake, asserting it happens exactly once.
async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": {
                "sid": SID,
                "csrf": CSRF,
                "valid": true,
                "totp": false,
                "validity": 300,
                "message": ""
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn session_cookie() -> String {
    format!("sid={SID}")
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_first_call_logs_in_exactly_once() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .and(header("cookie", session_cookie()))
        .and(header("X-FTL-CSRF", CSRF))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": ["1.2.3.4 host.local"] } }
        })))
        .expect(2)
        .mount(&server)
        .await;

    // Two list calls, one login (the `expect` counters verify on drop).
    let first = client.list_dns_records().await.expect("first list");
    let second = client.list_dns_records().await.expect("second list");

    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![DnsRecord {
            domain: "host.local".to_string(),
            ip: "1.2.3.4".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_login_failure_wraps_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_dns_records().await.expect_err("login fails");
    assert!(matches!(err, Error::Login { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_login_failure_on_unparseable_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_dns_records().await.expect_err("parse fails");
    assert!(matches!(err, Error::Login { .. }), "got: {err:?}");
}

// ── DNS records ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_dns_entry_fails_entire_list() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": ["1.2.3.4 host.local", "malformed"] } }
        })))
        .mount(&server)
        .await;

    let err = client.list_dns_records().await.expect_err("malformed entry");
    assert!(
        matches!(
            err,
            Error::MalformedListEntry { resource: "dns record", ref entry } if entry == "malformed"
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_create_dns_record() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/config/dns/hosts/10.0.0.1%20a.test"))
        .and(header("cookie", session_cookie()))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let record = DnsRecord {
        domain: "a.test".to_string(),
        ip: "10.0.0.1".to_string(),
    };
    let created = client.create_dns_record(&record).await.expect("created");
    assert_eq!(created, record);
}

#[tokio::test]
async fn test_create_dns_record_unexpected_status() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/config/dns/hosts/10.0.0.1%20a.test"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let record = DnsRecord {
        domain: "a.test".to_string(),
        ip: "10.0.0.1".to_string(),
    };
    let err = client.create_dns_record(&record).await.expect_err("not 201");
    assert!(
        matches!(err, Error::UnexpectedStatus { operation: "create dns record", status: 200 }),
        "got: {err:?}"
    );
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_get_dns_record_scans_list() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": ["1.2.3.4 host.local", "10.0.0.2 b.test"] } }
        })))
        .mount(&server)
        .await;

    let record = client.get_dns_record("b.test").await.expect("found");
    assert_eq!(record.ip, "10.0.0.2");

    let err = client.get_dns_record("missing.test").await.expect_err("miss");
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_delete_dns_record_reads_then_deletes() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": ["10.0.0.1 a.test"] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/config/dns/hosts/10.0.0.1%20a.test"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_dns_record("a.test").await.expect("deleted");
}

#[tokio::test]
async fn test_delete_missing_dns_record_is_not_found() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": [] } }
        })))
        .mount(&server)
        .await;

    let err = client.delete_dns_record("a.test").await.expect_err("missing");
    assert!(err.is_not_found(), "got: {err:?}");
}

// ── CNAME records ───────────────────────────────────────────────────

#[tokio::test]
async fn test_cname_round_trip() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/config/dns/cnameRecords/alias.test%2Ctarget.test"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/cnameRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "cnameRecords": ["alias.test,target.test"] } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/config/dns/cnameRecords/alias.test%2Ctarget.test"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let record = CnameRecord {
        domain: "alias.test".to_string(),
        target: "target.test".to_string(),
    };

    let created = client.create_cname_record(&record).await.expect("created");
    assert_eq!(created, record);

    let listed = client.list_cname_records().await.expect("listed");
    assert_eq!(listed, vec![record.clone()]);

    let fetched = client.get_cname_record("alias.test").await.expect("found");
    assert_eq!(fetched.target, "target.test");

    client.delete_cname_record("alias.test").await.expect("deleted");
}

#[tokio::test]
async fn test_malformed_cname_entry_fails_entire_list() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/cnameRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "cnameRecords": ["no-comma-here"] } }
        })))
        .mount(&server)
        .await;

    let err = client.list_cname_records().await.expect_err("malformed");
    assert!(
        matches!(err, Error::MalformedListEntry { resource: "cname record", .. }),
        "got: {err:?}"
    );
}

// ── Groups ──────────────────────────────────────────────────────────

fn groups_body() -> serde_json::Value {
    json!({
        "groups": [
            {
                "id": 0,
                "name": "default",
                "comment": "The default group",
                "enabled": true,
                "date_added": 1_700_000_000,
                "date_modified": 1_700_000_000
            },
            {
                "id": 7,
                "name": "iot",
                "comment": null,
                "enabled": false,
                "date_added": 1_700_000_500,
                "date_modified": 1_700_000_600
            }
        ]
    })
}

#[tokio::test]
async fn test_list_groups() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(&server)
        .await;

    let groups = client.list_groups().await.expect("groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "default");
    assert_eq!(groups[0].description, "The default group");
    assert_eq!(groups[1].name, "iot");
    assert_eq!(groups[1].description, "");
    assert!(!groups[1].enabled);
    assert_eq!(groups[1].date_added.timestamp(), 1_700_000_500);
    assert_eq!(groups[1].date_modified.timestamp(), 1_700_000_600);

    let by_name = client.get_group("iot").await.expect("by name");
    assert_eq!(by_name.id, 7);

    let by_id = client.get_group_by_id(0).await.expect("by id");
    assert_eq!(by_id.name, "default");

    let err = client.get_group("nope").await.expect_err("miss");
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_create_group() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .and(body_json(json!({ "name": "iot", "comment": "things" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(&server)
        .await;

    let group = client
        .create_group(&GroupCreateRequest {
            name: "iot".to_string(),
            description: "things".to_string(),
        })
        .await
        .expect("created and re-read");

    assert_eq!(group.id, 7);
    assert_eq!(group.name, "iot");
}

#[tokio::test]
async fn test_create_group_with_whitespace_rejected_locally() {
    let (server, client) = setup().await;

    // No mocks mounted on purpose: the rejection must happen before any
    // request -- including the login handshake -- goes out.
    let err = client
        .create_group(&GroupCreateRequest {
            name: "has space".to_string(),
            description: String::new(),
        })
        .await
        .expect_err("invalid name");

    assert!(matches!(err, Error::InvalidGroupName { .. }), "got: {err:?}");

    let received = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(received.is_empty(), "no network call expected");
}

#[tokio::test]
async fn test_update_group() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/groups/iot"))
        .and(body_json(json!({
            "name": "iot",
            "comment": "updated",
            "enabled": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(&server)
        .await;

    let group = client
        .update_group(&GroupUpdateRequest {
            name: "iot".to_string(),
            enabled: Some(false),
            description: "updated".to_string(),
        })
        .await
        .expect("updated and re-read");

    assert_eq!(group.id, 7);
}

#[tokio::test]
async fn test_delete_group() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/groups/iot"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_group("iot").await.expect("deleted");
}

// ── Blocking toggle ─────────────────────────────────────────────────

#[tokio::test]
async fn test_blocking_status_enabled() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "blocking": "enabled", "timer": null })),
        )
        .mount(&server)
        .await;

    let status = client.get_blocking_status().await.expect("status");
    assert!(status.enabled);
}

#[tokio::test]
async fn test_blocking_status_bogus_value_is_protocol_error() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blocking": "bogus" })))
        .mount(&server)
        .await;

    let err = client.get_blocking_status().await.expect_err("bogus");
    assert!(
        matches!(err, Error::UnexpectedBlockingStatus { ref value } if value == "bogus"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_set_blocking_disabled() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .and(body_json(json!({ "blocking": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blocking": "disabled" })))
        .mount(&server)
        .await;

    let status = client.set_blocking_status(false).await.expect("set");
    assert!(!status.enabled);
}

// ── Request builders ────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthenticated_request_is_form_encoded() {
    let (_server, client) = setup().await;
    let session = client.session_client().expect("session mode");

    let form = BTreeMap::from([("domain".to_string(), "a.test".to_string())]);
    let req = session
        .request(reqwest::Method::POST, "/admin/index.php", &form)
        .expect("request builds");

    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "application/x-www-form-urlencoded");

    let body = req.body().and_then(|b| b.as_bytes()).unwrap_or_default();
    assert_eq!(body, b"domain=a.test");
}

#[tokio::test]
async fn test_session_request_merges_csrf_token() {
    let (server, client) = setup().await;
    mount_login(&server).await;
    let session = client.session_client().expect("session mode");

    let form = BTreeMap::from([("action".to_string(), "flush".to_string())]);
    let req = session
        .request_with_session(reqwest::Method::POST, "/admin/index.php", &form)
        .await
        .expect("request builds");

    let cookie = req
        .headers()
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(cookie, session_cookie());

    let body = req.body().and_then(|b| b.as_bytes()).unwrap_or_default();
    assert_eq!(body, format!("action=flush&token={CSRF}").as_bytes());
}

#[tokio::test]
async fn test_query_auth_request_carries_web_password() {
    let (_server, client) = setup().await;
    let session = client.session_client().expect("session mode");

    let req = session
        .request_with_auth(reqwest::Method::GET, "/admin/api.php", &BTreeMap::new())
        .expect("request builds");

    let query = req.url().query().unwrap_or_default();
    assert!(
        query.contains(&format!("auth={}", double_hash256(PASSWORD))),
        "got query: {query}"
    );
}

// ── Service token ───────────────────────────────────────────────────

#[tokio::test]
async fn test_service_token_headers_attach_to_every_request() {
    let server = MockServer::start().await;

    let mut config = Config::new(
        server.uri(),
        AuthCredentials::Password(SecretString::from(PASSWORD)),
    );
    config.service_token = Some(ServiceToken::new("client-id.access", "shhh"));
    let client = config.client().expect("client builds");

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(header("CF-Access-Client-Id", "client-id.access"))
        .and(header("CF-Access-Client-Secret", "shhh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "sid": SID, "csrf": CSRF, "valid": true, "totp": false, "validity": 300, "message": "" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .and(header("CF-Access-Client-Id", "client-id.access"))
        .and(header("CF-Access-Client-Secret", "shhh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blocking": "enabled" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.get_blocking_status().await.expect("status");
    assert!(status.enabled);
}

// ── Error plumbing ──────────────────────────────────────────────────

#[tokio::test]
async fn test_non_success_status_carries_code() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.list_groups().await.expect_err("server error");
    assert!(
        matches!(err, Error::UnexpectedStatus { operation: "list groups", status: 500 }),
        "got: {err:?}"
    );
    assert_eq!(err.status(), Some(500));
}
