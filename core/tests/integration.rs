//! End-to-end test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through the default `UreqTransport`. Validates
//! that request building, header decoration and response parsing work
//! against an actual axum service.

use std::net::SocketAddr;

use mock_server::Credentials;
use yd4b::{
    AddressZipRequest, ChoikiType, ClientConfig, ErrorKind, SearchCodeRequest, SearchKind,
    SearchScope, Yd4bClient,
};

const CLIENT_ID: &str = "integration-client";
const SECRET: &str = "integration-secret";

/// Start the mock server on a background runtime and return its address.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let credentials = Credentials {
                client_id: CLIENT_ID.to_string(),
                secret_key: SECRET.to_string(),
            };
            mock_server::run(listener, credentials).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn lookup_lifecycle() {
    // Step 1: start mock server on a random port.
    let addr = start_server();
    let mut client = Yd4bClient::new(&format!("http://{addr}"), CLIENT_ID, SECRET, "203.0.113.7");
    client.set_partner_id("EC42");

    // Step 2: calls without a token are rejected with the server's status.
    let err = client.address_zip(&AddressZipRequest::new()).unwrap_err();
    assert_eq!(err.status_code, 401);
    assert_eq!(err.kind(), ErrorKind::Status);

    // Step 3: exchange credentials; the "Token: " prefix is gone.
    let token = client.authenticate().unwrap();
    assert_eq!(token.scope, "J1");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, mock_server::TOKEN_TTL_SECS);
    assert!(!token.token.starts_with("Token: "));
    assert!(client.has_token());

    // Step 4: address lookup by city.
    let found = client
        .address_zip(&AddressZipRequest::new().pref_code("13").city_code("13101"))
        .unwrap();
    assert_eq!(found.level, 3);
    assert_eq!(found.count, 3);
    assert!(found.addresses.iter().any(|a| a.zip_code == "1000001"));

    // Step 5: prefecture list, paged.
    let prefs = client
        .address_zip(&AddressZipRequest::new().flg_getpref(true).limit(1).page(2))
        .unwrap();
    assert_eq!(prefs.level, 1);
    assert_eq!(prefs.count, 2);
    assert_eq!(prefs.addresses.len(), 1);

    // Step 6: search by zip code, brackets dropped by default.
    let by_zip = client.search_code(&SearchCodeRequest::new("1000004")).unwrap();
    assert_eq!(by_zip.searchtype, SearchKind::Zipcode);
    assert_eq!(by_zip.addresses[0].town_name, "大手町");
    assert!(by_zip.addresses[0].dgacode.is_none());

    // Step 7: same search with brackets kept.
    let bracketed = client
        .search_code(&SearchCodeRequest::new("1000004").choikitype(ChoikiType::WithBrackets))
        .unwrap();
    assert_eq!(bracketed.addresses[0].town_name, "大手町（次のビルを除く）");

    // Step 8: search by digital address code.
    let by_dga = client.search_code(&SearchCodeRequest::new("A7E2FK8")).unwrap();
    assert_eq!(by_dga.searchtype, SearchKind::Dgacode);
    assert_eq!(by_dga.addresses[0].dgacode.as_deref(), Some("A7E2FK8"));
    assert!(by_dga.addresses[0].latitude.is_some());

    // Step 9: business zip code, then excluded by scope.
    let biz = client.search_code(&SearchCodeRequest::new("1008111")).unwrap();
    assert_eq!(biz.searchtype, SearchKind::Bizzipcode);
    assert_eq!(biz.addresses[0].biz_name.as_deref(), Some("宮内庁"));
    let err = client
        .search_code(&SearchCodeRequest::new("1008111").searchtype(SearchScope::ExcludeBusiness))
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "unexpected status code");
}

#[test]
fn wrong_credentials_are_rejected() {
    let addr = start_server();
    let mut client = Yd4bClient::new(&format!("http://{addr}"), CLIENT_ID, "wrong", "203.0.113.7");

    let err = client.authenticate().unwrap_err();
    assert_eq!(err.status_code, 401);
    assert!(!client.has_token());
}

#[test]
fn client_from_config_talks_to_server() {
    let addr = start_server();
    let config = ClientConfig {
        origin: format!("http://{addr}"),
        client_id: CLIENT_ID.to_string(),
        client_secret: SECRET.to_string(),
        caller_ip: "203.0.113.7".to_string(),
        partner_id: None,
        version: "v1".to_string(),
        timeout_secs: Some(5),
    };
    let mut client = Yd4bClient::from_config(&config);
    client.authenticate().unwrap();

    let found = client.search_code(&SearchCodeRequest::new("0600042")).unwrap();
    assert_eq!(found.count, 1);
    assert_eq!(found.addresses[0].pref_name, "北海道");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = Yd4bClient::new(&format!("http://{addr}"), CLIENT_ID, SECRET, "203.0.113.7");

    let err = client.get_token().unwrap_err();
    assert_eq!(err.status_code, 500);
    assert_eq!(err.message, "client do error");
    assert_eq!(err.kind(), ErrorKind::Transport);
}
