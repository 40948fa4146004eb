// HTTP collaborators against a mock directory and relay.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharenav_core::{
    ConnectionMode, Event, EventBus, EventQueue, HttpDiscovery, HttpTransport, Server,
    ServerDiscovery, ServerId, SessionConfig, Token, TransportClient,
};

fn config_for(mock: &MockServer) -> SessionConfig {
    let url = Url::parse(&mock.uri()).unwrap();
    SessionConfig::new(url.clone(), url)
}

async fn next(queue: &mut EventQueue) -> Event {
    queue.recv().await.unwrap()
}

#[tokio::test]
async fn discovery_reports_every_server() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(header("authorization", "Bearer t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "name": "home", "active": true, "session": "s-1" },
            { "id": "2", "name": "cabin", "active": false },
        ])))
        .mount(&mock)
        .await;

    let (bus, mut queue) = EventBus::new();
    let discovery = HttpDiscovery::new(&config_for(&mock), bus.sender()).unwrap();
    discovery.fetch_servers(&Token::new("t-1"));

    let Event::ServersLoaded(servers) = next(&mut queue).await else {
        panic!("expected a server list");
    };
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0], Server::new("1", "home", true).with_session("s-1"));
    assert!(!servers[1].active);
}

#[tokio::test]
async fn discovery_failure_is_reported() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock)
        .await;

    let (bus, mut queue) = EventBus::new();
    let discovery = HttpDiscovery::new(&config_for(&mock), bus.sender()).unwrap();
    discovery.fetch_servers(&Token::new("expired"));

    assert!(matches!(next(&mut queue).await, Event::ServersLoadFailed));
}

async fn mount_route(mock: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/route"))
        .and(header("x-server-session", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "local_address": format!("{}/lan", mock.uri()),
            "remote_address": format!("{}/wan", mock.uri()),
        })))
        .mount(mock)
        .await;
}

#[tokio::test]
async fn transport_connects_and_lists_shares_on_selected_path() {
    let mock = MockServer::start().await;
    mount_route(&mock).await;
    Mock::given(method("GET"))
        .and(path("/lan/shares"))
        .and(header("x-server-session", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "m", "name": "Movies" },
            { "name": "Music" },
        ])))
        .mount(&mock)
        .await;

    let (bus, mut queue) = EventBus::new();
    let transport = HttpTransport::new(&config_for(&mock), bus.sender()).unwrap();
    let server = Server::new("1", "home", true).with_session("s-1");

    assert!(!transport.is_connected(&server));
    transport.connect(&server);
    assert!(matches!(next(&mut queue).await, Event::ServerConnected(id) if id == ServerId::new("1")));
    assert!(transport.is_connected(&server));

    transport.connect_local();
    assert_eq!(transport.current_address().unwrap(), format!("{}/lan", mock.uri()));
    transport.fetch_shares();

    let Event::SharesLoaded { server: from, shares } = next(&mut queue).await else {
        panic!("expected a share list");
    };
    assert_eq!(from, ServerId::new("1"));
    let ids: Vec<&str> = shares.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["m", "Music"]);
    assert!(shares.iter().all(|s| s.server == ServerId::new("1")));
}

#[tokio::test]
async fn share_failure_on_remote_path_is_reported() {
    let mock = MockServer::start().await;
    mount_route(&mock).await;
    Mock::given(method("GET"))
        .and(path("/wan/shares"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock)
        .await;

    let (bus, mut queue) = EventBus::new();
    let transport = HttpTransport::new(&config_for(&mock), bus.sender()).unwrap();
    transport.connect(&Server::new("1", "home", true).with_session("s-1"));
    next(&mut queue).await;

    transport.connect_remote();
    transport.fetch_shares();

    assert!(matches!(
        next(&mut queue).await,
        Event::SharesLoadFailed(id) if id == ServerId::new("1")
    ));
}

fn unreachable_transport(bus: &EventBus) -> HttpTransport {
    let config = SessionConfig::new(
        Url::parse("http://127.0.0.1:9").unwrap(),
        Url::parse("http://127.0.0.1:9").unwrap(),
    );
    HttpTransport::with_client(
        sharenav_api::ServerClient::new(config.relay_url.clone(), &config.transport()).unwrap(),
        bus.sender(),
        ConnectionMode::Remote,
    )
}

#[tokio::test]
async fn shares_without_route_fail_for_the_target() {
    let (bus, mut queue) = EventBus::new();
    let transport = unreachable_transport(&bus);

    transport.fetch_shares();
    assert!(queue.try_recv().is_none());

    transport.reuse(&Server::new("7", "attic", true));
    transport.fetch_shares();

    assert!(matches!(
        queue.try_recv(),
        Some(Event::SharesLoadFailed(id)) if id == ServerId::new("7")
    ));
}

#[tokio::test]
async fn late_route_does_not_replace_reused_server() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route"))
        .and(header("x-server-session", "s-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "local_address": format!("{}/a-lan", mock.uri()),
            "remote_address": format!("{}/a-wan", mock.uri()),
        })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/route"))
        .and(header("x-server-session", "s-b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "local_address": format!("{}/b-lan", mock.uri()),
                    "remote_address": format!("{}/b-wan", mock.uri()),
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock)
        .await;

    let (bus, mut queue) = EventBus::new();
    let transport = HttpTransport::new(&config_for(&mock), bus.sender()).unwrap();
    let a = Server::new("a", "home", true).with_session("s-a");
    let b = Server::new("b", "cabin", true).with_session("s-b");

    transport.connect(&a);
    assert!(matches!(next(&mut queue).await, Event::ServerConnected(id) if id == ServerId::new("a")));

    transport.connect(&b);
    transport.reuse(&a);
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(queue.try_recv().is_none());
    assert!(transport.is_connected(&a));
    assert!(!transport.is_connected(&b));
    assert_eq!(
        transport.current_address().unwrap(),
        format!("{}/a-wan", mock.uri())
    );
}
