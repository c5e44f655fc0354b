use nmos_browser_adapter::{
    AdapterError, DataProvider, DataResponse, HttpTransport, Total, TransportConfig,
};
use nmos_browser_prefs::{MemoryPreferenceStore, PaginationMode, PreferenceStore, Preferences};
use nmos_browser_types::{DataRequest, Filter, LinkRelation, Operation, ResourceFamily};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY_PATH: &str = "/x-nmos/query/v1.2";

fn provider_for(server: &MockServer) -> (Arc<MemoryPreferenceStore>, DataProvider) {
    let store = Arc::new(MemoryPreferenceStore::new());
    let transport = HttpTransport::new(TransportConfig::default()).unwrap();
    let provider = DataProvider::new(transport, Preferences::new(store.clone()), server.uri());
    (store, provider)
}

// ── Transport ─────────────────────────────────────────────────────

#[test]
fn total_serializes_count_or_unknown() {
    assert_eq!(serde_json::to_value(Total::Exact(3)).unwrap(), json!(3));
    assert_eq!(serde_json::to_value(Total::Unknown).unwrap(), json!("unknown"));
}

#[tokio::test]
async fn custom_client_sends_its_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/nodes/n-1")))
        .and(header("user-agent", "studio-panel/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "n-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .user_agent("studio-panel/2")
        .build()
        .unwrap();
    let provider = DataProvider::new(
        HttpTransport::with_client(client),
        Preferences::new(Arc::new(MemoryPreferenceStore::new())),
        server.uri(),
    );
    let response = provider
        .execute(&DataRequest::get_one(ResourceFamily::Nodes, "n-1"))
        .await
        .unwrap();
    assert!(matches!(response, DataResponse::One { .. }));
}

#[test]
fn transport_config_defaults() {
    let cfg = TransportConfig::default();
    assert_eq!(cfg.timeout_secs, None);
    assert!(cfg.user_agent.starts_with("nmos-browser/"));
}

#[tokio::test]
async fn remote_error_message_is_composed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/nodes/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "error": "Resource not found",
            "debug": "no such id"
        })))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let err = provider
        .execute(&DataRequest::get_one(ResourceFamily::Nodes, "missing"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Resource not found - 404 - (no such id)");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let err = provider
        .execute(&DataRequest::get_list(ResourceFamily::Nodes, Filter::new()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let provider = DataProvider::new(
        HttpTransport::new(TransportConfig::default()).unwrap(),
        Preferences::new(store),
        "http://127.0.0.1:1",
    );
    let err = provider
        .execute(&DataRequest::get_one(ResourceFamily::Nodes, "n"))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Network(_)));
}

// ── Listing and paging ────────────────────────────────────────────

#[tokio::test]
async fn list_records_links_and_pagination_mode() {
    let server = MockServer::start().await;
    let next = format!("{}{QUERY_PATH}/nodes?paging.since=2", server.uri());
    let first = format!("{}{QUERY_PATH}/nodes?paging.since=0", server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/nodes")))
        .and(query_param("paging.limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!(r#"<{first}>; rel="first", <{next}>; rel="next""#).as_str())
                .set_body_json(json!([{"id": "n-1"}, {"id": "n-2"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/nodes")))
        .and(query_param("paging.since", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "n-3"}])))
        .mount(&server)
        .await;

    let (store, provider) = provider_for(&server);
    provider.preferences().set_paging_limit(2).unwrap();

    let response = provider
        .execute(&DataRequest::get_list(ResourceFamily::Nodes, Filter::new()))
        .await
        .unwrap();
    let DataResponse::List { data, total, .. } = response else {
        panic!("expected a list");
    };
    assert_eq!(data.len(), 2);
    assert_eq!(total, Total::Exact(2));
    assert_eq!(store.get("Pagination").unwrap().as_deref(), Some("enabled"));
    assert_eq!(provider.links().await.next.as_deref(), Some(next.as_str()));

    let response = provider
        .execute(&DataRequest::navigate(ResourceFamily::Nodes, LinkRelation::Next))
        .await
        .unwrap();
    let DataResponse::List { url, data, .. } = response else {
        panic!("expected a list");
    };
    assert_eq!(url, next);
    assert_eq!(data, vec![json!({"id": "n-3"})]);

    // The second page advertised nothing.
    assert_eq!(provider.preferences().pagination().unwrap(), PaginationMode::Disabled);
    let response = provider
        .execute(&DataRequest::navigate(ResourceFamily::Nodes, LinkRelation::Next))
        .await
        .unwrap();
    assert_eq!(response, DataResponse::NoOp);
}

#[tokio::test]
async fn plain_mode_filter_is_sent_as_pairs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/flows")))
        .and(query_param("format", "urn:x-nmos:format:audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    provider.preferences().set_rql_mode(false).unwrap();
    let response = provider
        .execute(&DataRequest::get_list(
            ResourceFamily::Flows,
            Filter::new().with("format", "urn:x-nmos:format:audio"),
        ))
        .await
        .unwrap();
    assert!(matches!(response, DataResponse::List { total: Total::Exact(0), .. }));
}

#[tokio::test]
async fn reference_listing_total_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/senders")))
        .and(query_param("query.rql", "matches(device_id,string:d-1,i)"))
        .and(query_param("paging.limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "s-1"}])))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let response = provider
        .execute(&DataRequest::get_many_reference(ResourceFamily::Senders, "device_id", "d-1"))
        .await
        .unwrap();
    let DataResponse::List { total, data, .. } = response else {
        panic!("expected a list");
    };
    assert_eq!(total, Total::Unknown);
    assert_eq!(total.to_string(), "unknown");
    assert_eq!(data.len(), 1);
}

#[tokio::test]
async fn discovery_entries_get_ids_from_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x-dns-sd/v1.0/_nmos-query._tcp/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "reg-a", "port": 80},
            {"name": "reg-b", "port": 8080},
        ])))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let response = provider
        .execute(&DataRequest::get_list(ResourceFamily::QueryApis, Filter::new()))
        .await
        .unwrap();
    let DataResponse::List { data, .. } = response else {
        panic!("expected a list");
    };
    assert_eq!(data[0]["id"], json!("reg-a"));
    assert_eq!(data[1]["id"], json!("reg-b"));
}

#[tokio::test]
async fn discovery_entry_by_name_gets_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x-dns-sd/v1.0/_nmos-query._tcp/reg-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "reg-a", "port": 80})))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let response = provider
        .execute(&DataRequest::get_one(ResourceFamily::QueryApis, "reg-a"))
        .await
        .unwrap();
    let DataResponse::One { record, .. } = response else {
        panic!("expected one record");
    };
    assert_eq!(record.id(), Some("reg-a"));
    assert_eq!(record.base, json!({"id": "reg-a", "name": "reg-a", "port": 80}));
    assert!(!record.is_resolved());
}

#[tokio::test]
async fn discovery_pages_get_ids_from_names() {
    let server = MockServer::start().await;
    let next = format!("{}/x-dns-sd/v1.0/_nmos-query._tcp/?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/x-dns-sd/v1.0/_nmos-query._tcp/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "reg-c"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x-dns-sd/v1.0/_nmos-query._tcp/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!(r#"<{next}>; rel="next""#).as_str())
                .set_body_json(json!([{"name": "reg-a"}, {"name": "reg-b"}])),
        )
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    provider
        .execute(&DataRequest::get_list(ResourceFamily::QueryApis, Filter::new()))
        .await
        .unwrap();
    let response = provider
        .execute(&DataRequest::navigate(ResourceFamily::QueryApis, LinkRelation::Next))
        .await
        .unwrap();
    let DataResponse::List { url, data, total } = response else {
        panic!("expected a list");
    };
    assert_eq!(url, next);
    assert_eq!(total, Total::Exact(1));
    assert_eq!(data, vec![json!({"id": "reg-c", "name": "reg-c"})]);
}

#[tokio::test]
async fn object_where_list_expected_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let err = provider
        .execute(&DataRequest::get_list(ResourceFamily::Nodes, Filter::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::UnexpectedResponse(_)));
}

// ── Unsupported operations ────────────────────────────────────────

#[tokio::test]
async fn create_and_delete_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    for op in [Operation::Create, Operation::Delete] {
        let response = provider
            .execute(&DataRequest::new(ResourceFamily::Nodes, op))
            .await
            .unwrap();
        assert_eq!(response, DataResponse::NoOp);
    }
}

// ── Composite records and updates ─────────────────────────────────

async fn mount_receiver(server: &MockServer) -> String {
    let conn = format!("{}/x-nmos/connection/v1.1", server.uri());
    let single = "/x-nmos/connection/v1.1/single/receivers/r-1";

    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/receivers/r-1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "r-1", "device_id": "d-1"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{QUERY_PATH}/devices/d-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "d-1",
            "controls": [{"type": "urn:x-nmos:control:sr-ctrl/v1.1", "href": conn}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{single}/staged/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sender_id": null,
            "master_enable": false,
            "activation": {"mode": null, "requested_time": null},
            "transport_params": [{"destination_port": 5004}, {"destination_port": 5006}],
            "transport_file": {"data": null, "type": null}
        })))
        .mount(server)
        .await;
    for endpoint in ["active", "constraints"] {
        Mock::given(method("GET"))
            .and(path(format!("{single}/{endpoint}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("{single}/transporttype/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("urn:x-nmos:transport:rtp")))
        .mount(server)
        .await;
    conn
}

#[tokio::test]
async fn get_one_receiver_is_resolved() {
    let server = MockServer::start().await;
    let conn = mount_receiver(&server).await;

    let (_, provider) = provider_for(&server);
    let response = provider
        .execute(&DataRequest::get_one(ResourceFamily::Receivers, "r-1"))
        .await
        .unwrap();
    let DataResponse::One { url, record } = response else {
        panic!("expected one record");
    };
    assert_eq!(url, format!("{}{QUERY_PATH}/receivers/r-1", server.uri()));
    assert_eq!(record.connection_api.as_deref(), Some(conn.as_str()));
    assert_eq!(record.staged().unwrap()["master_enable"], json!(false));
}

#[tokio::test]
async fn update_sends_sparse_patch() {
    let server = MockServer::start().await;
    mount_receiver(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/x-nmos/connection/v1.1/single/receivers/r-1/staged"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "master_enable": true,
            "activation": {"mode": "activate_immediate", "requested_time": null},
            "sender_id": "s-9",
            "transport_params": [{}, {"destination_port": 5008}],
            "transport_file": {"data": "v=0\r\n", "type": "application/sdp"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"master_enable": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (_, provider) = provider_for(&server);
    let DataResponse::One { record: previous, .. } = provider
        .execute(&DataRequest::get_one(ResourceFamily::Receivers, "r-1"))
        .await
        .unwrap()
    else {
        panic!("expected one record");
    };

    let mut data = previous.clone();
    let staged = data.staged_mut().unwrap();
    staged["master_enable"] = json!(true);
    staged["sender_id"] = json!("s-9");
    staged["activation"]["mode"] = json!("activate_immediate");
    staged["transport_params"][1]["destination_port"] = json!(5008);
    staged["transport_file"]["data"] = json!("v=0\r\n");

    let response = provider
        .execute(&DataRequest::new(
            ResourceFamily::Receivers,
            Operation::Update {
                id: "r-1".into(),
                data,
                previous,
            },
        ))
        .await
        .unwrap();
    assert_eq!(response, DataResponse::Updated { data: json!({"master_enable": true}) });
}
