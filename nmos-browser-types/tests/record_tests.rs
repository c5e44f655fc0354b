use nmos_browser_types::{CompositeRecord, Endpoint};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn from_base_is_unresolved() {
    let record = CompositeRecord::from_base(json!({"id": "r1", "label": "rx"}));
    assert_eq!(record.id(), Some("r1"));
    assert!(!record.is_resolved());
    assert!(record.staged().is_none());
}

#[test]
fn flat_view_adds_prefixed_keys() {
    let mut record = CompositeRecord::from_base(json!({"id": "s1"}));
    record.connection_api = Some("http://dev/x-nmos/connection/v1.1".into());
    record.transport_file = Some("v=0\r\n".into());
    record.endpoints.insert(Endpoint::Staged, json!({"master_enable": true}));
    record
        .endpoints
        .insert(Endpoint::TransportType, json!("urn:x-nmos:transport:rtp"));

    assert_eq!(
        record.to_flat_json(),
        json!({
            "id": "s1",
            "$connectionAPI": "http://dev/x-nmos/connection/v1.1",
            "$transportfile": "v=0\r\n",
            "$staged": {"master_enable": true},
            "$transporttype": "urn:x-nmos:transport:rtp",
        })
    );
}

#[test]
fn flat_view_of_unresolved_record_is_base() {
    let base = json!({"id": "s1", "device_id": "d1"});
    let record = CompositeRecord::from_base(base.clone());
    assert_eq!(record.to_flat_json(), base);
}

#[test]
fn from_flat_json_splits_side_channel() {
    let flat = json!({
        "id": "r1",
        "$connectionAPI": "http://dev/conn/v1.0",
        "$staged": {"sender_id": null},
        "$unknown": 1,
    });
    let record = CompositeRecord::from_flat_json(flat);
    assert_eq!(record.base, json!({"id": "r1", "$unknown": 1}));
    assert_eq!(record.connection_api.as_deref(), Some("http://dev/conn/v1.0"));
    assert_eq!(record.staged(), Some(&json!({"sender_id": null})));
}

#[test]
fn staged_mut_edits_in_place() {
    let mut record = CompositeRecord::from_base(json!({"id": "r1"}));
    record.endpoints.insert(Endpoint::Staged, json!({"master_enable": false}));
    record.staged_mut().unwrap()["master_enable"] = json!(true);
    assert_eq!(record.staged(), Some(&json!({"master_enable": true})));
}

#[test]
fn endpoint_names() {
    assert_eq!(Endpoint::TransportType.as_str(), "transporttype");
    assert_eq!(Endpoint::Active.flat_key(), "$active");
    assert_eq!("constraints".parse::<Endpoint>().unwrap(), Endpoint::Constraints);
    assert!("bogus".parse::<Endpoint>().is_err());
}
