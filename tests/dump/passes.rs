//! Whole-Pass Tests
//!
//! `load_prefix` enumerates keys once and ingests each; the snapshot is
//! label-sorted for display and degraded records never stop the pass.

use super::*;
use crate::common::TestStore;
use agentkv::model::{AgentStatus, OperationalState};
use agentkv::{
    Aggregator, BytesBroker, DumpConfig, Error, Filters, IssueKind, MemoryStore, PutOptions,
};
use std::sync::Arc;

fn seed_fleet(ts: &TestStore) {
    for label in ["vpp3", "vpp1", "vpp2"] {
        ts.seed(&format!("{label}/vpp/config/interfaces/loop0"), &eth_config());
        ts.seed(&format!("{label}/vpp/state/interfaces/loop0"), &eth_state());
        ts.seed(
            &format!("{label}/check/status"),
            &AgentStatus {
                state: OperationalState::Ok,
                ..Default::default()
            },
        );
    }
}

#[test]
fn test_load_prefix_builds_sorted_snapshot() {
    let ts = TestStore::new();
    seed_fleet(&ts);
    let mut agg = Aggregator::new();

    let summary = agg.load_prefix(&ts.broker, "", &Filters::none()).unwrap();

    assert_eq!(summary.scanned, 9);
    assert_eq!(summary.merged, 9);
    assert_eq!(agg.labels(), vec!["vpp1", "vpp2", "vpp3"]);
    let labels: Vec<&str> = agg.iter_sorted().map(|(label, _)| label).collect();
    assert_eq!(labels, vec!["vpp1", "vpp2", "vpp3"]);
    for (_, bundle) in agg.iter_sorted() {
        assert_eq!(bundle.record_count(), 3);
        assert_eq!(bundle.status["Agent"].value.state, OperationalState::Ok);
    }
}

#[test]
fn test_pass_survives_bad_records() {
    let ts = TestStore::new();
    seed_fleet(&ts);
    ts.store
        .put("vpp2/vpp/config/interfaces/bad0", vec![0xc1], &PutOptions::default())
        .unwrap();
    ts.store
        .put("vpp2/vpp/config/fib/bd1", vec![], &PutOptions::default())
        .unwrap();
    ts.store
        .put("vpp2/vpp/config/acls/acl1", vec![], &PutOptions::default())
        .unwrap();
    let mut agg = Aggregator::new();

    let summary = agg.load_prefix(&ts.broker, "vpp2/", &Filters::none()).unwrap();

    assert_eq!(summary.scanned, 6);
    assert_eq!(summary.merged, 3);
    assert_eq!(summary.decode_failed, 1);
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.no_decoder, 1);
    assert_eq!(agg.issues().len(), 2);
    assert!(agg
        .issues()
        .iter()
        .any(|i| matches!(i.kind, IssueKind::DecodeFailed(_))));
}

#[test]
fn test_pass_with_filters_counts_filtered() {
    let ts = TestStore::new();
    seed_fleet(&ts);
    let mut agg = Aggregator::new();
    let filters = Filters::none().with_labels(["vpp1"]).with_types(["state"]);

    let summary = agg.load_prefix(&ts.broker, "", &filters).unwrap();

    // vpp1 state + vpp1 status (status bypasses the type filter)
    assert_eq!(summary.matched(), 2);
    assert_eq!(summary.filtered, 7);
    assert_eq!(agg.labels(), vec!["vpp1"]);
}

#[test]
fn test_closed_store_ends_pass() {
    let ts = TestStore::new();
    seed_fleet(&ts);
    ts.broker.close().unwrap();
    let mut agg = Aggregator::new();

    let err = agg.load_prefix(&ts.broker, "", &Filters::none()).unwrap_err();
    assert!(matches!(err, Error::Closed));
}

#[test]
fn test_json_config_with_root_prefix() {
    let config = DumpConfig {
        serializer: "json".to_string(),
        root_prefix: "/vnf-agent/".to_string(),
        filters: Filters::none(),
    };
    let store = MemoryStore::new();
    let broker = config.open_broker(Arc::new(store.clone())).unwrap();
    broker
        .put("/vnf-agent/vpp1/check/status", &AgentStatus::default(), &PutOptions::default())
        .unwrap();

    let raw = store.get("/vnf-agent/vpp1/check/status").unwrap().unwrap();
    assert_eq!(raw.data.first(), Some(&b'{'));

    let mut agg = Aggregator::from_config(&config);
    let summary = agg.load_prefix(&broker, "/vnf-agent/", &config.filters).unwrap();
    assert_eq!(summary.merged, 1);
    assert!(agg.bundle("vpp1").unwrap().status.contains_key("Agent"));
}
