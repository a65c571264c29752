//! Merge Scenario Tests
//!
//! - config then state for one interface keeps both slots
//! - the same pair ingested in the opposite order gives the same bundle
//! - error records accumulate
//! - missing keys are reported without touching the bundle

use super::*;
use crate::common::TestStore;
use agentkv::model::{
    BridgeDomain, BridgeDomainState, FibEntry, InterfaceError, StaticRoutes, XConnectPair,
};
use agentkv::{Aggregator, Filters, IngestOutcome, IssueKind, RecordMeta, Revision};

// =============================================================================
// CONFIG / STATE
// =============================================================================

#[test]
fn test_config_at_rev_42_then_state_at_rev_43() {
    let ts = TestStore::new();
    ts.advance_to(42);
    assert_eq!(ts.seed(IF_CONFIG_KEY, &eth_config()), Revision(42));

    let mut agg = Aggregator::new();
    let outcome = agg.ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap();
    assert_eq!(outcome, IngestOutcome::Merged(Revision(42)));

    let entry = &agg.bundle("agent1").unwrap().interfaces[ETH];
    let config = entry.config.as_ref().unwrap();
    assert_eq!(config.metadata, RecordMeta::new(Revision(42), IF_CONFIG_KEY));
    assert!(config.value.enabled);
    assert!(entry.state.is_none());

    assert_eq!(ts.seed(IF_STATE_KEY, &eth_state()), Revision(43));
    agg.ingest(&ts.broker, IF_STATE_KEY, &Filters::none()).unwrap();

    let entry = &agg.bundle("agent1").unwrap().interfaces[ETH];
    assert_eq!(entry.config.as_ref().unwrap().rev(), Revision(42));
    assert_eq!(entry.state.as_ref().unwrap().rev(), Revision(43));
    assert_eq!(entry.state.as_ref().unwrap().key(), IF_STATE_KEY);
}

#[test]
fn test_disjoint_slots_commute() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    ts.seed(IF_STATE_KEY, &eth_state());

    let mut forward = Aggregator::new();
    forward.ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap();
    forward.ingest(&ts.broker, IF_STATE_KEY, &Filters::none()).unwrap();

    let mut backward = Aggregator::new();
    backward.ingest(&ts.broker, IF_STATE_KEY, &Filters::none()).unwrap();
    backward.ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap();

    assert_eq!(forward.bundle("agent1"), backward.bundle("agent1"));
}

#[test]
fn test_bridge_domain_config_and_state() {
    let ts = TestStore::new();
    let cfg_key = "agent1/vpp/config/bridge-domains/bd1";
    let state_key = "agent1/vpp/state/bridge-domains/bd1";
    ts.seed(
        state_key,
        &BridgeDomainState {
            index: 1,
            interface_count: 2,
            ..Default::default()
        },
    );
    ts.seed(
        cfg_key,
        &BridgeDomain {
            name: "bd1".to_string(),
            learn: true,
            ..Default::default()
        },
    );

    let mut agg = Aggregator::new();
    agg.ingest(&ts.broker, state_key, &Filters::none()).unwrap();
    agg.ingest(&ts.broker, cfg_key, &Filters::none()).unwrap();

    let bd = &agg.bundle("agent1").unwrap().bridge_domains["bd1"];
    assert!(bd.config.as_ref().unwrap().value.learn);
    assert_eq!(bd.state.as_ref().unwrap().value.interface_count, 2);
}

// =============================================================================
// KEYED AND APPEND-ONLY RECORDS
// =============================================================================

#[test]
fn test_two_error_records_append_in_order() {
    let ts = TestStore::new();
    let key = format!("agent1/vpp/error/interfaces/{ETH}");
    let mut agg = Aggregator::new();

    for name in ["tap0", "tap1"] {
        ts.seed(
            &key,
            &InterfaceError {
                interface_name: name.to_string(),
                ..Default::default()
            },
        );
        agg.ingest(&ts.broker, &key, &Filters::none()).unwrap();
    }

    let log = &agg.bundle("agent1").unwrap().interface_errors[ETH];
    assert_eq!(log.len(), 2);
    assert_eq!(log.items[0].value.interface_name, "tap0");
    assert_eq!(log.items[1].value.interface_name, "tap1");
    assert!(log.items[0].rev() < log.items[1].rev());
}

#[test]
fn test_fib_entries_accumulate_across_bridge_domains() {
    let ts = TestStore::new();
    let keys = [
        "agent1/vpp/config/fib/bd1/aa:aa:aa:aa:aa:01",
        "agent1/vpp/config/fib/bd2/aa:aa:aa:aa:aa:02",
    ];
    let mut agg = Aggregator::new();
    for key in keys {
        ts.seed(key, &FibEntry::default());
        agg.ingest(&ts.broker, key, &Filters::none()).unwrap();
    }

    let fib = &agg.bundle("agent1").unwrap().fib_table;
    assert_eq!(fib.len(), 2);
    assert_eq!(fib.meta.as_ref().unwrap().key, keys[1]);
}

#[test]
fn test_xconnect_and_routes() {
    let ts = TestStore::new();
    ts.seed(
        "agent1/vpp/config/xconnect/memif1",
        &XConnectPair {
            receive_interface: "memif1".to_string(),
            transmit_interface: "memif2".to_string(),
        },
    );
    ts.seed("agent1/vpp/config/routes", &StaticRoutes::default());

    let mut agg = Aggregator::new();
    agg.ingest(&ts.broker, "agent1/vpp/config/xconnect/memif1", &Filters::none())
        .unwrap();
    agg.ingest(&ts.broker, "agent1/vpp/config/routes", &Filters::none())
        .unwrap();

    let bundle = agg.bundle("agent1").unwrap();
    assert_eq!(bundle.xconnect_pairs["memif1"].value.transmit_interface, "memif2");
    assert!(bundle.static_routes.is_some());
    assert_eq!(bundle.record_count(), 2);
}

// =============================================================================
// MISSING RECORDS
// =============================================================================

#[test]
fn test_missing_key_reports_not_found() {
    let ts = TestStore::new();
    let mut agg = Aggregator::new();

    let outcome = agg.ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap();
    assert!(outcome.matched());
    assert_eq!(outcome, IngestOutcome::NotFound);
    assert!(agg.bundle("agent1").unwrap().is_empty());
    assert_eq!(agg.issues().len(), 1);
    assert_eq!(agg.issues()[0].kind, IssueKind::NotFound);
    assert_eq!(agg.issues()[0].key, IF_CONFIG_KEY);
}
