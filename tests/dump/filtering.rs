//! Filter Tests
//!
//! Filters are evaluated before any store access: label first, then the
//! record type. Reads let status keys skip the type filter; deletes do not.

use super::*;
use crate::common::TestStore;
use agentkv::model::AgentStatus;
use agentkv::{Aggregator, Filters, IngestOutcome};

// =============================================================================
// DELETE
// =============================================================================

#[test]
fn test_delete_with_other_label_issues_no_store_delete() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    let agg: Aggregator = Aggregator::new();

    let deleted = agg
        .delete(&ts.broker, IF_CONFIG_KEY, &Filters::none().with_labels(["agent2"]))
        .unwrap();

    assert!(!deleted);
    assert_eq!(ts.store.stats().deletes, 0);
    assert_eq!(ts.store.len(), 1);
}

#[test]
fn test_delete_does_not_touch_snapshot() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    let mut agg = Aggregator::new();
    agg.ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap();

    assert!(agg.delete(&ts.broker, IF_CONFIG_KEY, &Filters::none()).unwrap());
    assert!(ts.store.is_empty());
    assert!(agg.bundle("agent1").unwrap().interfaces[ETH].config.is_some());
}

#[test]
fn test_type_filtered_delete_keeps_status_keys() {
    let ts = TestStore::new();
    ts.seed("agent1/check/status", &AgentStatus::default());
    let agg: Aggregator = Aggregator::new();

    let deleted = agg
        .delete(&ts.broker, "agent1/check/status", &Filters::none().with_types(["interfaces"]))
        .unwrap();

    assert!(!deleted);
    assert_eq!(ts.store.stats().deletes, 0);
    assert_eq!(ts.store.len(), 1);
}

// =============================================================================
// INGEST
// =============================================================================

#[test]
fn test_label_filter_never_reads() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    ts.seed("agent1/check/status", &AgentStatus::default());
    let mut agg = Aggregator::new();
    let filters = Filters::none().with_labels(["agent2"]);

    for key in [IF_CONFIG_KEY, "agent1/check/status"] {
        let outcome = agg.ingest(&ts.broker, key, &filters).unwrap();
        assert_eq!(outcome, IngestOutcome::Filtered, "{key}");
    }
    assert_eq!(ts.store.stats().gets, 0);
    assert!(agg.is_empty());
}

#[test]
fn test_label_filter_is_substring_match() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    let mut agg = Aggregator::new();

    let outcome = agg
        .ingest(&ts.broker, IF_CONFIG_KEY, &Filters::none().with_labels(["nt1"]))
        .unwrap();
    assert!(matches!(outcome, IngestOutcome::Merged(_)));
}

#[test]
fn test_type_filter_spares_status_keys() {
    let ts = TestStore::new();
    ts.seed(IF_CONFIG_KEY, &eth_config());
    ts.seed("agent1/check/status", &AgentStatus::default());
    let mut agg = Aggregator::new();
    let filters = Filters::none().with_types(["vpp/state"]);

    let cfg = agg.ingest(&ts.broker, IF_CONFIG_KEY, &filters).unwrap();
    let status = agg.ingest(&ts.broker, "agent1/check/status", &filters).unwrap();

    assert_eq!(cfg, IngestOutcome::Filtered);
    assert!(matches!(status, IngestOutcome::Merged(_)));
    assert_eq!(ts.store.stats().gets, 1);
}
