//! Watch-Driven Refresh Tests
//!
//! A typed watch announces changed keys; re-ingesting them keeps the
//! snapshot current while stale announcements are refused.

use super::*;
use crate::common::TestStore;
use agentkv::model::Interface;
use agentkv::{Aggregator, ChangeKind, Filters, IngestOutcome, PutOptions};

#[tokio::test]
async fn test_watch_then_ingest_refreshes_snapshot() {
    let ts = TestStore::new();
    let mut stream = ts.broker.watch(&["agent1/vpp/"]).unwrap();
    let mut agg = Aggregator::new();

    ts.seed(IF_CONFIG_KEY, &eth_config());
    ts.seed(IF_STATE_KEY, &eth_state());

    for _ in 0..2 {
        let event = stream.recv().await.unwrap();
        assert_eq!(event.kind(), ChangeKind::Put);
        let outcome = agg.ingest(&ts.broker, event.key(), &Filters::none()).unwrap();
        assert_eq!(outcome, IngestOutcome::Merged(event.revision()));
    }

    let entry = &agg.bundle("agent1").unwrap().interfaces[ETH];
    assert!(entry.config.is_some());
    assert!(entry.state.is_some());
}

#[tokio::test]
async fn test_event_payload_matches_store() {
    let ts = TestStore::new();
    let agent1 = ts.broker.new_broker("agent1/");
    let mut stream = agent1.watch(&["vpp/config/interfaces/"]).unwrap();

    let mut disabled = eth_config();
    disabled.enabled = false;
    agent1
        .put(&format!("vpp/config/interfaces/{ETH}"), &disabled, &PutOptions::default())
        .unwrap();

    let event = stream.recv().await.unwrap();
    assert_eq!(event.key(), format!("vpp/config/interfaces/{ETH}"));
    let decoded: Interface = event.decode().unwrap();
    assert_eq!(decoded, disabled);
}

#[tokio::test]
async fn test_closing_owner_ends_stream() {
    let ts = TestStore::new();
    let mut stream = ts.broker.new_watcher("agent1/").watch(&[""]).unwrap();

    ts.broker.close().unwrap();
    assert!(stream.recv().await.is_none());
}
