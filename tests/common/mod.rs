//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use agentkv::{MemoryStore, PutOptions, Revision, TypedBroker};
use serde::Serialize;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per binary; `RUST_LOG` controls the level.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// TestStore
// ============================================================================

/// A MemoryStore together with the owning broker over it.
pub struct TestStore {
    pub store: MemoryStore,
    pub broker: TypedBroker,
}

impl TestStore {
    pub fn new() -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let broker = TypedBroker::new(Arc::new(store.clone()));
        TestStore { store, broker }
    }

    /// Write `value` and return the revision the store assigned.
    pub fn seed<M: Serialize>(&self, key: &str, value: &M) -> Revision {
        self.broker
            .put(key, value, &PutOptions::default())
            .expect("seed put should succeed");
        self.store.current_revision()
    }

    /// Advance the store revision to exactly `rev - 1` using filler keys.
    pub fn advance_to(&self, rev: i64) {
        while self.store.current_revision().as_i64() < rev - 1 {
            self.broker
                .put("filler/x", &0u8, &PutOptions::default())
                .expect("filler put should succeed");
        }
    }
}
