//! Dump Test Suite
//!
//! End-to-end coverage of the typed broker and the aggregator over a
//! `MemoryStore`.
//!
//! ## Modules
//!
//! - `scenarios`: merge behaviour for config/state, errors and statuses
//! - `filtering`: label and type filters on ingest and delete
//! - `passes`: whole-prefix passes, ordering and configuration
//! - `watching`: re-ingesting keys announced by a typed watch
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test dump
//! RUST_LOG=agentkv=debug cargo test --test dump -- --nocapture
//! ```

#[path = "../common/mod.rs"]
mod common;

pub mod filtering;
pub mod passes;
pub mod scenarios;
pub mod watching;

use agentkv::model::{Interface, InterfaceState, LinkStatus};

pub const ETH: &str = "GigabitEthernet0/0/0";
pub const IF_CONFIG_KEY: &str = "agent1/vpp/config/interfaces/GigabitEthernet0/0/0";
pub const IF_STATE_KEY: &str = "agent1/vpp/state/interfaces/GigabitEthernet0/0/0";

pub fn eth_config() -> Interface {
    Interface {
        name: ETH.to_string(),
        enabled: true,
        ..Default::default()
    }
}

pub fn eth_state() -> InterfaceState {
    InterfaceState {
        name: ETH.to_string(),
        admin_status: LinkStatus::Up,
        oper_status: LinkStatus::Up,
        ..Default::default()
    }
}
