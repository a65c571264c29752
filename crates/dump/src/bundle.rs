//! Per-entity record bundle
//!
//! An `EntityBundle` holds everything read for one entity label. Slots come
//! in three shapes:
//!
//! - `ConfigState`: paired config/state slots, each independently optional
//! - keyed maps: one `Versioned` entry per sub-entity name
//! - `AppendLog`: inherently multi-valued records, accumulated in order
//!
//! Replacing merges refuse a record older than the one already held; see
//! [`Merge`].

use std::collections::BTreeMap;

use serde::Serialize;

use agentkv_core::{RecordMeta, Revision, Versioned};

use crate::model::{
    AgentStatus, BridgeDomain, BridgeDomainError, BridgeDomainState, FibEntry, Interface,
    InterfaceError, InterfaceState, StaticRoutes, XConnectPair,
};

/// Result of merging one record into a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// The record was stored
    Applied,
    /// The slot already held a record at this newer revision
    Stale(Revision),
}

/// Replace `slot` unless it holds a newer revision
pub fn replace_slot<T>(slot: &mut Option<Versioned<T>>, incoming: Versioned<T>) -> Merge {
    if let Some(current) = slot {
        if incoming.rev().is_stale_against(current.rev()) {
            return Merge::Stale(current.rev());
        }
    }
    *slot = Some(incoming);
    Merge::Applied
}

/// Replace the entry at `name` unless it holds a newer revision
pub fn replace_entry<T>(
    map: &mut BTreeMap<String, Versioned<T>>,
    name: &str,
    incoming: Versioned<T>,
) -> Merge {
    if let Some(current) = map.get(name) {
        if incoming.rev().is_stale_against(current.rev()) {
            return Merge::Stale(current.rev());
        }
    }
    map.insert(name.to_string(), incoming);
    Merge::Applied
}

/// Config and state of one named sub-entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigState<C, S> {
    pub config: Option<Versioned<C>>,
    pub state: Option<Versioned<S>>,
}

impl<C, S> Default for ConfigState<C, S> {
    fn default() -> Self {
        ConfigState {
            config: None,
            state: None,
        }
    }
}

impl<C, S> ConfigState<C, S> {
    /// Set the config slot; the state slot is untouched
    pub fn merge_config(&mut self, incoming: Versioned<C>) -> Merge {
        replace_slot(&mut self.config, incoming)
    }

    /// Set the state slot; the config slot is untouched
    pub fn merge_state(&mut self, incoming: Versioned<S>) -> Merge {
        replace_slot(&mut self.state, incoming)
    }
}

/// Append-only record list
///
/// `meta` describes the most recently appended item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendLog<T> {
    pub meta: Option<RecordMeta>,
    pub items: Vec<Versioned<T>>,
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        AppendLog {
            meta: None,
            items: Vec::new(),
        }
    }
}

impl<T> AppendLog<T> {
    /// Append `incoming`; never deduplicates
    pub fn push(&mut self, incoming: Versioned<T>) -> Merge {
        self.meta = Some(incoming.metadata.clone());
        self.items.push(incoming);
        Merge::Applied
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Everything read for one entity label
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityBundle {
    pub interfaces: BTreeMap<String, ConfigState<Interface, InterfaceState>>,
    pub interface_errors: BTreeMap<String, AppendLog<InterfaceError>>,
    pub bridge_domains: BTreeMap<String, ConfigState<BridgeDomain, BridgeDomainState>>,
    pub bridge_domain_errors: BTreeMap<String, AppendLog<BridgeDomainError>>,
    pub fib_table: AppendLog<FibEntry>,
    pub xconnect_pairs: BTreeMap<String, Versioned<XConnectPair>>,
    pub static_routes: Option<Versioned<StaticRoutes>>,
    pub status: BTreeMap<String, Versioned<AgentStatus>>,
}

impl EntityBundle {
    /// Whether nothing has been merged yet
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
            && self.interface_errors.is_empty()
            && self.bridge_domains.is_empty()
            && self.bridge_domain_errors.is_empty()
            && self.fib_table.is_empty()
            && self.xconnect_pairs.is_empty()
            && self.static_routes.is_none()
            && self.status.is_empty()
    }

    /// Number of individual records held
    pub fn record_count(&self) -> usize {
        let paired: usize = self
            .interfaces
            .values()
            .map(|cs| cs.config.is_some() as usize + cs.state.is_some() as usize)
            .sum::<usize>()
            + self
                .bridge_domains
                .values()
                .map(|cs| cs.config.is_some() as usize + cs.state.is_some() as usize)
                .sum::<usize>();
        let logged: usize = self.interface_errors.values().map(AppendLog::len).sum::<usize>()
            + self.bridge_domain_errors.values().map(AppendLog::len).sum::<usize>()
            + self.fib_table.len();
        paired
            + logged
            + self.xconnect_pairs.len()
            + self.static_routes.is_some() as usize
            + self.status.len()
    }
}
