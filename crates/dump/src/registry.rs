//! Record-type decoders
//!
//! The registry maps a record-type tag to a decoder. A decoder performs the
//! single typed `get` for a key and merges the result into a bundle. New
//! record types are added with [`DecoderRegistry::register`]; the
//! aggregator's control flow never changes.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use agentkv_broker::TypedBroker;
use agentkv_core::{Result, Revision, Serializer, SerializerKind, Versioned};

use crate::bundle::{replace_entry, replace_slot, EntityBundle, Merge};
use crate::key::{self, Arity, ClassifiedKey, Marker, STANDARD_MARKERS};
use crate::model::{
    AgentStatus, BridgeDomain, BridgeDomainError, BridgeDomainState, FibEntry, Interface,
    InterfaceError, InterfaceState, StaticRoutes, XConnectPair,
};

/// What a decoder did with one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The key was read at `rev` and merged (or refused as stale)
    Found { rev: Revision, merge: Merge },
    /// The store holds no value for the key
    NotFound,
}

type DecoderFn<S> = Box<
    dyn Fn(&TypedBroker<S>, &str, &ClassifiedKey, &mut EntityBundle) -> Result<Decoded>
        + Send
        + Sync,
>;

/// Table of record-type decoders
pub struct DecoderRegistry<S = SerializerKind> {
    markers: Vec<Marker>,
    decoders: HashMap<&'static str, DecoderFn<S>>,
}

impl<S: Serializer> Default for DecoderRegistry<S> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<S: Serializer> DecoderRegistry<S> {
    /// Registry with no record types
    pub fn empty() -> Self {
        DecoderRegistry {
            markers: Vec::new(),
            decoders: HashMap::new(),
        }
    }

    /// Registry covering every standard agent record type
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        reg.register(key::IF_CONFIG, Arity::exact(1), |b, ck, v: Versioned<Interface>| {
            b.interfaces.entry(ck.params[0].clone()).or_default().merge_config(v)
        });
        reg.register(key::IF_STATE, Arity::exact(1), |b, ck, v: Versioned<InterfaceState>| {
            b.interfaces.entry(ck.params[0].clone()).or_default().merge_state(v)
        });
        reg.register(key::IF_ERROR, Arity::exact(1), |b, ck, v: Versioned<InterfaceError>| {
            b.interface_errors.entry(ck.params[0].clone()).or_default().push(v)
        });
        reg.register(key::BD_CONFIG, Arity::exact(1), |b, ck, v: Versioned<BridgeDomain>| {
            b.bridge_domains.entry(ck.params[0].clone()).or_default().merge_config(v)
        });
        reg.register(key::BD_STATE, Arity::exact(1), |b, ck, v: Versioned<BridgeDomainState>| {
            b.bridge_domains.entry(ck.params[0].clone()).or_default().merge_state(v)
        });
        reg.register(key::BD_ERROR, Arity::exact(1), |b, ck, v: Versioned<BridgeDomainError>| {
            b.bridge_domain_errors.entry(ck.params[0].clone()).or_default().push(v)
        });
        reg.register(key::FIB, Arity::exact(2), |b, _ck, v: Versioned<FibEntry>| {
            b.fib_table.push(v)
        });
        reg.register(key::XCONNECT, Arity::exact(1), |b, ck, v: Versioned<XConnectPair>| {
            replace_entry(&mut b.xconnect_pairs, &ck.params[0], v)
        });
        reg.register(key::ROUTES, Arity::exact(0), |b, _ck, v: Versioned<StaticRoutes>| {
            replace_slot(&mut b.static_routes, v)
        });
        reg.register(key::STATUS, Arity::range(0, 1), |b, ck, v: Versioned<AgentStatus>| {
            replace_entry(&mut b.status, ck.status_id(), v)
        });
        debug_assert_eq!(reg.markers.len(), STANDARD_MARKERS.len());
        reg
    }

    /// Register a record type
    ///
    /// `merge` receives the bundle, the classified key (parameters already
    /// validated against `arity`) and the decoded record. Registering an
    /// existing tag replaces its decoder.
    pub fn register<M, F>(&mut self, tag: &'static str, arity: Arity, merge: F) -> &mut Self
    where
        M: DeserializeOwned + 'static,
        F: Fn(&mut EntityBundle, &ClassifiedKey, Versioned<M>) -> Merge + Send + Sync + 'static,
    {
        let decoder: DecoderFn<S> = Box::new(
            move |broker: &TypedBroker<S>,
                  key: &str,
                  ck: &ClassifiedKey,
                  bundle: &mut EntityBundle| {
                match broker.get::<M>(key)? {
                    Some(record) => {
                        let rev = record.rev();
                        Ok(Decoded::Found {
                            rev,
                            merge: merge(bundle, ck, record),
                        })
                    }
                    None => Ok(Decoded::NotFound),
                }
            },
        );
        self.markers.retain(|m| m.tag != tag);
        self.markers.push(Marker { tag, arity });
        self.decoders.insert(tag, decoder);
        self
    }

    /// Classify `key` against the registered markers
    pub fn classify(&self, key: &str) -> ClassifiedKey {
        key::classify_with(key, &self.markers)
    }

    /// Whether `tag` has a decoder
    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.decoders.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Fetch `key` and merge it into `bundle`
    ///
    /// Returns `None` when no decoder is registered for the key's tag.
    pub(crate) fn decode(
        &self,
        broker: &TypedBroker<S>,
        key: &str,
        ck: &ClassifiedKey,
        bundle: &mut EntityBundle,
    ) -> Option<Result<Decoded>> {
        let decoder = self.decoders.get(ck.tag?)?;
        Some(decoder(broker, key, ck, bundle))
    }
}

impl<S> fmt::Debug for DecoderRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("markers", &self.markers)
            .finish()
    }
}
