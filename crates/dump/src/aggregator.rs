//! Record aggregator
//!
//! The aggregator owns the snapshot of one dump pass: a map from entity
//! label to `EntityBundle`. Each key goes through the same pipeline:
//!
//! 1. classify (after stripping the configured root prefix)
//! 2. label filter, then the status bypass, then the type filter
//! 3. parameter validation
//! 4. exactly one typed `get`, merged by the registered decoder
//!
//! Filtered keys never reach the store. Missing, malformed and undecodable
//! records are logged, recorded in [`Aggregator::issues`] and skipped; only
//! store failures end the pass.
//!
//! Merges are read-modify-write on the in-memory bundle only. Nothing here
//! guards against another writer changing the store between two reads.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use agentkv_broker::TypedBroker;
use agentkv_core::{DeleteOptions, Result, Revision, Serializer, SerializerKind};

use crate::bundle::{EntityBundle, Merge};
use crate::config::DumpConfig;
use crate::filter::Filters;
use crate::key::{strip_root, ClassifiedKey};
use crate::registry::{Decoded, DecoderRegistry};

/// What happened to one ingested key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Rejected by a filter; the store was not contacted
    Filtered,
    /// Read at this revision and merged
    Merged(Revision),
    /// Read at `read`, but the slot already held `held`
    Stale { read: Revision, held: Revision },
    /// The store holds no value for the key
    NotFound,
    /// The key lacks parameters its record type requires
    Malformed,
    /// The value could not be decoded
    DecodeFailed,
    /// No decoder is registered for the key's record type
    NoDecoder,
}

impl IngestOutcome {
    /// Whether the key passed the filters
    pub fn matched(&self) -> bool {
        !matches!(self, IngestOutcome::Filtered)
    }
}

/// Per-key problem noticed during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    NotFound,
    Malformed(String),
    DecodeFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::NotFound => write!(f, "{}: not found", self.key),
            IssueKind::Malformed(reason) => write!(f, "{}: malformed key: {}", self.key, reason),
            IssueKind::DecodeFailed(msg) => write!(f, "{}: {}", self.key, msg),
        }
    }
}

/// Counters for one `load_prefix` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub scanned: usize,
    pub filtered: usize,
    pub merged: usize,
    pub stale: usize,
    pub not_found: usize,
    pub malformed: usize,
    pub decode_failed: usize,
    pub no_decoder: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: IngestOutcome) {
        self.scanned += 1;
        match outcome {
            IngestOutcome::Filtered => self.filtered += 1,
            IngestOutcome::Merged(_) => self.merged += 1,
            IngestOutcome::Stale { .. } => self.stale += 1,
            IngestOutcome::NotFound => self.not_found += 1,
            IngestOutcome::Malformed => self.malformed += 1,
            IngestOutcome::DecodeFailed => self.decode_failed += 1,
            IngestOutcome::NoDecoder => self.no_decoder += 1,
        }
    }

    /// Keys that passed the filters
    pub fn matched(&self) -> usize {
        self.scanned - self.filtered
    }
}

/// Snapshot of many entities, built one key at a time
pub struct Aggregator<S = SerializerKind> {
    registry: DecoderRegistry<S>,
    root_prefix: String,
    bundles: HashMap<String, EntityBundle>,
    issues: Vec<Issue>,
}

impl<S: Serializer> Default for Aggregator<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Serializer> Aggregator<S> {
    /// Aggregator using the standard record types
    pub fn new() -> Self {
        Self::with_registry(DecoderRegistry::standard())
    }

    pub fn with_registry(registry: DecoderRegistry<S>) -> Self {
        Aggregator {
            registry,
            root_prefix: String::new(),
            bundles: HashMap::new(),
            issues: Vec::new(),
        }
    }

    /// Aggregator configured from a `DumpConfig`
    pub fn from_config(config: &DumpConfig) -> Self {
        Self::new().with_root_prefix(&config.root_prefix)
    }

    /// Strip `root` from keys before classifying them
    pub fn with_root_prefix(mut self, root: &str) -> Self {
        self.root_prefix = root.to_string();
        self
    }

    pub fn registry(&self) -> &DecoderRegistry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DecoderRegistry<S> {
        &mut self.registry
    }

    fn classify(&self, key: &str) -> ClassifiedKey {
        self.registry.classify(strip_root(key, &self.root_prefix))
    }

    // ========== Bundles ==========

    /// Bundle for `label`, created empty if absent
    pub fn ensure_bundle(&mut self, label: &str) -> &mut EntityBundle {
        self.bundles.entry(label.to_string()).or_default()
    }

    /// Reset the bundle of `key`'s label to an empty placeholder
    pub fn create_empty_record(&mut self, key: &str) {
        let label = self.classify(key).label;
        debug!(target: "agentkv::dump", %label, "Created empty record");
        self.bundles.insert(label, EntityBundle::default());
    }

    pub fn bundle(&self, label: &str) -> Option<&EntityBundle> {
        self.bundles.get(label)
    }

    /// Labels in sorted order
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Bundles in label order
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &EntityBundle)> + '_ {
        let mut entries: Vec<(&str, &EntityBundle)> =
            self.bundles.iter().map(|(l, b)| (l.as_str(), b)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Problems noticed so far, in the order they occurred
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    fn report(&mut self, key: &str, kind: IssueKind) {
        self.issues.push(Issue {
            key: key.to_string(),
            kind,
        });
    }

    // ========== Ingestion ==========

    /// Read `key` and merge it into its label's bundle
    ///
    /// # Errors
    ///
    /// Only store-level failures are returned; everything else is an
    /// outcome.
    pub fn ingest(
        &mut self,
        broker: &TypedBroker<S>,
        key: &str,
        filters: &Filters,
    ) -> Result<IngestOutcome> {
        let ck = self.classify(key);
        if !admits_read(&ck, filters) {
            trace!(target: "agentkv::dump", key, "Filtered out");
            return Ok(IngestOutcome::Filtered);
        }

        let known = ck.tag.map(|tag| self.registry.contains(tag)).unwrap_or(false);
        if !known {
            debug!(target: "agentkv::dump", key, "No decoder for record type");
            return Ok(IngestOutcome::NoDecoder);
        }

        self.bundles.entry(ck.label.clone()).or_default();

        if let Err(e) = ck.validate(key) {
            warn!(target: "agentkv::dump", key, error = %e, "Skipping malformed key");
            self.report(key, IssueKind::Malformed(e.to_string()));
            return Ok(IngestOutcome::Malformed);
        }

        let bundle = self.bundles.entry(ck.label.clone()).or_default();
        let decoded = match self.registry.decode(broker, key, &ck, bundle) {
            Some(result) => result,
            None => return Ok(IngestOutcome::NoDecoder),
        };

        match decoded {
            Ok(Decoded::Found {
                rev,
                merge: Merge::Applied,
            }) => {
                debug!(target: "agentkv::dump", key, %rev, "Merged record");
                Ok(IngestOutcome::Merged(rev))
            }
            Ok(Decoded::Found {
                rev,
                merge: Merge::Stale(held),
            }) => {
                warn!(target: "agentkv::dump", key, %rev, %held, "Ignoring stale read");
                Ok(IngestOutcome::Stale { read: rev, held })
            }
            Ok(Decoded::NotFound) => {
                warn!(target: "agentkv::dump", key, "Data for key not found");
                self.report(key, IssueKind::NotFound);
                Ok(IngestOutcome::NotFound)
            }
            Err(e) if e.is_decode() => {
                warn!(target: "agentkv::dump", key, error = %e, "Could not decode record");
                self.report(key, IssueKind::DecodeFailed(e.to_string()));
                Ok(IngestOutcome::DecodeFailed)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete `key` from the store if it passes the filters
    ///
    /// Unlike `ingest`, status keys get no pass on the type filter. The
    /// snapshot is not touched. Returns whether the store deleted
    /// anything.
    pub fn delete(&self, broker: &TypedBroker<S>, key: &str, filters: &Filters) -> Result<bool> {
        let ck = self.classify(key);
        if !admits_delete(&ck, filters) {
            trace!(target: "agentkv::dump", key, "Delete filtered out");
            return Ok(false);
        }
        let existed = broker.delete(key, &DeleteOptions::default())?;
        debug!(target: "agentkv::dump", key, existed, "Deleted key");
        Ok(existed)
    }

    /// Ingest every key under `prefix`
    ///
    /// Keys are enumerated with one `list_keys` call, then ingested in
    /// key order. Stops at the first store failure.
    pub fn load_prefix(
        &mut self,
        broker: &TypedBroker<S>,
        prefix: &str,
        filters: &Filters,
    ) -> Result<PassSummary> {
        let keys: Vec<String> = broker.list_keys(prefix)?.map(|(key, _)| key).collect();
        let mut summary = PassSummary::default();
        for key in &keys {
            let outcome = self.ingest(broker, key, filters)?;
            summary.record(outcome);
        }
        debug!(
            target: "agentkv::dump",
            prefix,
            scanned = summary.scanned,
            merged = summary.merged,
            issues = self.issues.len(),
            "Pass finished"
        );
        Ok(summary)
    }
}

impl<S> fmt::Debug for Aggregator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("root_prefix", &self.root_prefix)
            .field("bundles", &self.bundles.len())
            .field("issues", &self.issues.len())
            .finish()
    }
}

/// Label filter first; status keys skip the type filter on reads
fn admits_read(ck: &ClassifiedKey, filters: &Filters) -> bool {
    if !filters.allows_label(&ck.label) {
        return false;
    }
    ck.is_status || filters.allows_type(ck.type_name())
}

/// Both filters apply to every key, status keys included
fn admits_delete(ck: &ClassifiedKey, filters: &Filters) -> bool {
    filters.allows_label(&ck.label) && filters.allows_type(ck.type_name())
}
