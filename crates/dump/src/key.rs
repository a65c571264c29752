//! Key classification
//!
//! Keys follow the agent layout
//!
//! ```text
//! [<root>]<label>/<domain>/<class>/<kind>/<param0>/<param1>...
//! [<root>]<label>/check/status[/<agent-id>]
//! ```
//!
//! The first path segment is the entity label. The remainder is matched
//! against a closed table of record-type markers (longest match wins); what
//! follows the marker is split into at most `arity.max` parameters, with the
//! last parameter absorbing the rest of the path so that interface names
//! like `GigabitEthernet0/0/0` survive intact.
//!
//! Classification is pure: no store access, no allocation beyond the
//! returned strings.

use agentkv_core::{Error, Result};

/// Interface configuration
pub const IF_CONFIG: &str = "vpp/config/interfaces";
/// Interface operational state
pub const IF_STATE: &str = "vpp/state/interfaces";
/// Interface error records
pub const IF_ERROR: &str = "vpp/error/interfaces";
/// Bridge domain configuration
pub const BD_CONFIG: &str = "vpp/config/bridge-domains";
/// Bridge domain operational state
pub const BD_STATE: &str = "vpp/state/bridge-domains";
/// Bridge domain error records
pub const BD_ERROR: &str = "vpp/error/bridge-domains";
/// L2 FIB entries, keyed by bridge domain and MAC
pub const FIB: &str = "vpp/config/fib";
/// L2 cross-connect pairs
pub const XCONNECT: &str = "vpp/config/xconnect";
/// L3 static routes (one record per label)
pub const ROUTES: &str = "vpp/config/routes";
/// Agent status namespace
pub const STATUS: &str = "check/status";

/// Status id used when a status key carries no agent id
pub const DEFAULT_STATUS_ID: &str = "Agent";

/// How many positional parameters a record type takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Parameters that must be present and non-empty
    pub min: usize,
    /// Parameters extracted at most; the last absorbs the remaining path
    pub max: usize,
}

impl Arity {
    /// Exactly `n` parameters
    pub const fn exact(n: usize) -> Self {
        Arity { min: n, max: n }
    }

    /// Between `min` and `max` parameters
    pub const fn range(min: usize, max: usize) -> Self {
        Arity { min, max }
    }
}

/// A known record-type marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub tag: &'static str,
    pub arity: Arity,
}

/// Markers understood out of the box
pub const STANDARD_MARKERS: &[Marker] = &[
    Marker {
        tag: IF_CONFIG,
        arity: Arity::exact(1),
    },
    Marker {
        tag: IF_STATE,
        arity: Arity::exact(1),
    },
    Marker {
        tag: IF_ERROR,
        arity: Arity::exact(1),
    },
    Marker {
        tag: BD_CONFIG,
        arity: Arity::exact(1),
    },
    Marker {
        tag: BD_STATE,
        arity: Arity::exact(1),
    },
    Marker {
        tag: BD_ERROR,
        arity: Arity::exact(1),
    },
    Marker {
        tag: FIB,
        arity: Arity::exact(2),
    },
    Marker {
        tag: XCONNECT,
        arity: Arity::exact(1),
    },
    Marker {
        tag: ROUTES,
        arity: Arity::exact(0),
    },
    Marker {
        tag: STATUS,
        arity: Arity::range(0, 1),
    },
];

/// Routing information extracted from a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedKey {
    /// Entity label (first path segment)
    pub label: String,
    /// Matched record-type marker, `None` when unknown
    pub tag: Option<&'static str>,
    /// Positional parameters following the marker
    pub params: Vec<String>,
    /// Whether the key lives in the status namespace
    pub is_status: bool,
    arity: Arity,
}

impl ClassifiedKey {
    /// Record-type string used for type filtering (empty when unknown)
    pub fn type_name(&self) -> &str {
        self.tag.unwrap_or("")
    }

    /// Reject keys lacking the parameters their record type requires
    pub fn validate(&self, key: &str) -> Result<()> {
        let present = self.params.iter().take_while(|p| !p.is_empty()).count();
        if present < self.arity.min {
            return Err(Error::MalformedKey {
                key: key.to_string(),
                reason: format!(
                    "{} needs {} parameter(s), found {}",
                    self.type_name(),
                    self.arity.min,
                    present
                ),
            });
        }
        Ok(())
    }

    /// Status id for a status key (`Agent` when the key names none)
    pub fn status_id(&self) -> &str {
        self.params
            .first()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_STATUS_ID)
    }
}

/// Remove the configured root prefix, if the key carries it
pub fn strip_root<'a>(key: &'a str, root: &str) -> &'a str {
    if root.is_empty() {
        return key;
    }
    key.strip_prefix(root).unwrap_or(key)
}

/// Classify `key` against the standard marker table
pub fn classify(key: &str) -> ClassifiedKey {
    classify_with(key, STANDARD_MARKERS)
}

/// Classify `key` against an arbitrary marker table
pub fn classify_with(key: &str, markers: &[Marker]) -> ClassifiedKey {
    let (label, rest) = key.split_once('/').unwrap_or((key, ""));

    let marker = markers
        .iter()
        .filter(|m| matches_marker(rest, m.tag))
        .max_by_key(|m| m.tag.len());

    let Some(marker) = marker else {
        return ClassifiedKey {
            label: label.to_string(),
            tag: None,
            params: Vec::new(),
            is_status: false,
            arity: Arity::exact(0),
        };
    };

    let tail = rest.get(marker.tag.len() + 1..).unwrap_or("");
    let params = if tail.is_empty() || marker.arity.max == 0 {
        Vec::new()
    } else {
        tail.splitn(marker.arity.max, '/').map(str::to_string).collect()
    };

    ClassifiedKey {
        label: label.to_string(),
        tag: Some(marker.tag),
        params,
        is_status: marker.tag == STATUS,
        arity: marker.arity,
    }
}

fn matches_marker(rest: &str, tag: &str) -> bool {
    match rest.strip_prefix(tag) {
        Some(after) => after.is_empty() || after.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interface_name_with_slashes() {
        let ck = classify("agent1/vpp/config/interfaces/GigabitEthernet0/0/0");
        assert_eq!(ck.label, "agent1");
        assert_eq!(ck.tag, Some(IF_CONFIG));
        assert_eq!(ck.params, vec!["GigabitEthernet0/0/0"]);
        assert!(!ck.is_status);
        assert!(ck.validate("k").is_ok());
    }

    #[test]
    fn test_fib_has_two_params() {
        let ck = classify("vpp1/vpp/config/fib/bd1/62:89:c6:a3:33:18");
        assert_eq!(ck.tag, Some(FIB));
        assert_eq!(ck.params, vec!["bd1", "62:89:c6:a3:33:18"]);
    }

    #[test]
    fn test_fib_missing_mac_is_malformed() {
        let ck = classify("vpp1/vpp/config/fib/bd1");
        assert!(matches!(ck.validate("k"), Err(Error::MalformedKey { .. })));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        for key in ["agent1/vpp/config/interfaces", "agent1/vpp/config/interfaces/"] {
            let ck = classify(key);
            assert_eq!(ck.tag, Some(IF_CONFIG));
            assert!(ck.validate(key).is_err(), "{key}");
        }
    }

    #[test]
    fn test_routes_take_no_params() {
        let ck = classify("agent1/vpp/config/routes");
        assert_eq!(ck.tag, Some(ROUTES));
        assert!(ck.params.is_empty());
        assert!(ck.validate("k").is_ok());
    }

    #[test]
    fn test_status_keys() {
        let plain = classify("agent1/check/status");
        assert!(plain.is_status);
        assert_eq!(plain.status_id(), DEFAULT_STATUS_ID);

        let named = classify("agent1/check/status/vpp-agent");
        assert!(named.is_status);
        assert_eq!(named.status_id(), "vpp-agent");
    }

    #[test]
    fn test_unknown_marker() {
        let ck = classify("agent1/vpp/config/acls/acl1");
        assert_eq!(ck.label, "agent1");
        assert_eq!(ck.tag, None);
        assert_eq!(ck.type_name(), "");
        assert!(ck.validate("k").is_ok());
    }

    #[test]
    fn test_marker_must_end_at_segment_boundary() {
        let ck = classify("agent1/vpp/config/interfaces-v2/eth0");
        assert_eq!(ck.tag, None);
    }

    #[test]
    fn test_longest_marker_wins() {
        let markers = [
            Marker {
                tag: "vpp/config",
                arity: Arity::exact(1),
            },
            Marker {
                tag: "vpp/config/interfaces",
                arity: Arity::exact(1),
            },
        ];
        let ck = classify_with("a/vpp/config/interfaces/eth0", &markers);
        assert_eq!(ck.tag, Some("vpp/config/interfaces"));
        assert_eq!(ck.params, vec!["eth0"]);
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(
            strip_root("/vnf-agent/agent1/check/status", "/vnf-agent/"),
            "agent1/check/status"
        );
        assert_eq!(strip_root("agent1/check/status", "/vnf-agent/"), "agent1/check/status");
        assert_eq!(strip_root("agent1/x", ""), "agent1/x");
    }

    proptest! {
        #[test]
        fn prop_classify_is_pure(key in "[a-z0-9/]{0,40}") {
            prop_assert_eq!(classify(&key), classify(&key));
        }

        #[test]
        fn prop_interface_keys_round_trip(
            label in "[a-z][a-z0-9-]{0,11}",
            name in "[A-Za-z][A-Za-z0-9/.:]{0,15}",
        ) {
            let key = format!("{label}/{IF_STATE}/{name}");
            let ck = classify(&key);
            prop_assert_eq!(ck.label, label);
            prop_assert_eq!(ck.tag, Some(IF_STATE));
            prop_assert_eq!(ck.params, vec![name]);
        }
    }
}
