//! Domain payloads stored under the agent key layout
//!
//! These are plain serde types; the aggregator treats them as opaque
//! payloads and never validates their contents. Every field defaults so
//! that partially populated records written by older agents still decode.

use serde::{Deserialize, Serialize};

// ============================================================================
// Interfaces
// ============================================================================

/// Kind of VPP interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    #[default]
    SoftwareLoopback,
    EthernetCsmacd,
    MemoryInterface,
    TapInterface,
    AfPacketInterface,
    VxlanTunnel,
}

/// Interface configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
    pub enabled: bool,
    pub phys_address: String,
    pub mtu: u32,
    pub vrf: u32,
    pub ip_addresses: Vec<String>,
}

/// Link status as reported by VPP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Unknown,
    Up,
    Down,
    Deleted,
}

/// Interface counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceStatistics {
    pub in_packets: u64,
    pub in_bytes: u64,
    pub out_packets: u64,
    pub out_bytes: u64,
    pub drop_packets: u64,
    pub in_errors: u64,
    pub out_errors: u64,
}

/// Interface operational state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceState {
    pub name: String,
    pub internal_name: String,
    pub if_index: u32,
    pub admin_status: LinkStatus,
    pub oper_status: LinkStatus,
    pub last_change: i64,
    pub phys_address: String,
    pub speed: u64,
    pub mtu: u32,
    pub statistics: InterfaceStatistics,
}

/// One recorded failure of a configuration change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorData {
    pub change_type: String,
    pub error_message: String,
    pub last_change: i64,
}

/// Errors recorded against one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceError {
    pub interface_name: String,
    pub error_data: Vec<ErrorData>,
}

// ============================================================================
// Bridge domains
// ============================================================================

/// Interface attached to a bridge domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomainInterface {
    pub name: String,
    pub bridged_virtual_interface: bool,
    pub split_horizon_group: u32,
}

/// Bridge domain configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomain {
    pub name: String,
    pub flood: bool,
    pub unknown_unicast_flood: bool,
    pub forward: bool,
    pub learn: bool,
    pub arp_termination: bool,
    pub mac_age: u32,
    pub interfaces: Vec<BridgeDomainInterface>,
}

/// Bridge domain member as seen by VPP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomainInterfaceState {
    pub name: String,
    pub sw_if_index: u32,
    pub split_horizon_group: u32,
}

/// Bridge domain operational state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomainState {
    pub index: u32,
    pub internal_name: String,
    pub interface_count: u32,
    pub bvi_interface: String,
    pub interfaces: Vec<BridgeDomainInterfaceState>,
    pub last_change: i64,
}

/// Errors recorded against one bridge domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomainError {
    pub bd_name: String,
    pub error_data: Vec<ErrorData>,
}

// ============================================================================
// L2 forwarding
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FibAction {
    #[default]
    Forward,
    Drop,
}

/// Static L2 FIB entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibEntry {
    pub phys_address: String,
    pub bridge_domain: String,
    pub outgoing_interface: String,
    pub action: FibAction,
    pub static_config: bool,
    pub bridged_virtual_interface: bool,
}

/// L2 cross-connect between two interfaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XConnectPair {
    pub receive_interface: String,
    pub transmit_interface: String,
}

// ============================================================================
// L3
// ============================================================================

/// One static route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub vrf_id: u32,
    pub description: String,
    pub dst_ip_addr: String,
    pub next_hop_addr: String,
    pub outgoing_interface: String,
    pub weight: u32,
    pub preference: u32,
}

/// The static route table of an agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticRoutes {
    pub routes: Vec<Route>,
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalState {
    #[default]
    Init,
    Ok,
    Error,
}

/// Health report published by an agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentStatus {
    pub build_version: String,
    pub build_date: String,
    pub commit_hash: String,
    pub state: OperationalState,
    pub start_time: i64,
    pub last_change: i64,
    pub last_update: i64,
}
