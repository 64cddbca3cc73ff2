//! Locking-protocol registry.
//!
//! The kernel identifies each real-time locking protocol by a small integer
//! (its object type). This module maps those identifiers to the names users
//! type on command lines and in configuration files.
//!
//! The table is fixed at build time. `MPCP_VS` is registered under two
//! spellings, so names are not unique but identifiers are. Lookups scan the
//! table in registration order and return the first match.

use core::fmt;
use core::str::FromStr;

use litmus_errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Name returned for identifiers that are not registered.
pub const UNKNOWN_PROTOCOL_NAME: &str = "<UNKNOWN>";

/// Real-time locking protocols known to the kernel.
///
/// Discriminants are the kernel's object-type numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LockProtocol {
    /// Flexible Multiprocessor Locking Protocol
    #[serde(rename = "FMLP")]
    Fmlp = 0,
    /// Stack Resource Policy
    #[serde(rename = "SRP")]
    Srp = 1,
    /// Multiprocessor Priority Ceiling Protocol
    #[serde(rename = "MPCP")]
    Mpcp = 2,
    /// MPCP with virtual spinning
    #[serde(rename = "MPCP_VS", alias = "MPCP-VS")]
    MpcpVs = 3,
    /// Distributed Priority Ceiling Protocol
    #[serde(rename = "DPCP")]
    Dpcp = 4,
    /// Priority Ceiling Protocol
    #[serde(rename = "PCP")]
    Pcp = 5,
}

struct ProtocolEntry {
    protocol: LockProtocol,
    name: &'static str,
}

const fn entry(protocol: LockProtocol, name: &'static str) -> ProtocolEntry {
    ProtocolEntry { protocol, name }
}

static PROTOCOLS: [ProtocolEntry; 7] = [
    entry(LockProtocol::Fmlp, "FMLP"),
    entry(LockProtocol::Srp, "SRP"),
    entry(LockProtocol::Mpcp, "MPCP"),
    entry(LockProtocol::MpcpVs, "MPCP_VS"),
    entry(LockProtocol::MpcpVs, "MPCP-VS"),
    entry(LockProtocol::Dpcp, "DPCP"),
    entry(LockProtocol::Pcp, "PCP"),
];

impl LockProtocol {
    /// Every protocol, in identifier order.
    pub const ALL: [LockProtocol; 6] = [
        LockProtocol::Fmlp,
        LockProtocol::Srp,
        LockProtocol::Mpcp,
        LockProtocol::MpcpVs,
        LockProtocol::Dpcp,
        LockProtocol::Pcp,
    ];

    /// The kernel object-type number.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a protocol by its kernel identifier.
    pub fn from_id(id: i32) -> Option<Self> {
        PROTOCOLS
            .iter()
            .find(|e| e.protocol.id() == id)
            .map(|e| e.protocol)
    }

    /// Look up a protocol by name. The first registered match wins.
    pub fn for_name(name: &str) -> Option<Self> {
        PROTOCOLS
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.protocol)
    }

    /// Canonical name, the first spelling registered for this protocol.
    pub fn name(self) -> &'static str {
        name_for_protocol_id(self.id())
    }
}

/// Kernel identifier for `name`, or `None` when the name is not registered.
pub fn protocol_id_for_name(name: &str) -> Option<i32> {
    LockProtocol::for_name(name).map(LockProtocol::id)
}

/// Registered name for `id`, or [`UNKNOWN_PROTOCOL_NAME`].
///
/// This never fails because it feeds human-readable diagnostics.
pub fn name_for_protocol_id(id: i32) -> &'static str {
    PROTOCOLS
        .iter()
        .find(|e| e.protocol.id() == id)
        .map_or(UNKNOWN_PROTOCOL_NAME, |e| e.name)
}

/// Every registered name paired with its protocol, in registration order.
pub fn registered_names() -> impl Iterator<Item = (&'static str, LockProtocol)> {
    PROTOCOLS.iter().map(|e| (e.name, e.protocol))
}

impl fmt::Display for LockProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LockProtocol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LockProtocol::for_name(s).ok_or_else(|| {
            let expected = registered_names()
                .map(|(name, _)| name)
                .collect::<Vec<_>>()
                .join(", ");
            ValidationError::invalid_enum("locking protocol", s, expected)
        })
    }
}

/// Protocol-specific argument passed alongside an object-open request.
///
/// Most protocols take none. DPCP needs the CPU on which the resource's
/// agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolConfig {
    /// No protocol-specific argument
    #[default]
    None,
    /// Synchronization processor for the resource
    Cpu(i32),
}

impl ProtocolConfig {
    /// Whether an argument is carried.
    pub fn is_none(&self) -> bool {
        matches!(self, ProtocolConfig::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_match_kernel_numbering() {
        assert_eq!(LockProtocol::Fmlp.id(), 0);
        assert_eq!(LockProtocol::Srp.id(), 1);
        assert_eq!(LockProtocol::Mpcp.id(), 2);
        assert_eq!(LockProtocol::MpcpVs.id(), 3);
        assert_eq!(LockProtocol::Dpcp.id(), 4);
        assert_eq!(LockProtocol::Pcp.id(), 5);
    }

    #[test]
    fn test_both_mpcp_vs_spellings_resolve() {
        assert_eq!(protocol_id_for_name("MPCP_VS"), Some(3));
        assert_eq!(protocol_id_for_name("MPCP-VS"), Some(3));
    }

    #[test]
    fn test_name_for_id_returns_first_registered_spelling() {
        assert_eq!(name_for_protocol_id(3), "MPCP_VS");
        assert_eq!(LockProtocol::MpcpVs.to_string(), "MPCP_VS");
    }

    #[test]
    fn test_unknown_lookups() {
        assert_eq!(protocol_id_for_name("not-a-protocol"), None);
        assert_eq!(protocol_id_for_name("fmlp"), None);
        assert_eq!(protocol_id_for_name(""), None);
        assert_eq!(name_for_protocol_id(-1), UNKNOWN_PROTOCOL_NAME);
        assert_eq!(name_for_protocol_id(6), UNKNOWN_PROTOCOL_NAME);
        assert_eq!(LockProtocol::from_id(99), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("DPCP".parse::<LockProtocol>(), Ok(LockProtocol::Dpcp));

        let err = "OMLP".parse::<LockProtocol>();
        assert!(matches!(
            err,
            Err(ValidationError::InvalidEnumValue { ref value, .. }) if value == "OMLP"
        ));
    }

    #[test]
    fn test_registration_order() {
        let names: Vec<_> = registered_names().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["FMLP", "SRP", "MPCP", "MPCP_VS", "MPCP-VS", "DPCP", "PCP"]
        );
    }

    #[test]
    fn test_serde_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&LockProtocol::MpcpVs)?, "\"MPCP_VS\"");
        let parsed: LockProtocol = serde_json::from_str("\"MPCP-VS\"")?;
        assert_eq!(parsed, LockProtocol::MpcpVs);
        Ok(())
    }

    #[test]
    fn test_protocol_config_default() {
        assert!(ProtocolConfig::default().is_none());
        assert!(!ProtocolConfig::Cpu(2).is_none());
    }
}
