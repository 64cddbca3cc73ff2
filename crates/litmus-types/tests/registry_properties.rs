//! Property tests for the locking-protocol registry.

use litmus_types::{
    LockProtocol, UNKNOWN_PROTOCOL_NAME, name_for_protocol_id, protocol_id_for_name,
    registered_names,
};
use proptest::prelude::*;

#[test]
fn every_registered_id_round_trips_through_its_name() {
    for protocol in LockProtocol::ALL {
        let id = protocol.id();
        assert_eq!(protocol_id_for_name(name_for_protocol_id(id)), Some(id));
    }
}

#[test]
fn every_registered_name_resolves() {
    for (name, protocol) in registered_names() {
        assert_eq!(LockProtocol::for_name(name), Some(protocol));
        assert_eq!(name.parse::<LockProtocol>(), Ok(protocol));
    }
}

#[test]
fn identifiers_are_unique() {
    let mut ids: Vec<i32> = LockProtocol::ALL.iter().map(|p| p.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), LockProtocol::ALL.len());
}

proptest! {
    #[test]
    fn unknown_ids_name_as_unknown(id in any::<i32>()) {
        let name = name_for_protocol_id(id);
        match LockProtocol::from_id(id) {
            Some(protocol) => prop_assert_eq!(name, protocol.name()),
            None => prop_assert_eq!(name, UNKNOWN_PROTOCOL_NAME),
        }
    }

    #[test]
    fn arbitrary_names_never_panic(name in ".{0,16}") {
        let resolved = protocol_id_for_name(&name);
        let registered = registered_names().any(|(n, _)| n == name);
        prop_assert_eq!(resolved.is_some(), registered);
    }
}
