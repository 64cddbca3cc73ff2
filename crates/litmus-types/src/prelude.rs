//! Prelude module for common task and protocol types.

pub use crate::protocol::{
    LockProtocol, ProtocolConfig, UNKNOWN_PROTOCOL_NAME, name_for_protocol_id,
    protocol_id_for_name,
};
pub use crate::task::{
    BudgetPolicy, LITMUS_HIGHEST_PRIORITY, LITMUS_LOWEST_PRIORITY, Lt, NS_PER_MS, ReleasePolicy,
    RtTask, TaskClass,
};
