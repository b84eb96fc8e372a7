//! Application core — inventory and venting logic, zero direct I/O.
//!
//! All interaction with pumps, storage and the UI happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without a machine attached.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
