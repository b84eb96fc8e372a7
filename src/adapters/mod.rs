//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                  |
//! |-------------|--------------|------------------------------|
//! | `actuator`  | PumpActuator | Simulated pumps (timer)      |
//! | `file`      | StoragePort  | One file per key on disk     |
//! |             | ConfigPort   | (blanket impl)               |
//! | `log_sink`  | EventSink    | `log` facade                 |
//! | `memory`    | StoragePort  | Shared in-process map        |
//! |             | ConfigPort   | (blanket impl)               |
//! | `time`      | Clock        | System clock / manual clock  |

pub mod actuator;
pub mod file;
pub mod log_sink;
pub mod memory;
pub mod time;
