//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on the host; pumps and storage
//! are simulated.

mod availability_tests;
mod venting_tests;
