//! Mixbot ingredient inventory and dispensing-readiness engine.
//!
//! Tracks the fill level of the bottle behind each of the 18 pumps,
//! keeps those records bound to the current pump wiring, answers "can this
//! cocktail be made right now?", and drives pump venting.  Everything
//! outside the core (storage, pumps, clocks, UI) is reached through the
//! port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod availability;
pub mod binding;
pub mod config;
pub mod error;
pub mod levels;
pub mod model;
pub mod runtime;
pub mod venting;

pub use error::{Error, Result};
