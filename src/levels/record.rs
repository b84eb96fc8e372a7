//! Per-pump liquid level records and their bounds.

use serde::{Deserialize, Serialize};

use crate::model::{PUMP_COUNT, PumpId};

/// Smallest container the machine accepts.
pub const MIN_CONTAINER_ML: u32 = 100;
/// Largest container the machine accepts.
pub const MAX_CONTAINER_ML: u32 = 5000;

/// Remaining liquid behind one pump.
///
/// Invariants: `current_level <= container_size` and
/// `MIN_CONTAINER_ML <= container_size <= MAX_CONTAINER_ML`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLevel {
    pub pump_id: PumpId,
    pub ingredient: String,
    pub ingredient_id: String,
    pub current_level: u32,
    pub container_size: u32,
    /// Epoch milliseconds of the last mutation.
    pub last_updated: u64,
}

/// A single field-level change requested through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelMutation {
    /// Set the fill level.  Raw UI input; clamped into `[0, container_size]`.
    SetLevel(i64),
    /// Swap the container.  Clamped into `[100, 5000]`; the fill level follows
    /// it down if it no longer fits.
    SetContainerSize(i64),
    /// Relabel the pump's ingredient.  Empty restores the slot defaults.
    Rename(String),
    /// Deduct a dispensed amount, stopping at empty.
    Consume(u32),
}

impl IngredientLevel {
    /// Factory record for a slot that has never been configured.
    pub fn default_for(pump_id: PumpId, container_size: u32, now_ms: u64) -> Self {
        let size = clamp_container(i64::from(container_size));
        Self {
            pump_id,
            ingredient: default_label(pump_id),
            ingredient_id: default_ingredient_id(pump_id),
            current_level: size,
            container_size: size,
            last_updated: now_ms,
        }
    }

    /// Apply `mutation`, keep the invariants, stamp `now_ms`.
    pub fn apply(&mut self, mutation: LevelMutation, now_ms: u64) {
        match mutation {
            LevelMutation::SetLevel(v) => {
                self.current_level = clamp_level(v, self.container_size);
            }
            LevelMutation::SetContainerSize(v) => {
                self.container_size = clamp_container(v);
                self.current_level = self.current_level.min(self.container_size);
            }
            LevelMutation::Rename(name) => {
                if name.is_empty() {
                    self.ingredient = default_label(self.pump_id);
                    self.ingredient_id = default_ingredient_id(self.pump_id);
                } else {
                    self.ingredient.clone_from(&name);
                    self.ingredient_id = name;
                }
            }
            LevelMutation::Consume(amount) => {
                self.current_level = self.current_level.saturating_sub(amount);
            }
        }
        self.last_updated = now_ms;
    }

    /// Fill back up to the container size.
    pub fn refill(&mut self, now_ms: u64) {
        self.current_level = self.container_size;
        self.last_updated = now_ms;
    }

    /// Whether both volume invariants hold.
    pub fn is_within_bounds(&self) -> bool {
        (MIN_CONTAINER_ML..=MAX_CONTAINER_ML).contains(&self.container_size)
            && self.current_level <= self.container_size
    }
}

/// Canonical full set of default records, ids `1..=18`.
pub fn default_levels(container_size: u32, now_ms: u64) -> [IngredientLevel; PUMP_COUNT] {
    core::array::from_fn(|i| IngredientLevel::default_for(i as PumpId + 1, container_size, now_ms))
}

pub fn clamp_container(v: i64) -> u32 {
    v.clamp(i64::from(MIN_CONTAINER_ML), i64::from(MAX_CONTAINER_ML)) as u32
}

pub fn clamp_level(v: i64, container_size: u32) -> u32 {
    v.clamp(0, i64::from(container_size)) as u32
}

fn default_label(pump_id: PumpId) -> String {
    format!("Ingredient {}", pump_id)
}

fn default_ingredient_id(pump_id: PumpId) -> String {
    format!("ingredient-{}", pump_id)
}
