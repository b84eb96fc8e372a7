//! Wiring and recipe types supplied by the outside world.
//!
//! The core never persists these.  Pump wiring comes from the machine's
//! configuration collaborator, recipes from the cocktail catalog.

use serde::{Deserialize, Serialize};

/// Physical pump identity (1-based, stable).
pub type PumpId = u8;

/// Number of physical pump slots on the machine.
pub const PUMP_COUNT: usize = 18;

// ---------------------------------------------------------------------------
// Pump wiring
// ---------------------------------------------------------------------------

/// One entry of the pump-to-ingredient wiring table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpConfig {
    pub id: PumpId,
    /// Ingredient key currently hooked up to this pump.
    pub ingredient: String,
    /// Disabled pumps take no part in venting or availability lookups.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl PumpConfig {
    pub fn new(id: PumpId, ingredient: impl Into<String>, enabled: bool) -> Self {
        Self {
            id,
            ingredient: ingredient.into(),
            enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// How an ingredient gets into the glass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    /// Dispensed by a pump; inventory-tracked.
    Automatic,
    /// Added by hand; never inventory-tracked.
    Manual,
}

/// One line of a cocktail recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeItem {
    pub ingredient_id: String,
    /// Volume units required for one serving.
    pub amount: u32,
    #[serde(rename = "type")]
    pub kind: IngredientKind,
    /// Legacy UI hint; `kind` is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<bool>,
}

impl RecipeItem {
    pub fn automatic(ingredient_id: impl Into<String>, amount: u32) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            amount,
            kind: IngredientKind::Automatic,
            manual: None,
        }
    }

    pub fn manual(ingredient_id: impl Into<String>, amount: u32) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            amount,
            kind: IngredientKind::Manual,
            manual: Some(true),
        }
    }

    pub fn is_automatic(&self) -> bool {
        self.kind == IngredientKind::Automatic
    }
}

/// First enabled pump wired to `ingredient_id`, in configuration order.
pub fn pump_for<'a>(pumps: &'a [PumpConfig], ingredient_id: &str) -> Option<&'a PumpConfig> {
    pumps
        .iter()
        .find(|p| p.enabled && p.ingredient == ingredient_id)
}
