//! Availability engine — can this drink be made right now?
//!
//! Every automatic recipe line is looked up through the pump wiring and the
//! current level snapshot and classified:
//!
//! | available `A` vs required `R` | verdict    |
//! |-------------------------------|------------|
//! | `A < R`                       | missing    |
//! | `R <= A < 2R`                 | low        |
//! | `A >= 2R`                     | sufficient |
//!
//! Manual lines never count.  Lines are checked independently against the
//! same snapshot; a recipe naming one ingredient twice is not deducted as it
//! goes.

use serde::Serialize;

use crate::levels::IngredientLevel;
use crate::model::{PumpConfig, RecipeItem, pump_for};

/// Verdict for one recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub can_make: bool,
    /// Enough for exactly one more serving.
    pub low_ingredients: Vec<String>,
    /// Not enough for even one serving, or not wired to an enabled pump.
    pub missing_ingredients: Vec<String>,
}

/// Badge shown on a cocktail card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockWarning {
    None,
    /// Makeable, but at least one ingredient runs out after this one.
    Low,
    /// Not makeable.
    Unavailable,
}

impl Availability {
    pub fn warning(&self) -> StockWarning {
        if !self.can_make {
            StockWarning::Unavailable
        } else if !self.low_ingredients.is_empty() {
            StockWarning::Low
        } else {
            StockWarning::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stock {
    Sufficient,
    Low,
    Missing,
}

fn classify(required: u32, available: u32) -> Stock {
    let (r, a) = (u64::from(required), u64::from(available));
    if a < r {
        Stock::Missing
    } else if a < r * 2 {
        Stock::Low
    } else {
        Stock::Sufficient
    }
}

fn push_unique(set: &mut Vec<String>, id: &str) {
    if !set.iter().any(|s| s == id) {
        set.push(id.to_owned());
    }
}

/// Classify every automatic line of `recipe`.
pub fn check(recipe: &[RecipeItem], levels: &[IngredientLevel], pumps: &[PumpConfig]) -> Availability {
    let mut result = Availability::default();

    for item in recipe.iter().filter(|i| i.is_automatic()) {
        let level = pump_for(pumps, &item.ingredient_id)
            .and_then(|pump| levels.iter().find(|l| l.pump_id == pump.id));

        let stock = match level {
            Some(l) => classify(item.amount, l.current_level),
            None => Stock::Missing,
        };

        match stock {
            Stock::Missing => push_unique(&mut result.missing_ingredients, &item.ingredient_id),
            Stock::Low => push_unique(&mut result.low_ingredients, &item.ingredient_id),
            Stock::Sufficient => {}
        }
    }

    result.can_make = result.missing_ingredients.is_empty();
    result
}
