//! Pump binding sync — keeps level records in step with the pump wiring.
//!
//! When a pump is rewired to a different ingredient, its level record takes
//! over the new ingredient key and a display label derived from it.

use log::info;

use crate::levels::IngredientLevel;
use crate::model::PumpConfig;

/// Prefix the catalog uses for user-created ingredients: `custom-<digits>-`.
const CUSTOM_PREFIX: &str = "custom-";

/// Display label for an ingredient key.
///
/// Strips a literal `custom-<digits>-` prefix.  Keys without that prefix,
/// or with nothing after it, are returned unchanged.
pub fn ingredient_label(ingredient_id: &str) -> &str {
    let Some(rest) = ingredient_id.strip_prefix(CUSTOM_PREFIX) else {
        return ingredient_id;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return ingredient_id;
    }
    match rest[digits..].strip_prefix('-') {
        Some(label) if !label.is_empty() => label,
        _ => ingredient_id,
    }
}

/// Human-facing name of a dash-separated ingredient key
/// (`"dark-rum"` → `"Dark Rum"`).
pub fn display_name(ingredient_id: &str) -> String {
    ingredient_label(ingredient_id)
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rebind `levels` to `pumps`.  Returns how many records changed.
///
/// Pumps without a level record are skipped.  Records whose key already
/// matches are left untouched, including their timestamp.
pub fn sync_bindings(pumps: &[PumpConfig], levels: &mut [IngredientLevel], now_ms: u64) -> usize {
    let mut changed = 0;
    for pump in pumps {
        let Some(level) = levels.iter_mut().find(|l| l.pump_id == pump.id) else {
            continue;
        };
        if level.ingredient_id == pump.ingredient {
            continue;
        }
        info!(
            "binding: P{} {} -> {}",
            pump.id, level.ingredient_id, pump.ingredient
        );
        level.ingredient_id.clone_from(&pump.ingredient);
        level.ingredient = ingredient_label(&pump.ingredient).to_owned();
        level.last_updated = now_ms;
        changed += 1;
    }
    changed
}
