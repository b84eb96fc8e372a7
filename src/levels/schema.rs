//! Persisted envelope for level data.
//!
//! Two storage keys make up the envelope: the JSON level array and a
//! schema version tag.  A tag other than [`SCHEMA_VERSION`] invalidates
//! the payload wholesale; there is no field-by-field migration.
//!
//! Stored records are decoded leniently (any field may be missing, of the
//! wrong type or out of range) and then reconciled against the canonical
//! 18 pump slots.

use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::{PUMP_COUNT, PumpId};

use super::record::{IngredientLevel, clamp_container, clamp_level, default_levels};

pub const LEVELS_NAMESPACE: &str = "levels";
pub const PAYLOAD_KEY: &str = "cocktail-ingredient-levels";
pub const VERSION_KEY: &str = "cocktail-ingredient-levels-version";
pub const SCHEMA_VERSION: &str = "2.1";

/// A level record as found in storage or an import file.
///
/// Every field goes through a forgiving decoder: a value of the wrong type
/// reads as absent instead of failing the whole array.  Fractional volumes
/// are rounded and `lastUpdated` may be epoch milliseconds or an RFC 3339
/// date string, as older installs wrote it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLevel {
    /// Records without a usable id are dropped during reconciliation.
    #[serde(default, deserialize_with = "lenient_int")]
    pub pump_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ingredient: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ingredient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub current_level: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub container_size: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<u64>,
}

fn rounded(v: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    v.is_finite().then(|| v.round() as i64)
}

fn int_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(rounded)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(rounded),
        _ => None,
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(int_from(&Value::deserialize(d)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let ms = match Value::deserialize(d)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.timestamp_millis())
            .or_else(|| int_from(&Value::String(s))),
        other => int_from(&other),
    };
    Ok(ms.and_then(|v| u64::try_from(v).ok()))
}

impl From<&IngredientLevel> for StoredLevel {
    fn from(l: &IngredientLevel) -> Self {
        Self {
            pump_id: Some(i64::from(l.pump_id)),
            ingredient: Some(l.ingredient.clone()),
            ingredient_id: Some(l.ingredient_id.clone()),
            current_level: Some(i64::from(l.current_level)),
            container_size: Some(i64::from(l.container_size)),
            last_updated: Some(l.last_updated),
        }
    }
}

/// Why a payload could not be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Not JSON, or not an array of level records.
    Malformed,
    /// A well-formed but empty array.
    Empty,
}

/// Decode a level payload.  Anything but a non-empty array of records is
/// rejected.
pub fn decode_payload(bytes: &[u8]) -> Result<Vec<StoredLevel>, PayloadError> {
    let stored: Vec<StoredLevel> =
        serde_json::from_slice(bytes).map_err(|_| PayloadError::Malformed)?;
    if stored.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(stored)
}

/// Map stored records onto the canonical slots `1..=18`.
///
/// The first stored record with a matching id wins and is clamped into the
/// level invariants.  Missing or zero container sizes fall back to
/// `default_container`.  Ids outside the canonical range are dropped.
pub fn reconcile(
    stored: &[StoredLevel],
    default_container: u32,
    now_ms: u64,
) -> [IngredientLevel; PUMP_COUNT] {
    let mut levels = default_levels(default_container, now_ms);
    for slot in &mut levels {
        let Some(found) = stored
            .iter()
            .find(|s| s.pump_id == Some(i64::from(slot.pump_id)))
        else {
            continue;
        };
        merge_into(slot, found, default_container);
    }
    levels
}

fn merge_into(slot: &mut IngredientLevel, stored: &StoredLevel, default_container: u32) {
    let size = match stored.container_size {
        Some(v) if v != 0 => clamp_container(v),
        _ => clamp_container(i64::from(default_container)),
    };
    slot.container_size = size;
    slot.current_level = clamp_level(stored.current_level.unwrap_or(0), size);
    if let Some(id) = &stored.ingredient_id {
        slot.ingredient_id.clone_from(id);
    }
    if let Some(label) = &stored.ingredient {
        slot.ingredient.clone_from(label);
    }
    if let Some(ts) = stored.last_updated {
        slot.last_updated = ts;
    }
}

/// Canonical slot ids, for callers that need to validate a pump id.
pub fn is_canonical(pump_id: PumpId) -> bool {
    (1..=PUMP_COUNT as PumpId).contains(&pump_id)
}
