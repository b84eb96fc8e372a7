//! Level store — cached, bounded, debounced.
//!
//! [`LevelStore`] owns the 18 [`IngredientLevel`] records.  Reads come from
//! the in-process cache; writes update the cache synchronously and arm a
//! pending durable write that is pushed out by every further mutation.
//!
//! ```text
//!  update() ──▶ cache ──▶ PendingWrite{deadline} ──▶ persist_if_due() ──▶ StoragePort
//!                                                             │
//!                                                             └──▶ subscribers
//! ```

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, StorageError, StoragePort};
use crate::binding;
use crate::config::DispenserConfig;
use crate::error::LevelsError;
use crate::model::{PUMP_COUNT, PumpConfig, PumpId};

use super::record::{IngredientLevel, LevelMutation, default_levels};
use super::schema::{
    self, LEVELS_NAMESPACE, PAYLOAD_KEY, PayloadError, SCHEMA_VERSION, StoredLevel, VERSION_KEY,
};

/// Handle returned by [`LevelStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// A scheduled durable write.  Replaced, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWrite {
    deadline_ms: u64,
}

/// Exclusive owner of the per-pump level records.
pub struct LevelStore<S: StoragePort, C: Clock> {
    storage: S,
    clock: C,
    levels: [IngredientLevel; PUMP_COUNT],
    pending: Option<PendingWrite>,
    debounce_ms: u64,
    default_container: u32,
    subscribers: Vec<(SubscriptionId, Box<dyn EventSink>)>,
    next_subscription: u32,
    writes: u64,
}

impl<S: StoragePort, C: Clock> LevelStore<S, C> {
    /// Open the store and perform the initial load.
    ///
    /// Absent, corrupt or version-mismatched data is discarded and replaced
    /// by 18 defaults, which are written back immediately.
    pub fn open(storage: S, clock: C, config: &DispenserConfig) -> Self {
        let now = clock.now_ms();
        let mut store = Self {
            storage,
            clock,
            levels: default_levels(config.default_container_ml, now),
            pending: None,
            debounce_ms: u64::from(config.debounce_ms),
            default_container: config.default_container_ml,
            subscribers: Vec::new(),
            next_subscription: 0,
            writes: 0,
        };
        store.load();
        store
    }

    // ── Reads ─────────────────────────────────────────────────

    /// Current snapshot of all 18 records.
    pub fn levels(&self) -> &[IngredientLevel; PUMP_COUNT] {
        &self.levels
    }

    /// Record for a single pump.
    pub fn level(&self, pump_id: PumpId) -> Option<&IngredientLevel> {
        self.levels.iter().find(|l| l.pump_id == pump_id)
    }

    /// Serialize the snapshot in the persisted format.
    pub fn export_json(&self) -> Result<String, LevelsError> {
        serde_json::to_string(&self.levels).map_err(|_| LevelsError::Encode)
    }

    // ── Mutations ─────────────────────────────────────────────

    /// Apply `mutation` to the record of `pump_id`.
    ///
    /// Returns `false` (and changes nothing) if no such pump exists.
    pub fn update(&mut self, pump_id: PumpId, mutation: LevelMutation) -> bool {
        if !schema::is_canonical(pump_id) {
            debug!("levels: update for unknown pump {} ignored", pump_id);
            return false;
        }
        let now = self.clock.now_ms();
        let Some(level) = self.levels.iter_mut().find(|l| l.pump_id == pump_id) else {
            return false;
        };
        level.apply(mutation, now);
        debug!(
            "levels: P{} now {}/{}",
            pump_id, level.current_level, level.container_size
        );
        self.schedule_persist();
        true
    }

    /// Deduct dispensed amounts after a cocktail or shot.
    ///
    /// Schedules one write if at least one pump matched.
    pub fn consume_many(&mut self, dispensed: &[(PumpId, u32)]) -> bool {
        let now = self.clock.now_ms();
        let mut touched = false;
        for &(pump_id, amount) in dispensed {
            if let Some(level) = self.levels.iter_mut().find(|l| l.pump_id == pump_id) {
                let before = level.current_level;
                level.apply(LevelMutation::Consume(amount), now);
                info!("levels: P{} {} -> {}", pump_id, before, level.current_level);
                touched = true;
            }
        }
        if touched {
            self.schedule_persist();
        }
        touched
    }

    /// Fill every container back up.
    pub fn reset_all(&mut self) {
        let now = self.clock.now_ms();
        for level in &mut self.levels {
            level.refill(now);
        }
        info!("levels: all pumps reset to full");
        self.schedule_persist();
    }

    /// Alias kept for the refill button of the UI.
    pub fn refill_all(&mut self) {
        self.reset_all();
    }

    /// Replace the whole set from an external source.
    ///
    /// The input is reconciled onto the 18 canonical slots like a stored
    /// payload.  Unlike routine updates the durable write happens right away
    /// and its failure is returned.
    pub fn set_all(&mut self, levels: &[IngredientLevel]) -> Result<(), LevelsError> {
        if levels.is_empty() {
            error!("levels: refusing to import an empty level set");
            return Err(LevelsError::ValidationRejected("level set is empty"));
        }
        let stored: Vec<StoredLevel> = levels.iter().map(StoredLevel::from).collect();
        self.replace_from(&stored)
    }

    /// Parse an externally supplied JSON payload and [`set_all`](Self::set_all) it.
    pub fn import_json(&mut self, text: &str) -> Result<(), LevelsError> {
        let stored = schema::decode_payload(text.as_bytes()).map_err(|e| match e {
            PayloadError::Malformed => {
                LevelsError::ValidationRejected("payload is not an array of level records")
            }
            PayloadError::Empty => LevelsError::ValidationRejected("level set is empty"),
        })?;
        self.replace_from(&stored)
    }

    /// Rebind records to the current pump wiring.
    ///
    /// Returns the number of records that changed; schedules one write only
    /// if that number is non-zero.
    pub fn sync_bindings(&mut self, pumps: &[PumpConfig]) -> usize {
        let now = self.clock.now_ms();
        let changed = binding::sync_bindings(pumps, &mut self.levels, now);
        if changed > 0 {
            info!("levels: {} pump binding(s) changed", changed);
            self.schedule_persist();
        }
        changed
    }

    // ── Persistence ───────────────────────────────────────────

    /// Write the pending state if its coalescing window has expired.
    /// Returns `true` if a write was committed.
    pub fn persist_if_due(&mut self) -> bool {
        match self.pending {
            Some(p) if self.clock.now_ms() >= p.deadline_ms => self.commit_pending(),
            _ => false,
        }
    }

    /// Force any pending write out now.  Call before shutdown.
    pub fn flush(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.commit_pending()
    }

    /// Whether a durable write is still scheduled.
    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the scheduled write, if any.
    pub fn pending_deadline_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.deadline_ms)
    }

    /// Time left in the current coalescing window, if a write is pending.
    pub fn ms_until_due(&self) -> Option<u64> {
        self.pending
            .map(|p| p.deadline_ms.saturating_sub(self.clock.now_ms()))
    }

    /// Number of durable writes committed since open.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Drop the cache and load again from storage.  Pending writes are
    /// flushed first so nothing is lost.
    pub fn reload(&mut self) {
        self.flush();
        self.load();
    }

    // ── Notifications ─────────────────────────────────────────

    /// Register a sink that is told about every committed write.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push((id, sink));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── Internal ──────────────────────────────────────────────

    fn load(&mut self) {
        let now = self.clock.now_ms();
        match self.read_stored() {
            Ok(stored) => {
                self.levels = schema::reconcile(&stored, self.default_container, now);
                info!(
                    "levels: loaded {}",
                    self.levels
                        .iter()
                        .map(|l| format!("P{}:{}", l.pump_id, l.current_level))
                        .collect::<Vec<_>>()
                        .join(" ")
                );
            }
            Err(reason) => {
                warn!("levels: {}, initialising defaults", reason);
                for key in [PAYLOAD_KEY, VERSION_KEY] {
                    if let Err(e) = self.storage.delete(LEVELS_NAMESPACE, key) {
                        warn!("levels: could not delete stale {}: {}", key, e);
                    }
                }
                self.levels = default_levels(self.default_container, now);
                if let Err(e) = self.write_through() {
                    error!("levels: failed to save defaults: {}", e);
                }
            }
        }
    }

    fn read_stored(&self) -> Result<Vec<StoredLevel>, &'static str> {
        let version = match self.storage.read(LEVELS_NAMESPACE, VERSION_KEY) {
            Ok(v) => v,
            Err(StorageError::NotFound) => return Err("no stored levels"),
            Err(_) => return Err("version tag unreadable"),
        };
        if version != SCHEMA_VERSION.as_bytes() {
            return Err("schema version mismatch");
        }
        let payload = match self.storage.read(LEVELS_NAMESPACE, PAYLOAD_KEY) {
            Ok(p) => p,
            Err(StorageError::NotFound) => return Err("no stored levels"),
            Err(_) => return Err("payload unreadable"),
        };
        schema::decode_payload(&payload).map_err(|e| match e {
            PayloadError::Malformed => "stored levels corrupt",
            PayloadError::Empty => "stored levels empty",
        })
    }

    fn replace_from(&mut self, stored: &[StoredLevel]) -> Result<(), LevelsError> {
        let now = self.clock.now_ms();
        let incoming = schema::reconcile(stored, self.default_container, now);
        let previous = core::mem::replace(&mut self.levels, incoming);
        if let Err(e) = self.write_through() {
            error!("levels: external replace not stored, keeping previous levels: {}", e);
            self.levels = previous;
            // The payload may have landed before the failure; rewrite ours.
            self.schedule_persist();
            return Err(e);
        }
        info!("levels: replaced from external source ({} records)", stored.len());
        self.pending = None;
        Ok(())
    }

    fn schedule_persist(&mut self) {
        let deadline_ms = self.clock.now_ms() + self.debounce_ms;
        if self.pending.replace(PendingWrite { deadline_ms }).is_some() {
            debug!("levels: pending write pushed back to {}", deadline_ms);
        }
    }

    fn commit_pending(&mut self) -> bool {
        self.pending = None;
        match self.write_through() {
            Ok(()) => true,
            Err(e) => {
                error!("levels: durable write failed: {}", e);
                false
            }
        }
    }

    /// Payload first, then the version tag.  Subscribers hear about it only
    /// once both landed.
    fn write_through(&mut self) -> Result<(), LevelsError> {
        let payload = serde_json::to_vec(&self.levels).map_err(|_| LevelsError::Encode)?;
        self.storage
            .write(LEVELS_NAMESPACE, PAYLOAD_KEY, &payload)?;
        self.storage
            .write(LEVELS_NAMESPACE, VERSION_KEY, SCHEMA_VERSION.as_bytes())?;
        self.writes += 1;
        self.notify(&AppEvent::LevelsPersisted);
        Ok(())
    }

    fn notify(&mut self, event: &AppEvent) {
        for (_, sink) in &mut self.subscribers {
            sink.emit(event);
        }
    }
}

impl<S: StoragePort, C: Clock> Drop for LevelStore<S, C> {
    fn drop(&mut self) {
        self.flush();
    }
}
