//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the level store and the current pump wiring and
//! exposes the dispenser's inventory operations behind a hardware-agnostic
//! API.  All I/O flows through port traits, making the whole service
//! testable with mock adapters.
//!
//! ```text
//!  RecipePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! StoragePort ◀──▶│ LevelStore · Binding · Avail │
//!                 └──────────────────────────────┘
//! ```
//!
//! Venting lives next to the service in
//! [`VentingOrchestrator`](crate::venting::VentingOrchestrator); it only
//! needs [`AppService::pumps`].

use std::path::Path;

use anyhow::Context;
use log::info;

use crate::availability::{self, Availability};
use crate::config::DispenserConfig;
use crate::levels::{LevelMutation, LevelStore};
use crate::model::{PumpConfig, RecipeItem, pump_for};

use super::commands::LevelCommand;
use super::events::AppEvent;
use super::ports::{Clock, EventSink, RecipePort, StoragePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<S: StoragePort, C: Clock> {
    levels: LevelStore<S, C>,
    pumps: Vec<PumpConfig>,
}

impl<S: StoragePort, C: Clock> AppService<S, C> {
    /// Open the level store and start with no pump wiring.
    pub fn open(storage: S, clock: C, config: &DispenserConfig) -> Self {
        Self {
            levels: LevelStore::open(storage, clock, config),
            pumps: Vec::new(),
        }
    }

    // ── Wiring ────────────────────────────────────────────────

    /// Install new pump wiring and rebind level records to it.
    /// Returns how many records changed.
    pub fn apply_pump_config(&mut self, pumps: Vec<PumpConfig>, sink: &mut impl EventSink) -> usize {
        let changed = self.levels.sync_bindings(&pumps);
        self.pumps = pumps;
        if changed > 0 {
            sink.emit(&AppEvent::BindingsChanged { count: changed });
        }
        changed
    }

    pub fn pumps(&self) -> &[PumpConfig] {
        &self.pumps
    }

    pub fn enabled_pumps(&self) -> impl Iterator<Item = &PumpConfig> {
        self.pumps.iter().filter(|p| p.enabled)
    }

    // ── Availability ──────────────────────────────────────────

    pub fn check_recipe(&self, recipe: &[RecipeItem]) -> Availability {
        availability::check(recipe, self.levels.levels(), &self.pumps)
    }

    /// `None` if the catalog does not know the cocktail.
    pub fn check_cocktail(&self, recipes: &impl RecipePort, cocktail_id: &str) -> Option<Availability> {
        let recipe = recipes.recipe(cocktail_id)?;
        Some(self.check_recipe(&recipe))
    }

    // ── Level edits ───────────────────────────────────────────

    /// Deduct a poured recipe from the pumps that served it.
    /// Lines without an enabled pump are skipped.
    pub fn record_dispense(&mut self, recipe: &[RecipeItem]) -> bool {
        let dispensed: Vec<_> = recipe
            .iter()
            .filter(|i| i.is_automatic())
            .filter_map(|i| pump_for(&self.pumps, &i.ingredient_id).map(|p| (p.id, i.amount)))
            .collect();
        if dispensed.is_empty() {
            return false;
        }
        self.levels.consume_many(&dispensed)
    }

    /// Process an external level command.  Returns `false` if the command
    /// named an unknown pump.
    pub fn handle_command(&mut self, cmd: LevelCommand) -> bool {
        match cmd {
            LevelCommand::SetLevel { pump_id, level } => {
                self.levels.update(pump_id, LevelMutation::SetLevel(level))
            }
            LevelCommand::SetContainerSize { pump_id, size } => {
                self.levels.update(pump_id, LevelMutation::SetContainerSize(size))
            }
            LevelCommand::Rename { pump_id, name } => {
                self.levels.update(pump_id, LevelMutation::Rename(name))
            }
            LevelCommand::RecordShot { pump_id, amount } => {
                self.levels.consume_many(&[(pump_id, amount)])
            }
            LevelCommand::RefillAll => {
                self.levels.refill_all();
                true
            }
        }
    }

    // ── Import / export ───────────────────────────────────────

    /// Replace all levels from a JSON file written by
    /// [`export_levels_file`](Self::export_levels_file) or an older install.
    pub fn import_levels_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading levels from {}", path.display()))?;
        self.levels
            .import_json(&text)
            .with_context(|| format!("importing levels from {}", path.display()))?;
        info!("levels imported from {}", path.display());
        Ok(())
    }

    pub fn export_levels_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.levels.export_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("writing levels to {}", path.display()))?;
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────

    /// Drive the debounced write.  Call periodically from the host loop.
    pub fn tick(&mut self) -> bool {
        self.levels.persist_if_due()
    }

    /// Flush pending writes before the process exits.
    pub fn shutdown(&mut self) {
        if self.levels.flush() {
            info!("pending level write flushed on shutdown");
        }
    }

    // ── Access ────────────────────────────────────────────────

    pub fn levels(&self) -> &LevelStore<S, C> {
        &self.levels
    }

    pub fn levels_mut(&mut self) -> &mut LevelStore<S, C> {
        &mut self.levels
    }
}
