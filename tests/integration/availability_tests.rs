//! Readiness checks through the service: wiring, live levels, recipes.

use std::collections::HashMap;
use std::rc::Rc;

use mixbot::adapters::memory::MemoryStorage;
use mixbot::adapters::time::ManualClock;
use mixbot::app::commands::LevelCommand;
use mixbot::app::ports::RecipePort;
use mixbot::app::service::AppService;
use mixbot::availability::StockWarning;
use mixbot::config::DispenserConfig;
use mixbot::model::{PumpConfig, RecipeItem};

use crate::mock_hw::Recorder;

struct Catalog(HashMap<&'static str, Vec<RecipeItem>>);

impl RecipePort for Catalog {
    fn recipe(&self, cocktail_id: &str) -> Option<Vec<RecipeItem>> {
        self.0.get(cocktail_id).cloned()
    }
}

fn service() -> AppService<MemoryStorage, Rc<ManualClock>> {
    let mut svc = AppService::open(
        MemoryStorage::new(),
        Rc::new(ManualClock::new(0)),
        &DispenserConfig::default(),
    );
    svc.apply_pump_config(
        vec![
            PumpConfig::new(1, "rum", true),
            PumpConfig::new(2, "cola", true),
            PumpConfig::new(3, "gin", false),
        ],
        &mut Recorder::new(),
    );
    svc
}

fn cuba_libre() -> Vec<RecipeItem> {
    vec![
        RecipeItem::automatic("rum", 300),
        RecipeItem::automatic("cola", 300),
        RecipeItem::manual("lime", 10),
    ]
}

#[test]
fn full_rig_can_make_the_drink() {
    let svc = service();
    let a = svc.check_recipe(&cuba_libre());
    assert!(a.can_make);
    assert!(a.low_ingredients.is_empty());
    assert!(a.missing_ingredients.is_empty());
    assert_eq!(a.warning(), StockWarning::None);
}

#[test]
fn short_pump_makes_ingredient_missing() {
    let mut svc = service();
    svc.handle_command(LevelCommand::SetLevel { pump_id: 2, level: 250 });
    let a = svc.check_recipe(&cuba_libre());
    assert!(!a.can_make);
    assert_eq!(a.missing_ingredients, vec!["cola".to_string()]);
    assert_eq!(a.warning(), StockWarning::Unavailable);
}

#[test]
fn single_serving_left_is_low() {
    let mut svc = service();
    svc.handle_command(LevelCommand::SetLevel { pump_id: 1, level: 550 });
    let a = svc.check_recipe(&cuba_libre());
    assert!(a.can_make);
    assert_eq!(a.low_ingredients, vec!["rum".to_string()]);
    assert_eq!(a.warning(), StockWarning::Low);
}

#[test]
fn disabled_pump_counts_as_missing() {
    let svc = service();
    let a = svc.check_recipe(&[RecipeItem::automatic("gin", 10)]);
    assert_eq!(a.missing_ingredients, vec!["gin".to_string()]);
}

#[test]
fn dispensing_drains_levels_until_unavailable() {
    let mut svc = service();
    let recipe = cuba_libre();

    assert!(svc.record_dispense(&recipe));
    assert!(svc.record_dispense(&recipe));
    assert_eq!(svc.levels().level(1).unwrap().current_level, 400);
    assert_eq!(svc.check_recipe(&recipe).warning(), StockWarning::Low);

    assert!(svc.record_dispense(&recipe));
    assert_eq!(svc.check_recipe(&recipe).warning(), StockWarning::Unavailable);

    // Manual lime never touched a pump.
    assert!(svc.levels().levels()[2..].iter().all(|l| l.current_level == 1000));
}

#[test]
fn catalog_lookup() {
    let svc = service();
    let catalog = Catalog(HashMap::from([("cuba-libre", cuba_libre())]));
    assert!(svc.check_cocktail(&catalog, "cuba-libre").unwrap().can_make);
    assert!(svc.check_cocktail(&catalog, "mojito").is_none());
}
