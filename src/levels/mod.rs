//! Ingredient level inventory.
//!
//! - [`record`] — the per-pump record and its volume bounds
//! - [`schema`] — persisted envelope, version gate, reconciliation
//! - [`store`]  — cached store with debounced persistence
//!
//! [`persist_task`] is the async driver that turns the store's pending
//! write deadline into an actual timer on the cooperative executor.

pub mod record;
pub mod schema;
pub mod store;

pub use record::{IngredientLevel, LevelMutation};
pub use store::{LevelStore, SubscriptionId};

use core::cell::RefCell;
use core::convert::Infallible;
use core::time::Duration;

use crate::app::ports::{Clock, StoragePort};

/// Keep the store's durable copy in step with its cache.
///
/// Sleeps until the pending write is due (or `idle_poll` when nothing is
/// pending) and commits it.  Never returns; race it against the session
/// future and call [`LevelStore::flush`] afterwards, as
/// [`runtime::run_session`](crate::runtime::run_session) does.
///
/// The `RefCell` borrow is released before every `.await`.
pub async fn persist_task<S: StoragePort, C: Clock>(
    store: &RefCell<LevelStore<S, C>>,
    idle_poll: Duration,
) -> Infallible {
    loop {
        let wait = {
            let mut s = store.borrow_mut();
            s.persist_if_due();
            s.ms_until_due().map_or(idle_poll, Duration::from_millis)
        };
        async_io_mini::Timer::after(wait).await;
    }
}
