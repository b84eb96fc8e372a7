//! Host runtime — one cooperative executor for the whole core.
//!
//! The level writer and the caller's session future share a single
//! `edge-executor` context, with `async-io-mini` timers driving the
//! debounce deadlines.  Tasks spawned on the executor beforehand (manual vents,
//! an automatic run) are driven alongside them.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                │
//!  │  ┌──────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                    │  │
//!  │  │  ┌──────────────┐   ┌─────────────────────────┐  │  │
//!  │  │  │ persist_task │ ∥ │ session (+ its spawns)  │  │  │
//!  │  │  └──────────────┘   └─────────────────────────┘  │  │
//!  │  └──────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────┘
//! ```

use core::cell::RefCell;
use core::future::Future;
use core::time::Duration;

use edge_executor::LocalExecutor;
use futures_lite::future::{block_on, or};
use log::info;

use crate::app::ports::{Clock, StoragePort};
use crate::levels::{LevelStore, persist_task};

/// How often the writer looks for work when nothing is pending.
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Drive `session` to completion on `executor` with the level writer
/// running beside it.  Whatever is still pending when the session ends is
/// flushed before returning.
pub fn run_session<'a, const N: usize, S, C, F>(
    executor: &LocalExecutor<'a, N>,
    levels: &'a RefCell<LevelStore<S, C>>,
    idle_poll: Duration,
    session: F,
) -> F::Output
where
    S: StoragePort + 'a,
    C: Clock + 'a,
    F: Future + 'a,
    F::Output: 'a,
{
    let background = writer(levels, idle_poll);
    info!("runtime: session started (writer idle poll {:?})", idle_poll);

    let out = block_on(executor.run(or(session, background)));

    if levels.borrow_mut().flush() {
        info!("runtime: pending level write flushed at session end");
    }
    out
}

/// The never-ending writer, typed to match whatever the session yields.
async fn writer<S: StoragePort, C: Clock, T>(levels: &RefCell<LevelStore<S, C>>, idle_poll: Duration) -> T {
    match persist_task(levels, idle_poll).await {}
}
