//! Browser Pool: a three-tier (permanent/hot/cold) cache of engine
//! adapters keyed by config signature, with an adaptive janitor that
//! reads container memory pressure to pick its sweep cadence.
//!
//! Grounded on `riptide-pool/src/pool.rs` for per-key creation locking
//! and eviction-sweep mechanics, and `riptide-core/src/memory_manager.rs`
//! for the available/in-use split and atomic-counter style.

mod janitor;
mod memory;
mod pool;

pub use janitor::{thresholds_for, JanitorThresholds};
pub use memory::memory_pressure_percent;
pub use pool::Pool;
