//! Queue worker: claims pipeline tasks and drives them to a terminal state.
//!
//! The worker is the only process that executes generation and revision
//! runs. It polls the `tasks` table with `FOR UPDATE SKIP LOCKED` claims,
//! bounds every run with a wall-clock budget, and owns retry scheduling,
//! outcome events, and the terminal failure callback.

pub mod config;
pub mod runner;

pub use config::WorkerConfig;
pub use runner::TaskRunner;
