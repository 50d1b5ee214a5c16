//! Background bookkeeping for Warden.
//!
//! Work that must never delay or fail a login is submitted to a
//! [`BackgroundExecutor`]; a [`WorkerRunner`] drains the queue and runs each
//! task on its own tokio task, logging failures.

pub mod executor;
pub mod runner;
pub mod tasks;

pub use executor::{BackgroundExecutor, BackgroundTask};
pub use runner::WorkerRunner;
pub use tasks::RecordAdminCheck;
