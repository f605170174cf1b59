// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod reports;
pub mod scheduling;
pub mod store;
pub mod time;
pub mod utils;

pub use error::{EngineError, EngineResult, StoreError, StoreResult};
pub use ledger::Ledger;
pub use scheduling::Scheduler;
pub use store::{AppointmentFilter, EntityStore, SqliteStore};
