//! Daily distribution agent for a DEX-style contract.
//!
//! This library drives two tightly coupled subsystems against a single
//! EVM-compatible network endpoint:
//!
//! - A scheduled trigger that fires the contract's `distro()` call exactly
//!   once per UTC day, with confirmation tracking and retry classification.
//! - An event ingestion pipeline that reconciles live log subscriptions with
//!   historical backfill queries for the contract's swap and liquidity events.
//!
//! # Modules
//! - `models`: Domain models (event records, cursors, transaction lifecycle, config)
//! - `services`: Chain client, scheduler, transaction submitter, ingestion, trigger surface
//! - `bootstrap`: Service wiring and shutdown handling
//! - `utils`: Logging and retry helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
