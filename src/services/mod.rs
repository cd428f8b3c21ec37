//! Core service implementations for the distribution agent.
//!
//! Contains the main service modules:
//!
//! - `blockchain`: JSON-RPC chain client and transports
//! - `ingest`: Event normalization, live listening and backfill
//! - `scheduler`: Daily UTC-midnight trigger scheduling
//! - `submitter`: Privileged transaction build/sign/submit/confirm
//! - `trigger`: Remote trigger and health HTTP surface

pub mod blockchain;
pub mod ingest;
pub mod scheduler;
pub mod submitter;
pub mod trigger;
