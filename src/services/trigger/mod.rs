//! Manual trigger surface.
//!
//! HTTP endpoints for operator-initiated distribution runs and liveness
//! checks. The caller supplies the signing key per request; the agent uses it
//! for the one submission and never persists it.

mod server;

pub use server::{create_trigger_server, DistroRunner, DistroTrigger, TriggerRequest};
