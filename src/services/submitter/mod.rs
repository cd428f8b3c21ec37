//! Privileged transaction submission.
//!
//! Builds, signs, submits and confirms the daily distribution call. Includes:
//!
//! - Signing capability provider interface (the core never holds key material)
//! - Outcome classification mapped to per-reason retry policies
//! - Confirmation tracking with a mandatory timeout and reconciliation reads

mod error;
mod service;
mod signer;

pub use error::SubmitterError;
pub use service::TransactionSubmitter;
pub use signer::{
    EnvSignerProvider, LocalSigner, SignerProvider, SigningCapability, TransactionPayload,
};
