//! Trigger server module
//!
//! This module provides an HTTP server exposing the manual distribution
//! trigger and a health probe.

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use alloy::primitives::B256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use zeroize::Zeroizing;

use crate::services::submitter::{
	LocalSigner, SigningCapability, SubmitterError, TransactionSubmitter,
};

pub type DistroTriggerData = web::Data<Arc<dyn DistroTrigger>>;

/// Capability to run one distribution submission with a caller-supplied signer
#[async_trait]
pub trait DistroTrigger: Send + Sync {
	async fn trigger(&self, signer: Arc<dyn SigningCapability>) -> Result<B256, SubmitterError>;
}

/// Production trigger backed by the transaction submitter
pub struct DistroRunner {
	submitter: Arc<TransactionSubmitter>,
}

impl DistroRunner {
	pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
		Self { submitter }
	}
}

#[async_trait]
impl DistroTrigger for DistroRunner {
	async fn trigger(&self, signer: Arc<dyn SigningCapability>) -> Result<B256, SubmitterError> {
		self.submitter.submit_distro(signer.as_ref()).await
	}
}

#[derive(Deserialize)]
pub struct TriggerRequest {
	pub private_key: String,
}

/// Manual trigger handler
///
/// The key lives only for the duration of the request and is zeroized when
/// the handler returns.
async fn trigger_handler(
	trigger: DistroTriggerData,
	body: web::Json<TriggerRequest>,
) -> impl Responder {
	let key = Zeroizing::new(body.into_inner().private_key);

	let signer: Arc<dyn SigningCapability> = match LocalSigner::from_hex_key(&key) {
		Ok(signer) => Arc::new(signer),
		Err(e) => {
			return HttpResponse::BadRequest().json(json!({
				"status": "rejected",
				"error": e.to_string(),
			}));
		}
	};

	info!("Manual distribution trigger received");
	match trigger.trigger(signer).await {
		Ok(hash) => HttpResponse::Ok().json(json!({
			"status": "confirmed",
			"transaction_hash": format!("{:#x}", hash),
		})),
		Err(e) => {
			error!("Manual distribution trigger failed: {}", e);
			let mut response = match e {
				SubmitterError::NetworkUnavailable(_) => HttpResponse::ServiceUnavailable(),
				SubmitterError::Timeout(_) => HttpResponse::GatewayTimeout(),
				SubmitterError::SignerError(_) => HttpResponse::BadRequest(),
				_ => HttpResponse::InternalServerError(),
			};
			response.json(json!({
				"status": "failed",
				"error": e.to_string(),
			}))
		}
	}
}

/// Health probe handler
async fn health_handler() -> impl Responder {
	HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Create trigger server
pub fn create_trigger_server(
	bind_address: String,
	trigger: Arc<dyn DistroTrigger>,
) -> std::io::Result<actix_web::dev::Server> {
	info!("Starting trigger server on {}", bind_address);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.app_data(web::Data::new(trigger.clone()))
			.route("/trigger", web::post().to(trigger_handler))
			.route("/health", web::get().to(health_handler))
	})
	.workers(2)
	.bind(bind_address)?
	.shutdown_timeout(5)
	.run())
}
