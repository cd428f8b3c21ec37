//! RPC error types and handling.
//!
//! Every chain operation can fail with an [`RpcError`]; the transient flag
//! separates connectivity problems (retryable by callers) from malformed
//! requests and node-reported errors (not retryable).

use log::error;

/// Represents possible errors that can occur during RPC operations
#[derive(Debug)]
pub enum RpcError {
	/// Errors related to network connectivity issues (transient)
	ConnectionError(String),

	/// Request or response exceeded its deadline (transient)
	TimeoutError(String),

	/// Malformed requests or error objects reported by the node (non-transient)
	RequestError(String),

	/// Responses that could not be decoded into the expected shape (non-transient)
	ParseError(String),
}

impl RpcError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::TimeoutError(msg) => format!("Timeout error: {}", msg),
			Self::RequestError(msg) => format!("Request error: {}", msg),
			Self::ParseError(msg) => format!("Parse error: {}", msg),
		}
	}

	/// Whether the caller may retry the operation
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::ConnectionError(_) | Self::TimeoutError(_))
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new timeout error with logging
	pub fn timeout_error(msg: impl Into<String>) -> Self {
		let error = Self::TimeoutError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new parse error with logging
	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::ParseError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl std::fmt::Display for RpcError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for RpcError {}

impl From<reqwest::Error> for RpcError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			Self::timeout_error(err.to_string())
		} else if err.is_connect() {
			Self::connection_error(err.to_string())
		} else {
			Self::request_error(err.to_string())
		}
	}
}
