//! Gateway-level error types shared across the request path, transports, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// Expired access tokens never surface here: they are absorbed by the refresh
/// path. [`Error::Auth`] marks the terminal case where the refresh token
/// itself was rejected (or the refresh call failed) and the stored credentials
/// have been cleared; callers should route the user back to a login screen.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure on an ordinary call; passed through without retries.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Terminal authentication failure; stored credentials have been cleared.
	#[error("Authentication failed: {reason}.")]
	Auth {
		/// Human-readable failure summary.
		reason: String,
		/// Underlying transport or decode failure, when one exists.
		#[source]
		source: Option<BoxError>,
	},
}
impl Error {
	/// Returns `true` for terminal authentication failures that require the
	/// user to re-authenticate.
	pub fn is_auth(&self) -> bool {
		matches!(self, Self::Auth { .. })
	}

	pub(crate) fn auth(reason: impl Into<String>) -> Self {
		Self::Auth { reason: reason.into(), source: None }
	}

	pub(crate) fn auth_with_source(
		reason: impl Into<String>,
		source: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Auth { reason: reason.into(), source: Some(Box::new(source)) }
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A request path could not be joined onto the gateway's base URL.
	#[error("Request path `{path}` is not a valid endpoint.")]
	InvalidEndpoint {
		/// Caller-supplied path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	SerializeBody(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
	/// The request exceeded its configured deadline.
	#[error("Request timed out.")]
	Timeout,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
