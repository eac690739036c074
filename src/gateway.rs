//! The authenticated request gateway and its refresh orchestration.

pub mod metrics;

mod refresh;
mod request;
#[cfg(test)] pub(crate) mod testing;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::GatewayHttpClient,
	store::{CredentialVault, KeyValueStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestGatewayClient;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestGatewayClient>;

/// Authenticated request gateway for a single backend and credential pair.
///
/// The gateway attaches the stored access token to every outbound call,
/// recovers from expired-token responses by refreshing the pair exactly once
/// per expiry event no matter how many callers observed it, and retries each
/// original call once with the rotated token. Every other response status
/// passes through untouched; interpreting business-level errors belongs to
/// the caller.
///
/// Per credential lifetime the gateway moves through
/// `VALID -> (401) -> REFRESHING -> VALID` on a successful rotation, or
/// `REFRESHING -> LOGGED_OUT` when the refresh token itself is rejected.
/// `REFRESHING` is shared across callers, never per-caller.
#[derive(Clone)]
pub struct Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Typed credential store facade holding the access/refresh pair.
	pub vault: CredentialVault,
	/// Base URL all request paths are joined onto.
	pub base_url: Url,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_path: String,
	refresh_timeout: Option<Duration>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Default endpoint the refresh call is posted to.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/api/admin/auth/refresh";
	/// Default deadline applied to the refresh call.
	pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn KeyValueStore>,
		base_url: Url,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			vault: CredentialVault::new(store),
			base_url,
			refresh_metrics: Default::default(),
			refresh_path: Self::DEFAULT_REFRESH_PATH.into(),
			refresh_timeout: Some(Self::DEFAULT_REFRESH_TIMEOUT),
			refresh_guard: Default::default(),
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the deadline applied to refresh calls.
	///
	/// `None` disables the deadline, leaving a hung refresh endpoint free to
	/// block every queued caller indefinitely.
	pub fn with_refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
		self.base_url.join(path).map_err(|source| {
			ConfigError::InvalidEndpoint { path: path.to_owned(), source }.into()
		})
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestGatewayClient> {
	/// Creates a gateway with its own default reqwest transport.
	///
	/// Use [`Gateway::with_refresh_path`] and [`Gateway::with_refresh_timeout`]
	/// to adjust the refresh endpoint afterwards.
	pub fn new(store: Arc<dyn KeyValueStore>, base_url: Url) -> Self {
		Self::with_http_client(store, base_url, ReqwestGatewayClient::default())
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.base_url.as_str())
			.field("refresh_path", &self.refresh_path)
			.field("refresh_timeout", &self.refresh_timeout)
			.finish()
	}
}
