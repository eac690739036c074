//! Transport primitives for gateway requests.
//!
//! [`GatewayHttpClient`] is the crate's only dependency on an HTTP stack.
//! Implementations execute a fully resolved [`GatewayRequest`] and map their
//! native failures into [`TransportError`] themselves, surfacing deadline
//! overruns as [`TransportError::Timeout`] so refresh deadlines stay
//! observable to the gateway.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, credentials::TokenSecret, error::TransportError};

/// Boxed future returned by [`GatewayHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing gateway requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// behind `Arc` across gateway clones, and the returned futures must be `Send`
/// so request-path futures hop executors freely.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes the request, honoring its per-request timeout when set.
	fn execute(&self, request: GatewayRequest) -> TransportFuture<'_>;
}

/// HTTP methods the gateway can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP PATCH.
	Patch,
	/// HTTP DELETE.
	Delete,
}
impl Method {
	/// Returns the canonical uppercase method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-supplied request parameters for [`Gateway::request`](crate::gateway::Gateway::request).
///
/// Method, body, and extra headers are unconstrained beyond being well-formed
/// HTTP request parameters; the gateway merges in the Authorization header
/// itself.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// HTTP method for the call.
	pub method: Method,
	/// Extra headers merged into the request.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Optional per-request deadline.
	pub timeout: Option<Duration>,
}
impl RequestOptions {
	/// Creates empty options for the provided method.
	pub fn new(method: Method) -> Self {
		Self { method, headers: Vec::new(), body: None, timeout: None }
	}

	/// Shorthand for a body-less GET.
	pub fn get() -> Self {
		Self::new(Method::Get)
	}

	/// Shorthand for a body-less DELETE.
	pub fn delete() -> Self {
		Self::new(Method::Delete)
	}

	/// Shorthand for a POST carrying a JSON payload.
	pub fn post_json<T>(payload: &T) -> Result<Self, crate::error::ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Self::new(Method::Post).with_json_body(payload)
	}

	/// Shorthand for a PUT carrying a JSON payload.
	pub fn put_json<T>(payload: &T) -> Result<Self, crate::error::ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Self::new(Method::Put).with_json_body(payload)
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets a raw request body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `payload` as the JSON request body and stamps the content type.
	pub fn with_json_body<T>(mut self, payload: &T) -> Result<Self, crate::error::ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(payload)?);

		Ok(self.with_header("content-type", "application/json"))
	}

	/// Sets a per-request deadline.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Fully resolved outbound request handed to the transport.
#[derive(Clone)]
pub struct GatewayRequest {
	/// HTTP method for the call.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Headers to send, including any Authorization header the gateway merged in.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Optional deadline the transport must enforce.
	pub timeout: Option<Duration>,
}
impl GatewayRequest {
	/// Creates a header-less request for the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None, timeout: None }
	}

	/// Resolves caller options against a concrete URL.
	pub fn from_options(url: Url, options: &RequestOptions) -> Self {
		Self {
			method: options.method,
			url,
			headers: options.headers.clone(),
			body: options.body.clone(),
			timeout: options.timeout,
		}
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the deadline the transport must enforce.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Merges a bearer Authorization header for the provided token.
	pub fn with_bearer(self, token: &TokenSecret) -> Self {
		self.with_header("authorization", format!("Bearer {}", token.expose()))
	}

	/// Returns the first header matching `name`, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for GatewayRequest {
	// The Authorization header carries the bearer token; log header names only.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewayRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &self.headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>())
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Response surfaced by the transport and passed through to gateway callers.
#[derive(Clone, Debug)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: Vec<(String, String)>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl GatewayResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for the expired-token status the gateway recovers from.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Returns the first header matching `name`, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Decodes the body as JSON with path-annotated diagnostics.
	pub fn json<T>(&self) -> Result<T, ResponseParseError>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ResponseParseError { source, status: self.status })
	}
}

/// Path-annotated JSON decode failure for a response body.
#[derive(Debug, ThisError)]
#[error("Response body is not valid JSON for the expected shape.")]
pub struct ResponseParseError {
	/// Structured parsing failure.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status of the response being decoded.
	pub status: u16,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Per-request deadlines from [`GatewayRequest::timeout`] map onto reqwest's
/// request timeout; anything the client cannot express (negative durations)
/// is ignored rather than rejected.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestGatewayClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestGatewayClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestGatewayClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestGatewayClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestGatewayClient {
	fn execute(&self, request: GatewayRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method.into(), request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}
			let timeout =
				request.timeout.and_then(|timeout| std::time::Duration::try_from(timeout).ok());

			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(GatewayResponse { status, headers, body })
		})
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}
