//! The request path: bearer attachment, 401 detection, and retry-once recovery.

// self
use crate::{
	_prelude::*,
	credentials::TokenSecret,
	gateway::Gateway,
	http::{GatewayHttpClient, GatewayRequest, GatewayResponse, RequestOptions},
	obs::{self, GatewaySpan, OpKind, OpOutcome},
};

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Performs an authenticated request against `path`, joined onto the base URL.
	///
	/// Expired-token responses are absorbed: the gateway rotates the
	/// credential pair (coalescing concurrent callers into one refresh call)
	/// and retries the original call exactly once with the new token. The
	/// retried outcome is returned as-is, so a second 401 surfaces to the
	/// caller instead of looping. Every other status, success or not, passes
	/// through unchanged.
	pub async fn request(&self, path: &str, options: RequestOptions) -> Result<GatewayResponse> {
		const KIND: OpKind = OpKind::Request;

		let span = GatewaySpan::new(KIND, "request");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let observed = self.vault.access_token().await?;
				let response = self.send(path, &options, observed.as_ref()).await?;

				if !response.is_unauthorized() {
					return Ok(response);
				}

				let rotated = self.refresh_access_token(observed.as_ref()).await?;

				self.send(path, &options, Some(&rotated)).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn send(
		&self,
		path: &str,
		options: &RequestOptions,
		token: Option<&TokenSecret>,
	) -> Result<GatewayResponse> {
		let url = self.endpoint(path)?;
		let mut request = GatewayRequest::from_options(url, options);

		if let Some(token) = token {
			request = request.with_bearer(token);
		}

		Ok(self.http_client.execute(request).await?)
	}
}
