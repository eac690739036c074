//! Single-flight refresh orchestration.
//!
//! At most one refresh call is in flight per gateway at any time. A caller
//! that observes a 401 while another refresh is running suspends on the guard
//! and, once inside, re-reads the stored pair: a rotated token is reused
//! as-is, and a cleared store means the shared refresh already failed, so the
//! same terminal outcome is surfaced without a second endpoint call or a
//! second wipe. In a multi-threaded executor the guard is what makes the
//! check-then-refresh sequence atomic; no bare flag is relied upon.

// self
use crate::{
	_prelude::*,
	credentials::{CredentialPair, RefreshRequest, RefreshResponse, TokenSecret},
	error::ConfigError,
	gateway::Gateway,
	http::{GatewayHttpClient, GatewayRequest, Method},
	obs::{self, GatewaySpan, OpKind, OpOutcome},
};

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Rotates the credential pair, coalescing concurrent callers into a
	/// single refresh-endpoint call.
	///
	/// `observed` is the access token the caller attached when the backend
	/// answered 401 (`None` when no token was stored). It anchors the
	/// post-guard recheck that decides between reusing a concurrent rotation
	/// and performing one. Any failure past that point is terminal: the
	/// stored pair is cleared and [`Error::Auth`] is returned.
	pub async fn refresh_access_token(
		&self,
		observed: Option<&TokenSecret>,
	) -> Result<TokenSecret> {
		const KIND: OpKind = OpKind::Refresh;

		let span = GatewaySpan::new(KIND, "refresh_access_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.refresh_metrics.record_attempt();

				let _singleflight = self.refresh_guard.lock().await;
				let current = self.vault.access_token().await.map_err(|err| {
					self.refresh_metrics.record_failure();

					Error::from(err)
				})?;

				match (observed, current) {
					// Another caller rotated the pair while this one waited.
					(Some(seen), Some(current)) if seen.expose() != current.expose() => {
						self.refresh_metrics.record_coalesced();
						self.refresh_metrics.record_success();

						return Ok(current);
					},
					// The caller had no token; a login or rotation landed meanwhile.
					(None, Some(current)) => {
						self.refresh_metrics.record_coalesced();
						self.refresh_metrics.record_success();

						return Ok(current);
					},
					// The shared refresh already failed and wiped the store.
					(Some(_), None) => {
						self.refresh_metrics.record_failure();

						return Err(Error::auth(
							"a concurrent refresh failed and the session was cleared",
						));
					},
					_ => {},
				}

				let refresh_token = self.vault.refresh_token().await.map_err(|err| {
					self.refresh_metrics.record_failure();

					Error::from(err)
				})?;
				let refresh_token = match refresh_token {
					Some(secret) => secret,
					None => {
						let _ = self.vault.clear().await;

						self.refresh_metrics.record_failure();

						return Err(Error::auth("no refresh token is stored"));
					},
				};

				match self.call_refresh_endpoint(&refresh_token).await {
					Ok(pair) => {
						self.vault.save(&pair).await.map_err(|err| {
							self.refresh_metrics.record_failure();

							Error::from(err)
						})?;
						self.refresh_metrics.record_success();

						Ok(pair.access)
					},
					Err(err) => {
						// Wiped exactly once: waiters observe the empty store
						// instead of clearing again.
						let _ = self.vault.clear().await;

						self.refresh_metrics.record_failure();

						Err(err)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn call_refresh_endpoint(&self, refresh_token: &TokenSecret) -> Result<CredentialPair> {
		let url = self.endpoint(&self.refresh_path)?;
		let body = serde_json::to_vec(&RefreshRequest { refresh_token: refresh_token.expose() })
			.map_err(ConfigError::SerializeBody)?;
		let mut request = GatewayRequest::new(Method::Post, url)
			.with_header("content-type", "application/json")
			.with_body(body);

		if let Some(timeout) = self.refresh_timeout {
			request = request.with_timeout(timeout);
		}

		let response = self.http_client.execute(request).await.map_err(|err| {
			Error::auth_with_source("the refresh call could not be completed", err)
		})?;

		if !response.is_success() {
			return Err(Error::auth(format!(
				"the refresh endpoint rejected the stored refresh token with status {}",
				response.status,
			)));
		}

		let rotated: RefreshResponse = response.json().map_err(|err| {
			Error::auth_with_source("the refresh endpoint returned a malformed token payload", err)
		})?;

		Ok(rotated.into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		gateway::testing::{self, ScriptedClient},
		store::{CredentialVault, KeyValueStore, MemoryStore},
	};

	const REFRESH_PATH: &str = "/api/admin/auth/refresh";

	fn build_gateway() -> (Gateway<ScriptedClient>, Arc<ScriptedClient>, Arc<MemoryStore>) {
		let client = Arc::new(ScriptedClient::new(REFRESH_PATH));
		let store = Arc::new(MemoryStore::default());
		let gateway = Gateway::with_http_client(
			store.clone(),
			testing::url("http://backend.local/"),
			client.clone(),
		);

		(gateway, client, store)
	}

	#[tokio::test]
	async fn waiter_reuses_a_concurrent_rotation() {
		let (gateway, client, _) = build_gateway();

		gateway
			.vault
			.save(&CredentialPair::new("T2", "R2"))
			.await
			.expect("Seeding the vault should succeed.");

		// The caller observed T1 before the store rotated to T2.
		let stale = TokenSecret::new("T1");
		let token = gateway
			.refresh_access_token(Some(&stale))
			.await
			.expect("A rotated store should satisfy the waiter without a refresh call.");

		assert_eq!(token.expose(), "T2");
		assert!(client.recorded().is_empty());
		assert_eq!(gateway.refresh_metrics.coalesced(), 1);
	}

	#[tokio::test]
	async fn waiter_observes_a_concurrent_terminal_failure() {
		let (gateway, client, _) = build_gateway();

		// Empty store: the shared refresh already failed and cleared it.
		let stale = TokenSecret::new("T1");
		let err = gateway
			.refresh_access_token(Some(&stale))
			.await
			.expect_err("A cleared store should surface the shared terminal failure.");

		assert!(err.is_auth());
		assert!(client.recorded().is_empty());
	}

	#[tokio::test]
	async fn missing_refresh_token_is_terminal() {
		let (gateway, client, store) = build_gateway();

		store
			.set(CredentialVault::ACCESS_TOKEN_KEY, "T1")
			.await
			.expect("Seeding the access token should succeed.");

		let observed = TokenSecret::new("T1");
		let err = gateway
			.refresh_access_token(Some(&observed))
			.await
			.expect_err("A missing refresh token cannot be recovered from.");

		assert!(err.is_auth());
		assert!(client.recorded().is_empty());
		assert_eq!(
			store
				.get(CredentialVault::ACCESS_TOKEN_KEY)
				.await
				.expect("Store read should succeed."),
			None,
			"The orphaned access token should be cleared as well.",
		);
	}

	#[tokio::test]
	async fn malformed_refresh_payloads_are_terminal() {
		let (gateway, client, _) = build_gateway();

		gateway
			.vault
			.save(&CredentialPair::new("T1", "R1"))
			.await
			.expect("Seeding the vault should succeed.");
		client.push_refresh(200, "{\"access_token\":\"T2\"}");

		let observed = TokenSecret::new("T1");
		let err = gateway
			.refresh_access_token(Some(&observed))
			.await
			.expect_err("A payload missing the rotated refresh token is unusable.");

		assert!(err.is_auth());
		assert_eq!(gateway.vault.access_token().await.expect("Vault read should succeed."), None);
	}
}
