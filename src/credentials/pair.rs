//! The persisted access/refresh pair and the refresh endpoint's payloads.

// self
use crate::{_prelude::*, credentials::secret::TokenSecret};

/// Access/refresh token pair persisted by the credential store.
///
/// Written on successful login and on every successful refresh; deleted when a
/// refresh fails terminally or on explicit logout. A save always overwrites
/// both values, never merges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialPair {
	/// Short-lived bearer credential attached to API calls.
	pub access: TokenSecret,
	/// Longer-lived credential used solely to obtain a new access token.
	pub refresh: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) }
	}
}

/// JSON body submitted to the refresh endpoint.
#[derive(Clone, Serialize)]
pub struct RefreshRequest<'a> {
	/// Refresh token currently held by the credential store.
	pub refresh_token: &'a str,
}
impl Debug for RefreshRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshRequest").field("refresh_token", &"<redacted>").finish()
	}
}

/// Successful refresh endpoint response.
///
/// Extra fields (`token_type`, `expires_in`, ...) are tolerated and ignored;
/// only the rotated pair matters to the gateway.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
	/// Newly issued access token.
	pub access_token: String,
	/// Newly issued refresh token.
	pub refresh_token: String,
}
impl Debug for RefreshResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshResponse")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.finish()
	}
}
impl From<RefreshResponse> for CredentialPair {
	fn from(response: RefreshResponse) -> Self {
		Self::new(response.access_token, response.refresh_token)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_response_rotates_into_a_pair() {
		let response: RefreshResponse = serde_json::from_str(
			"{\"access_token\":\"T2\",\"refresh_token\":\"R2\",\"token_type\":\"bearer\",\"expires_in\":480}",
		)
		.expect("Refresh response fixture should deserialize despite extra fields.");
		let pair = CredentialPair::from(response);

		assert_eq!(pair, CredentialPair::new("T2", "R2"));
	}

	#[test]
	fn wire_types_redact_their_tokens() {
		let request = RefreshRequest { refresh_token: "R1" };

		assert!(!format!("{request:?}").contains("R1"));

		let pair = CredentialPair::new("T1", "R1");
		let rendered = format!("{pair:?}");

		assert!(!rendered.contains("T1"));
		assert!(!rendered.contains("R1"));
	}
}
