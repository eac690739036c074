//! Bearer-token request gateway—transparent authorization, single-flight token
//! refresh, and retry-once recovery for REST back-office clients.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod credentials;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		credentials::CredentialPair,
		gateway::Gateway,
		http::ReqwestGatewayClient,
		store::{CredentialVault, KeyValueStore, MemoryStore},
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestGatewayClient>;

	/// Constructs a [`Gateway`] backed by an in-memory store and the default
	/// reqwest transport, pointed at the provided base URL.
	pub fn build_reqwest_test_gateway(base_url: &str) -> (ReqwestTestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn KeyValueStore> = store_backend.clone();
		let base_url = Url::parse(base_url).expect("Test base URL should parse successfully.");
		let gateway = Gateway::new(store, base_url);

		(gateway, store_backend)
	}

	/// Seeds the vault with a credential pair the way a login response would.
	pub async fn seed_credentials(vault: &CredentialVault, access: &str, refresh: &str) {
		vault
			.save(&CredentialPair::new(access, refresh))
			.await
			.expect("Failed to seed credentials into the store.");
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
