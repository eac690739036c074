//! Storage contracts, the typed credential vault, and built-in backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	credentials::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key-value collaborator that persists credential strings.
///
/// The gateway only ever touches the two fixed keys owned by
/// [`CredentialVault`]; backends are free to namespace, encrypt, or expire
/// values however they like.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Persists or replaces the value stored under `key`.
	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()>;

	/// Removes the value stored under `key`, if present.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Typed facade over a [`KeyValueStore`] that owns the credential key names.
///
/// All credential reads and writes in the crate go through this facade so the
/// two keys stay consistent: [`save`](Self::save) overwrites both values and
/// [`clear`](Self::clear) deletes both, matching the pair's lifecycle (login
/// or refresh writes, terminal auth failure or logout deletes).
#[derive(Clone)]
pub struct CredentialVault {
	store: Arc<dyn KeyValueStore>,
}
impl CredentialVault {
	/// Fixed key under which the access token is stored.
	pub const ACCESS_TOKEN_KEY: &'static str = "gateway.access_token";
	/// Fixed key under which the refresh token is stored.
	pub const REFRESH_TOKEN_KEY: &'static str = "gateway.refresh_token";

	/// Wraps the provided backend.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// Reads the current access token, if one is stored.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.store.get(Self::ACCESS_TOKEN_KEY).await?.map(TokenSecret::new))
	}

	/// Reads the current refresh token, if one is stored.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.store.get(Self::REFRESH_TOKEN_KEY).await?.map(TokenSecret::new))
	}

	/// Overwrites both stored values with the provided pair.
	pub async fn save(&self, pair: &CredentialPair) -> Result<(), StoreError> {
		self.store.set(Self::ACCESS_TOKEN_KEY, pair.access.expose()).await?;
		self.store.set(Self::REFRESH_TOKEN_KEY, pair.refresh.expose()).await?;

		Ok(())
	}

	/// Deletes both stored values.
	pub async fn clear(&self) -> Result<(), StoreError> {
		self.store.delete(Self::ACCESS_TOKEN_KEY).await?;
		self.store.delete(Self::REFRESH_TOKEN_KEY).await?;

		Ok(())
	}
}
impl Debug for CredentialVault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialVault").finish_non_exhaustive()
	}
}
