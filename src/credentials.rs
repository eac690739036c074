//! Credential material: redacted token secrets, the persisted pair, and the
//! refresh endpoint's wire types.

pub mod pair;
pub mod secret;

pub use pair::*;
pub use secret::*;
