//! IdVanity Identities
//!
//! The identity generation seam used by the search engine, plus the
//! concrete type 0 (Curve25519) identity.

pub mod identity;
pub mod traits;

// Re-exports
pub use identity::{derive_address, C25519Generator, Identity, IDENTITY_TYPE_C25519};
pub use traits::{Address, Candidate, IdentityError, IdentityGenerator};
