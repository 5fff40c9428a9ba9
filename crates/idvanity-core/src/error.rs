//! Search errors

use idvanity_identity::IdentityError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The generator could not produce a trustworthy identity
    #[error("identity generation failed: {0}")]
    Identity(#[from] IdentityError),
}
