//! IdVanity Core Engine
//!
//! Host-cooperative vanity identity search: single-threaded, one candidate
//! per iteration, with progress and cancellation delegated to the host.

mod error;
mod host;
mod search;
mod stats;

pub use error::SearchError;
pub use host::{Host, Progress};
#[cfg(not(target_arch = "wasm32"))]
pub use host::{NativeHost, StoredIdentity};
pub use search::{SearchConfig, SearchOutcome, SearchSummary, StopReason, VanitySearch};
pub use stats::SearchStats;

// Re-exports for convenience
pub use idvanity_crypto::{capabilities, Capabilities, EntropySource};
pub use idvanity_identity::{
    Address, C25519Generator, Candidate, Identity, IdentityError, IdentityGenerator,
};
pub use idvanity_pattern::VanityTarget;

/// Run one search with type 0 identities and the default configuration
pub fn run<H: Host>(host: &mut H) -> Result<SearchSummary, SearchError> {
    VanitySearch::new(C25519Generator, SearchConfig::default()).run(host)
}
