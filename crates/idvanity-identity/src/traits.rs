//! Identity traits and types

use std::fmt;

use idvanity_crypto::encoding::address_hex;
use idvanity_crypto::zeroize::Zeroizing;
use idvanity_crypto::{EntropySource, RandomError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("entropy unavailable: {0}")]
    Entropy(#[from] RandomError),
    #[error("entropy source returned an all-zero block")]
    DegenerateEntropy,
}

/// A 40-bit address carried in the low bits of a `u64`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(u64);

impl Address {
    /// Significant bits in an address
    pub const BITS: u32 = 40;
    pub const MASK: u64 = 0xff_ffff_ffff;

    /// Wrap a raw value, discarding anything above bit 39
    pub fn from_u64(value: u64) -> Self {
        Self(value & Self::MASK)
    }

    /// Big-endian five-byte form
    pub fn from_bytes(bytes: &[u8; 5]) -> Self {
        Self(idvanity_crypto::encoding::be_u64(bytes))
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Zero and the `0xff` prefix are never valid identity addresses
    pub fn is_reserved(self) -> bool {
        self.0 == 0 || (self.0 >> 32) == 0xff
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&address_hex(self.0))
    }
}

/// A freshly generated identity under evaluation by the search
pub trait Candidate {
    /// Address derived from the public key
    fn address(&self) -> Address;

    /// Public textual form, safe to share
    fn public_form(&self) -> String;

    /// Private textual form, including secret key material. Wiped on drop.
    fn private_form(&self) -> Zeroizing<String>;

    /// Zero all private key material in place
    fn burn(&mut self);
}

/// Source of new identities
pub trait IdentityGenerator {
    type Identity: Candidate;

    /// Generate one identity, drawing all randomness from `entropy`
    fn generate(
        &mut self,
        entropy: &mut dyn EntropySource,
    ) -> Result<Self::Identity, IdentityError>;
}
