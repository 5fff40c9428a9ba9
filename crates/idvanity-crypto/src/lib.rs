//! IdVanity Crypto Primitives
//!
//! CPU capability probing, secure erase, the host entropy bridge and the
//! key material used by identity generation.

pub mod burn;
pub mod c25519;
pub mod cpu;
pub mod encoding;
pub mod hash;
pub mod random;

pub use self::burn::{burn, burn_string};
pub use self::c25519::C25519Keypair;
pub use self::cpu::{capabilities, Capabilities};
pub use self::random::{secure_random, EntropySource, RandomError};

// Re-export dependencies for use by other crates
pub use hex;
pub use zeroize;
