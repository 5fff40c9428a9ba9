//! Type 0 identities: Curve25519 key pair, address from SHA-512 of the public key

use idvanity_crypto::c25519::{C25519Keypair, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
use idvanity_crypto::hash::sha512;
use idvanity_crypto::encoding::ADDRESS_HEX_LEN;
use idvanity_crypto::zeroize::{Zeroize, Zeroizing};
use idvanity_crypto::{burn, hex, secure_random, EntropySource};
use tracing::trace;

use crate::traits::{Address, Candidate, IdentityError, IdentityGenerator};

/// Identity type tag written into the textual forms
pub const IDENTITY_TYPE_C25519: u8 = 0;

/// `<address>:0:<public hex>:<secret hex>`
pub const PRIVATE_FORM_LEN: usize =
    ADDRESS_HEX_LEN + 3 + 2 * PUBLIC_KEY_LEN + 1 + 2 * SECRET_KEY_LEN;

/// A type 0 identity
pub struct Identity {
    address: Address,
    keypair: C25519Keypair,
}

impl Identity {
    /// Build an identity from 64 bytes of secret material
    pub fn from_secret(secret: [u8; SECRET_KEY_LEN]) -> Self {
        let keypair = C25519Keypair::from_secret(secret);
        let address = derive_address(keypair.public_key_bytes());
        Self { address, keypair }
    }

    pub fn public_key_bytes(&self) -> &[u8] {
        self.keypair.public_key_bytes()
    }

    pub fn is_burned(&self) -> bool {
        self.keypair.is_burned()
    }
}

/// Last five bytes of SHA-512 over the public key
pub fn derive_address(public_key: &[u8]) -> Address {
    let digest = sha512(public_key);
    let mut tail = [0u8; 5];
    tail.copy_from_slice(&digest[59..]);
    Address::from_bytes(&tail)
}

impl Candidate for Identity {
    fn address(&self) -> Address {
        self.address
    }

    fn public_form(&self) -> String {
        format!(
            "{}:{}:{}",
            self.address,
            IDENTITY_TYPE_C25519,
            hex::encode(self.keypair.public_key_bytes())
        )
    }

    fn private_form(&self) -> Zeroizing<String> {
        // Sized up front so the secret never lands in a buffer that gets
        // reallocated away.
        let mut text = Zeroizing::new(String::with_capacity(PRIVATE_FORM_LEN));
        text.push_str(&self.public_form());
        text.push(':');

        let mut secret_hex = [0u8; 2 * SECRET_KEY_LEN];
        if hex::encode_to_slice(self.keypair.secret_key_bytes(), &mut secret_hex).is_ok() {
            text.extend(secret_hex.iter().copied().map(char::from));
        }
        secret_hex.zeroize();
        text
    }

    fn burn(&mut self) {
        self.keypair.burn();
    }
}

/// Generator of type 0 identities
#[derive(Debug, Default, Clone, Copy)]
pub struct C25519Generator;

impl IdentityGenerator for C25519Generator {
    type Identity = Identity;

    fn generate(&mut self, entropy: &mut dyn EntropySource) -> Result<Identity, IdentityError> {
        loop {
            let mut secret = [0u8; SECRET_KEY_LEN];
            if let Err(err) = secure_random(&mut *entropy, &mut secret) {
                burn(&mut secret);
                return Err(err.into());
            }
            if secret.iter().all(|&b| b == 0) {
                return Err(IdentityError::DegenerateEntropy);
            }

            let identity = Identity::from_secret(secret);
            burn(&mut secret);

            if !identity.address().is_reserved() {
                return Ok(identity);
            }
            trace!(address = %identity.address(), "discarding reserved address");
        }
    }
}
