//! Curve25519 key pair: X25519 for key agreement, Ed25519 for signatures

use curve25519_dalek::montgomery::MontgomeryPoint;
use ed25519_dalek::SigningKey;
use zeroize::Zeroize;

/// X25519 public key followed by Ed25519 verifying key
pub const PUBLIC_KEY_LEN: usize = 64;
/// X25519 secret followed by Ed25519 seed
pub const SECRET_KEY_LEN: usize = 64;

/// A combined agreement/signing key pair. The secret half is burned on drop.
pub struct C25519Keypair {
    public: [u8; PUBLIC_KEY_LEN],
    secret: [u8; SECRET_KEY_LEN],
}

impl C25519Keypair {
    /// Derive the key pair from 64 bytes of secret material
    pub fn from_secret(secret: [u8; SECRET_KEY_LEN]) -> Self {
        let mut dh_secret = [0u8; 32];
        let mut seed = [0u8; 32];
        dh_secret.copy_from_slice(&secret[..32]);
        seed.copy_from_slice(&secret[32..]);

        let dh_public = MontgomeryPoint::mul_base_clamped(dh_secret);
        let signing_key = SigningKey::from_bytes(&seed);

        let mut public = [0u8; PUBLIC_KEY_LEN];
        public[..32].copy_from_slice(dh_public.as_bytes());
        public[32..].copy_from_slice(signing_key.verifying_key().as_bytes());

        dh_secret.zeroize();
        seed.zeroize();

        Self { public, secret }
    }

    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public
    }

    pub fn secret_key_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.secret
    }

    /// Zero the secret half in place
    pub fn burn(&mut self) {
        self.secret.zeroize();
    }

    pub fn is_burned(&self) -> bool {
        self.secret.iter().all(|&b| b == 0)
    }
}

impl Drop for C25519Keypair {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}
