use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::primitives::{Address, H256};
use crate::utils::{DevnetError, Result};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Account address: last 20 bytes of sha256(public key).
    pub fn address(&self) -> Address {
        Address::from_hash(&H256::digest(&self.0))
    }
}

#[derive(Clone)]
pub struct Keypair {
    pub signing: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::from_secret(secret)
    }

    /// Deterministic keypair for dev accounts: secret = sha256(seed || index).
    pub fn derive(seed: &str, index: u32) -> Self {
        let mut h = Sha256::new();
        h.update(seed.as_bytes());
        h.update(index.to_be_bytes());
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&h.finalize());
        Self::from_secret(secret)
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self { signing: SigningKey::from_bytes(&secret) }
    }

    /// Construct from raw bytes
    pub fn from_bytes(secret: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = secret
            .try_into()
            .map_err(|_| DevnetError::CryptoError(format!("secret key must be 32 bytes, got {}", secret.len())))?;
        Ok(Self::from_secret(arr))
    }

    /// Get public key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key().to_bytes())
    }

    pub fn address(&self) -> Address {
        self.public().address()
    }

    /// Export secret as bytes
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing.to_bytes()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair").field("address", &self.address()).finish()
    }
}

pub(crate) fn verifying_key(pk: &PublicKey) -> Result<VerifyingKey> {
    VerifyingKey::from_bytes(&pk.0).map_err(|e| DevnetError::CryptoError(e.to_string()))
}

/// Address of a contract created by `sender` at `nonce`.
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let mut buf = Vec::with_capacity(28);
    buf.extend_from_slice(sender.as_bytes());
    buf.extend_from_slice(&nonce.to_be_bytes());
    Address::from_hash(&H256::digest(&buf))
}
