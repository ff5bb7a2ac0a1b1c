use ed25519_dalek::{Signature as DalekSig, Signer as DalekSigner, Verifier as DalekVerifier};
use serde::{Deserialize, Serialize};

use crate::crypto::keys::verifying_key;
use crate::crypto::{Keypair, PublicKey};
use crate::utils::serde_helpers::{as_hex, from_hex};
use crate::utils::{DevnetError, Result};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Signature(
    #[serde(serialize_with = "as_hex", deserialize_with = "from_hex")] pub Vec<u8>,
);

/// Trait for signing
pub trait Signer {
    fn sign(&self, msg: &[u8]) -> Signature;
}

/// Trait for verifying
pub trait Verifier {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()>;
}

impl Signer for Keypair {
    fn sign(&self, msg: &[u8]) -> Signature {
        let sig = self.signing.sign(msg);
        Signature(sig.to_bytes().to_vec())
    }
}

impl Verifier for PublicKey {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()> {
        let pk = verifying_key(self)?;
        let raw: [u8; 64] = sig
            .0
            .as_slice()
            .try_into()
            .map_err(|_| DevnetError::CryptoError("signature must be 64 bytes".into()))?;
        let ds = DalekSig::from_bytes(&raw);
        pk.verify(msg, &ds)
            .map_err(|_| DevnetError::CryptoError("signature verification failed".into()))
    }
}
