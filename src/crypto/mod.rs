//! Crypto module: key management, signing, verification.
//!
//! - Keys: generation, deterministic dev-account derivation, addresses
//! - Sign: Ed25519 signatures

pub mod keys;
pub mod sign;

pub use keys::{contract_address, Keypair, PublicKey};
pub use sign::{Signature, Signer, Verifier};
