//! Fixed-size chain primitives shared by every layer.
//!
//! All of them travel over JSON-RPC as `0x`-prefixed lowercase hex.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::utils::serde_helpers::strip_0x;
use crate::utils::{DevnetError, Result};

/// One ether in wei.
pub const ETHER: u128 = 1_000_000_000_000_000_000;

macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;
            pub const ZERO: $name = $name([0u8; $len]);

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    DevnetError::AbiError(format!(
                        "{} expects {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok($name(arr))
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = DevnetError;

            fn from_str(s: &str) -> Result<Self> {
                let bytes = hex::decode(strip_0x(s))
                    .map_err(|e| DevnetError::AbiError(format!("invalid hex {:?}: {}", s, e)))?;
                $name::from_slice(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

fixed_bytes!(Address, 20);
fixed_bytes!(H256, 32);

impl H256 {
    /// SHA-256 of arbitrary bytes.
    pub fn digest(data: &[u8]) -> Self {
        let out = Sha256::digest(data);
        let mut h = [0u8; 32];
        h.copy_from_slice(&out);
        H256(h)
    }
}

impl Address {
    /// Last 20 bytes of a 32-byte hash.
    pub fn from_hash(h: &H256) -> Self {
        let mut a = [0u8; 20];
        a.copy_from_slice(&h.0[12..]);
        Address(a)
    }
}

/// Balance / value in wei. Serialized as a hex quantity (`0x0` for zero).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn ether(n: u64) -> Self {
        Wei(n as u128 * ETHER)
    }

    pub fn checked_add(self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Wei)
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Wei)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Wei> {
        self.0.checked_mul(factor as u128).map(Wei)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Wei {
    fn from(v: u128) -> Self {
        Wei(v)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{:x}", self.0))
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        u128::from_str_radix(strip_0x(&s), 16)
            .map(Wei)
            .map_err(D::Error::custom)
    }
}

/// A `u64` that travels as a hex quantity (block numbers, nonces, gas).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(#[serde(with = "crate::utils::serde_helpers::quantity")] pub u64);

impl From<u64> for Quantity {
    fn from(v: u64) -> Self {
        Quantity(v)
    }
}

/// Arbitrary bytes that travel as `0x` hex (code, calldata, return data).
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bytes(
    #[serde(
        serialize_with = "crate::utils::serde_helpers::as_hex",
        deserialize_with = "crate::utils::serde_helpers::from_hex"
    )]
    pub Vec<u8>,
);

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}
