use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};

/// Strip an optional `0x` prefix.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Serialize bytes as `0x`-prefixed hex string
pub fn as_hex<T, S>(bytes: T, s: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    s.serialize_str(&format!("0x{}", hex::encode(bytes.as_ref())))
}

/// Deserialize hex string (with or without `0x`) into bytes
pub fn from_hex<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    hex::decode(strip_0x(&s)).map_err(D::Error::custom)
}

/// Serde adapter for optional hex byte fields.
pub mod opt_hex {
    use super::*;

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => as_hex(b, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(d)?;
        match s {
            Some(s) => hex::decode(strip_0x(&s)).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serde adapter for `u64` quantities encoded as `0x`-prefixed hex.
pub mod quantity {
    use super::*;

    pub fn serialize<S>(v: &u64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("0x{:x}", v))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        u64::from_str_radix(strip_0x(&s), 16).map_err(D::Error::custom)
    }
}

/// Same as [`quantity`] for optional fields.
pub mod opt_quantity {
    use super::*;

    pub fn serialize<S>(v: &Option<u64>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match v {
            Some(v) => quantity::serialize(v, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(d)?;
        match s {
            Some(s) => u64::from_str_radix(strip_0x(&s), 16)
                .map(Some)
                .map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
