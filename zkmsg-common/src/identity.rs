//! Identities and their map keys.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CommonError, Result},
    hash::{hash_with_domain, IDENTITY_DOMAIN},
    MapKey,
};

/// Map key of a public key: `H("zkmsg_identity_v1" || public_key)`.
pub fn identity_key(public_key: &VerifyingKey) -> MapKey {
    hash_with_domain(IDENTITY_DOMAIN, &[public_key.as_bytes()])
}

/// An identity holding an ed25519 verification key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(with = "serde_verifying_key")]
    pub public_key: VerifyingKey,
}

impl Account {
    pub fn new(public_key: VerifyingKey) -> Self {
        Self { public_key }
    }

    /// Parse an account from 32 public-key bytes.
    pub fn from_public_key_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let public_key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| CommonError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { public_key })
    }

    /// Key of this account in every authenticated map.
    pub fn key(&self) -> MapKey {
        identity_key(&self.public_key)
    }

    /// Verify `signature` over `message` against this account's key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key.verify(message, signature).is_ok()
    }
}

/// Serde module for ed25519 public keys as `0x`-prefixed hex.
pub mod serde_verifying_key {
    use ed25519_dalek::VerifyingKey;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(key: &VerifyingKey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(key.as_bytes())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<VerifyingKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex_str = s.strip_prefix("0x").unwrap_or(&s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str, &mut bytes).map_err(de::Error::custom)?;
        VerifyingKey::from_bytes(&bytes).map_err(de::Error::custom)
    }
}

/// Serde module for ed25519 signatures as `0x`-prefixed hex.
pub mod serde_signature {
    use ed25519_dalek::Signature;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(signature: &Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(signature.to_bytes())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex_str = s.strip_prefix("0x").unwrap_or(&s);
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(hex_str, &mut bytes).map_err(de::Error::custom)?;
        Ok(Signature::from_bytes(&bytes))
    }
}
