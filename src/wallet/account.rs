//! Account key material
//!
//! An [`Account`] owns exactly one secp256k1 private key and its derived
//! address. The key lives inside alloy's `PrivateKeySigner` (a k256
//! `SigningKey`, zeroized on drop), is never serialized, and never appears in
//! `Debug` output, logs, or error messages. The only way to use it is through
//! the wallet's signing operations.

use crate::{Error, Result};
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

/// A single private key and its derived address.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
    address: Address,
}

impl Account {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let signer = PrivateKeySigner::random();
        let address = signer.address();
        Self { signer, address }
    }

    /// Import a raw 32-byte private key.
    ///
    /// Rejects byte strings that are not a valid scalar on the curve
    /// (zero, or >= the group order).
    pub fn from_bytes(bytes: &B256) -> Result<Self> {
        let signer =
            PrivateKeySigner::from_bytes(bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let address = signer.address();
        Ok(Self { signer, address })
    }

    /// Import a hex-encoded private key (with or without the `0x` prefix).
    ///
    /// Takes a [`SecretString`] so the caller's copy of the hex material is
    /// not accidentally logged or cloned around before import.
    pub fn from_hex(key_hex: &SecretString) -> Result<Self> {
        let hex = key_hex.expose_secret();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let signer: PrivateKeySigner = hex
            .parse()
            .map_err(|e| Error::InvalidKey(format!("{e}")))?;
        let address = signer.address();
        Ok(Self { signer, address })
    }

    /// The derived address (safe to share).
    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

// Manual Debug so the signer can never leak through formatting.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
