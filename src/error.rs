//! Error types for the Celo SDK core

use alloy::primitives::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Private key bytes are not a valid secp256k1 scalar.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// An account with the same derived address already exists in the wallet.
    #[error("Account already exists in wallet: {0}")]
    DuplicateAccount(Address),

    /// Address not present in the wallet, or no active account to fall back to.
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// A field required by the canonical encoding is absent.
    #[error("Missing required transaction field: {0}")]
    MissingField(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The registry contract returned the zero address for this name.
    #[error("Contract not registered in on-chain registry: {0}")]
    UnknownRegistryEntry(&'static str),

    /// Collaborator call failed or timed out. Never retried by this crate.
    #[error("Upstream call failed: {0}")]
    UpstreamUnavailable(String),

    /// Input that cannot be canonically encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<alloy::rlp::Error> for Error {
    fn from(e: alloy::rlp::Error) -> Self {
        Error::Encoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
