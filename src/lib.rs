//! Celo client SDK core
//!
//! Account management, canonical transaction encoding/signing, and on-chain
//! registry resolution for the Celo blockchain. Contract wrappers and the
//! JSON-RPC transport sit on top of this crate: they implement
//! [`CeloProvider`] for node access and consume [`Wallet`] signatures and
//! [`RegistryResolver`] lookups.
//!
//! # Security model
//!
//! - Private keys live only inside [`wallet::Account`] (zeroized on drop)
//! - Keys are never serialized, logged, or exposed through `Debug`
//! - Transaction signatures carry EIP-155 chain-id replay protection
//! - Message signatures use the EIP-191 prefix and are not interchangeable
//!   with transaction signatures
//! - Signing nonces are deterministic (RFC 6979): no weak-randomness reuse

pub mod config;
pub mod provider;
pub mod registry;
pub mod transaction;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{Network, REGISTRY_ADDRESS};
pub use error::{Error, Result};
pub use provider::CeloProvider;
pub use registry::{CoreContract, RegistryResolver};
pub use transaction::{CeloTransaction, SignedTransaction, TransactionEncoder, TransactionRequest};
pub use wallet::{Account, TransactionDefaults, Wallet};
