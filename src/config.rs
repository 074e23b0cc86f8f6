//! Network configuration for the Celo SDK core

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Address of the Registry proxy contract. Identical on every Celo network;
/// it is a protocol constant and is never itself resolved through the registry.
pub const REGISTRY_ADDRESS: Address = address!("000000000000000000000000000000000000ce10");

/// Default deadline for a single collaborator call (nonce/gas lookups,
/// registry reads). Elapsed deadlines surface as `UpstreamUnavailable`.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported Celo networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Alfajores,
    Baklava,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 42220,
            Network::Alfajores => 44787,
            Network::Baklava => 62320,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Alfajores => "alfajores",
            Network::Baklava => "baklava",
        }
    }
}
