//! On-chain registry resolution
//!
//! Celo core contracts live behind a well-known Registry contract that maps
//! fixed names to the current deployed address. Lookups go through the
//! collaborator call layer and are cached per resolver instance; entries are
//! advisory (contracts can be re-pointed by governance), so the cache is
//! explicitly invalidatable and supports an optional TTL.

use crate::config::{DEFAULT_CALL_TIMEOUT, REGISTRY_ADDRESS};
use crate::provider::{with_timeout, CeloProvider};
use crate::{Error, Result};
use alloy::primitives::Address;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

alloy::sol! {
    /// Read method of the Registry contract. Returns the zero address for
    /// names that were never registered.
    function getAddressForString(string identifier) external view returns (address);
}

/// The closed set of registry-resolvable core contracts.
///
/// Resolution is by enum variant rather than free-form strings, so an
/// unsupported name is a compile error instead of a runtime lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreContract {
    Accounts,
    Attestations,
    BlockchainParameters,
    DoubleSigningSlasher,
    DowntimeSlasher,
    Election,
    Escrow,
    Exchange,
    Freezer,
    GasPriceMinimum,
    GoldToken,
    Governance,
    LockedGold,
    Reserve,
    SortedOracles,
    StableToken,
    Validators,
}

impl CoreContract {
    /// The name this contract is registered under on-chain.
    pub fn registry_name(&self) -> &'static str {
        match self {
            CoreContract::Accounts => "Accounts",
            CoreContract::Attestations => "Attestations",
            CoreContract::BlockchainParameters => "BlockchainParameters",
            CoreContract::DoubleSigningSlasher => "DoubleSigningSlasher",
            CoreContract::DowntimeSlasher => "DowntimeSlasher",
            CoreContract::Election => "Election",
            CoreContract::Escrow => "Escrow",
            CoreContract::Exchange => "Exchange",
            CoreContract::Freezer => "Freezer",
            CoreContract::GasPriceMinimum => "GasPriceMinimum",
            CoreContract::GoldToken => "GoldToken",
            CoreContract::Governance => "Governance",
            CoreContract::LockedGold => "LockedGold",
            CoreContract::Reserve => "Reserve",
            CoreContract::SortedOracles => "SortedOracles",
            CoreContract::StableToken => "StableToken",
            CoreContract::Validators => "Validators",
        }
    }
}

struct CacheEntry {
    address: Address,
    resolved_at: Instant,
}

/// Resolves core-contract names to their current on-chain address.
///
/// Staleness policy: entries live until [`invalidate`](Self::invalidate) /
/// [`invalidate_all`](Self::invalidate_all), or until the TTL elapses when
/// one is configured with [`with_ttl`](Self::with_ttl). There is no TTL by
/// default; registry re-pointing is rare and callers invalidate explicitly
/// after governance migrations.
pub struct RegistryResolver<P> {
    provider: Arc<P>,
    cache: Mutex<HashMap<CoreContract, CacheEntry>>,
    /// Per-name gates so concurrent misses collapse into one lookup.
    gates: Mutex<HashMap<CoreContract, Arc<Mutex<()>>>>,
    ttl: Option<Duration>,
    call_timeout: Duration,
}

impl<P: CeloProvider> RegistryResolver<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            ttl: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Expire cache entries after `ttl` instead of only on explicit
    /// invalidation.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Resolve a core contract to its current address.
    ///
    /// Fresh cache entries are returned without a collaborator call.
    /// Concurrent resolutions of the same uncached name are coalesced: one
    /// caller performs the lookup while the rest wait and read the cache.
    /// A cancelled resolution releases its gate without touching the cache.
    pub async fn resolve(&self, contract: CoreContract) -> Result<Address> {
        if let Some(address) = self.cached(contract).await {
            debug!(contract = contract.registry_name(), %address, "registry cache hit");
            return Ok(address);
        }

        let gate = {
            let mut gates = self.gates.lock().await;
            gates
                .entry(contract)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _inflight = gate.lock().await;

        // Another caller may have completed the lookup while we waited.
        if let Some(address) = self.cached(contract).await {
            return Ok(address);
        }

        let address = self.lookup(contract).await?;
        self.cache.lock().await.insert(
            contract,
            CacheEntry {
                address,
                resolved_at: Instant::now(),
            },
        );
        Ok(address)
    }

    /// Drop a single cache entry; the next `resolve` performs a fresh lookup.
    pub async fn invalidate(&self, contract: CoreContract) {
        self.cache.lock().await.remove(&contract);
    }

    /// Drop every cache entry.
    pub async fn invalidate_all(&self) {
        self.cache.lock().await.clear();
    }

    async fn cached(&self, contract: CoreContract) -> Option<Address> {
        let mut cache = self.cache.lock().await;
        let entry = cache.get(&contract)?;
        if let Some(ttl) = self.ttl {
            if entry.resolved_at.elapsed() >= ttl {
                warn!(
                    contract = contract.registry_name(),
                    "registry cache entry expired, re-resolving"
                );
                cache.remove(&contract);
                return None;
            }
        }
        Some(entry.address)
    }

    async fn lookup(&self, contract: CoreContract) -> Result<Address> {
        let name = contract.registry_name();
        let data = getAddressForStringCall {
            identifier: name.to_string(),
        }
        .abi_encode();

        let returned = with_timeout(
            self.call_timeout,
            "registry getAddressForString",
            self.provider.call_contract(REGISTRY_ADDRESS, data.into()),
        )
        .await?;

        let address = getAddressForStringCall::abi_decode_returns(&returned)
            .map_err(|e| Error::Encoding(e.to_string()))?;
        if address == Address::ZERO {
            return Err(Error::UnknownRegistryEntry(name));
        }
        debug!(contract = name, %address, "resolved registry entry");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use alloy::primitives::address;
    use std::sync::atomic::Ordering;

    const GOLD_TOKEN: Address = address!("471ece3750da237f93b8e339c536989b8978a438");

    fn provider_with_gold_token() -> MockProvider {
        let mut provider = MockProvider::default();
        provider
            .registry
            .insert("GoldToken".to_string(), GOLD_TOKEN);
        provider
    }

    #[tokio::test]
    async fn test_second_resolve_served_from_cache() {
        let provider = Arc::new(provider_with_gold_token());
        let resolver = RegistryResolver::new(provider.clone());

        assert_eq!(resolver.resolve(CoreContract::GoldToken).await.unwrap(), GOLD_TOKEN);
        assert_eq!(resolver.resolve(CoreContract::GoldToken).await.unwrap(), GOLD_TOKEN);
        assert_eq!(provider.calls.call_contract.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_one_fresh_lookup() {
        let provider = Arc::new(provider_with_gold_token());
        let resolver = RegistryResolver::new(provider.clone());

        resolver.resolve(CoreContract::GoldToken).await.unwrap();
        resolver.invalidate(CoreContract::GoldToken).await;
        resolver.resolve(CoreContract::GoldToken).await.unwrap();
        resolver.resolve(CoreContract::GoldToken).await.unwrap();

        assert_eq!(provider.calls.call_contract.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unregistered_name_is_an_error() {
        let provider = Arc::new(MockProvider::default());
        let resolver = RegistryResolver::new(provider);

        assert!(matches!(
            resolver.resolve(CoreContract::Escrow).await,
            Err(Error::UnknownRegistryEntry("Escrow"))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_resolves_coalesce_to_one_call() {
        let mut provider = provider_with_gold_token();
        provider.call_delay = Some(Duration::from_millis(20));
        let provider = Arc::new(provider);
        let resolver = Arc::new(RegistryResolver::new(provider.clone()));

        let (a, b, c) = tokio::join!(
            resolver.resolve(CoreContract::GoldToken),
            resolver.resolve(CoreContract::GoldToken),
            resolver.resolve(CoreContract::GoldToken),
        );

        assert_eq!(a.unwrap(), GOLD_TOKEN);
        assert_eq!(b.unwrap(), GOLD_TOKEN);
        assert_eq!(c.unwrap(), GOLD_TOKEN);
        assert_eq!(provider.calls.call_contract.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_treats_every_entry_as_stale() {
        let provider = Arc::new(provider_with_gold_token());
        let resolver = RegistryResolver::new(provider.clone()).with_ttl(Duration::ZERO);

        resolver.resolve(CoreContract::GoldToken).await.unwrap();
        resolver.resolve(CoreContract::GoldToken).await.unwrap();

        assert_eq!(provider.calls.call_contract.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_does_not_poison_cache() {
        let provider = Arc::new(MockProvider {
            fail_upstream: true,
            ..provider_with_gold_token()
        });
        let resolver = RegistryResolver::new(provider);

        assert!(matches!(
            resolver.resolve(CoreContract::GoldToken).await,
            Err(Error::UpstreamUnavailable(_))
        ));
        // The failure cached nothing; a later resolve retries the lookup.
        assert!(resolver.cached(CoreContract::GoldToken).await.is_none());
    }
}
