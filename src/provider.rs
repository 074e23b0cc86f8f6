//! Collaborator call layer
//!
//! The SDK core never speaks JSON-RPC itself. Everything that requires a node
//! round-trip (nonce lookup, gas estimation, gas-price-minimum quotes, raw
//! contract calls, broadcast) goes through the [`CeloProvider`] trait, which a
//! transport implements. Failures and timeouts surface as
//! [`Error::UpstreamUnavailable`]; retry policy belongs to the implementor or
//! the caller, never to this crate.

use crate::transaction::TransactionRequest;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Remote operations the SDK core consumes
#[async_trait]
pub trait CeloProvider: Send + Sync {
    /// Next on-chain nonce for an address.
    async fn get_nonce(&self, address: Address) -> Result<u64>;

    /// Gas estimate for a call described by the request.
    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64>;

    /// Network gas price minimum, quoted in `fee_currency` when one is given
    /// and in native CELO otherwise.
    async fn get_gas_price_minimum(&self, fee_currency: Option<Address>) -> Result<U256>;

    /// Read-only contract call (`eth_call`) returning the raw return data.
    async fn call_contract(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Broadcast a signed canonical encoding, returning the transaction hash.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256>;
}

/// Bound a collaborator call by a deadline.
///
/// A hung transport must never hang the SDK; an elapsed deadline is reported
/// as `UpstreamUnavailable` like any other collaborator failure.
pub(crate) async fn with_timeout<T>(
    timeout: Duration,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::UpstreamUnavailable(format!(
            "{operation} timed out after {timeout:?}"
        ))),
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory provider used by wallet, encoder, and registry tests.

    use super::*;
    use crate::registry::getAddressForStringCall;
    use alloy::sol_types::SolCall;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct CallCounters {
        pub get_nonce: AtomicUsize,
        pub estimate_gas: AtomicUsize,
        pub get_gas_price_minimum: AtomicUsize,
        pub call_contract: AtomicUsize,
    }

    pub(crate) struct MockProvider {
        pub nonce: u64,
        pub gas_estimate: u64,
        pub native_gas_price: U256,
        pub fee_currency_gas_price: U256,
        /// Registry name -> address mapping served by `call_contract`.
        /// Missing names return the zero word, matching the on-chain contract.
        pub registry: HashMap<String, Address>,
        /// Simulate a dead upstream on every call.
        pub fail_upstream: bool,
        /// Artificial latency on `call_contract`, for coalescing tests.
        pub call_delay: Option<Duration>,
        pub calls: CallCounters,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self {
                nonce: 7,
                gas_estimate: 21_000,
                native_gas_price: U256::from(500_000_000u64),
                fee_currency_gas_price: U256::from(1_300_000_000u64),
                registry: HashMap::new(),
                fail_upstream: false,
                call_delay: None,
                calls: CallCounters::default(),
            }
        }
    }

    impl MockProvider {
        fn check_upstream(&self) -> Result<()> {
            if self.fail_upstream {
                Err(Error::UpstreamUnavailable("mock upstream down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CeloProvider for MockProvider {
        async fn get_nonce(&self, _address: Address) -> Result<u64> {
            self.calls.get_nonce.fetch_add(1, Ordering::SeqCst);
            self.check_upstream()?;
            Ok(self.nonce)
        }

        async fn estimate_gas(&self, _request: &TransactionRequest) -> Result<u64> {
            self.calls.estimate_gas.fetch_add(1, Ordering::SeqCst);
            self.check_upstream()?;
            Ok(self.gas_estimate)
        }

        async fn get_gas_price_minimum(&self, fee_currency: Option<Address>) -> Result<U256> {
            self.calls.get_gas_price_minimum.fetch_add(1, Ordering::SeqCst);
            self.check_upstream()?;
            Ok(match fee_currency {
                Some(_) => self.fee_currency_gas_price,
                None => self.native_gas_price,
            })
        }

        async fn call_contract(&self, _to: Address, data: Bytes) -> Result<Bytes> {
            self.calls.call_contract.fetch_add(1, Ordering::SeqCst);
            self.check_upstream()?;
            if let Some(delay) = self.call_delay {
                tokio::time::sleep(delay).await;
            }
            let call = getAddressForStringCall::abi_decode(&data)
                .map_err(|e| Error::Encoding(e.to_string()))?;
            let address = self
                .registry
                .get(&call.identifier)
                .copied()
                .unwrap_or(Address::ZERO);
            Ok(Bytes::from(address.into_word().to_vec()))
        }

        async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256> {
            self.check_upstream()?;
            Ok(alloy::primitives::keccak256(&raw))
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_upstream_unavailable() {
        let err = with_timeout(Duration::from_millis(5), "get_nonce", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(0u64)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }
}
