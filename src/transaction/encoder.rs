//! Default resolution for transaction requests
//!
//! Turns a [`TransactionRequest`] into a fully-populated [`CeloTransaction`]
//! by filling unset fields from the collaborator layer: the account's next
//! nonce, a gas estimate, and the network gas price minimum. When a fee
//! currency is set, the gas price minimum is quoted in that currency, not in
//! native CELO.

use crate::config::{Network, DEFAULT_CALL_TIMEOUT};
use crate::provider::{with_timeout, CeloProvider};
use crate::transaction::{CeloTransaction, TransactionRequest};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Normalizes requests against a provider for a fixed network.
pub struct TransactionEncoder<P> {
    provider: Arc<P>,
    network: Network,
    call_timeout: Duration,
}

impl<P: CeloProvider> TransactionEncoder<P> {
    pub fn new(provider: Arc<P>, network: Network) -> Self {
        Self {
            provider,
            network,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Resolve every unset field and return the canonical transaction.
    ///
    /// Collaborator lookups only happen for fields the request leaves unset;
    /// each is bounded by the call timeout and surfaces
    /// [`Error::UpstreamUnavailable`] on failure. No state is mutated, so a
    /// failed or cancelled normalization leaves nothing to undo.
    pub async fn normalize(&self, request: TransactionRequest) -> Result<CeloTransaction> {
        let from = request.from.ok_or(Error::MissingField("from"))?;
        let to = request.to.ok_or(Error::MissingField("to"))?;
        let chain_id = request.chain_id.unwrap_or_else(|| self.network.chain_id());

        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => {
                let nonce = with_timeout(
                    self.call_timeout,
                    "get_nonce",
                    self.provider.get_nonce(from),
                )
                .await?;
                debug!(%from, nonce, "resolved nonce from chain");
                nonce
            }
        };

        let gas = match request.gas {
            Some(gas) => gas,
            None => {
                let gas = with_timeout(
                    self.call_timeout,
                    "estimate_gas",
                    self.provider.estimate_gas(&request),
                )
                .await?;
                debug!(gas, "resolved gas from estimation");
                gas
            }
        };

        let gas_price = match request.gas_price {
            Some(gas_price) => gas_price,
            None => {
                let gas_price = with_timeout(
                    self.call_timeout,
                    "get_gas_price_minimum",
                    self.provider.get_gas_price_minimum(request.fee_currency),
                )
                .await?;
                debug!(
                    fee_currency = ?request.fee_currency,
                    %gas_price,
                    "resolved gas price minimum"
                );
                gas_price
            }
        };

        Ok(CeloTransaction {
            nonce,
            gas_price,
            gas,
            to,
            value: request.value,
            data: request.data,
            fee_currency: request.fee_currency,
            gateway_fee_recipient: request.gateway_fee_recipient,
            gateway_fee: request.gateway_fee,
            chain_id,
        })
    }
}
