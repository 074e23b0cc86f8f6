//! In-memory keystore and signing entry points
//!
//! The [`Wallet`] owns every private key in the process. Keys are held in
//! [`Account`]s (zeroized on drop), never serialized, and never exposed; the
//! wallet only hands out signatures. All operations are safe under concurrent
//! callers: the account map sits behind a reader/writer lock that is never
//! held across an await, so a cancelled signing operation cannot corrupt it.

mod account;
mod signer;

pub use account::Account;
pub use signer::{eip155_v, recover_address};

use crate::provider::CeloProvider;
use crate::transaction::{SignedTransaction, TransactionEncoder, TransactionRequest};
use crate::{Error, Result};
use alloy::primitives::{Address, Signature, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Wallet-level defaults applied to every request before normalization.
/// Fields set on the request itself always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDefaults {
    pub fee_currency: Option<Address>,
    pub gateway_fee_recipient: Option<Address>,
    pub gateway_fee: Option<U256>,
    pub gas_price: Option<U256>,
}

#[derive(Default)]
struct AccountStore {
    keys: HashMap<Address, Account>,
    /// Insertion order, for deterministic listing.
    order: Vec<Address>,
    active: Option<Address>,
}

/// In-memory keystore holding one or more accounts, one of them active.
pub struct Wallet {
    store: RwLock<AccountStore>,
    defaults: RwLock<TransactionDefaults>,
}

impl Wallet {
    /// Create an empty wallet.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(AccountStore::default()),
            defaults: RwLock::new(TransactionDefaults::default()),
        }
    }

    /// Create a wallet seeded with one account, which becomes active.
    pub fn with_account(account: Account) -> Self {
        let wallet = Self::new();
        // Empty wallet: insertion cannot fail
        let _ = wallet.add_account(account);
        wallet
    }

    /// Insert an account, keyed by its derived address.
    ///
    /// The first account added becomes the active one; later additions leave
    /// the selection untouched. Fails with [`Error::DuplicateAccount`] if the
    /// address is already present.
    pub fn add_account(&self, account: Account) -> Result<Address> {
        let address = account.address();
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if store.keys.contains_key(&address) {
            return Err(Error::DuplicateAccount(address));
        }
        store.keys.insert(address, account);
        store.order.push(address);
        if store.active.is_none() {
            store.active = Some(address);
        }
        info!(%address, "account added to wallet");
        Ok(address)
    }

    /// Generate a fresh account from the OS CSPRNG and insert it.
    pub fn generate_account(&self) -> Address {
        // A freshly drawn key cannot collide with an existing address in
        // practice; a collision would mean the CSPRNG produced a known key.
        self.add_account(Account::generate())
            .expect("generated account collided with an existing address")
    }

    /// Remove an account, zeroizing its key material.
    ///
    /// Documented no-op behavior: returns `false` when the address is not in
    /// the wallet. Removing the active account clears the active selection.
    pub fn remove_account(&self, address: Address) -> bool {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if store.keys.remove(&address).is_none() {
            return false;
        }
        store.order.retain(|a| *a != address);
        if store.active == Some(address) {
            store.active = None;
        }
        info!(%address, "account removed from wallet");
        true
    }

    /// Select the default signer for requests that omit `from`.
    pub fn set_active(&self, address: Address) -> Result<()> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if !store.keys.contains_key(&address) {
            return Err(Error::UnknownAccount(address.to_string()));
        }
        store.active = Some(address);
        Ok(())
    }

    pub fn active(&self) -> Option<Address> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
    }

    /// Addresses in insertion order.
    pub fn accounts(&self) -> Vec<Address> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys
            .contains_key(&address)
    }

    /// Set wallet-level fee defaults (fee currency, gateway fee, gas price).
    pub fn set_defaults(&self, defaults: TransactionDefaults) {
        *self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner) = defaults;
    }

    pub fn defaults(&self) -> TransactionDefaults {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Normalize, encode, and sign a transaction request.
    ///
    /// `from` falls back to the active account; an unknown or unresolvable
    /// sender fails with [`Error::UnknownAccount`]. The signer is cloned out
    /// of the lock before any collaborator call, so signing never blocks or
    /// mutates the key map and a mid-flight failure leaves no partial state.
    pub async fn sign_transaction<P: CeloProvider>(
        &self,
        encoder: &TransactionEncoder<P>,
        request: TransactionRequest,
    ) -> Result<SignedTransaction> {
        let mut request = self.apply_defaults(request);

        let signer = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            let from = request.from.or(store.active).ok_or_else(|| {
                Error::UnknownAccount("no sender given and no active account selected".into())
            })?;
            request.from = Some(from);
            store
                .keys
                .get(&from)
                .ok_or_else(|| Error::UnknownAccount(from.to_string()))?
                .signer()
                .clone()
        };

        let tx = encoder.normalize(request).await?;
        let hash = tx.signing_hash();
        let (v, r, s) = signer::transaction_signature(&signer, hash, tx.chain_id)?;
        Ok(SignedTransaction::new(tx, v, r, s))
    }

    /// Sign an arbitrary message under the EIP-191 domain separator.
    ///
    /// The prefix keeps message signatures and transaction signatures
    /// non-interchangeable; `v` stays in the 27/28 convention.
    pub fn sign_message(&self, address: Address, message: &[u8]) -> Result<Signature> {
        let signer = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            store
                .keys
                .get(&address)
                .ok_or_else(|| Error::UnknownAccount(address.to_string()))?
                .signer()
                .clone()
        };
        signer::message_signature(&signer, message)
    }

    fn apply_defaults(&self, mut request: TransactionRequest) -> TransactionRequest {
        let defaults = self.defaults();
        if request.fee_currency.is_none() {
            request.fee_currency = defaults.fee_currency;
        }
        if request.gateway_fee_recipient.is_none() {
            request.gateway_fee_recipient = defaults.gateway_fee_recipient;
        }
        if request.gateway_fee == U256::ZERO {
            if let Some(gateway_fee) = defaults.gateway_fee {
                request.gateway_fee = gateway_fee;
            }
        }
        if request.gas_price.is_none() {
            request.gas_price = defaults.gas_price;
        }
        request
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
