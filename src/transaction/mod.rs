//! Celo transaction types and canonical encoding
//!
//! Celo extends the legacy Ethereum transaction with three fee fields:
//! `fee_currency` (pay gas in a whitelisted ERC-20 instead of CELO),
//! `gateway_fee_recipient`, and `gateway_fee`. The canonical encoding is an
//! RLP list with a fixed field count — unused extension fields are encoded as
//! the empty string, never omitted — because every on-chain verifier
//! recomputes the same bytes to recover the signer.

mod encoder;

pub use encoder::TransactionEncoder;

use crate::{Error, Result};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::rlp::{Decodable, Encodable, Header, EMPTY_STRING_CODE};
use serde::{Deserialize, Serialize};

/// A logical, pre-signing transaction request.
///
/// Optional fields are resolved by [`TransactionEncoder::normalize`] before
/// encoding: `nonce` from the chain, `gas` from estimation, `gas_price` from
/// the network minimum quoted in `fee_currency` (native CELO when `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub nonce: Option<u64>,
    pub gas: Option<u64>,
    pub gas_price: Option<U256>,
    pub fee_currency: Option<Address>,
    pub gateway_fee_recipient: Option<Address>,
    pub gateway_fee: U256,
    pub chain_id: Option<u64>,
}

impl TransactionRequest {
    /// Start a request to a recipient address.
    pub fn to(to: Address) -> Self {
        Self {
            to: Some(to),
            ..Self::default()
        }
    }

    /// Start a request from a hex recipient address string.
    pub fn to_str(to: &str) -> Result<Self> {
        let to = to
            .parse::<Address>()
            .map_err(|e| Error::InvalidAddress(e.to_string()))?;
        Ok(Self::to(to))
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the value from a decimal (or 0x-prefixed hex) string.
    pub fn value_str(mut self, value: &str) -> Result<Self> {
        let parsed = match value.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(value, 10),
        }
        .map_err(|e| Error::InvalidAmount(e.to_string()))?;
        self.value = parsed;
        Ok(self)
    }

    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Denominate fees in an alternate whitelisted currency.
    pub fn fee_currency(mut self, fee_currency: Address) -> Self {
        self.fee_currency = Some(fee_currency);
        self
    }

    pub fn gateway_fee(mut self, recipient: Address, fee: U256) -> Self {
        self.gateway_fee_recipient = Some(recipient);
        self.gateway_fee = fee;
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

/// A fully-normalized transaction: every canonical field is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeloTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub fee_currency: Option<Address>,
    pub gateway_fee_recipient: Option<Address>,
    pub gateway_fee: U256,
    pub chain_id: u64,
}

impl CeloTransaction {
    /// Canonical encoding of the unsigned payload: the 13-field list with
    /// `v = 0`, `r = 0`, `s = 0`.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        self.encode_with_signature(0, U256::ZERO, U256::ZERO)
    }

    /// Canonical encoding with an explicit signature triple.
    pub fn encode_with_signature(&self, v: u64, r: U256, s: U256) -> Vec<u8> {
        let mut payload = Vec::new();
        self.nonce.encode(&mut payload);
        self.gas_price.encode(&mut payload);
        self.gas.encode(&mut payload);
        self.to.encode(&mut payload);
        self.value.encode(&mut payload);
        self.data.encode(&mut payload);
        encode_optional_address(self.fee_currency, &mut payload);
        encode_optional_address(self.gateway_fee_recipient, &mut payload);
        self.gateway_fee.encode(&mut payload);
        self.chain_id.encode(&mut payload);
        v.encode(&mut payload);
        r.encode(&mut payload);
        s.encode(&mut payload);

        let mut out = Vec::with_capacity(payload.len() + 9);
        Header {
            list: true,
            payload_length: payload.len(),
        }
        .encode(&mut out);
        out.extend_from_slice(&payload);
        out
    }

    /// Digest signed by the sender: keccak256 of the unsigned encoding.
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.encode_unsigned())
    }

    /// Decode a canonical encoding back into the transaction and its
    /// signature triple (zeros for an unsigned payload).
    pub fn decode(encoded: &[u8]) -> Result<(Self, u64, U256, U256)> {
        let mut buf = encoded;
        let mut payload = Header::decode_bytes(&mut buf, true)?;
        if !buf.is_empty() {
            return Err(Error::Encoding("trailing bytes after transaction".into()));
        }

        let tx = CeloTransaction {
            nonce: u64::decode(&mut payload)?,
            gas_price: U256::decode(&mut payload)?,
            gas: u64::decode(&mut payload)?,
            to: Address::decode(&mut payload)?,
            value: U256::decode(&mut payload)?,
            data: Bytes::decode(&mut payload)?,
            fee_currency: decode_optional_address(&mut payload)?,
            gateway_fee_recipient: decode_optional_address(&mut payload)?,
            gateway_fee: U256::decode(&mut payload)?,
            chain_id: u64::decode(&mut payload)?,
        };
        let v = u64::decode(&mut payload)?;
        let r = U256::decode(&mut payload)?;
        let s = U256::decode(&mut payload)?;
        if !payload.is_empty() {
            return Err(Error::Encoding("extra fields in transaction list".into()));
        }
        Ok((tx, v, r, s))
    }
}

fn encode_optional_address(address: Option<Address>, out: &mut Vec<u8>) {
    match address {
        Some(address) => address.encode(out),
        // Empty string, not omission: the field count is fixed.
        None => out.push(EMPTY_STRING_CODE),
    }
}

fn decode_optional_address(payload: &mut &[u8]) -> Result<Option<Address>> {
    let bytes = Bytes::decode(payload)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        n => Err(Error::Encoding(format!(
            "optional address field has {n} bytes, expected 0 or 20"
        ))),
    }
}

/// A signed, ready-to-broadcast transaction.
#[derive(Debug, Clone, Serialize)]
pub struct SignedTransaction {
    pub tx: CeloTransaction,
    pub v: u64,
    pub r: U256,
    pub s: U256,
    raw: Bytes,
    hash: B256,
}

impl SignedTransaction {
    pub(crate) fn new(tx: CeloTransaction, v: u64, r: U256, s: U256) -> Self {
        let raw = Bytes::from(tx.encode_with_signature(v, r, s));
        let hash = tx.signing_hash();
        Self {
            tx,
            v,
            r,
            s,
            raw,
            hash,
        }
    }

    /// Canonical signed encoding, ready for `send_raw_transaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Transaction hash: keccak256 of the unsigned canonical encoding.
    pub fn hash(&self) -> B256 {
        self.hash
    }
}
