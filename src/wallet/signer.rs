//! Signature primitives
//!
//! Transactions are signed over the keccak256 digest of the unsigned
//! canonical encoding, with `v = y_parity + chain_id * 2 + 35` so a signed
//! transaction cannot be replayed on another chain. Messages go through the
//! EIP-191 personal-sign path (`"\x19Ethereum Signed Message:\n" + len`
//! prefix) and keep `v` in the 27/28 convention, so a message signature can
//! never double as a transaction signature.
//!
//! Signing uses RFC 6979 deterministic nonces (the k256 default): the same
//! key and digest always produce the same `(v, r, s)`.

use crate::{Error, Result};
use alloy::primitives::{Address, Signature, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

/// EIP-155 `v` for a recovery parity and chain id.
pub fn eip155_v(y_parity: bool, chain_id: u64) -> u64 {
    u64::from(y_parity) + chain_id * 2 + 35
}

/// Sign a transaction digest with chain-id replay protection.
pub(crate) fn transaction_signature(
    signer: &PrivateKeySigner,
    hash: B256,
    chain_id: u64,
) -> Result<(u64, U256, U256)> {
    let signature = signer
        .sign_hash_sync(&hash)
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok((eip155_v(signature.v(), chain_id), signature.r(), signature.s()))
}

/// Sign an arbitrary message under the EIP-191 domain separator.
pub(crate) fn message_signature(
    signer: &PrivateKeySigner,
    message: &[u8],
) -> Result<Signature> {
    signer
        .sign_message_sync(message)
        .map_err(|e| Error::Signing(e.to_string()))
}

/// Recover the signing address from a digest and signature triple.
///
/// Accepts `v` in the EIP-155 convention (`chain_id * 2 + 35/36`), the
/// message convention (27/28), or a bare parity (0/1). Used for
/// self-verification and tests.
pub fn recover_address(hash: B256, v: u64, r: U256, s: U256) -> Result<Address> {
    let signature = Signature::new(r, s, parity_from_v(v)?);
    signature
        .recover_address_from_prehash(&hash)
        .map_err(|e| Error::Signing(e.to_string()))
}

fn parity_from_v(v: u64) -> Result<bool> {
    match v {
        0 | 1 => Ok(v == 1),
        27 | 28 => Ok(v == 28),
        v if v >= 35 => Ok((v - 35) % 2 == 1),
        _ => Err(Error::Encoding(format!("invalid signature v value: {v}"))),
    }
}
