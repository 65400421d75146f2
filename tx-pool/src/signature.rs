//! The signature verifier bridge (C4): §4.4's external crypto contract.
//!
//! The pipeline itself never touches a secret key or a curve point; it only
//! ever calls `verify_*` through this trait, from inside a [`Handler`]'s
//! `verify`. This module also ships a real, usable bridge backed by the
//! `secp256k1` crate, the same crate already pinned by the teacher
//! workspace, rather than leaving the trait with no implementation.
//!
//! [`Handler`]: crate::handler::Handler

use secp256k1::hashes::{sha256, Hash};
use secp256k1::{ecdsa, schnorr, Keypair, Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use crate::types::Transaction;

/// A signature as received at the verify boundary: either hex-encoded or
/// raw bytes. §4.4 requires both forms to be accepted equivalently.
#[derive(Debug, Clone)]
pub enum SignatureBytes {
    Hex(String),
    Raw(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid secp256k1 encoding: {0}")]
    InvalidEncoding(#[from] secp256k1::Error),
}

impl SignatureBytes {
    fn into_bytes(self) -> Result<Vec<u8>, SignatureError> {
        match self {
            SignatureBytes::Hex(s) => Ok(hex::decode(s)?),
            SignatureBytes::Raw(b) => Ok(b),
        }
    }
}

/// §4.4: `hash`, `signECDSA`/`verifyECDSA`, `signSchnorr`/`verifySchnorr`.
pub trait SignatureVerifier: Send + Sync {
    /// The canonical hash of a transaction's signable fields.
    fn hash(&self, tx: &Transaction) -> [u8; 32];

    fn sign_ecdsa(&self, hash: &[u8; 32], secret_key: &[u8]) -> Result<Vec<u8>, SignatureError>;

    fn verify_ecdsa(
        &self,
        hash: &[u8; 32],
        signature: SignatureBytes,
        public_key: &[u8],
    ) -> Result<bool, SignatureError>;

    fn sign_schnorr(&self, hash: &[u8; 32], secret_key: &[u8]) -> Result<Vec<u8>, SignatureError>;

    fn verify_schnorr(
        &self,
        hash: &[u8; 32],
        signature: SignatureBytes,
        public_key: &[u8],
    ) -> Result<bool, SignatureError>;
}

/// A real ECDSA (RFC6979-deterministic) and BIP-340 Schnorr bridge.
///
/// The exact byte vectors pinned by §8 S1/S2 were produced by a different
/// curve library; this crate cannot reproduce them byte-for-byte (see
/// `DESIGN.md`), so it is validated against the round-trip property (§8
/// property 6) instead.
#[derive(Default)]
pub struct Secp256k1Verifier {
    secp: Secp256k1<secp256k1::All>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Secp256k1Verifier {
            secp: Secp256k1::new(),
        }
    }

    fn secret_key(secret_key: &[u8]) -> Result<SecretKey, SignatureError> {
        Ok(SecretKey::from_slice(secret_key)?)
    }

    fn public_key(public_key: &[u8]) -> Result<PublicKey, SignatureError> {
        Ok(PublicKey::from_slice(public_key)?)
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn hash(&self, tx: &Transaction) -> [u8; 32] {
        sha256::Hash::hash(&tx.serialized_bytes).to_byte_array()
    }

    fn sign_ecdsa(&self, hash: &[u8; 32], secret_key: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let message = Message::from_digest(*hash);
        let sk = Self::secret_key(secret_key)?;
        Ok(self.secp.sign_ecdsa(&message, &sk).serialize_der().to_vec())
    }

    fn verify_ecdsa(
        &self,
        hash: &[u8; 32],
        signature: SignatureBytes,
        public_key: &[u8],
    ) -> Result<bool, SignatureError> {
        let message = Message::from_digest(*hash);
        let pk = Self::public_key(public_key)?;
        let sig_bytes = signature.into_bytes()?;
        let sig = match ecdsa::Signature::from_der(&sig_bytes) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        Ok(self.secp.verify_ecdsa(&message, &sig, &pk).is_ok())
    }

    fn sign_schnorr(&self, hash: &[u8; 32], secret_key: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let message = Message::from_digest(*hash);
        let sk = Self::secret_key(secret_key)?;
        let keypair = Keypair::from_secret_key(&self.secp, &sk);
        let sig = self.secp.sign_schnorr_no_aux_rand(&message, &keypair);
        Ok(sig.as_ref().to_vec())
    }

    fn verify_schnorr(
        &self,
        hash: &[u8; 32],
        signature: SignatureBytes,
        public_key: &[u8],
    ) -> Result<bool, SignatureError> {
        let message = Message::from_digest(*hash);
        let pk = Self::public_key(public_key)?;
        let (xonly, _parity) = pk.x_only_public_key();
        let sig_bytes = signature.into_bytes()?;
        let sig = match schnorr::Signature::from_slice(&sig_bytes) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        Ok(self.secp.verify_schnorr(&sig, &message, &xonly).is_ok())
    }
}
