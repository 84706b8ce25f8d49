//! Signing: custodial identities and domain-separated order signatures
//!
//! - `identity`: per-user Ed25519 keys derived from the venue master secret
//! - `domain`: signing domain and the structured order digest
//! - `signer`: the `OrderSigner` seam, custodial signer, verification
//! - `nonce`: time-based nonce generation and replay tracking

pub mod domain;
pub mod identity;
pub mod nonce;
pub mod signer;

pub use domain::{signing_digest, SigningDomain};
pub use identity::{derive_identity, MasterSecret, SigningIdentity};
pub use nonce::{NonceGenerator, NonceTracker};
pub use signer::{sign_order, verify_order, CustodialSigner, OrderSigner};

/// Signing module errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Order maker {maker} is not the signing identity {signer}")]
    MakerMismatch { maker: String, signer: String },

    #[error("Master secret must not be empty")]
    EmptyMasterSecret,
}
