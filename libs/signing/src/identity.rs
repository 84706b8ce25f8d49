//! Custodial identity derivation
//!
//! Each user's signing key is derived from the venue master secret and the
//! user identifier, so no per-user key material is stored. Whoever holds the
//! master secret can sign for every user.

use ed25519_dalek::{Signature, Signer, SigningKey};
use sha2::{Digest, Sha256};
use std::fmt;
use types::ids::{SignerAddress, SubmitterId};

use crate::SigningError;

/// Venue-wide secret all custodial identities are derived from
#[derive(Clone)]
pub struct MasterSecret(Vec<u8>);

impl MasterSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SigningError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SigningError::EmptyMasterSecret);
        }
        Ok(Self(secret))
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret(<redacted>)")
    }
}

/// Signing key of one user
#[derive(Clone)]
pub struct SigningIdentity {
    key: SigningKey,
}

impl SigningIdentity {
    pub fn address(&self) -> SignerAddress {
        SignerAddress::from_hex(hex::encode(self.key.verifying_key().to_bytes()))
    }

    pub(crate) fn sign_digest(&self, digest: &[u8; 32]) -> Signature {
        self.key.sign(digest)
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish()
    }
}

/// Derive the signing identity for `submitter`.
///
/// The Ed25519 seed is `SHA256(master_secret ‖ submitter_id)`. Pure and total.
pub fn derive_identity(secret: &MasterSecret, submitter: &SubmitterId) -> SigningIdentity {
    let seed: [u8; 32] = Sha256::new()
        .chain_update(&secret.0)
        .chain_update(submitter.as_str().as_bytes())
        .finalize()
        .into();

    SigningIdentity {
        key: SigningKey::from_bytes(&seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> MasterSecret {
        MasterSecret::new("venue-master-secret").unwrap()
    }

    fn user(id: &str) -> SubmitterId {
        SubmitterId::try_new(id).unwrap()
    }

    #[test]
    fn test_derivation_deterministic() {
        let a = derive_identity(&secret(), &user("alice"));
        let b = derive_identity(&secret(), &user("alice"));
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_distinct_users_distinct_identities() {
        let a = derive_identity(&secret(), &user("alice"));
        let b = derive_identity(&secret(), &user("bob"));
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_distinct_secrets_distinct_identities() {
        let other = MasterSecret::new("another-secret").unwrap();
        assert_ne!(
            derive_identity(&secret(), &user("alice")).address(),
            derive_identity(&other, &user("alice")).address()
        );
    }

    #[test]
    fn test_address_is_hex_public_key() {
        let addr = derive_identity(&secret(), &user("alice")).address();
        assert_eq!(addr.as_str().len(), 64);
        assert!(hex::decode(addr.as_str()).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(MasterSecret::new("").unwrap_err(), SigningError::EmptyMasterSecret);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", secret());
        assert!(!rendered.contains("venue-master-secret"));
    }
}
