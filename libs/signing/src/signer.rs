//! Order signing and verification
//!
//! `OrderSigner` is the only interface the intake path sees, so the custodial
//! implementation can be replaced by a hardware-backed or per-user KMS signer
//! without touching matching or settlement.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use types::ids::{SignerAddress, SubmitterId};
use types::order::Order;

use crate::domain::{signing_digest, SigningDomain};
use crate::identity::{derive_identity, MasterSecret, SigningIdentity};
use crate::SigningError;

/// Signs orders on behalf of submitters.
pub trait OrderSigner: Send + Sync {
    /// Signing identity (maker) used for `submitter`.
    fn signer_for(&self, submitter: &SubmitterId) -> Result<SignerAddress, SigningError>;

    /// Sign `order` as `submitter`. Returns the hex-encoded signature.
    fn sign(&self, submitter: &SubmitterId, order: &Order) -> Result<String, SigningError>;

    fn domain(&self) -> &SigningDomain;
}

/// Signer deriving every user's key from one master secret
#[derive(Debug, Clone)]
pub struct CustodialSigner {
    secret: MasterSecret,
    domain: SigningDomain,
}

impl CustodialSigner {
    pub fn new(secret: MasterSecret, domain: SigningDomain) -> Self {
        Self { secret, domain }
    }
}

impl OrderSigner for CustodialSigner {
    fn signer_for(&self, submitter: &SubmitterId) -> Result<SignerAddress, SigningError> {
        Ok(derive_identity(&self.secret, submitter).address())
    }

    fn sign(&self, submitter: &SubmitterId, order: &Order) -> Result<String, SigningError> {
        let identity = derive_identity(&self.secret, submitter);
        sign_order(&self.domain, order, &identity)
    }

    fn domain(&self) -> &SigningDomain {
        &self.domain
    }
}

/// Sign `order` with `identity` under `domain`.
///
/// Fails if the order's maker is not `identity`.
pub fn sign_order(
    domain: &SigningDomain,
    order: &Order,
    identity: &SigningIdentity,
) -> Result<String, SigningError> {
    let address = identity.address();
    if order.maker != address {
        return Err(SigningError::MakerMismatch {
            maker: order.maker.to_string(),
            signer: address.to_string(),
        });
    }

    let digest = signing_digest(domain, order);
    Ok(hex::encode(identity.sign_digest(&digest).to_bytes()))
}

/// Verify that `signature` was produced by `order.maker` under `domain`.
pub fn verify_order(
    domain: &SigningDomain,
    order: &Order,
    signature: &str,
) -> Result<(), SigningError> {
    let pub_key_bytes: [u8; 32] = hex::decode(order.maker.as_str())
        .map_err(|_| SigningError::InvalidPublicKey)?
        .try_into()
        .map_err(|_| SigningError::InvalidPublicKey)?;
    let sig_bytes: [u8; 64] = hex::decode(signature)
        .map_err(|_| SigningError::InvalidSignature)?
        .try_into()
        .map_err(|_| SigningError::InvalidSignature)?;

    let verifying_key =
        VerifyingKey::from_bytes(&pub_key_bytes).map_err(|_| SigningError::InvalidPublicKey)?;
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify(&signing_digest(domain, order), &signature)
        .map_err(|_| SigningError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use types::ids::AssetId;
    use types::order::Side;

    fn domain() -> SigningDomain {
        SigningDomain::new("GradedCardVenue", "1", 1, "0xc0ffee")
    }

    fn signer() -> CustodialSigner {
        CustodialSigner::new(MasterSecret::new("test-secret").unwrap(), domain())
    }

    fn alice() -> SubmitterId {
        SubmitterId::try_new("alice").unwrap()
    }

    fn order_for(maker: SignerAddress) -> Order {
        Order::build(
            maker,
            AssetId(7),
            Decimal::new(125050, 2),
            Side::Sell,
            1,
            42,
            Utc.timestamp_opt(1_708_123_456, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = signer();
        let order = order_for(signer.signer_for(&alice()).unwrap());
        let signature = signer.sign(&alice(), &order).unwrap();
        assert!(verify_order(&domain(), &order, &signature).is_ok());
    }

    #[test]
    fn test_signature_deterministic() {
        let signer = signer();
        let order = order_for(signer.signer_for(&alice()).unwrap());
        assert_eq!(
            signer.sign(&alice(), &order).unwrap(),
            signer.sign(&alice(), &order).unwrap()
        );
    }

    #[test]
    fn test_signature_length() {
        let signer = signer();
        let order = order_for(signer.signer_for(&alice()).unwrap());
        // Ed25519 signature = 64 bytes = 128 hex chars
        assert_eq!(signer.sign(&alice(), &order).unwrap().len(), 128);
    }

    #[test]
    fn test_sign_for_other_maker_fails() {
        let signer = signer();
        let bob = SubmitterId::try_new("bob").unwrap();
        let order = order_for(signer.signer_for(&bob).unwrap());
        assert!(matches!(
            signer.sign(&alice(), &order),
            Err(SigningError::MakerMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_tampered_order_fails() {
        let signer = signer();
        let mut order = order_for(signer.signer_for(&alice()).unwrap());
        let signature = signer.sign(&alice(), &order).unwrap();

        order.price = types::numeric::Price::from_units(1);
        assert_eq!(
            verify_order(&domain(), &order, &signature),
            Err(SigningError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_other_domain_fails() {
        let signer = signer();
        let order = order_for(signer.signer_for(&alice()).unwrap());
        let signature = signer.sign(&alice(), &order).unwrap();

        let mut foreign = domain();
        foreign.network_id = 5;
        assert_eq!(
            verify_order(&foreign, &order, &signature),
            Err(SigningError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        use ed25519_dalek::SigningKey;
        use rand::rngs::OsRng;

        let signer = signer();
        let mut order = order_for(signer.signer_for(&alice()).unwrap());
        let signature = signer.sign(&alice(), &order).unwrap();

        let other_key = SigningKey::generate(&mut OsRng);
        order.maker = SignerAddress::from_hex(hex::encode(other_key.verifying_key().to_bytes()));
        assert_eq!(
            verify_order(&domain(), &order, &signature),
            Err(SigningError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_malformed_inputs() {
        let signer = signer();
        let order = order_for(signer.signer_for(&alice()).unwrap());
        assert_eq!(
            verify_order(&domain(), &order, "not_hex"),
            Err(SigningError::InvalidSignature)
        );

        let bad_maker = order_for(SignerAddress::from_hex("zz"));
        let signature = signer.sign(&alice(), &order).unwrap();
        assert_eq!(
            verify_order(&domain(), &bad_maker, &signature),
            Err(SigningError::InvalidPublicKey)
        );
    }
}
