//! Structured order encoding under a venue signing domain
//!
//! Mirrors typed structured-data signing: a domain separator binds signatures
//! to one venue deployment (name, version, network, settlement contract) and
//! a struct hash commits to every signed order field in a fixed layout.
//!
//! ```text
//! digest = SHA256(0x19 0x01 ‖ domainSeparator ‖ structHash(order))
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::order::Order;

/// Type string of the domain (hashed into the separator)
pub const DOMAIN_TYPE: &str =
    "VenueDomain(string name,string version,uint64 networkId,string settlementContract)";

/// Type string of the order struct (hashed into every struct hash)
pub const ORDER_TYPE: &str = "Order(string maker,uint64 assetId,uint64 price,bool isBuy,uint64 quantity,uint64 nonce,int64 expiry)";

const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// Signing domain of one venue deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub network_id: u64,
    /// Address of the settlement contract that will consume the signatures
    pub settlement_contract: String,
}

impl SigningDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        network_id: u64,
        settlement_contract: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            network_id,
            settlement_contract: settlement_contract.into(),
        }
    }

    /// Domain separator: hash of the domain type and each encoded field.
    pub fn separator(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(sha256(DOMAIN_TYPE.as_bytes()));
        hasher.update(sha256(self.name.as_bytes()));
        hasher.update(sha256(self.version.as_bytes()));
        hasher.update(self.network_id.to_be_bytes());
        hasher.update(sha256(self.settlement_contract.as_bytes()));
        hasher.finalize().into()
    }
}

/// Hash of the order's signed fields in fixed order and width.
pub fn order_struct_hash(order: &Order) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(sha256(ORDER_TYPE.as_bytes()));
    // dynamic fields are hashed, scalars are fixed-width big-endian
    hasher.update(sha256(order.maker.as_str().as_bytes()));
    hasher.update(order.asset_id.0.to_be_bytes());
    hasher.update(order.price.units().to_be_bytes());
    hasher.update([u8::from(order.side.is_buy())]);
    hasher.update(order.quantity.get().to_be_bytes());
    hasher.update(order.nonce.to_be_bytes());
    hasher.update(order.expiry.to_be_bytes());
    hasher.finalize().into()
}

/// Final digest that gets signed.
pub fn signing_digest(domain: &SigningDomain, order: &Order) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DIGEST_PREFIX);
    hasher.update(domain.separator());
    hasher.update(order_struct_hash(order));
    hasher.finalize().into()
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use types::ids::{AssetId, SignerAddress};
    use types::order::Side;

    fn domain() -> SigningDomain {
        SigningDomain::new("GradedCardVenue", "1", 1, "0x00000000000000000000000000000000c0ffee")
    }

    fn order(nonce: u64) -> Order {
        Order::build(
            SignerAddress::from_hex("cd".repeat(32)),
            AssetId(7),
            Decimal::new(10000, 2),
            Side::Buy,
            1,
            nonce,
            Utc.timestamp_opt(1_708_123_456, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(signing_digest(&domain(), &order(1)), signing_digest(&domain(), &order(1)));
    }

    #[test]
    fn test_digest_commits_to_every_field() {
        let base = order(1);
        let digest = signing_digest(&domain(), &base);

        let mut changed = base.clone();
        changed.nonce = 2;
        assert_ne!(signing_digest(&domain(), &changed), digest);

        let mut changed = base.clone();
        changed.side = Side::Sell;
        assert_ne!(signing_digest(&domain(), &changed), digest);

        let mut changed = base.clone();
        changed.asset_id = AssetId(8);
        assert_ne!(signing_digest(&domain(), &changed), digest);

        let mut changed = base.clone();
        changed.expiry += 1;
        assert_ne!(signing_digest(&domain(), &changed), digest);

        let mut changed = base;
        changed.maker = SignerAddress::from_hex("ef".repeat(32));
        assert_ne!(signing_digest(&domain(), &changed), digest);
    }

    #[test]
    fn test_digest_is_domain_separated() {
        let o = order(1);
        let mut other_network = domain();
        other_network.network_id = 137;
        assert_ne!(signing_digest(&domain(), &o), signing_digest(&other_network, &o));

        let mut other_contract = domain();
        other_contract.settlement_contract = "0xdead".into();
        assert_ne!(domain().separator(), other_contract.separator());

        let mut other_version = domain();
        other_version.version = "2".into();
        assert_ne!(domain().separator(), other_version.separator());
    }
}
