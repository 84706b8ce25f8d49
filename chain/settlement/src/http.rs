//! Remote settlement authority over HTTP
//!
//! `POST {base_url}/settlements` with `{ "buy": SignedOrder, "sell": SignedOrder }`.
//! A 2xx answer carries `{ "reference": "..." }`. Any other status is a
//! rejection; transport failures mean the authority is unreachable.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::ids::SettlementReference;
use types::order::{MatchedPair, SignedOrder};

use crate::authority::SettlementAuthority;
use crate::errors::SettlementError;

#[derive(Debug, Serialize)]
pub struct SettlementRequest<'a> {
    pub buy: &'a SignedOrder,
    pub sell: &'a SignedOrder,
}

#[derive(Debug, Deserialize)]
pub struct SettlementResponse {
    pub reference: String,
}

pub struct HttpSettlementAuthority {
    client: Client,
    endpoint: String,
}

impl HttpSettlementAuthority {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/settlements", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SettlementAuthority for HttpSettlementAuthority {
    async fn settle(&self, pair: &MatchedPair) -> Result<SettlementReference, SettlementError> {
        let request = SettlementRequest {
            buy: pair.buy(),
            sell: pair.sell(),
        };
        debug!(endpoint = %self.endpoint, buy_id = %pair.buy().id, sell_id = %pair.sell().id, "Submitting settlement");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SettlementError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SettlementError::Rejected(format!("{}: {}", status, body)));
        }

        let body: SettlementResponse = response
            .json()
            .await
            .map_err(|e| SettlementError::Rejected(format!("malformed response: {}", e)))?;
        if body.reference.is_empty() {
            return Err(SettlementError::Rejected("empty settlement reference".into()));
        }
        Ok(SettlementReference::new(body.reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path() {
        let authority = HttpSettlementAuthority::new(Client::new(), "http://ledger.local/");
        assert_eq!(authority.endpoint(), "http://ledger.local/settlements");

        let authority = HttpSettlementAuthority::new(Client::new(), "http://ledger.local/api");
        assert_eq!(authority.endpoint(), "http://ledger.local/api/settlements");
    }
}
