//! Scripted settlement authority
//!
//! Answers from a queue of canned outcomes and records every pair it sees.
//! Once the script runs out it settles everything. Used to inject settlement
//! failures and latency.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use types::ids::{OrderId, SettlementReference};
use types::order::MatchedPair;

use crate::authority::SettlementAuthority;
use crate::errors::SettlementError;

#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<Result<SettlementReference, SettlementError>>,
    calls: Vec<(OrderId, OrderId)>,
}

#[derive(Debug, Default)]
pub struct ScriptedAuthority {
    script: Mutex<Script>,
    delay: Option<Duration>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the outcome of the next unscripted call.
    pub fn push(&self, outcome: Result<SettlementReference, SettlementError>) {
        self.lock().outcomes.push_back(outcome);
    }

    pub fn fail_next(&self, error: SettlementError) {
        self.push(Err(error));
    }

    /// `(buy id, sell id)` of every pair submitted so far.
    pub fn calls(&self) -> Vec<(OrderId, OrderId)> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SettlementAuthority for ScriptedAuthority {
    async fn settle(&self, pair: &MatchedPair) -> Result<SettlementReference, SettlementError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.lock();
        script.calls.push((pair.buy().id, pair.sell().id));
        let call = script.calls.len();
        script
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(SettlementReference::new(format!("0xscripted{:04}", call))))
    }
}
