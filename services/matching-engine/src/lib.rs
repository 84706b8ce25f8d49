//! Matching Engine Service
//!
//! Pairs incoming signed orders with resting ones. The book is an
//! `OrderBookStore`; the engine claims a counterparty atomically, validates
//! the pair and hands it to the caller for settlement.
//!
//! **Key Invariants:**
//! - A resting order is claimed by at most one incoming order
//! - Only whole-quantity matches on the same asset at a crossing price
//! - Expired orders are never matched
//! - A failed settlement returns both orders to the book

pub mod book;
pub mod engine;
pub mod events;
pub mod matching;

pub use book::{BookError, InMemoryOrderBook, OrderBookStore};
pub use engine::{ClaimOutcome, EngineError, MatchingEngine};
pub use events::BookEvent;
pub use matching::MatchPolicy;
