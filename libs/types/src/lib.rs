//! Types library for the graded-card venue
//!
//! Core type definitions shared by signing, matching, persistence,
//! settlement and the intake gateway.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, SubmitterId, AssetId, SignerAddress, SettlementReference)
//! - `numeric`: Fixed-point settlement prices and quantities
//! - `order`: Orders, signed orders and matched pairs
//! - `settlement`: Settlement outcomes
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod settlement;
pub mod errors;
