//! Venue gateway
//!
//! HTTP surface of the graded-card venue: order intake, open-order listing
//! and health. Intake signs orders custodially, matches them against the
//! book and dispatches matched pairs for settlement.

pub mod config;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod sweep;
