//! Error types shared by the order model
//!
//! Errors here are caller errors: they are never retried.

use thiserror::Error;

/// Order construction and pairing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid order input: {0}")]
    InvalidOrderInput(String),

    #[error("Orders do not form a valid match: {0}")]
    InvalidPair(String),
}
