//! Core error types for the Fundtrack application.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! are converted to these types by the storage layer.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use thiserror::Error;

use fundtrack_fund_data::FundDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Fund data error: {0}")]
    FundData(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by the transaction ledger and position reconstruction.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The write has malformed fields or violates sign conventions.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The write would take the running share balance below zero.
    #[error("Insufficient shares of fund {fund_id} in portfolio {portfolio_id} on {date}")]
    InsufficientShares {
        portfolio_id: String,
        fund_id: String,
        date: NaiveDate,
    },

    /// The referenced transaction already has an offsetting entry.
    #[error("Transaction {0} has already been reversed")]
    AlreadyReversed(String),

    /// Replay found an impossible stored state (e.g. a negative running
    /// balance that bypassed the write-time check). Fatal for the affected
    /// portfolio's valuation.
    #[error("Ledger corruption detected: {0}")]
    Corruption(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Storage-agnostic error type for repository operations.
///
/// Uses `String` for details so concrete storage layers can convert their
/// engine-specific errors into this format.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Internal storage error: {0}")]
    Internal(String),
}

// === From implementations for common error types ===

impl From<FundDataError> for Error {
    fn from(err: FundDataError) -> Self {
        Error::FundData(err.to_string())
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
