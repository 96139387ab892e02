//! Transaction ledger domain models.
//!
//! The ledger is append-only. Positions, cash and contributions are always
//! reconstructed from it, so a transaction is never mutated after it is
//! accepted; corrections are made with offsetting entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{errors::LedgerError, Error, Result};

/// The kind of a ledger entry. The set is closed; unknown kinds are
/// rejected at the boundary rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Purchase of fund shares with external money.
    Buy,
    /// Redemption of fund shares, proceeds leave the portfolio.
    Sell,
    /// Cash dividend paid into the portfolio's cash balance.
    DividendCash,
    /// Dividend paid as additional shares at the distribution NAV.
    DividendReinvest,
    /// Standalone fee charged against the cash balance.
    Fee,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
            TransactionKind::DividendCash => "DIVIDEND_CASH",
            TransactionKind::DividendReinvest => "DIVIDEND_REINVEST",
            TransactionKind::Fee => "FEE",
        }
    }

    /// Whether entries of this kind carry a share quantity.
    pub fn affects_shares(&self) -> bool {
        matches!(
            self,
            TransactionKind::Buy | TransactionKind::Sell | TransactionKind::DividendReinvest
        )
    }

    /// Sign with which this kind's amount enters net contribution.
    /// Buys bring external money in; sells and cash dividends pay money
    /// out. Reinvested dividends and fees move nothing across the
    /// portfolio boundary.
    pub fn contribution_sign(&self) -> i32 {
        match self {
            TransactionKind::Buy => 1,
            TransactionKind::Sell | TransactionKind::DividendCash => -1,
            TransactionKind::DividendReinvest | TransactionKind::Fee => 0,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(TransactionKind::Buy),
            "SELL" => Ok(TransactionKind::Sell),
            "DIVIDEND_CASH" => Ok(TransactionKind::DividendCash),
            "DIVIDEND_REINVEST" => Ok(TransactionKind::DividendReinvest),
            "FEE" => Ok(TransactionKind::Fee),
            _ => Err(Error::Ledger(LedgerError::InvalidTransaction(format!(
                "Unknown transaction kind: {s}"
            )))),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub fund_id: String,
    pub kind: TransactionKind,
    /// Date the trade is effective for position reconstruction.
    pub trade_date: NaiveDate,
    /// Signed share delta. Positive for buys and reinvestments, negative
    /// for sells, zero for pure cash kinds. Reversal entries carry the
    /// opposite sign of the original.
    pub shares: Decimal,
    /// NAV per share the entry was executed at. Zero for cash kinds with
    /// no price.
    pub nav: Decimal,
    /// Unsigned money magnitude of the entry; direction comes from the
    /// kind (negated on reversal entries).
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<NaiveDate>,
    /// ID of the transaction this entry offsets, if it is a reversal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverses: Option<String>,
    /// Monotonic insertion order, used to break ties between entries that
    /// share a trade date.
    pub sequence: i64,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_reversal(&self) -> bool {
        self.reverses.is_some()
    }
}

/// Input model for appending a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub portfolio_id: String,
    pub fund_id: String,
    pub kind: TransactionKind,
    pub trade_date: NaiveDate,
    pub shares: Decimal,
    pub nav: Decimal,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<NaiveDate>,
}

impl NewTransaction {
    /// Validates field-level rules. The running-balance check needs the
    /// existing ledger and lives in the service.
    pub fn validate(&self) -> Result<()> {
        if self.portfolio_id.trim().is_empty() {
            return Err(invalid("Portfolio ID cannot be empty"));
        }
        if self.fund_id.trim().is_empty() {
            return Err(invalid("Fund ID cannot be empty"));
        }
        if self.amount < Decimal::ZERO {
            return Err(invalid("Amount cannot be negative"));
        }
        if self.kind.affects_shares() {
            if self.nav <= Decimal::ZERO {
                return Err(invalid("NAV must be positive for share transactions"));
            }
        } else if self.nav < Decimal::ZERO {
            return Err(invalid("NAV cannot be negative"));
        }
        self.validate_share_sign()?;
        if let Some(settlement) = self.settlement_date {
            if settlement < self.trade_date {
                return Err(invalid("Settlement date cannot precede the trade date"));
            }
        }
        Ok(())
    }

    /// Share sign convention per kind. Skipped for reversal entries, which
    /// deliberately carry the opposite sign.
    pub fn validate_share_sign(&self) -> Result<()> {
        match self.kind {
            TransactionKind::Buy | TransactionKind::DividendReinvest => {
                if self.shares <= Decimal::ZERO {
                    return Err(invalid(&format!(
                        "{} requires a positive share quantity",
                        self.kind
                    )));
                }
            }
            TransactionKind::Sell => {
                if self.shares >= Decimal::ZERO {
                    return Err(invalid("SELL requires a negative share quantity"));
                }
            }
            TransactionKind::DividendCash | TransactionKind::Fee => {
                if !self.shares.is_zero() {
                    return Err(invalid(&format!(
                        "{} must not carry a share quantity",
                        self.kind
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::Ledger(LedgerError::InvalidTransaction(msg.to_string()))
}
