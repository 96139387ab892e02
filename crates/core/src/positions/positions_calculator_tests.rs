use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::positions_calculator::PositionsCalculator;
use crate::errors::LedgerError;
use crate::ledger::{Transaction, TransactionKind};
use crate::Error;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(
    sequence: i64,
    kind: TransactionKind,
    trade_date: NaiveDate,
    shares: Decimal,
    nav: Decimal,
    amount: Decimal,
) -> Transaction {
    Transaction {
        id: format!("tx-{sequence}"),
        portfolio_id: "pf-1".to_string(),
        fund_id: "000001".to_string(),
        kind,
        trade_date,
        shares,
        nav,
        amount,
        settlement_date: None,
        reverses: None,
        sequence,
        created_at: Utc::now(),
    }
}

#[test]
fn fifo_sell_consumes_oldest_lots_first() {
    // 10 @ 5, then 10 @ 7, then sell 15 @ 8. The sale consumes the whole
    // first lot and half of the second.
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Buy, date(2024, 2, 1), dec!(10), dec!(7), dec!(70)),
        tx(3, TransactionKind::Sell, date(2024, 3, 1), dec!(-15), dec!(8), dec!(120)),
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let position = &snapshot.positions["000001"];

    assert_eq!(position.quantity, dec!(5));
    assert_eq!(position.total_cost_basis, dec!(35));
    assert_eq!(position.average_cost, dec!(7));
    // Realized: 15 * 8 - (50 + 35) = 35.
    assert_eq!(position.realized_gain, dec!(35));
    assert_eq!(position.lots.len(), 1);
    assert_eq!(position.lots[0].acquisition_nav, dec!(7));
}

#[test]
fn as_of_excludes_later_entries() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Sell, date(2024, 3, 1), dec!(-10), dec!(8), dec!(80)),
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 2, 1)).unwrap();
    assert_eq!(snapshot.positions["000001"].quantity, dec!(10));
    assert_eq!(snapshot.net_contribution, dec!(50));
}

#[test]
fn cash_balance_tracks_dividends_and_fees() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(100), dec!(1), dec!(100)),
        tx(2, TransactionKind::DividendCash, date(2024, 2, 1), Decimal::ZERO, Decimal::ZERO, dec!(12)),
        tx(3, TransactionKind::Fee, date(2024, 2, 5), Decimal::ZERO, Decimal::ZERO, dec!(2)),
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    assert_eq!(snapshot.cash_balance, dec!(10));
    // Cash dividends reduce net contribution; fees do not.
    assert_eq!(snapshot.net_contribution, dec!(88));
}

#[test]
fn dividend_reinvest_creates_a_new_lot() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(100), dec!(1), dec!(100)),
        tx(2, TransactionKind::DividendReinvest, date(2024, 2, 1), dec!(5), dec!(1.2), dec!(6)),
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let position = &snapshot.positions["000001"];
    assert_eq!(position.quantity, dec!(105));
    assert_eq!(position.total_cost_basis, dec!(106));
    assert_eq!(position.lots.len(), 2);
    // Reinvested dividends move no money across the portfolio boundary.
    assert_eq!(snapshot.net_contribution, dec!(100));
}

#[test]
fn reversed_buy_removes_basis_without_gain() {
    let mut reversal = tx(2, TransactionKind::Buy, date(2024, 1, 1), dec!(-10), dec!(5), dec!(-50));
    reversal.reverses = Some("tx-1".to_string());
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        reversal,
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let position = &snapshot.positions["000001"];
    assert_eq!(position.quantity, Decimal::ZERO);
    assert_eq!(position.realized_gain, Decimal::ZERO);
    assert_eq!(snapshot.net_contribution, Decimal::ZERO);
}

#[test]
fn reversed_sell_restores_shares_at_sale_nav() {
    let mut reversal = tx(3, TransactionKind::Sell, date(2024, 2, 1), dec!(10), dec!(8), dec!(-80));
    reversal.reverses = Some("tx-2".to_string());
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Sell, date(2024, 2, 1), dec!(-10), dec!(8), dec!(80)),
        reversal,
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let position = &snapshot.positions["000001"];
    assert_eq!(position.quantity, dec!(10));
    // The restored lot is priced at the sale NAV and the original gain
    // stays realized, so total gain is unchanged.
    assert_eq!(position.total_cost_basis, dec!(80));
    assert_eq!(position.realized_gain, dec!(30));
    // Only the original buy remains as contributed money once the sell
    // and its reversal cancel.
    assert_eq!(snapshot.net_contribution, dec!(50));
}

#[test]
fn oversold_ledger_is_reported_as_corruption() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Sell, date(2024, 2, 1), dec!(-15), dec!(8), dec!(120)),
    ];
    let err = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap_err();
    assert!(matches!(err, Error::Ledger(LedgerError::Corruption(_))));
}

#[test]
fn sell_without_a_position_is_corruption() {
    let txs = vec![tx(
        1,
        TransactionKind::Sell,
        date(2024, 1, 1),
        dec!(-5),
        dec!(8),
        dec!(40),
    )];
    let err = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap_err();
    assert!(matches!(err, Error::Ledger(LedgerError::Corruption(_))));
}

#[test]
fn replay_is_idempotent() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Buy, date(2024, 2, 1), dec!(10), dec!(7), dec!(70)),
        tx(3, TransactionKind::Sell, date(2024, 3, 1), dec!(-15), dec!(8), dec!(120)),
    ];
    let a = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let b = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    assert_eq!(
        a.positions["000001"].total_cost_basis,
        b.positions["000001"].total_cost_basis
    );
    assert_eq!(a.positions["000001"].quantity, b.positions["000001"].quantity);
    assert_eq!(a.net_contribution, b.net_contribution);
}

#[test]
fn fully_sold_position_drops_dust_lots() {
    let txs = vec![
        tx(1, TransactionKind::Buy, date(2024, 1, 1), dec!(10), dec!(5), dec!(50)),
        tx(2, TransactionKind::Sell, date(2024, 2, 1), dec!(-9.99995), dec!(8), dec!(79.9996)),
    ];
    let snapshot = PositionsCalculator::calculate("pf-1", &txs, date(2024, 12, 31)).unwrap();
    let position = &snapshot.positions["000001"];
    assert!(!position.is_open());
    assert!(position.lots.is_empty());
}
