//! End-to-end flow over the in-memory storage: account creation, ledger
//! writes, NAV sync and valuation working together.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use fundtrack_core::accounts::{AccountService, AccountServiceTrait, NewAccount};
use fundtrack_core::ledger::{
    LedgerService, LedgerServiceTrait, NewTransaction, TransactionKind,
};
use fundtrack_core::navs::NavStore;
use fundtrack_core::sync::{FundSyncStatus, TaskManager, TaskManagerConfig};
use fundtrack_core::valuation::{ValuationService, ValuationServiceTrait, ValuationWarning};
use fundtrack_fund_data::{FixtureProvider, NavQuote};
use fundtrack_storage_memory::{
    AccountMemoryRepository, NavMemoryStore, PortfolioMemoryRepository, SyncJobMemoryStore,
    TransactionMemoryRepository,
};

struct App {
    accounts: AccountService,
    ledger: LedgerService,
    valuation: ValuationService,
    manager: TaskManager,
    navs: Arc<NavMemoryStore>,
}

fn app(provider: FixtureProvider) -> App {
    let account_repo = Arc::new(AccountMemoryRepository::new());
    let portfolio_repo = Arc::new(PortfolioMemoryRepository::new());
    let transaction_repo = Arc::new(TransactionMemoryRepository::new());
    let navs = Arc::new(NavMemoryStore::new());
    let jobs = Arc::new(SyncJobMemoryStore::new());

    App {
        accounts: AccountService::new(
            account_repo,
            portfolio_repo.clone(),
            transaction_repo.clone(),
        ),
        ledger: LedgerService::new(transaction_repo.clone()),
        valuation: ValuationService::new(
            transaction_repo.clone(),
            portfolio_repo,
            navs.clone(),
        ),
        manager: TaskManager::new(
            Arc::new(provider),
            navs.clone(),
            transaction_repo,
            jobs,
            TaskManagerConfig::default(),
        ),
        navs,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn quote(fund_id: &str, date: NaiveDate, nav: Decimal) -> NavQuote {
    NavQuote {
        fund_id: fund_id.to_string(),
        date,
        nav,
        accumulated_nav: None,
        daily_return: None,
    }
}

async fn default_portfolio(app: &App, account_name: &str) -> String {
    let account = app
        .accounts
        .create_account(NewAccount {
            id: None,
            name: account_name.to_string(),
        })
        .await
        .unwrap();
    // The default portfolio was created with the account.
    let valuation = app.valuation.valuate_account(&account.id, None).unwrap();
    valuation.portfolios[0].portfolio_id.clone()
}

fn buy(portfolio_id: &str, fund_id: &str, d: NaiveDate, shares: Decimal, nav: Decimal) -> NewTransaction {
    NewTransaction {
        id: None,
        portfolio_id: portfolio_id.to_string(),
        fund_id: fund_id.to_string(),
        kind: TransactionKind::Buy,
        trade_date: d,
        shares,
        nav,
        amount: shares * nav,
        settlement_date: None,
    }
}

#[tokio::test]
async fn buys_sells_sync_and_valuation_agree() {
    let provider = FixtureProvider::new().with_nav_series(
        "110011",
        vec![
            quote("110011", date(2024, 5, 31), dec!(7.9)),
            quote("110011", date(2024, 6, 3), dec!(8)),
        ],
    );
    let app = app(provider);
    let portfolio_id = default_portfolio(&app, "Main").await;

    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 1, 5), dec!(10), dec!(5)))
        .await
        .unwrap();
    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 2, 5), dec!(10), dec!(7)))
        .await
        .unwrap();
    app.ledger
        .record_transaction(NewTransaction {
            id: None,
            portfolio_id: portfolio_id.clone(),
            fund_id: "110011".to_string(),
            kind: TransactionKind::Sell,
            trade_date: date(2024, 3, 5),
            shares: dec!(-15),
            nav: dec!(8),
            amount: dec!(120),
            settlement_date: None,
        })
        .await
        .unwrap();

    // The ledger references the fund, so a scheduler pass syncs it.
    let outcomes = app.manager.run_due_jobs(chrono::Utc::now()).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, FundSyncStatus::Success);
    assert!(app
        .navs
        .latest_on_or_before("110011", date(2024, 6, 3))
        .unwrap()
        .is_some());

    let valuation = app
        .valuation
        .valuate_portfolio(&portfolio_id, Some(date(2024, 6, 3)))
        .unwrap();

    // 5 shares remain from the second lot at cost 7 each.
    let fund = &valuation.funds[0];
    assert_eq!(fund.quantity, dec!(5));
    assert_eq!(fund.cost_basis, dec!(35));
    assert_eq!(fund.average_cost, dec!(7));
    assert_eq!(fund.realized_gain, dec!(35));
    assert_eq!(fund.market_value, dec!(40.0));
    assert_eq!(fund.day_change, Some(dec!(0.5)));

    // 50 + 70 bought, 120 sold back out.
    assert_eq!(valuation.net_contribution, Decimal::ZERO);
    assert_eq!(valuation.total_value, dec!(40.0));
    assert_eq!(valuation.return_rate, None);
    assert!(valuation.warnings.is_empty());
}

#[tokio::test]
async fn missing_nav_yields_a_partial_valuation() {
    let provider = FixtureProvider::new().with_nav_series(
        "110011",
        vec![quote("110011", date(2024, 6, 3), dec!(2))],
    );
    let app = app(provider);
    let portfolio_id = default_portfolio(&app, "Main").await;

    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 1, 5), dec!(100), dec!(1)))
        .await
        .unwrap();
    app.ledger
        .record_transaction(buy(&portfolio_id, "161725", date(2024, 1, 5), dec!(100), dec!(1)))
        .await
        .unwrap();

    app.manager.run_due_jobs(chrono::Utc::now()).await.unwrap();

    let valuation = app
        .valuation
        .valuate_portfolio(&portfolio_id, Some(date(2024, 6, 3)))
        .unwrap();
    assert_eq!(
        valuation.warnings,
        vec![ValuationWarning::MissingNav {
            fund_id: "161725".to_string()
        }]
    );
    // Only the fund with a NAV contributes to the totals.
    assert_eq!(valuation.funds.len(), 1);
    assert_eq!(valuation.investment_value, dec!(200.0));
}

#[tokio::test]
async fn money_weighted_return_on_a_single_contribution() {
    let provider = FixtureProvider::new().with_nav_series(
        "110011",
        vec![quote("110011", date(2024, 6, 3), dec!(1.1))],
    );
    let app = app(provider);
    let portfolio_id = default_portfolio(&app, "Main").await;

    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 1, 5), dec!(1000), dec!(1)))
        .await
        .unwrap();
    app.manager.run_due_jobs(chrono::Utc::now()).await.unwrap();

    let valuation = app
        .valuation
        .valuate_portfolio(&portfolio_id, Some(date(2024, 6, 3)))
        .unwrap();
    assert_eq!(valuation.total_value, dec!(1100.0));
    assert_eq!(valuation.return_rate, Some(dec!(0.1)));
}

#[tokio::test]
async fn reversal_flows_through_to_valuation() {
    let provider = FixtureProvider::new().with_nav_series(
        "110011",
        vec![quote("110011", date(2024, 6, 3), dec!(1.5))],
    );
    let app = app(provider);
    let portfolio_id = default_portfolio(&app, "Main").await;

    let first = app
        .ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 1, 5), dec!(100), dec!(1)))
        .await
        .unwrap();
    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 2, 5), dec!(50), dec!(1.2)))
        .await
        .unwrap();
    app.ledger.reverse_transaction(&first.id).await.unwrap();

    app.manager.run_due_jobs(chrono::Utc::now()).await.unwrap();
    let valuation = app
        .valuation
        .valuate_portfolio(&portfolio_id, Some(date(2024, 6, 3)))
        .unwrap();

    // Only the second buy survives the reversal.
    assert_eq!(valuation.funds[0].quantity, dec!(50));
    assert_eq!(valuation.funds[0].cost_basis, dec!(60.0));
    assert_eq!(valuation.net_contribution, dec!(60.0));
}

#[tokio::test]
async fn deleting_an_account_cascades_to_transactions() {
    let app = app(FixtureProvider::new());
    let account = app
        .accounts
        .create_account(NewAccount {
            id: None,
            name: "Main".to_string(),
        })
        .await
        .unwrap();
    let valuation = app.valuation.valuate_account(&account.id, None).unwrap();
    let portfolio_id = valuation.portfolios[0].portfolio_id.clone();

    app.ledger
        .record_transaction(buy(&portfolio_id, "110011", date(2024, 1, 5), dec!(10), dec!(1)))
        .await
        .unwrap();
    assert_eq!(app.ledger.history(&portfolio_id, None, None).unwrap().len(), 1);

    app.accounts.delete_account(&account.id).await.unwrap();
    assert!(app.ledger.history(&portfolio_id, None, None).unwrap().is_empty());
    assert!(app.valuation.valuate_account(&account.id, None).unwrap().portfolios.is_empty());
}
