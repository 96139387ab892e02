//! Valuation service: marks replayed positions to stored NAVs.

use chrono::{NaiveDate, Utc};
use log::warn;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::valuation_model::{
    AccountValuation, FundValuation, PortfolioValuation, ValuationWarning,
};
use super::valuation_traits::ValuationServiceTrait;
use crate::errors::Result;
use crate::ledger::TransactionRepositoryTrait;
use crate::navs::NavStore;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::positions::PositionsCalculator;

pub struct ValuationService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    nav_store: Arc<dyn NavStore>,
}

impl ValuationService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        nav_store: Arc<dyn NavStore>,
    ) -> Self {
        Self {
            transaction_repository,
            portfolio_repository,
            nav_store,
        }
    }
}

impl ValuationServiceTrait for ValuationService {
    fn valuate_portfolio(
        &self,
        portfolio_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let transactions = self
            .transaction_repository
            .list(portfolio_id, None, Some(as_of))?;
        let snapshot = PositionsCalculator::calculate(portfolio_id, &transactions, as_of)?;

        let mut open: Vec<_> = snapshot.open_positions().collect();
        open.sort_by(|a, b| a.fund_id.cmp(&b.fund_id));

        let mut funds = Vec::with_capacity(open.len());
        let mut warnings = Vec::new();
        let mut investment_value = Decimal::ZERO;
        let mut cost_basis = Decimal::ZERO;
        let mut unrealized_gain = Decimal::ZERO;
        let mut day_change = Decimal::ZERO;

        for position in open {
            let Some(pair) = self.nav_store.latest_with_previous(&position.fund_id, as_of)?
            else {
                // A fund without any usable NAV cannot be marked; it is
                // excluded from the totals rather than valued at zero.
                warn!(
                    "No NAV on or before {} for fund {}, excluding from valuation",
                    as_of, position.fund_id
                );
                warnings.push(ValuationWarning::MissingNav {
                    fund_id: position.fund_id.clone(),
                });
                continue;
            };

            let market_value = position.quantity * pair.latest.nav;
            let fund_unrealized = market_value - position.total_cost_basis;
            let fund_day_change = pair
                .previous
                .as_ref()
                .map(|previous| position.quantity * (pair.latest.nav - previous.nav));

            investment_value += market_value;
            cost_basis += position.total_cost_basis;
            unrealized_gain += fund_unrealized;
            day_change += fund_day_change.unwrap_or(Decimal::ZERO);

            funds.push(FundValuation {
                fund_id: position.fund_id.clone(),
                quantity: position.quantity,
                average_cost: position.average_cost,
                cost_basis: position.total_cost_basis,
                nav: pair.latest.nav,
                nav_date: pair.latest.date,
                market_value,
                unrealized_gain: fund_unrealized,
                realized_gain: position.realized_gain,
                day_change: fund_day_change,
            });
        }

        let total_value = investment_value + snapshot.cash_balance;
        let return_rate = if snapshot.net_contribution > Decimal::ZERO {
            Some((total_value - snapshot.net_contribution) / snapshot.net_contribution)
        } else {
            None
        };

        Ok(PortfolioValuation {
            portfolio_id: portfolio_id.to_string(),
            as_of,
            funds,
            warnings,
            cash_balance: snapshot.cash_balance,
            investment_value,
            total_value,
            cost_basis,
            net_contribution: snapshot.net_contribution,
            realized_gain: snapshot.total_realized_gain(),
            unrealized_gain,
            day_change,
            return_rate,
            calculated_at: Utc::now(),
        })
    }

    fn valuate_account(
        &self,
        account_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountValuation> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let portfolios = self.portfolio_repository.list_by_account(account_id)?;

        let mut valuations = Vec::with_capacity(portfolios.len());
        let mut total_value = Decimal::ZERO;
        let mut net_contribution = Decimal::ZERO;
        let mut realized_gain = Decimal::ZERO;
        let mut unrealized_gain = Decimal::ZERO;
        let mut day_change = Decimal::ZERO;

        for portfolio in &portfolios {
            let valuation = self.valuate_portfolio(&portfolio.id, Some(as_of))?;
            total_value += valuation.total_value;
            net_contribution += valuation.net_contribution;
            realized_gain += valuation.realized_gain;
            unrealized_gain += valuation.unrealized_gain;
            day_change += valuation.day_change;
            valuations.push(valuation);
        }

        let return_rate = if net_contribution > Decimal::ZERO {
            Some((total_value - net_contribution) / net_contribution)
        } else {
            None
        };

        Ok(AccountValuation {
            account_id: account_id.to_string(),
            as_of,
            portfolios: valuations,
            total_value,
            net_contribution,
            realized_gain,
            unrealized_gain,
            day_change,
            return_rate,
            calculated_at: Utc::now(),
        })
    }
}
