pub mod valuation_model;
pub mod valuation_service;
pub mod valuation_traits;


pub use valuation_model::{
    AccountValuation, FundValuation, PortfolioValuation, ValuationWarning,
};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
