pub mod ledger_model;
pub mod ledger_service;
pub mod ledger_traits;


pub use ledger_model::{NewTransaction, Transaction, TransactionKind};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerServiceTrait, TransactionRepositoryTrait};
