pub mod positions_calculator;
pub mod positions_model;

#[cfg(test)]
mod positions_calculator_tests;

pub use positions_calculator::PositionsCalculator;
pub use positions_model::{Lot, PortfolioSnapshot, Position};
