pub mod nav_model;
pub mod nav_store;

pub use nav_model::{NavPoint, NavPointPair};
pub use nav_store::NavStore;
