//! Domain models for the bakery inventory platform

mod item;
mod ledger;
mod price;
mod shop;

pub use item::*;
pub use ledger::*;
pub use price::*;
pub use shop::*;
