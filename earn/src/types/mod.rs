//! Value types shared by every layer: coins and account addresses.

pub mod address;
pub mod coin;

pub use address::{AccAddress, AddressError};
pub use coin::{validate_denom, Coin, CoinError};
