pub mod price;

pub use price::{BitcoinPrice, NewBitcoinPrice};
