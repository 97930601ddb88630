//! Market data models
//!
//! - `exchange` - The closed set of supported exchanges (Exchange)
//! - `market_type` - Contract classification (MarketType)
//! - `market` - The canonical output record (Market, Fees, Precision, MinQuantity)

mod exchange;
mod market;
mod market_type;

pub use exchange::Exchange;
pub use market::{Fees, Market, MinQuantity, Precision};
pub use market_type::MarketType;
