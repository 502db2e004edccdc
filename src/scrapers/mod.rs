pub mod rtech;
pub mod table;
pub mod traits;
pub mod types;

pub use rtech::RtechBrowserSource;
pub use traits::PriceSource;
pub use types::{AreaPrices, PriceQuote};
