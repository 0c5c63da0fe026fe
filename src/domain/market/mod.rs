pub mod candle;
pub mod instrument;
pub mod order_book;

pub use candle::{Candle, CandleQuery, CandleSeries};
pub use instrument::{InstrumentKind, Interval, SymbolStatus, TickerInfo};
pub use order_book::{OrderBookSnapshot, PriceLevel};
