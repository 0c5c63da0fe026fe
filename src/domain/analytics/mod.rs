// Pure transforms over candles and order books
pub mod correlation;
pub mod density;
pub mod inclined_line;
pub mod percent_change;
pub mod pump_dump;
pub mod trend;

pub use correlation::{CorrelationPair, CorrelationResult, compute_correlation, pearson};
pub use density::{DensityResult, DensitySide, compute_density};
pub use inclined_line::{InclinedLine, MoveKind, compute_inclined_line};
pub use percent_change::percent_change;
pub use pump_dump::{PumpDumpResult, detect_pumps_dumps};
pub use trend::{TrendDirection, TrendResult, compute_trend};
