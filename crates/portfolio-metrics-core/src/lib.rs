pub mod cashflow;
pub mod error;
pub mod metrics;
pub mod projection;
pub mod solver;
pub mod statistics;
pub mod twr;
pub mod types;
pub mod validation;

pub use error::{InputRangeError, MetricsError};
pub use types::*;

/// Standard result type for all metric operations
pub type MetricsResult<T> = Result<T, MetricsError>;
