pub mod metrics;
pub mod returns;
