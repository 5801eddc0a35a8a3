pub mod config;
pub mod error;
pub mod extraction;
pub mod telemetry;

pub use extraction::{ExpenseRecord, ValidationError};
