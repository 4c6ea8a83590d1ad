//! Validated value types shared by configuration and the aggregator

pub mod config;
pub mod validated;

pub use config::{ChannelCapacity, HistoryPoints, WindowSize};
pub use validated::{MetricName, ValidationError};
