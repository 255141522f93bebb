pub mod analyzer;
pub mod clicks;
pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod report;
