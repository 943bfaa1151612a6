//! RUFT CLI Library
//!
//! Shared functionality for the RUFT command-line tools.

pub mod config;
pub mod payload;
pub mod stats;

pub use config::{Config, ConfigError, LossDetectionMethod, ReceiverConfig, SenderConfig};
pub use payload::generate_random_payload;
pub use stats::{display_transfer_report, format_bytes, format_duration, format_rtt};
