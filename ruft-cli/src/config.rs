//! Configuration file support for RUFT CLI tools

use ruft_protocol::{LossDetection, DEFAULT_SEGMENT_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Loss-detection method, as written in config files
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossDetectionMethod {
    Timeout,
    OutOfOrder,
    Both,
}

impl From<LossDetectionMethod> for LossDetection {
    fn from(method: LossDetectionMethod) -> Self {
        match method {
            LossDetectionMethod::Timeout => LossDetection::Timeout,
            LossDetectionMethod::OutOfOrder => LossDetection::OutOfOrder,
            LossDetectionMethod::Both => LossDetection::Both,
        }
    }
}

/// Sender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Listen address for the peer's initiation datagram
    pub listen: SocketAddr,
    /// Input file; when absent, a synthetic payload is generated
    pub input: Option<String>,
    /// Synthetic payload size in MiB (used when `input` is absent)
    #[serde(default = "default_file_size_mib")]
    pub file_size_mib: usize,
    /// Probability of deliberately dropping a send
    #[serde(default)]
    pub loss_probability: f64,
    /// Loss-detection method
    #[serde(default = "default_loss_detection")]
    pub loss_detection: LossDetectionMethod,
    /// Payload bytes per segment
    #[serde(default = "default_segment_size")]
    pub segment_size: usize,
    /// Acknowledgment wait timeout in milliseconds
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
}

fn default_file_size_mib() -> usize {
    4
}

fn default_loss_detection() -> LossDetectionMethod {
    LossDetectionMethod::OutOfOrder
}

fn default_segment_size() -> usize {
    DEFAULT_SEGMENT_SIZE
}

fn default_receive_timeout_ms() -> u64 {
    30
}

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Sender address to initiate against
    pub connect: SocketAddr,
    /// Output file for the reassembled payload; discarded when absent
    pub output: Option<String>,
    /// Upper bound on the simulated per-ack delay, in milliseconds
    #[serde(default = "default_ack_jitter_ms")]
    pub ack_jitter_ms: u64,
}

fn default_ack_jitter_ms() -> u64 {
    20
}

/// Combined configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sender configuration
    pub sender: Option<SenderConfig>,
    /// Receiver configuration
    pub receiver: Option<ReceiverConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Create example sender configuration
    pub fn example_sender() -> Self {
        Config {
            sender: Some(SenderConfig {
                listen: "127.0.0.1:5000".parse().unwrap(),
                input: None,
                file_size_mib: 4,
                loss_probability: 0.0,
                loss_detection: LossDetectionMethod::OutOfOrder,
                segment_size: DEFAULT_SEGMENT_SIZE,
                receive_timeout_ms: 30,
            }),
            receiver: None,
        }
    }

    /// Create example receiver configuration
    pub fn example_receiver() -> Self {
        Config {
            sender: None,
            receiver: Some(ReceiverConfig {
                connect: "127.0.0.1:5000".parse().unwrap(),
                output: Some("received_file.bin".to_string()),
                ack_jitter_ms: 20,
            }),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SenderConfig {
    /// Acknowledgment wait timeout as a Duration
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

impl ReceiverConfig {
    /// Ack jitter upper bound as a Duration
    pub fn ack_jitter(&self) -> Duration {
        Duration::from_millis(self.ack_jitter_ms)
    }
}
