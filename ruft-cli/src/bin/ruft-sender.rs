//! RUFT Sender - reliable payload sender
//!
//! Listens for a receiver's initiation datagram, then transfers a file or a
//! synthetic payload with retransmission until fully acknowledged.

use clap::Parser;
use ruft::{SenderConfig, SenderEngine, UdpTransport};
use ruft_cli::config::Config;
use ruft_cli::{display_transfer_report, generate_random_payload};
use ruft_protocol::LossDetection;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "ruft-sender")]
#[command(about = "RUFT reliable payload sender", long_about = None)]
struct Args {
    /// Listen address for the receiver's initiation datagram
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: SocketAddr,

    /// Input file; omit to generate a synthetic payload
    #[arg(short, long)]
    input: Option<String>,

    /// Synthetic payload size in MiB (when no input file is given)
    #[arg(short = 's', long, default_value = "4")]
    file_size: usize,

    /// Probability of deliberately dropping a send (0.0 to 1.0)
    #[arg(short = 'p', long, default_value = "0.0")]
    loss_probability: f64,

    /// Loss detection method (timeout, out_of_order, both)
    #[arg(short = 'm', long, default_value = "out_of_order")]
    loss_detection: LossDetection,

    /// Payload bytes per segment
    #[arg(long, default_value = "5120")]
    segment_size: usize,

    /// Acknowledgment wait timeout in milliseconds
    #[arg(long, default_value = "30")]
    timeout_ms: u64,

    /// Optional TOML config file (overrides the flags above)
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    let (listen, input, file_size, config) = match &args.config {
        Some(path) => {
            let file = Config::from_file(path)?;
            let sender = file
                .sender
                .ok_or_else(|| anyhow::anyhow!("config file has no [sender] section"))?;
            let config = SenderConfig {
                loss_probability: sender.loss_probability,
                loss_detection: sender.loss_detection.into(),
                segment_size: sender.segment_size,
                receive_timeout: sender.receive_timeout(),
            };
            (sender.listen, sender.input, sender.file_size_mib, config)
        }
        None => {
            let config = SenderConfig {
                loss_probability: args.loss_probability,
                loss_detection: args.loss_detection,
                segment_size: args.segment_size,
                receive_timeout: Duration::from_millis(args.timeout_ms),
            };
            (args.listen, args.input, args.file_size, config)
        }
    };

    anyhow::ensure!(
        (0.0..=1.0).contains(&config.loss_probability),
        "loss probability must be in [0, 1]"
    );
    anyhow::ensure!(config.segment_size >= 1, "segment size must be at least 1");

    let payload = match &input {
        Some(path) => {
            tracing::info!(%path, "reading payload from file");
            fs::read(path)?
        }
        None => {
            tracing::info!(mib = file_size, "generating synthetic payload");
            generate_random_payload(file_size)
        }
    };

    let mut transport = UdpTransport::bind(listen)?;
    tracing::info!(addr = %transport.local_addr()?, "listening");

    let mut engine = SenderEngine::new(config);
    engine.load_payload(&payload);

    let stats = engine.run(&mut transport)?;
    display_transfer_report(&stats, engine.rtt(), payload.len() as u64);

    Ok(())
}
