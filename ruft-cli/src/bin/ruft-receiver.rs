//! RUFT Receiver - reliable payload receiver
//!
//! Sends one initiation datagram to the sender, then acknowledges every
//! received packet (after a simulated network delay) until the
//! end-of-transfer sentinel arrives.

use clap::Parser;
use ruft::{AckJitter, Datagram, ReceiverEngine, ReceiverEvent, UdpTransport};
use ruft_cli::config::Config;
use ruft_cli::format_bytes;
use std::fs;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

/// Size of the receive buffer; a datagram carries at most one segment
const RECV_BUFFER: usize = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "ruft-receiver")]
#[command(about = "RUFT reliable payload receiver", long_about = None)]
struct Args {
    /// Sender address to initiate against
    #[arg(short = 'c', long, default_value = "127.0.0.1:5000")]
    connect: SocketAddr,

    /// Output file for the reassembled payload; omit to discard
    #[arg(short, long)]
    output: Option<String>,

    /// Upper bound on the simulated per-ack delay, in milliseconds
    #[arg(long, default_value = "20")]
    ack_jitter_ms: u64,

    /// Optional TOML config file (overrides the flags above)
    #[arg(long)]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    let (connect, output, jitter) = match &args.config {
        Some(path) => {
            let file = Config::from_file(path)?;
            let receiver = file
                .receiver
                .ok_or_else(|| anyhow::anyhow!("config file has no [receiver] section"))?;
            let jitter = AckJitter::new(receiver.ack_jitter());
            (receiver.connect, receiver.output, jitter)
        }
        None => {
            let jitter = AckJitter::new(Duration::from_millis(args.ack_jitter_ms));
            (args.connect, args.output, jitter)
        }
    };

    let bind: SocketAddr = if connect.ip().is_loopback() {
        "127.0.0.1:0".parse()?
    } else {
        "0.0.0.0:0".parse()?
    };
    let mut transport = UdpTransport::bind(bind)?;
    transport.set_recv_buffer_size(RECV_BUFFER)?;
    tracing::info!(addr = %transport.local_addr()?, sender = %connect, "connecting");

    // Any datagram initiates; the sender only needs our source address
    transport.send_to(&[0u8; 16], connect)?;

    let mut engine = ReceiverEngine::new();
    let mut buf = vec![0u8; RECV_BUFFER];

    loop {
        let Some((len, from)) = transport.recv_timeout(&mut buf, Duration::from_secs(1))? else {
            continue;
        };

        match engine.on_datagram(&buf[..len]) {
            Ok(ReceiverEvent::Ack(ack)) => {
                // Simulated network latency; one ack per packet, sent after
                // the delay, so acks are never reordered or queued
                thread::sleep(jitter.sample());
                transport.send_to(&ack.to_bytes(), from)?;
                tracing::debug!(ack = ack.ack_number, largest = ack.largest_acknowledged, "ack sent");
            }
            Ok(ReceiverEvent::EndOfTransfer) => {
                tracing::info!(packets = engine.packet_count(), "end of transfer");
                break;
            }
            Err(err) => {
                tracing::warn!(%err, "discarding malformed datagram");
            }
        }
    }

    let payload = engine.reassemble();
    tracing::info!(size = %format_bytes(payload.len() as u64), "payload reassembled");
    if let Some(path) = output {
        fs::write(&path, &payload)?;
        tracing::info!(%path, "payload written");
    }

    Ok(())
}
