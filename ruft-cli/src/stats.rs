//! Transfer report display and formatting

use ruft_protocol::{RttEstimator, TransferStats};
use std::time::Duration;

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m {:05.2}s", (secs / 60.0) as u64, secs % 60.0)
    } else {
        format!("{:.3}s", secs)
    }
}

/// Format an RTT in human-readable form
pub fn format_rtt(rtt: Duration) -> String {
    let micros = rtt.as_micros();
    if micros >= 1_000_000 {
        format!("{:.2}s", rtt.as_secs_f64())
    } else if micros >= 1_000 {
        format!("{:.2}ms", micros as f64 / 1_000.0)
    } else {
        format!("{}µs", micros)
    }
}

/// Display the end-of-transfer summary
pub fn display_transfer_report(stats: &TransferStats, rtt: &RttEstimator, payload_bytes: u64) {
    println!("┌──────────────────────────────────────────────┐");
    println!("│ TRANSFER COMPLETE                            │");
    println!("├──────────────────────────────────────────────┤");
    println!("│ Payload:        {:28} │", format_bytes(payload_bytes));
    println!("│ Elapsed:        {:28} │", format_duration(stats.elapsed));
    println!("│ Packets sent:   {:28} │", stats.packets_sent);
    println!("│ Drops injected: {:28} │", stats.deliberate_drops);
    println!("│ Acks received:  {:28} │", stats.acks_received);
    println!("│ Malformed acks: {:28} │", stats.malformed_acks);
    println!(
        "│ Retransmits:    {:28} │",
        format!(
            "{} timeout / {} ooo / {} drain",
            stats.timeout_retransmits, stats.out_of_order_retransmits, stats.drain_retransmits
        )
    );
    println!("│ SRTT:           {:28} │", format_rtt(rtt.srtt()));
    println!("│ PTO:            {:28} │", format_rtt(rtt.pto()));
    println!("└──────────────────────────────────────────────┘");
}
