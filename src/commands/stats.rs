//! System statistics command
//!
//! One-shot display of the backend host's CPU and memory usage, or a fixed
//! interval poll with `--watch`.

use crate::backend::{format_size, Backend, SystemStats};
use crate::error::Result;
use colored::Colorize;
use std::time::Duration;

/// Show system statistics once, or every `interval` until Ctrl-C when `watch`
///
/// An unreachable backend is reported on the terminal, not returned.
pub async fn run_stats(backend: &dyn Backend, watch: bool, interval: Duration) -> Result<()> {
    if !watch {
        match backend.system_stats().await {
            Ok(stats) => print!("{}", format_stats(&stats)),
            Err(e) => {
                tracing::error!("Failed to fetch system stats: {:#}", e);
                eprintln!("{}", "Could not fetch system statistics".red());
            }
        }
        return Ok(());
    }

    println!(
        "Polling system statistics every {}s (Ctrl-C to stop)\n",
        interval.as_secs()
    );

    tokio::select! {
        _ = poll_stats(backend, interval, None) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Stats polling interrupted");
        }
    }
    Ok(())
}

/// Poll on a fixed interval, printing each result
///
/// Failures are logged and polling continues. Stops after `max_polls`
/// ticks when given; returns the number of successful polls.
pub async fn poll_stats(
    backend: &dyn Backend,
    interval: Duration,
    max_polls: Option<usize>,
) -> usize {
    let mut ticker = tokio::time::interval(interval);
    let mut ticks = 0;
    let mut succeeded = 0;

    loop {
        if max_polls.is_some_and(|max| ticks >= max) {
            break;
        }
        ticker.tick().await;
        ticks += 1;

        match backend.system_stats().await {
            Ok(stats) => {
                succeeded += 1;
                println!(
                    "{}",
                    chrono::Local::now().format("%H:%M:%S").to_string().dimmed()
                );
                print!("{}", format_stats(&stats));
                println!();
            }
            Err(e) => {
                tracing::error!("Failed to fetch system stats: {:#}", e);
                eprintln!("{}", "Could not fetch system statistics".red());
            }
        }
    }

    succeeded
}

/// Render statistics as aligned label/value lines
pub fn format_stats(stats: &SystemStats) -> String {
    let memory = &stats.memory;
    let used = memory
        .used
        .unwrap_or_else(|| memory.total.saturating_sub(memory.available));

    let mut out = String::new();
    out.push_str(&format!("{:<10} {:.1}%\n", "CPU", stats.cpu_percent));
    out.push_str(&format!(
        "{:<10} {} / {} ({:.1}%)\n",
        "Memory",
        format_size(used),
        format_size(memory.total),
        memory.percent
    ));
    out.push_str(&format!(
        "{:<10} {}\n",
        "Available",
        format_size(memory.available)
    ));
    out.push_str(&format!("{:<10} {}\n", "Platform", stats.platform));
    if let Some(version) = &stats.python_version {
        out.push_str(&format!("{:<10} {}\n", "Python", version));
    }
    if let Some(uptime) = stats.uptime {
        out.push_str(&format!("{:<10} {}\n", "Uptime", format_uptime(uptime)));
    }
    out
}

/// Format seconds as `1d 2h 3m`, dropping leading zero units
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
