//! Effective settings display

use crate::config::Config;
use crate::model_config::{GenerationParameters, TEMPERATURE_PRESETS};
use colored::Colorize;

/// Print the generation parameters followed by connection and storage settings
pub fn show_settings(config: &Config, parameters: &GenerationParameters) {
    println!("{}", "Generation parameters".bold());
    print!("{}", format_parameters(parameters));

    println!("\n{}", "Backend".bold());
    println!("  {:<18} {}", "base_url", config.backend.base_url);
    println!("  {:<18} {}", "api_prefix", config.backend.api_prefix);
    println!("  {:<18} {}", "chat endpoint", config.backend.endpoint("chat"));
    println!("  {:<18} {}s", "timeout", config.backend.timeout_seconds);

    println!("\n{}", "Storage".bold());
    println!(
        "  {:<18} {}",
        "history database",
        config
            .storage
            .path
            .as_deref()
            .unwrap_or("(platform data directory)")
    );
    println!("  {:<18} {}", "history page size", config.history.page_size);
    println!(
        "  {:<18} {}s",
        "stats poll interval", config.stats.poll_interval_seconds
    );
}

/// Render generation parameters as aligned lines
pub fn format_parameters(parameters: &GenerationParameters) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<18} {}{}\n",
        "temperature",
        parameters.temperature,
        temperature_label(parameters.temperature)
            .map(|label| format!(" ({})", label))
            .unwrap_or_default()
    ));
    out.push_str(&format!("  {:<18} {}\n", "max_tokens", parameters.max_tokens));
    out.push_str(&format!("  {:<18} {}\n", "top_p", parameters.top_p));
    out.push_str(&format!(
        "  {:<18} {}\n",
        "frequency_penalty", parameters.frequency_penalty
    ));
    out.push_str(&format!(
        "  {:<18} {}\n",
        "presence_penalty", parameters.presence_penalty
    ));
    out.push_str(&format!(
        "  {:<18} {} ({})\n",
        "tone",
        parameters.tone,
        parameters.tone.label()
    ));
    out
}

/// Name of a temperature preset
fn temperature_label(temperature: f64) -> Option<&'static str> {
    const LABELS: [&str; 4] = ["precise", "balanced", "creative", "very creative"];
    TEMPERATURE_PRESETS
        .iter()
        .position(|preset| (preset - temperature).abs() < f64::EPSILON)
        .map(|index| LABELS[index])
}
