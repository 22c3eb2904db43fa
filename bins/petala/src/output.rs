//! Terminal output

use magicsaas_runtime_config::RuntimeConfig;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Status message helpers
pub struct Status;

impl Status {
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<18} {}", label.dimmed(), value);
}

fn on_off(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

/// Human-readable view of a resolved configuration
pub fn print_config(config: &RuntimeConfig) {
    Status::header(&format!("Pétala {} ({})", config.petala.name, config.environment));
    row("type", config.petala.petala_type);
    row("base path", &config.petala.base_path);
    row("detected by", format!("{:?}", config.petala.detected_by));
    row("tenant", format!("{} ({})", config.tenant.id, config.tenant.name));
    row("version", &config.version);

    Status::header("Endpoints");
    row("api", &config.endpoints.api_url);
    row("cms", &config.endpoints.cms_url);
    row("sofia", &config.endpoints.sofia_url);
    row("timeout", format_duration(config.api.timeout));
    row(
        "retries",
        format!(
            "{} (base delay {})",
            config.api.retry.retry_attempts,
            format_duration(config.api.retry.base_delay)
        ),
    );

    Status::header("Features");
    row("analytics", on_off(config.features.analytics));
    row("payments", on_off(config.features.payments));
    row("search", on_off(config.features.search));
    row("sofia", on_off(config.features.sofia));
    row("debug", on_off(config.features.debug));

    if !config.flags.is_empty() {
        Status::header("Flags");
        for (name, flag) in config.flags.iter() {
            row(name, on_off(flag.value.is_enabled()));
        }
    }
}

/// Format a duration for display
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        format!("{}m {:.0}s", mins, secs % 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
