//! Logging configuration and initialization.
//!
//! Presets pick a baseline per target, `--log target=level` overrides
//! individual targets, and `RUST_LOG` replaces both when set.

use std::collections::HashMap;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const TARGET_PREFIX: &str = "cas::";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, connection and engine warnings only
    #[default]
    Production,
    Verbose,
    /// Everything except keepalive ticks
    Debug,
    Trace,
    /// Warnings and errors
    Quiet,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Full target name -> level, e.g. "cas::engine" -> DEBUG
    pub overrides: HashMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let preset = if quiet {
            LogPreset::Quiet
        } else if trace {
            LogPreset::Trace
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        };

        // "engine=debug,ws::keepalive=trace"
        let mut overrides = HashMap::new();
        for part in log_overrides.iter().flat_map(|s| s.split(',')) {
            let Some((target, level)) = part.split_once('=') else {
                continue;
            };
            let Some(level) = parse_level(level.trim()) else {
                continue;
            };
            overrides.insert(qualify_target(target.trim()), level);
        }

        Self {
            preset,
            overrides,
            format,
        }
    }

    fn directives(&self) -> Vec<String> {
        let base: &[&str] = match self.preset {
            LogPreset::Production => &[
                "cas::startup=info",
                "cas::api=warn",
                "cas::ws=info",
                "cas::ws::keepalive=off",
                "cas::registry=info",
                "cas::engine=warn",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &[
                "cas=info",
                "cas::ws::keepalive=off",
                "tower_http=info",
            ],
            LogPreset::Debug => &[
                "cas=debug",
                "cas::ws::keepalive=off",
                "tower_http=debug",
            ],
            LogPreset::Trace => &["cas=trace", "tower_http=trace"],
            LogPreset::Quiet => &["cas=warn", "tower_http=error"],
        };

        let mut directives: Vec<String> = base.iter().map(|d| d.to_string()).collect();
        let mut overrides: Vec<_> = self.overrides.iter().collect();
        overrides.sort();
        for (target, level) in overrides {
            directives.push(format!("{}={}", target, level.as_str().to_lowercase()));
        }
        directives
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives().join(","))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// "engine" -> "cas::engine"; full names and tower_http pass through.
fn qualify_target(target: &str) -> String {
    if target.starts_with(TARGET_PREFIX) || target == "cas" || target == "tower_http" {
        target.to_string()
    } else {
        format!("{}{}", TARGET_PREFIX, target)
    }
}

fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_preset_priority() {
        let config = LogConfig::from_cli(true, true, true, true, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Quiet);

        let config = LogConfig::from_cli(true, true, false, false, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Debug);

        let config = LogConfig::from_cli(false, false, false, false, vec![], LogFormat::Text);
        assert_eq!(config.preset, LogPreset::Production);
    }

    #[test]
    fn test_overrides_are_qualified() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            false,
            vec![
                "engine=debug".into(),
                "ws::keepalive=trace,cas::registry=warn".into(),
                "tower_http=info".into(),
                "api=loud".into(),
            ],
            LogFormat::Text,
        );

        assert_eq!(config.overrides.get("cas::engine"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("cas::ws::keepalive"), Some(&Level::TRACE));
        assert_eq!(config.overrides.get("cas::registry"), Some(&Level::WARN));
        assert_eq!(config.overrides.get("tower_http"), Some(&Level::INFO));
        assert!(!config.overrides.contains_key("cas::api"));
    }

    #[test]
    fn test_overrides_follow_preset_directives() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            false,
            vec!["ws::keepalive=trace".into()],
            LogFormat::Text,
        );
        let directives = config.directives();
        assert_eq!(directives.last().unwrap(), "cas::ws::keepalive=trace");
        assert!(directives.contains(&"cas::ws::keepalive=off".to_string()));
    }
}
