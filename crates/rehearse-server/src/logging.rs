//! Logging setup.
//!
//! Presets select a baseline filter per `rehearse::` target, `--log` flags
//! override single targets, and `RUST_LOG` replaces both when set.

use std::collections::HashMap;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const TARGET_PREFIX: &str = "rehearse::";

/// Log output format.
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
    /// Startup, API and session events; LLM and validator warnings.
    #[default]
    Production,
    Verbose,
    Debug,
    Trace,
    /// Warnings and errors only.
    Quiet,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target levels, e.g. "rehearse::llm" -> DEBUG.
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

        // "llm=debug,session=trace" or repeated flags
        let mut overrides = HashMap::new();
        for override_str in log_overrides {
            for part in override_str.split(',') {
                let Some((target, level_str)) = part.split_once('=') else {
                    continue;
                };
                let target = target.trim();
                let full_target = if target.starts_with(TARGET_PREFIX) || target == "tower_http" {
                    target.to_string()
                } else {
                    format!("{TARGET_PREFIX}{target}")
                };
                if let Some(level) = parse_level(level_str.trim()) {
                    overrides.insert(full_target, level);
                }
            }
        }

        Self {
            preset,
            overrides,
            format,
        }
    }

    pub fn directives(&self) -> Vec<String> {
        let mut directives: Vec<String> = match self.preset {
            LogPreset::Production => vec![
                "rehearse::startup=info".into(),
                "rehearse::api=info".into(),
                "rehearse::session=info".into(),
                "rehearse::snippets=info".into(),
                "rehearse::llm=warn".into(),
                "rehearse::validator=warn".into(),
                "tower_http=warn".into(),
            ],
            LogPreset::Verbose => vec!["rehearse=info".into(), "tower_http=info".into()],
            LogPreset::Debug => vec!["rehearse=debug".into(), "tower_http=debug".into()],
            LogPreset::Trace => vec!["rehearse=trace".into(), "tower_http=trace".into()],
            LogPreset::Quiet => vec!["rehearse=warn".into(), "tower_http=error".into()],
        };

        let mut overrides: Vec<_> = self.overrides.iter().collect();
        overrides.sort_by(|a, b| a.0.cmp(b.0));
        for (target, level) in overrides {
            directives.push(format!("{}={}", target, level_to_str(*level)));
        }
        directives
    }

    /// `RUST_LOG` wins over presets and overrides.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives().join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
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

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
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

        let config = LogConfig::from_cli(false, false, false, false, vec![], LogFormat::Json);
        assert_eq!(config.preset, LogPreset::Production);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_overrides_are_prefixed() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            false,
            vec!["llm=debug".into(), "session=trace,rehearse::validator=info".into()],
            LogFormat::Text,
        );
        assert_eq!(config.overrides.get("rehearse::llm"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("rehearse::session"), Some(&Level::TRACE));
        assert_eq!(config.overrides.get("rehearse::validator"), Some(&Level::INFO));
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            false,
            vec!["llm=loud".into(), "garbage".into(), "tower_http=error".into()],
            LogFormat::Text,
        );
        assert_eq!(config.overrides.len(), 1);
        assert_eq!(config.overrides.get("tower_http"), Some(&Level::ERROR));
    }

    #[test]
    fn test_overrides_follow_preset_directives() {
        let config = LogConfig::from_cli(
            false,
            false,
            false,
            true,
            vec!["llm=debug".into()],
            LogFormat::Text,
        );
        let directives = config.directives();
        assert_eq!(directives.first().map(String::as_str), Some("rehearse=warn"));
        assert_eq!(directives.last().map(String::as_str), Some("rehearse::llm=debug"));
    }
}
