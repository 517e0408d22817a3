use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub session_path: String,
    pub timezone: String,
    pub log_level: String,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            session_path: "config/session.json".to_string(),
            timezone: "Asia/Tokyo".to_string(),
            log_level: "info".to_string(),
            log_file: "kakeibo_tui.log".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "kakeibo_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL of the API (e.g. http://localhost:8080).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the file holding the login session.
    #[arg(long)]
    session_path: Option<String>,
    /// Override timezone (IANA name) used to find "today".
    #[arg(long)]
    timezone: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("KAKEIBO_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    settings.apply(args);
    Ok(settings)
}

impl AppConfig {
    /// Command-line flags win over the file and the environment.
    fn apply(&mut self, args: Args) {
        if let Some(base_url) = args.base_url {
            self.base_url = base_url;
        }
        if let Some(session_path) = args.session_path {
            self.session_path = session_path;
        }
        if let Some(timezone) = args.timezone {
            self.timezone = timezone;
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(log_file) = args.log_file {
            self.log_file = log_file;
        }
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: AppConfig = Config::builder()
            .add_source(File::from_str("base_url = \"http://budget:9000\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.base_url, "http://budget:9000");
        assert_eq!(settings.session_path, "config/session.json");
        assert_eq!(settings.timezone, "Asia/Tokyo");
    }

    #[test]
    fn flags_override_loaded_values() {
        let args = Args::try_parse_from([
            "kakeibo_tui",
            "--base-url",
            "http://127.0.0.1:3000",
            "--timezone",
            "UTC",
        ])
        .unwrap();
        let mut settings = AppConfig::default();
        settings.apply(args);

        assert_eq!(settings.base_url, "http://127.0.0.1:3000");
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.log_file, "kakeibo_tui.log");
    }
}
