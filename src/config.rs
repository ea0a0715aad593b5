use crate::cli::Args;
use crate::settings::SettingsStore;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_file: PathBuf,
    pub settings_path: PathBuf,
    pub command_line_only: bool,
    pub poll_interval: Duration,
    pub no_color: bool,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        if args.poll_interval == 0 {
            return Err(anyhow::anyhow!("Poll interval must be greater than zero"));
        }

        let settings_path = args
            .config
            .clone()
            .unwrap_or_else(SettingsStore::default_path);

        Ok(Config {
            log_file: args.log_file.clone(),
            settings_path,
            command_line_only: args.command_line_only,
            poll_interval: Duration::from_millis(args.poll_interval),
            no_color: args.no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_args() {
        let args = Args::try_parse_from([
            "watchssh",
            "-c",
            "--log-file",
            "/tmp/auth.log",
            "--config",
            "/tmp/watchssh.json",
            "--poll-interval",
            "250",
        ])
        .unwrap();

        let config = Config::from_args(&args).unwrap();
        assert!(config.command_line_only);
        assert_eq!(config.log_file, PathBuf::from("/tmp/auth.log"));
        assert_eq!(config.settings_path, PathBuf::from("/tmp/watchssh.json"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_default_settings_path() {
        let args = Args::try_parse_from(["watchssh"]).unwrap();
        if args.config.is_some() {
            // WATCHSSH_CONFIG is set in this environment
            return;
        }
        let config = Config::from_args(&args).unwrap();
        assert!(config.settings_path.ends_with(".watchssh_config.json"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let args = Args::try_parse_from(["watchssh", "--poll-interval", "0"]).unwrap();
        let result = Config::from_args(&args);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Poll interval must be greater than zero"));
    }
}
