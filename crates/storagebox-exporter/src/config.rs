//! Command line flags and environment credentials.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use storagebox_client::{Credentials, DEFAULT_BASE_URL};
use storagebox_poller::{DecodeFailurePolicy, PollerConfig};

/// Environment variable holding the robot username.
pub const USER_ENV: &str = "HETZNER_USER";

/// Environment variable holding the robot password.
pub const PASS_ENV: &str = "HETZNER_PASS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please provide HETZNER_USER and HETZNER_PASS as environment variables")]
    MissingCredentials,

    #[error("invalid listen address {0:?}: expected ':9509' or 'host:9509'")]
    InvalidListenAddress(String),

    #[error("invalid metrics path {0:?}: must start with '/' and be a literal path")]
    InvalidPath(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "storagebox-exporter",
    version,
    about = "Prometheus exporter for robot storage boxes"
)]
pub struct Cli {
    /// Exporter listen address, ':9509' or 'localhost:9509'.
    #[arg(long, default_value = ":9509")]
    pub listen: String,

    /// Path the metrics are served on.
    #[arg(long, default_value = "/metrics")]
    pub path: String,

    /// Base URL of the robot web service.
    #[arg(long, default_value = DEFAULT_BASE_URL, hide = true)]
    pub api_url: String,

    /// Timeout for each robot request, in seconds.
    #[arg(long, default_value = "30")]
    pub http_timeout: u64,

    /// Exit instead of skipping the cycle when a robot response cannot be decoded.
    #[arg(long)]
    pub exit_on_decode_error: bool,
}

/// Validated exporter settings.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Address to bind, with an empty host expanded to `0.0.0.0`.
    pub listen: String,
    pub path: String,
    pub api_url: String,
    pub http_timeout: Duration,
    pub credentials: Credentials,
    pub poller: PollerConfig,
}

impl Cli {
    /// Validate the flags and read credentials through `lookup`.
    pub fn into_config<F>(self, lookup: F) -> Result<ExporterConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = credentials_from(lookup)?;
        let listen = normalize_listen(&self.listen)?;
        validate_path(&self.path)?;

        let decode_failure = if self.exit_on_decode_error {
            DecodeFailurePolicy::Exit
        } else {
            DecodeFailurePolicy::Skip
        };

        Ok(ExporterConfig {
            listen,
            path: self.path,
            api_url: self.api_url,
            http_timeout: Duration::from_secs(self.http_timeout),
            credentials,
            poller: PollerConfig { decode_failure },
        })
    }
}

/// Read `HETZNER_USER` / `HETZNER_PASS` through `lookup`.
///
/// Unset and empty values are both treated as missing.
pub fn credentials_from<F>(lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    match (get(USER_ENV), get(PASS_ENV)) {
        (Some(user), Some(pass)) => Ok(Credentials::new(user, pass)),
        _ => Err(ConfigError::MissingCredentials),
    }
}

/// Lookup function backed by the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn normalize_listen(addr: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidListenAddress(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    port.parse::<u16>().map_err(|_| invalid())?;

    if host.is_empty() {
        Ok(format!("0.0.0.0:{port}"))
    } else {
        Ok(addr.to_string())
    }
}

fn validate_path(path: &str) -> Result<(), ConfigError> {
    let literal = !path.contains(['{', '}', '*', ':']);
    if path.starts_with('/') && literal {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        lookup_from(&[(USER_ENV, "robot-user"), (PASS_ENV, "s3cret")])
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["storagebox-exporter"]);
        let config = cli.into_config(full_env()).unwrap();

        assert_eq!(config.listen, "0.0.0.0:9509");
        assert_eq!(config.path, "/metrics");
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.poller.decode_failure, DecodeFailurePolicy::Skip);
        assert_eq!(config.credentials, Credentials::new("robot-user", "s3cret"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "storagebox-exporter",
            "--listen",
            "localhost:9100",
            "--path",
            "/stats",
            "--api-url",
            "http://127.0.0.1:8080",
            "--http-timeout",
            "5",
            "--exit-on-decode-error",
        ]);
        let config = cli.into_config(full_env()).unwrap();

        assert_eq!(config.listen, "localhost:9100");
        assert_eq!(config.path, "/stats");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.poller.decode_failure, DecodeFailurePolicy::Exit);
    }

    #[test]
    fn help_lists_only_public_flags() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("--listen"));
        assert!(help.contains("--path"));
        assert!(!help.contains("--api-url"));
    }

    #[test]
    fn missing_credentials_fail() {
        let only_user = lookup_from(&[(USER_ENV, "robot-user")]);
        assert_eq!(credentials_from(only_user), Err(ConfigError::MissingCredentials));

        let only_pass = lookup_from(&[(PASS_ENV, "s3cret")]);
        assert_eq!(credentials_from(only_pass), Err(ConfigError::MissingCredentials));

        assert_eq!(credentials_from(lookup_from(&[])), Err(ConfigError::MissingCredentials));
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let empty = lookup_from(&[(USER_ENV, ""), (PASS_ENV, "s3cret")]);
        assert_eq!(credentials_from(empty), Err(ConfigError::MissingCredentials));
    }

    #[test]
    fn missing_credentials_message_names_both_variables() {
        let msg = ConfigError::MissingCredentials.to_string();
        assert_eq!(msg, "Please provide HETZNER_USER and HETZNER_PASS as environment variables");
    }

    #[test]
    fn missing_credentials_checked_before_flags() {
        let cli = Cli::parse_from(["storagebox-exporter", "--listen", "nonsense"]);
        let err = cli.into_config(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn listen_address_forms() {
        assert_eq!(normalize_listen(":9509").unwrap(), "0.0.0.0:9509");
        assert_eq!(normalize_listen("127.0.0.1:9509").unwrap(), "127.0.0.1:9509");
        assert_eq!(normalize_listen("[::1]:9509").unwrap(), "[::1]:9509");
        assert!(normalize_listen("9509").is_err());
        assert!(normalize_listen(":http").is_err());
        assert!(normalize_listen("localhost:70000").is_err());
    }

    #[test]
    fn metrics_path_validation() {
        assert!(validate_path("/metrics").is_ok());
        assert!(validate_path("/").is_ok());
        assert!(validate_path("metrics").is_err());
        assert!(validate_path("/{id}").is_err());
        assert!(validate_path("/:id").is_err());
    }
}
