use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::errors::ServerError;

/// Environment variable names
pub mod env_vars {
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    /// `file`, `memory` or `session`
    pub const NOTES_BACKEND: &str = "NOTES_BACKEND";
    pub const NOTES_DATA_PATH: &str = "NOTES_DATA_PATH";
    pub const NOTES_SESSION_IDLE_SECS: &str = "NOTES_SESSION_IDLE_SECS";
    pub const API_USER: &str = "API_USER";
    pub const API_PASSWORD: &str = "API_PASSWORD";
    pub const RATE_LIMIT_INTERVAL_SECS: &str = "RATE_LIMIT_INTERVAL_SECS";
    pub const RATE_LIMIT_BURST: &str = "RATE_LIMIT_BURST";
}

/// Default values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8080;
    pub const DATA_FILE: &str = "notes_data.json";
    pub const SESSION_IDLE_SECS: u64 = 1440;
    pub const RATE_LIMIT_INTERVAL_SECS: u64 = 1;
    pub const RATE_LIMIT_BURST: u32 = 120;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Memory,
    Session,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "memory" => Ok(BackendKind::Memory),
            "session" => Ok(BackendKind::Session),
            other => Err(format!("unknown notes backend `{}`", other)),
        }
    }
}

/// Credentials that unlock the API role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCredentials {
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub data_path: PathBuf,
    pub session_idle_timeout: Duration,
    pub credentials: Option<ApiCredentials>,
    pub rate_limit_interval_secs: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let credentials = match (lookup(env_vars::API_USER), lookup(env_vars::API_PASSWORD)) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some(ApiCredentials { user, password })
            }
            _ => None,
        };

        let config = Config {
            host: lookup(env_vars::HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port: parse_var(&lookup, env_vars::PORT, defaults::PORT)?,
            backend: parse_var(&lookup, env_vars::NOTES_BACKEND, BackendKind::File)?,
            data_path: lookup(env_vars::NOTES_DATA_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join(defaults::DATA_FILE)),
            session_idle_timeout: Duration::from_secs(parse_var(
                &lookup,
                env_vars::NOTES_SESSION_IDLE_SECS,
                defaults::SESSION_IDLE_SECS,
            )?),
            credentials,
            rate_limit_interval_secs: parse_var(
                &lookup,
                env_vars::RATE_LIMIT_INTERVAL_SECS,
                defaults::RATE_LIMIT_INTERVAL_SECS,
            )?,
            rate_limit_burst: parse_var(
                &lookup,
                env_vars::RATE_LIMIT_BURST,
                defaults::RATE_LIMIT_BURST,
            )?,
        };

        if config.rate_limit_interval_secs == 0 || config.rate_limit_burst == 0 {
            return Err(ServerError::EnvironmentError(
                "rate limit values must be positive".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| ServerError::EnvironmentError(format!("{} is invalid: {}", name, err))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ServerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, defaults::PORT);
        assert_eq!(config.backend, BackendKind::File);
        assert!(config.data_path.ends_with(defaults::DATA_FILE));
        assert!(config.credentials.is_none());
        assert_eq!(
            config.session_idle_timeout,
            Duration::from_secs(defaults::SESSION_IDLE_SECS)
        );
    }

    #[test]
    fn reads_backend_and_credentials() {
        let config = config_from(&[
            ("NOTES_BACKEND", "Session"),
            ("PORT", "9000"),
            ("NOTES_SESSION_IDLE_SECS", "60"),
            ("API_USER", "restapi"),
            ("API_PASSWORD", "secretpw"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Session);
        assert_eq!(config.port, 9000);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert_eq!(
            config.credentials,
            Some(ApiCredentials {
                user: "restapi".to_string(),
                password: "secretpw".to_string(),
            })
        );
    }

    #[test]
    fn half_configured_credentials_are_ignored() {
        let config = config_from(&[("API_USER", "restapi")]).unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("NOTES_BACKEND", "postgres")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_BURST", "0")]).is_err());
    }
}
