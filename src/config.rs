use anyhow::{Context, anyhow};
use std::str::FromStr;

const DATABASE_URL: &str = "DATABASE_URL";
const SERVER_PORT: &str = "SERVER_PORT";

/// Settings for the library API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which returns the raw value of a
    /// variable or `None` when it is unset.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: required(&lookup, DATABASE_URL)?,
            server_port: required(&lookup, SERVER_PORT)?,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn required<F, T>(lookup: &F, key: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).ok_or_else(|| anyhow!("Missing environment variable {key}"))?;
    raw.parse::<T>()
        .with_context(|| format!("Invalid value {raw:?} for environment variable {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn reads_database_url_and_port() {
        let config = config(&[("DATABASE_URL", "sqlite://library.db"), ("SERVER_PORT", "8080")])
            .unwrap();

        assert_eq!(config.database_url(), "sqlite://library.db");
        assert_eq!(config.server_port(), 8080);
    }

    #[test]
    fn invalid_port_names_the_variable() {
        let err = config(&[("DATABASE_URL", "sqlite::memory:"), ("SERVER_PORT", "eighty")])
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid value \"eighty\" for environment variable SERVER_PORT"
        );
    }

    #[test]
    fn missing_variable_names_the_variable() {
        let err = config(&[("SERVER_PORT", "8080")]).unwrap_err();

        assert_eq!(err.to_string(), "Missing environment variable DATABASE_URL");
    }
}
