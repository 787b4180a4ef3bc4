use std::{env, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};

pub const ASSETS_DIR_VAR: &str = "DEMO_ASSETS_DIR";
pub const WIDGET_NAME_VAR: &str = "DEMO_WIDGET_NAME";
pub const LOG_DIR_VAR: &str = "DEMO_LOG_DIR";
pub const TRANSPORT_VAR: &str = "DEMO_TRANSPORT";
pub const HOST_VAR: &str = "DEMO_HOST";
pub const PORT_VAR: &str = "PORT";

/// How requests reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// `POST /mcp`, plus the widget's static assets.
    Http,
}

impl FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => bail!("unknown transport {other:?}, expected \"stdio\" or \"http\""),
        }
    }
}

/// Startup settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the built widget markup.
    pub assets_dir: PathBuf,
    /// Logical name of the widget's markup file, without extension.
    pub widget_name: String,
    /// Where log files go. A temporary directory is used when unset.
    pub log_dir: Option<PathBuf>,
    pub transport: Transport,
    /// Bind address for the HTTP transport.
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            widget_name: demo_app::widget::WIDGET_COMPONENT.to_string(),
            log_dir: None,
            transport: Transport::default(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let transport = match var(TRANSPORT_VAR) {
            Some(value) => value.parse().with_context(|| format!("invalid {TRANSPORT_VAR}"))?,
            None => defaults.transport,
        };
        let port = match var(PORT_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_VAR} {value:?}"))?,
            None => defaults.port,
        };

        Ok(Self {
            assets_dir: var(ASSETS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            widget_name: var(WIDGET_NAME_VAR).unwrap_or(defaults.widget_name),
            log_dir: var(LOG_DIR_VAR).map(PathBuf::from),
            transport,
            host: var(HOST_VAR).unwrap_or(defaults.host),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
        let defaults = Config::default();
        assert_eq!(defaults.widget_name, "demo");
        assert_eq!(defaults.transport, Transport::Stdio);
        assert_eq!((defaults.host.as_str(), defaults.port), ("0.0.0.0", 8000));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ASSETS_DIR_VAR, "/srv/ui/assets"),
            (WIDGET_NAME_VAR, "counter"),
            (LOG_DIR_VAR, "/var/log/demo"),
            (TRANSPORT_VAR, "HTTP"),
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "9090"),
        ]))
        .unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("/srv/ui/assets"));
        assert_eq!(config.widget_name, "counter");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/demo")));
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[
            (ASSETS_DIR_VAR, "  "),
            (LOG_DIR_VAR, ""),
            (PORT_VAR, " "),
        ]))
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_values_are_errors() {
        for (key, value) in [
            (PORT_VAR, "eighty"),
            (PORT_VAR, "70000"),
            (TRANSPORT_VAR, "sse"),
        ] {
            let err = Config::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
