use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// Which hook implementation the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateKind {
    Relay,
    Null,
}

impl FromStr for DelegateKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relay" => Ok(Self::Relay),
            "null" => Ok(Self::Null),
            other => Err(anyhow!("Unknown DISPATCH_DELEGATE '{}' (expected relay or null)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Location this server advertises to the world.
    pub location: String,
    pub key_file: Option<PathBuf>,
    pub db_path: PathBuf,
    pub delegate: DelegateKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("DISPATCH_PORT")
            .unwrap_or_else(|| "2048".into())
            .parse()
            .map_err(|e| anyhow!("Invalid DISPATCH_PORT: {}", e))?;

        let location = lookup("DISPATCH_ME")
            .or_else(|| lookup("HOSTNAME"))
            .unwrap_or_else(|| "localhost".into());

        Ok(Self {
            host: lookup("DISPATCH_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            location,
            key_file: lookup("DISPATCH_KEY_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            db_path: lookup("DISPATCH_DB_PATH")
                .unwrap_or_else(|| "dispatch.db".into())
                .into(),
            delegate: lookup("DISPATCH_DELEGATE")
                .unwrap_or_else(|| "relay".into())
                .parse()?,
        })
    }
}
