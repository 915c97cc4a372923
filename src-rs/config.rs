use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub port: u16,
    pub execution_timeout_secs: u64,
    /// Terminal records older than this are evicted; `None` keeps everything.
    pub retention_secs: Option<u64>,
    /// Optional JSON journal reloaded at startup.
    pub journal_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            execution_timeout_secs: 300,
            retention_secs: None,
            journal_path: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT", defaults.port),
            execution_timeout_secs: env_parse(
                "JURISAI_TASK_TIMEOUT_SECS",
                defaults.execution_timeout_secs,
            ),
            retention_secs: env_opt("JURISAI_RETENTION_SECS").and_then(|v| v.parse().ok()),
            journal_path: env_opt("JURISAI_JOURNAL").map(PathBuf::from),
        }
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}
