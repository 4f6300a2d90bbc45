use crate::errors::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ENV_WORKER_THREADS: &str = "TRIX_WORKER_THREADS";
pub const ENV_THREAD_NAME: &str = "TRIX_THREAD_NAME";
pub const ENV_LOG: &str = "TRIX_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound on concurrently running blocking tasks.
    pub worker_threads: usize,
    pub thread_name: String,
    /// `trace|debug|info|warn|error`
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            thread_name: "trix-worker".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        let cfg: BridgeConfig = serde_json::from_str(&s)?;
        cfg.validate()
    }

    /// Defaults overridden by `TRIX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_vars(|k| std::env::var(k).ok())
    }

    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup(ENV_WORKER_THREADS) {
            self.worker_threads = v
                .trim()
                .parse()
                .map_err(|_| BridgeError::Config(format!("{ENV_WORKER_THREADS}={v:?} is not a number")))?;
        }
        if let Some(v) = lookup(ENV_THREAD_NAME) {
            self.thread_name = v;
        }
        if let Some(v) = lookup(ENV_LOG) {
            self.log_level = v;
        }
        self.validate()
    }

    /// Install the fmt subscriber at `log_level`.
    pub fn init_logging(&self) -> Result<()> {
        crate::logging::init(&self.log_level)
    }

    pub fn validate(self) -> Result<Self> {
        if self.worker_threads == 0 {
            return Err(BridgeError::Config("worker_threads must be at least 1".into()));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(BridgeError::Config(format!("unknown log level {:?}", self.log_level)));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bridge.json");
        fs::write(&path, r#"{ "worker_threads": 8 }"#).unwrap();
        let cfg = BridgeConfig::load(&path).unwrap();
        assert_eq!(cfg.worker_threads, 8);
        assert_eq!(cfg.thread_name, "trix-worker");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn missing_file_is_config_error() {
        let tmp = tempdir().unwrap();
        let err = BridgeConfig::load(tmp.path().join("none.json")).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> =
            [(ENV_WORKER_THREADS, "2"), (ENV_LOG, "debug")].into_iter().collect();
        let cfg = BridgeConfig::default()
            .with_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.worker_threads, 2);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.thread_name, "trix-worker");
    }

    #[test]
    fn from_env_reads_process_vars() {
        std::env::set_var(ENV_THREAD_NAME, "trix-env-test");
        let cfg = BridgeConfig::from_env();
        std::env::remove_var(ENV_THREAD_NAME);
        assert_eq!(cfg.unwrap().thread_name, "trix-env-test");
    }

    #[test]
    fn log_level_reaches_the_subscriber() {
        let cfg = BridgeConfig { log_level: "trace".into(), ..Default::default() };
        cfg.init_logging().unwrap();
        assert!(tracing::dispatcher::has_been_set());
        assert!(tracing::enabled!(tracing::Level::TRACE));

        let bad = BridgeConfig { log_level: "shout".into(), ..Default::default() };
        assert!(matches!(bad.init_logging(), Err(BridgeError::Config(_))));
    }

    #[test]
    fn rejects_zero_workers_and_bad_level() {
        let zero = BridgeConfig { worker_threads: 0, ..Default::default() };
        assert!(zero.validate().is_err());
        let loud = BridgeConfig { log_level: "shout".into(), ..Default::default() };
        assert!(loud.validate().is_err());
        assert!(BridgeConfig::default()
            .with_vars(|k| (k == ENV_WORKER_THREADS).then(|| "many".to_string()))
            .is_err());
    }
}
