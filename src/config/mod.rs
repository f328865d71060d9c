use std::env;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::ai::live::{ANTHROPIC_API_BASE, DEFAULT_TIMEOUT};
use crate::market::scanner::{ScanConfig, DEFAULT_LIMIT};

/// The only settings the analysis client factory looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub use_stub: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            use_stub: true,
            api_key: None,
            base_url: ANTHROPIC_API_BASE.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AiConfig {
    pub fn stub() -> Self {
        Self::default()
    }

    pub fn live(api_key: impl Into<String>) -> Self {
        Self {
            use_stub: false,
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Key is present and not just whitespace.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub ai: AiConfig,
    /// Max movers analyzed per run of the binary.
    pub analyze_batch_limit: i64,
    /// JSON array of snapshots to scan before analysis; no scan when unset.
    pub scan_snapshots_path: Option<PathBuf>,
    pub scan: ScanConfig,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.parse().unwrap_or(false))
        .unwrap_or(false)
}

/// Scan settings: discovery mode lowers the default threshold; an explicit
/// `SCAN_THRESHOLD` wins over either default.
fn scan_config_from_env() -> ScanConfig {
    let base = if env_flag("SCAN_DISCOVERY") {
        ScanConfig::discovery()
    } else {
        ScanConfig::default()
    };

    ScanConfig {
        threshold: env::var("SCAN_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<Decimal>().ok())
            .unwrap_or(base.threshold),
        limit: env::var("SCAN_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LIMIT),
        dry_run: env_flag("SCAN_DRY_RUN"),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_secs: u64 = env::var("AI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT.as_secs().to_string())
            .parse()
            .unwrap_or(DEFAULT_TIMEOUT.as_secs());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            ai: AiConfig {
                use_stub: env::var("USE_STUB_AI")
                    .unwrap_or_else(|_| "true".into())
                    .parse()
                    .unwrap_or(true),
                api_key: env::var("ANTHROPIC_API_KEY").ok(),
                base_url: env::var("ANTHROPIC_BASE_URL")
                    .unwrap_or_else(|_| ANTHROPIC_API_BASE.into()),
                timeout: Duration::from_secs(timeout_secs),
            },
            analyze_batch_limit: env::var("ANALYZE_BATCH_LIMIT")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            scan_snapshots_path: env::var("SCAN_SNAPSHOTS_PATH").ok().map(PathBuf::from),
            scan: scan_config_from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stub() {
        let cfg = AiConfig::default();
        assert!(cfg.use_stub);
        assert_eq!(cfg.usable_api_key(), None);
    }

    #[test]
    fn test_blank_key_is_not_usable() {
        let cfg = AiConfig::live("   ");
        assert_eq!(cfg.usable_api_key(), None);
        assert_eq!(AiConfig::live(" sk-test ").usable_api_key(), Some("sk-test"));
    }
}
