use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::types::{Config, Credentials};

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }
    
    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
    
    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub const DEFAULT_SITE: &str = "datadoghq.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WORKBOOK: &str = "DD_alert.xlsx";
pub const DEFAULT_GAP_REPORT: &str = "missing_checkmarks.txt";

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

fn non_empty<E: EnvironmentProvider>(env: &E, key: &str) -> Option<String> {
    env.get_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let credentials = match (non_empty(env, "DD_API_KEY"), non_empty(env, "DD_APP_KEY")) {
        (Some(api_key), Some(app_key)) => Some(Credentials { api_key, app_key }),
        (None, None) => None,
        (Some(_), None) => return Err(anyhow!("DD_APP_KEY must be set when DD_API_KEY is provided")),
        (None, Some(_)) => return Err(anyhow!("DD_API_KEY must be set when DD_APP_KEY is provided")),
    };

    let api_url = match non_empty(env, "DD_API_URL") {
        Some(url) => url,
        None => {
            let site = non_empty(env, "DD_SITE").unwrap_or_else(|| DEFAULT_SITE.to_string());
            format!("https://api.{}", site)
        }
    };
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(anyhow!("DD_API_URL must be an http(s) URL, got {}", api_url));
    }

    let timeout_secs: u64 = non_empty(env, "DD_TIMEOUT_SECS")
        .and_then(|v| v.parse().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let workbook_path = non_empty(env, "MONITOR_WORKBOOK")
        .unwrap_or_else(|| DEFAULT_WORKBOOK.to_string());
    let gap_report_path = non_empty(env, "GAP_REPORT_PATH")
        .unwrap_or_else(|| DEFAULT_GAP_REPORT.to_string());

    Ok(Config {
        credentials,
        api_url,
        proxy: non_empty(env, "DD_PROXY"),
        timeout_secs,
        workbook_path: PathBuf::from(workbook_path),
        gap_report_path: PathBuf::from(gap_report_path),
        config_dump_path: non_empty(env, "CONFIG_DUMP_PATH").map(PathBuf::from),
    })
}

/// Credentials for commands that talk to the platform.
pub fn require_credentials(cfg: &Config) -> Result<&Credentials> {
    cfg.credentials
        .as_ref()
        .context("DD_API_KEY and DD_APP_KEY must be provided via env")
}
