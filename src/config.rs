//! 配置模块
//!
//! 从 JSON 文件加载服务配置，再用环境变量覆盖

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示按 CPU 核数）
    #[serde(default)]
    pub workers: usize,
}

/// 远程数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 项目地址，如 https://<project>.supabase.co
    #[serde(default)]
    pub url: String,
    /// 服务密钥，作为 `apikey` 和 Bearer Token 发送
    #[serde(default)]
    pub key: String,
    /// 日线行情表名
    #[serde(default = "default_table")]
    pub table: String,
    /// 请求超时（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 无 limit 查询的分页大小
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// 市场日历配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// 用于确定“今天”的 IANA 时区
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// 配置文件路径（如有）
    #[serde(skip)]
    pub source: Option<String>,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_table() -> String { "CompaniesData".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_page_size() -> usize { 1000 }
fn default_timezone() -> String { "UTC".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: default_table(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置：优先读取配置文件，否则使用默认值，最后应用环境变量
    pub fn load() -> Result<Self> {
        let config_paths = ["config.json", "config/config.json"];

        let mut config = match config_paths.into_iter().find(|p| Path::new(p).exists()) {
            Some(path) => {
                let mut config = Self::from_file(path)
                    .with_context(|| format!("Failed to load configuration file {}", path))?;
                config.source = Some(path.to_string());
                config
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// 从变量查找函数应用覆盖（生产环境为进程环境变量）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.url = url;
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.store.key = key;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid PORT value: {}", port))?;
        }
        if let Some(timezone) = lookup("MARKET_TIMEZONE") {
            self.market.timezone = timezone;
        }
        Ok(())
    }

    /// 校验配置，无法启动时返回错误
    pub fn validate(&self) -> Result<()> {
        if self.store.url.trim().is_empty() || self.store.key.trim().is_empty() {
            return Err(anyhow!(
                "Data store credentials are not set (SUPABASE_URL / SUPABASE_KEY)"
            ));
        }
        Url::parse(&self.store.url)
            .map_err(|e| anyhow!("Invalid data store URL {}: {}", self.store.url, e))?;
        if self.store.page_size == 0 {
            return Err(anyhow!("store.page_size must be greater than zero"));
        }
        self.market_timezone()?;
        Ok(())
    }

    /// 解析市场时区
    pub fn market_timezone(&self) -> Result<Tz> {
        self.market
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown market timezone {}: {}", self.market.timezone, e))
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.store.url = "https://example.supabase.co".to_string();
        config.store.key = "service-key".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.store.table, "CompaniesData");
        assert_eq!(config.store.page_size, 1000);
        assert_eq!(config.market_timezone().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"server": {"port": 9000}, "store": {"url": "https://x.supabase.co"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.url, "https://x.supabase.co");
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SUPABASE_URL", "https://env.supabase.co"),
            ("SUPABASE_KEY", "env-key"),
            ("PORT", "8081"),
            ("MARKET_TIMEZONE", "America/New_York"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.url, "https://env.supabase.co");
        assert_eq!(config.store.key, "env-key");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.market_timezone().unwrap(), chrono_tz::America::New_York);
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|name| (name == "PORT").then(|| "not-a-port".to_string()));
        assert!(result.is_err());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(AppConfig::default().validate().is_err());

        let mut missing_key = configured();
        missing_key.store.key = "  ".to_string();
        assert!(missing_key.validate().is_err());

        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url_and_timezone() {
        let mut bad_url = configured();
        bad_url.store.url = "not a url".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_tz = configured();
        bad_tz.market.timezone = "Mars/Olympus_Mons".to_string();
        assert!(bad_tz.validate().is_err());
    }
}
