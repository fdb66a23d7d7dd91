// 应用配置
//
// - 环境变量：TMDB 凭证、语言、超时，以及监听地址
// - JSON 文件：查询缓存策略（新鲜期、回收期、清理间隔、类型缓存）
//   文件不存在时写入默认配置，文件损坏时备份旧文件并使用默认配置

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::services::pagination::CachePolicy;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_LANGUAGE: &str = "en-US";
pub const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONFIG_PATH: &str = "discovery_config.json";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置错误: {0}")]
    Invalid(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 目录 API 访问设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbSettings {
    pub read_token: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            read_token: None,
            api_key: None,
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            language: DEFAULT_TMDB_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TMDB_TIMEOUT_SECS,
        }
    }
}

/// 应用配置（来自环境变量）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub tmdb: TmdbSettings,
    pub host: String,
    pub port: u16,
    pub discovery_config_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数构建，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tmdb = TmdbSettings {
            read_token: get("TMDB_READ_TOKEN"),
            api_key: get("TMDB_API_KEY"),
            base_url: get("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            language: get("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_TMDB_LANGUAGE.to_string()),
            timeout_secs: parse_or_default("TMDB_TIMEOUT_SECS", get("TMDB_TIMEOUT_SECS"), DEFAULT_TMDB_TIMEOUT_SECS),
        };

        Self {
            tmdb,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or_default("PORT", get("PORT"), DEFAULT_PORT),
            discovery_config_path: get("DISCOVERY_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or_default<T: std::str::FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}

/// 查询缓存策略配置（JSON 文件）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// 发现页结果新鲜期（秒）
    pub discovery_stale_secs: u64,
    /// 发现页条目回收期（秒）
    pub discovery_gc_secs: u64,
    pub search_stale_secs: u64,
    pub search_gc_secs: u64,
    /// 缓存清理任务间隔（秒）
    pub cleanup_interval_secs: u64,
    /// 类型列表缓存时长（秒）
    pub genre_ttl_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            discovery_stale_secs: 5 * 60,
            discovery_gc_secs: 30 * 60,
            search_stale_secs: 0,
            search_gc_secs: 5 * 60,
            cleanup_interval_secs: 5 * 60,
            genre_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl DiscoveryConfig {
    pub fn discovery_policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.discovery_stale_secs),
            gc_time: Duration::from_secs(self.discovery_gc_secs),
        }
    }

    pub fn search_policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.search_stale_secs),
            gc_time: Duration::from_secs(self.search_gc_secs),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    pub fn genre_ttl(&self) -> Duration {
        Duration::from_secs(self.genre_ttl_secs)
    }

    /// 从配置文件加载
    ///
    /// - 文件不存在：使用默认配置并创建文件
    /// - 文件损坏：备份旧文件并使用默认配置
    pub async fn load(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            tracing::info!("Config file {:?} not found, using defaults", config_path);
            let config = Self::default();
            config.save(config_path).await?;
            return Ok(config);
        }

        let content = match fs::read_to_string(config_path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}, using defaults: {}", config_path, e);
                return Ok(Self::default());
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::info!("Loaded discovery config from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("Config file {:?} is corrupted, using defaults: {}", config_path, e);
                Self::backup_corrupted_config(config_path).await;
                Ok(Self::default())
            }
        }
    }

    /// 保存配置到文件
    pub async fn save(&self, config_path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ConfigError::Invalid(format!("创建配置目录失败: {}", e))
                })?;
            }
        }

        fs::write(config_path, json).await?;
        tracing::info!("Saved discovery config to {:?}", config_path);
        Ok(())
    }

    /// 备份损坏的配置文件；备份失败不影响启动
    async fn backup_corrupted_config(config_path: &Path) {
        let backup_path = config_path.with_extension("json.backup");
        match fs::rename(config_path, &backup_path).await {
            Ok(_) => tracing::info!("Backed up corrupted config to {:?}", backup_path),
            Err(e) => tracing::warn!("Failed to back up corrupted config: {}", e),
        }
    }
}
