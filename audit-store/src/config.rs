use std::path::PathBuf;

use crate::store::DEFAULT_STORAGE_KEY;

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "comar-audit.redb";

/// Tracker configuration
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | COMAR_DATA_DIR | ./data | 数据目录 (redb 文件) |
/// | COMAR_STORAGE_KEY | comar-audit-state | 文档存储键 |
/// | COMAR_PERSIST | true | false = 不落盘 (dry run) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 日志文件目录, 未设置时输出到 stderr |
///
/// # 示例
///
/// ```ignore
/// COMAR_DATA_DIR=/srv/audit LOG_LEVEL=debug comar-audit summary
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the redb database
    pub data_dir: PathBuf,
    /// Key of the document slot
    pub storage_key: String,
    /// Whether a persistence medium is used at all
    pub persist: bool,
    /// trace | debug | info | warn | error
    pub log_level: String,
    /// Daily-rolling log files go here when set
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("COMAR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            storage_key: std::env::var("COMAR_STORAGE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.into()),
            persist: std::env::var("COMAR_PERSIST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// 使用自定义数据目录覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config
    }

    /// Full path of the redb database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Load `.env` from the working directory (if any) and build the config
pub fn load_config() -> Config {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }
    Config::from_env()
}
