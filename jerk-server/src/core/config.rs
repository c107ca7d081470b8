use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | PUBLIC_ORIGIN | http://localhost:3000 | 二维码链接的对外地址 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REMOTE_STORE_URL | (未设置) | 远端文档存储地址，未设置时仅用本地存储 |
/// | REMOTE_STORE_API_KEY | (未设置) | 远端存储 Bearer 密钥 |
/// | REMOTE_TIMEOUT_MS | 5000 | 远端请求超时(毫秒) |
/// | LOCATION_VERIFICATION | true | 创建订单时是否校验位置 |
/// | AUTO_COMPLETE_MINUTES | 0 | 已取餐订单自动完成的分钟数 (0 = 关闭) |
/// | SYNC_INTERVAL_SECS | 30 | 待同步队列扫描间隔 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | (未设置) | 日志文件目录 (存在时按天滚动写入) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/jerk HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 对外访问地址 (二维码链接前缀)
    pub public_origin: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 远端文档存储 URL
    pub remote_store_url: Option<String>,
    /// 远端存储 API 密钥
    pub remote_store_api_key: Option<String>,
    /// 远端请求超时 (毫秒)
    pub remote_timeout_ms: u64,
    /// 创建订单前是否做位置校验
    pub location_verification: bool,
    /// 已取餐订单自动标记送达的分钟数，0 表示关闭
    pub auto_complete_minutes: u64,
    /// 待同步队列扫描间隔 (秒)
    pub sync_interval_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            public_origin: std::env::var("PUBLIC_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            remote_store_url: env_opt("REMOTE_STORE_URL"),
            remote_store_api_key: env_opt("REMOTE_STORE_API_KEY"),
            remote_timeout_ms: std::env::var("REMOTE_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            location_verification: std::env::var("LOCATION_VERIFICATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            auto_complete_minutes: std::env::var("AUTO_COMPLETE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景：仅本地存储、关闭后台自动完成
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.remote_store_url = None;
        config.remote_store_api_key = None;
        config.auto_complete_minutes = 0;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 本地数据库文件: work_dir/database/jerk.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("jerk.redb")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Pending-sync scan interval, at least one second
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    /// Auto-complete threshold, `None` when disabled
    pub fn auto_complete_after(&self) -> Option<Duration> {
        (self.auto_complete_minutes > 0).then(|| Duration::from_secs(self.auto_complete_minutes * 60))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
