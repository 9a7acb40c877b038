use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、可信代理
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - tracking: 重定向页与 /api/track 相关配置
/// - collector: 客户端采集器的时间窗口与采样上限
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LT，分隔符：__
    /// 示例：LT__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 LT，分隔符 __
            .add_source(
                Environment::with_prefix("LT")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 可信代理（IP 或 CIDR），来自这些地址的请求使用 X-Forwarded-For
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
    /// 对外访问地址（CLI 输出短链接时使用），未设置时使用 host:port
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// POST /api/links 的 Bearer Token，未设置时接口关闭
    #[serde(default)]
    pub links_api_token: Option<String>,
}

impl ServerConfig {
    /// 短链接对外的基础地址，不带结尾斜杠
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 重定向页 / 关联接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 引导页引用的采集脚本地址
    #[serde(default = "default_collector_script_path")]
    pub collector_script_path: String,
    /// /api/track 请求体上限（字节）
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// 是否把请求头写入 server_observed_data
    #[serde(default = "default_capture_headers")]
    pub capture_headers: bool,
}

/// 客户端采集器配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectorConfig {
    #[serde(default = "default_behavior_window_ms")]
    pub behavior_window_ms: u64,
    #[serde(default = "default_max_samples")]
    pub pointer_max_samples: usize,
    #[serde(default = "default_max_samples")]
    pub key_max_samples: usize,
    #[serde(default = "default_max_samples")]
    pub touch_max_samples: usize,
    #[serde(default = "default_max_samples")]
    pub scroll_max_samples: usize,
    #[serde(default = "default_sensor_timeout_ms")]
    pub sensor_timeout_ms: u64,
    /// 电池、存储、媒体设备等异步接口的等待上限
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "linktrace.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_collector_script_path() -> String {
    "/static/collector.js".to_string()
}

fn default_max_payload_bytes() -> usize {
    256 * 1024
}

fn default_capture_headers() -> bool {
    true
}

fn default_behavior_window_ms() -> u64 {
    1000
}

fn default_max_samples() -> usize {
    50
}

fn default_sensor_timeout_ms() -> u64 {
    500
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

fn default_delivery_timeout_ms() -> u64 {
    3000
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
            public_base_url: None,
            links_api_token: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            collector_script_path: default_collector_script_path(),
            max_payload_bytes: default_max_payload_bytes(),
            capture_headers: default_capture_headers(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            behavior_window_ms: default_behavior_window_ms(),
            pointer_max_samples: default_max_samples(),
            key_max_samples: default_max_samples(),
            touch_max_samples: default_max_samples(),
            scroll_max_samples: default_max_samples(),
            sensor_timeout_ms: default_sensor_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
        }
    }
}
