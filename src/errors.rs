use std::fmt;

#[derive(Debug, Clone)]
pub enum LinktraceError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Serialization(String),
}

impl LinktraceError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinktraceError::DatabaseConfig(_) => "E001",
            LinktraceError::DatabaseConnection(_) => "E002",
            LinktraceError::DatabaseOperation(_) => "E003",
            LinktraceError::FileOperation(_) => "E004",
            LinktraceError::Validation(_) => "E005",
            LinktraceError::NotFound(_) => "E006",
            LinktraceError::Conflict(_) => "E007",
            LinktraceError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinktraceError::DatabaseConfig(_) => "Database Configuration Error",
            LinktraceError::DatabaseConnection(_) => "Database Connection Error",
            LinktraceError::DatabaseOperation(_) => "Database Operation Error",
            LinktraceError::FileOperation(_) => "File Operation Error",
            LinktraceError::Validation(_) => "Validation Error",
            LinktraceError::NotFound(_) => "Resource Not Found",
            LinktraceError::Conflict(_) => "Resource Conflict",
            LinktraceError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinktraceError::DatabaseConfig(msg) => msg,
            LinktraceError::DatabaseConnection(msg) => msg,
            LinktraceError::DatabaseOperation(msg) => msg,
            LinktraceError::FileOperation(msg) => msg,
            LinktraceError::Validation(msg) => msg,
            LinktraceError::NotFound(msg) => msg,
            LinktraceError::Conflict(msg) => msg,
            LinktraceError::Serialization(msg) => msg,
        }
    }

    /// Storage-layer failures (creation or update could not be persisted)
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            LinktraceError::DatabaseConfig(_)
                | LinktraceError::DatabaseConnection(_)
                | LinktraceError::DatabaseOperation(_)
        )
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LinktraceError::Validation(_) | LinktraceError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            LinktraceError::NotFound(_) => StatusCode::NOT_FOUND,
            LinktraceError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinktraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinktraceError {}

// 便捷的构造函数
impl LinktraceError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinktraceError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinktraceError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinktraceError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinktraceError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinktraceError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinktraceError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinktraceError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinktraceError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinktraceError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinktraceError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinktraceError {
    fn from(err: std::io::Error) -> Self {
        LinktraceError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinktraceError {
    fn from(err: serde_json::Error) -> Self {
        LinktraceError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinktraceError>;
