//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。配置文件中未设置的值会回落到这里。

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

impl From<EnvError> for crate::error::MailstyleError {
    fn from(error: EnvError) -> Self {
        crate::error::MailstyleError::Config(error.to_string())
    }
}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 变量存在时才解析，未设置返回 `None`
    fn get_optional() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "MAILSTYLE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 启用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 网络相关环境变量
pub mod network {
    use super::*;

    /// 远程样式表请求超时
    pub struct HttpTimeout;
    impl EnvVar<Duration> for HttpTimeout {
        const NAME: &'static str = "MAILSTYLE_HTTP_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(10));
        const DESCRIPTION: &'static str = "Timeout in seconds for fetching remote stylesheets (1-300)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 300)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// 请求时发送的 User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "MAILSTYLE_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent when fetching remote stylesheets";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(format!("mailstyle/{}", env!("CARGO_PKG_VERSION"))),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User agent cannot be empty".to_string(),
                });
            }
            Ok(value.to_string())
        }
    }

    /// 是否允许抓取外部样式表
    pub struct FetchExternal;
    impl EnvVar<bool> for FetchExternal {
        const NAME: &'static str = "MAILSTYLE_FETCH_EXTERNAL";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Fetch stylesheets linked with absolute URLs";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 本地资源相关环境变量
pub mod assets {
    use super::*;

    /// 本地样式表的根目录
    pub struct Root;
    impl EnvVar<PathBuf> for Root {
        const NAME: &'static str = "MAILSTYLE_ASSET_ROOT";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Directory that local stylesheet links are resolved against";

        fn get() -> EnvResult<PathBuf> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(PathBuf::from(".")),
            }
        }

        fn parse(value: &str) -> EnvResult<PathBuf> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Asset root cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(value))
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let entries = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "warn".to_string()),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION, "unset".to_string()),
        (
            network::HttpTimeout::NAME,
            network::HttpTimeout::DESCRIPTION,
            "10".to_string(),
        ),
        (
            network::UserAgent::NAME,
            network::UserAgent::DESCRIPTION,
            format!("mailstyle/{}", env!("CARGO_PKG_VERSION")),
        ),
        (
            network::FetchExternal::NAME,
            network::FetchExternal::DESCRIPTION,
            "false".to_string(),
        ),
        (assets::Root::NAME, assets::Root::DESCRIPTION, ".".to_string()),
    ];
    for (name, description, default) in entries {
        docs.push_str(&format!("- `{}`: {} (default: {})\n", name, description, default));
    }

    docs
}
