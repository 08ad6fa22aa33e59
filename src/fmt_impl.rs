//! 快速初始化模块 - 提供类似 tracing_subscriber::fmt().init() 的简洁 API
//!
//! # 使用示例
//!
//! ```no_run
//! use alog::{error, info};
//!
//! alog::fmt()
//!     .with_max_level(alog::Level::Info)
//!     .init()
//!     .unwrap();
//!
//! error!("这是一条错误日志");
//! info!("这是一条信息日志");
//! alog::shutdown();
//! ```

use crate::config::{DEFAULT_TIME_FORMAT, Level};
use crate::error::LogError;
use crate::handler::TermConfig;
use crate::LoggerBuilder;

/// 快速初始化器：只输出到终端的全局日志器
#[derive(Debug, Clone)]
pub struct FmtInitializer {
    max_level: Level,
    time_format: String,
}

impl Default for FmtInitializer {
    fn default() -> Self {
        Self {
            max_level: Level::Debug,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl FmtInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置最低日志级别
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    fn builder(self) -> LoggerBuilder {
        LoggerBuilder::new()
            .with_level(self.max_level)
            .with_time_format(self.time_format)
            .add_terminal_with_config(TermConfig { level: self.max_level })
    }

    /// 初始化全局日志器
    pub fn init(self) -> Result<(), LogError> {
        self.builder().init()
    }
}

/// 创建快速初始化器
pub fn fmt() -> FmtInitializer {
    FmtInitializer::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_initializer_default() {
        let initializer = FmtInitializer::default();
        assert_eq!(initializer.max_level, Level::Debug);
        assert_eq!(initializer.time_format, DEFAULT_TIME_FORMAT);
    }

    #[test]
    fn test_fmt_initializer_builder() {
        let initializer = fmt().with_max_level(Level::Warn).with_time_format("%H:%M:%S");
        assert_eq!(initializer.max_level, Level::Warn);

        let logger = initializer.builder().build().unwrap();
        assert_eq!(logger.level(), Level::Warn);
        assert!(!logger.enabled(Level::Info));
        logger.close();
    }
}
