//! 错误类型

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::SetLoggerError;

/// 配置错误 - 在构建日志器时立即返回
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("配置错误: 无效的日志级别 {0:?}")]
    InvalidLevel(String),

    #[error("配置错误: 切割文件时间至少为10分钟 (当前 {0:?})")]
    IntervalTooShort(Duration),

    #[error("配置错误: 文件大小上限不能为 0")]
    ZeroMaxSize,

    #[error("配置错误: 队列容量不能为 0")]
    ZeroQueueCapacity,

    #[error("配置错误: 日志文件名不能为空")]
    EmptyFileName,

    #[error("配置错误: 无效的时间格式 {0:?}")]
    InvalidTimeFormat(String),

    #[error("配置错误: 按时间切割要求时间格式可以被解析回时间 {0:?}")]
    TimeFormatNotParseable(String),

    #[error("配置错误: {0}")]
    InvalidWorkerTiming(&'static str),

    #[error("配置错误: 必须至少添加一个处理器（终端或文件）")]
    NoSink,
}

/// 日志库错误
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 启动阶段无法创建目录或打开日志文件
    #[error("无法打开日志文件 {}: {source}", path.display())]
    Startup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("日志文件IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("日志文件未打开")]
    FileClosed,

    #[error(transparent)]
    SetLogger(#[from] SetLoggerError),
}
