//! alog - 分级日志库
//!
//! 终端同步输出，文件由后台线程异步写入并按大小或时间切割。
//! 生产者线程只做一次非阻塞入队，队列满时日志被丢弃，记录日志永远不会阻塞调用方。
//!
//! ```no_run
//! use alog::config::DEFAULT_MAX_FILE_SIZE;
//! use alog::{FileConfig, Level, LoggerBuilder, Rotation};
//!
//! let logger = LoggerBuilder::new()
//!     .with_level(Level::Info)
//!     .add_terminal()
//!     .add_file(FileConfig::new("./log", "app.log").with_rotation(Rotation::by_size(DEFAULT_MAX_FILE_SIZE)))
//!     .build()
//!     .expect("无法初始化日志");
//!
//! alog::info!(logger: &logger, "服务启动，端口 {}", 8080);
//! logger.close();
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod fmt_impl;
pub mod handler;
pub mod producer_consumer;
pub mod rotation;

// 重新导出主要类型
pub use config::{FileConfig, Level, Record, Rotation, parse_line_timestamp};
pub use crate::core::{CallSite, Logger, LoggerBuilder, SetLoggerError, logger, set_logger, shutdown};
pub use error::{ConfigError, LogError};
pub use fmt_impl::fmt;
pub use handler::{FileHandler, LogHandler, TermConfig, TermHandler};
pub use producer_consumer::{AsyncWorker, LogProcessor, RecordQueue, WorkerConfig, WorkerState, record_queue};
pub use rotation::RotationPolicy;

#[doc(hidden)]
pub use crate::core::__log_global;

// 日志宏：`info!("...")` 写入全局日志器，`info!(logger: &l, "...")` 写入指定日志器
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::__private_log!(logger: $logger, $crate::Level::Fatal, $($arg)+));
    ($($arg:tt)+) => ($crate::__private_log!($crate::Level::Fatal, $($arg)+));
}

#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::__private_log!(logger: $logger, $crate::Level::Error, $($arg)+));
    ($($arg:tt)+) => ($crate::__private_log!($crate::Level::Error, $($arg)+));
}

#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::__private_log!(logger: $logger, $crate::Level::Warn, $($arg)+));
    ($($arg:tt)+) => ($crate::__private_log!($crate::Level::Warn, $($arg)+));
}

#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::__private_log!(logger: $logger, $crate::Level::Info, $($arg)+));
    ($($arg:tt)+) => ($crate::__private_log!($crate::Level::Info, $($arg)+));
}

#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::__private_log!(logger: $logger, $crate::Level::Debug, $($arg)+));
    ($($arg:tt)+) => ($crate::__private_log!($crate::Level::Debug, $($arg)+));
}

#[macro_export]
#[doc(hidden)]
macro_rules! __private_log {
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        if logger.enabled($level) {
            logger.log($level, format_args!($($arg)+), $crate::__call_site!());
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::__log_global($level, format_args!($($arg)+), $crate::__call_site!())
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __call_site {
    () => {
        $crate::CallSite::new(file!(), $crate::__function_name!(), line!())
    };
}

/// 调用处所在函数的名字
#[macro_export]
#[doc(hidden)]
macro_rules! __function_name {
    () => {{
        fn __f() {}
        $crate::__short_function_name(::std::any::type_name_of_val(&__f))
    }};
}

#[doc(hidden)]
pub fn __short_function_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__f").unwrap_or(path);
    path.rsplit("::").find(|segment| *segment != "{{closure}}").unwrap_or(path)
}

/// 便捷初始化函数：全局终端日志器
pub fn init() -> Result<(), LogError> {
    LoggerBuilder::new().add_terminal().init()
}

pub fn init_with_level(level: Level) -> Result<(), LogError> {
    LoggerBuilder::new().add_terminal().with_level(level).init()
}
