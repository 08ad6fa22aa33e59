//! 日志核心模块 - 级别过滤、构造日志记录并分发给各个处理器

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use chrono::Local;

use crate::config::{DEFAULT_TIME_FORMAT, FileConfig, Level, Record, format_timestamp, validate_time_format};
use crate::error::{ConfigError, LogError};
use crate::handler::{FileHandler, HandlerType, LogHandler, TermConfig, TermHandler};

/// 全局日志器实例
static LOGGER: ArcSwapOption<Logger> = ArcSwapOption::const_empty();

/// 调用位置，由日志宏在调用处捕获
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self { file, function, line }
    }

    /// 只保留文件名部分
    pub fn file_name(&self) -> &'static str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }
}

/// 日志器
pub struct Logger {
    level: Level,
    time_format: String,
    handlers: Vec<Box<dyn LogHandler>>,
    closed: AtomicBool,
}

impl Logger {
    /// 最低级别
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// 检查是否应该记录该级别的日志
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level && !self.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 记录一条日志；低于最低级别时不会构造日志记录
    pub fn log(&self, level: Level, args: std::fmt::Arguments<'_>, site: CallSite) {
        if !self.enabled(level) {
            return;
        }

        let record = Record {
            level,
            message: args.to_string(),
            file: site.file_name().to_string(),
            function: site.function.to_string(),
            line: site.line,
            timestamp: format_timestamp(&Local::now(), &self.time_format),
        };

        for handler in &self.handlers {
            handler.handle(&record);
        }
    }

    pub fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }

    /// 关闭日志器：先标记关闭，再等待各个处理器排空队列
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        for handler in &self.handlers {
            handler.close();
        }
    }

    /// 文件处理器因队列饱和丢弃的日志总数
    pub fn dropped(&self) -> u64 {
        self.file_handlers().map(FileHandler::dropped).sum()
    }

    pub fn handler_types(&self) -> Vec<HandlerType> {
        self.handlers.iter().map(|h| h.handler_type()).collect()
    }

    pub fn file_handlers(&self) -> impl Iterator<Item = &FileHandler> {
        self.handlers
            .iter()
            .filter_map(|handler| handler.as_any().downcast_ref::<FileHandler>())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

enum SinkConfig {
    Terminal(TermConfig, Option<Box<dyn Write + Send>>),
    File(FileConfig),
}

/// 日志构建器 - 配置只在构建时消费一次
pub struct LoggerBuilder {
    level: Level,
    time_format: String,
    sinks: Vec<SinkConfig>,
}

impl LoggerBuilder {
    /// 创建新的日志构建器
    pub fn new() -> Self {
        Self {
            level: Level::Debug,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            sinks: Vec::new(),
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 按字符串设置日志级别，不区分大小写
    pub fn with_level_str(self, level: &str) -> Result<Self, ConfigError> {
        Ok(self.with_level(level.parse()?))
    }

    /// 设置时间格式（chrono strftime 语法）
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// 添加终端处理器
    pub fn add_terminal(self) -> Self {
        self.add_terminal_with_config(TermConfig::default())
    }

    /// 添加带配置的终端处理器
    pub fn add_terminal_with_config(mut self, config: TermConfig) -> Self {
        self.sinks.push(SinkConfig::Terminal(config, None));
        self
    }

    /// 添加输出到指定 writer 的终端处理器
    pub fn add_terminal_with_writer(mut self, config: TermConfig, writer: Box<dyn Write + Send>) -> Self {
        self.sinks.push(SinkConfig::Terminal(config, Some(writer)));
        self
    }

    /// 添加文件处理器
    pub fn add_file(mut self, config: FileConfig) -> Self {
        self.sinks.push(SinkConfig::File(config));
        self
    }

    /// 构建日志器；配置错误或无法打开日志文件时返回错误
    pub fn build(self) -> Result<Logger, LogError> {
        validate_time_format(&self.time_format)?;
        if self.sinks.is_empty() {
            return Err(ConfigError::NoSink.into());
        }

        let mut handlers: Vec<Box<dyn LogHandler>> = Vec::with_capacity(self.sinks.len());
        for sink in self.sinks {
            let handler: Box<dyn LogHandler> = match sink {
                SinkConfig::Terminal(config, Some(writer)) => Box::new(TermHandler::with_writer(config, writer)),
                SinkConfig::Terminal(config, None) => Box::new(TermHandler::new(config)),
                // 已启动的处理器在 handlers 被丢弃时关闭
                SinkConfig::File(config) => Box::new(FileHandler::new(config, &self.time_format)?),
            };
            handlers.push(handler);
        }

        Ok(Logger {
            level: self.level,
            time_format: self.time_format,
            handlers,
            closed: AtomicBool::new(false),
        })
    }

    /// 构建并初始化全局日志器
    pub fn init(self) -> Result<(), LogError> {
        let logger = self.build()?;
        set_logger(Arc::new(logger))?;
        Ok(())
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 设置全局日志器，已经存在时返回错误
pub fn set_logger(logger: Arc<Logger>) -> Result<(), SetLoggerError> {
    let previous = LOGGER.compare_and_swap(&None::<Arc<Logger>>, Some(logger));
    if previous.is_some() {
        return Err(SetLoggerError(()));
    }
    Ok(())
}

/// 获取全局日志器
pub fn logger() -> Option<Arc<Logger>> {
    LOGGER.load_full()
}

/// 关闭并移除全局日志器，由应用在自己的退出流程中调用
pub fn shutdown() {
    if let Some(logger) = LOGGER.swap(None) {
        logger.close();
    }
}

#[doc(hidden)]
pub fn __log_global(level: Level, args: std::fmt::Arguments<'_>, site: CallSite) {
    let guard = LOGGER.load();
    if let Some(logger) = &*guard {
        logger.log(level, args, site);
    }
}

/// 日志器设置错误
#[derive(Debug)]
pub struct SetLoggerError(());

impl std::fmt::Display for SetLoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("failed to set logger")
    }
}

impl std::error::Error for SetLoggerError {}
