//! 配置模块

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::producer_consumer::WorkerConfig;

/// 默认时间格式
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// 默认日志目录
pub const DEFAULT_LOG_DIR: &str = "./log/";
/// 默认日志文件名
pub const DEFAULT_FILE_NAME: &str = "ALog.log";
/// 默认文件大小上限 8MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 23;
/// 默认切割间隔 24 小时
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// 按时间切割的最小间隔
pub const MIN_ROTATION_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// 日志级别，按严重程度排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    /// 不区分大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(ConfigError::InvalidLevel(s.to_string())),
        }
    }
}

/// 日志记录 - 构造后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub file: String,
    pub function: String,
    pub line: u32,
    /// 按配置的时间格式格式化后的时间
    pub timestamp: String,
}

impl Record {
    /// 按 `[时间] [级别] [文件:函数:行号] 消息` 写入一行
    pub fn write_to(&self, buf: &mut dyn Write) -> io::Result<()> {
        writeln!(
            buf,
            "[{}] [{}] [{}:{}:{}] {}",
            self.timestamp, self.level, self.file, self.function, self.line, self.message
        )
    }

    pub fn render(&self) -> String {
        format!(
            "[{}] [{}] [{}:{}:{}] {}\n",
            self.timestamp, self.level, self.file, self.function, self.line, self.message
        )
    }

    /// 将时间字段按给定格式解析回本地时间
    pub fn parse_timestamp(&self, format: &str) -> Option<DateTime<Local>> {
        parse_timestamp(&self.timestamp, format)
    }
}

/// 从已渲染的日志行中取出时间并解析
pub fn parse_line_timestamp(line: &str, format: &str) -> Option<DateTime<Local>> {
    let (timestamp, _) = line.strip_prefix('[')?.split_once("] [")?;
    parse_timestamp(timestamp, format)
}

/// 只含日期的格式（如 `%Y-%m-%d`）解析为当天本地零点
pub(crate) fn parse_timestamp(timestamp: &str, format: &str) -> Option<DateTime<Local>> {
    let naive = match NaiveDateTime::parse_from_str(timestamp, format) {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(timestamp, format).ok()?.and_hms_opt(0, 0, 0)?,
    };
    Local.from_local_datetime(&naive).earliest()
}

pub(crate) fn format_timestamp(at: &DateTime<Local>, format: &str) -> String {
    write_formatted(at.format(format), format)
}

/// 按本地挂钟时间（不带时区）输出
pub(crate) fn format_wall_clock(at: &NaiveDateTime, format: &str) -> String {
    write_formatted(at.format(format), format)
}

fn write_formatted(formatted: impl std::fmt::Display, format: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(format.len() + 8);
    let result = write!(out, "{formatted}");
    // 格式在构建日志器时已经校验过
    debug_assert!(result.is_ok(), "无法按格式 {format:?} 输出时间");
    out
}

/// 校验时间格式，非法的格式在输出时才会失败，所以提前检查
pub fn validate_time_format(format: &str) -> Result<(), ConfigError> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTimeFormat(format.to_string()));
    }
    Ok(())
}

/// 文件切割模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// 不切割
    #[default]
    None,
    /// 按大小切割
    BySize { max_size: u64 },
    /// 按时间切割
    ByTime { interval: Duration },
}

impl Rotation {
    pub fn by_size(max_size: u64) -> Self {
        Rotation::BySize { max_size }
    }

    pub fn by_time(interval: Duration) -> Self {
        Rotation::ByTime { interval }
    }

    /// 每天零点切割
    pub fn daily() -> Self {
        Rotation::by_time(DEFAULT_ROTATION_INTERVAL)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Rotation::None => Ok(()),
            Rotation::BySize { max_size } if max_size == 0 => Err(ConfigError::ZeroMaxSize),
            Rotation::BySize { .. } => Ok(()),
            Rotation::ByTime { interval } if interval < MIN_ROTATION_INTERVAL => {
                Err(ConfigError::IntervalTooShort(interval))
            }
            Rotation::ByTime { .. } => Ok(()),
        }
    }
}

/// 文件日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub log_dir: PathBuf,
    pub file_name: String,
    /// 该处理器自己的最低级别
    pub level: Level,
    pub rotation: Rotation,
    pub worker: WorkerConfig,
}

impl FileConfig {
    pub fn new(log_dir: impl AsRef<Path>, file_name: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.worker.queue_capacity = capacity;
        self
    }

    /// 当前活动日志文件的完整路径
    pub fn path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_name.is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        self.rotation.validate()?;
        self.worker.validate()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            level: Level::Debug,
            rotation: Rotation::None,
            worker: WorkerConfig::default(),
        }
    }
}
