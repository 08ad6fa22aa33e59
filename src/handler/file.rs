//! 文件日志处理器
//!
//! 生产者端只做级别过滤和非阻塞入队；文件句柄和切割状态归后台线程中的
//! [`FileProcessor`] 独占。

use std::any::Any;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::config::{FileConfig, Level, Record, Rotation, format_timestamp, parse_timestamp, validate_time_format};
use crate::error::{ConfigError, LogError};
use crate::handler::{HandlerType, LogHandler};
use crate::producer_consumer::{AsyncWorker, LogProcessor, RecordQueue, WorkerState, record_queue};
use crate::rotation::RotationPolicy;

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// 持有当前活动的日志文件
pub struct FileWriter {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    /// 当前文件已写入的字节数
    size: u64,
}

impl FileWriter {
    /// 创建目录并以追加模式打开文件，失败即为启动错误
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| LogError::Startup {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let startup = |source| LogError::Startup {
            path: path.clone(),
            source,
        };
        let file = open_append(&path).map_err(startup)?;
        let size = file.metadata().map_err(startup)?.len();

        Ok(Self {
            path,
            file: Some(BufWriter::new(file)),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn write(&mut self, line: &[u8]) -> Result<(), LogError> {
        let file = self.file.as_mut().ok_or(LogError::FileClosed)?;
        file.write_all(line)?;
        self.size += line.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), LogError> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    /// 关闭当前文件，重命名为 `<path>.<suffix>.bak`，再在原路径打开新文件
    ///
    /// 重命名失败时重新打开原文件；新文件打开失败时退回到备份文件，
    /// 保证后台线程始终持有一个可写的句柄。
    pub fn rotate(&mut self, suffix: &str) -> Result<PathBuf, LogError> {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                self.file = Some(file);
                return Err(e.into());
            }
        }

        let archive = self.archive_path(suffix);
        if let Err(e) = fs::rename(&self.path, &archive) {
            self.file = open_append(&self.path).ok().map(BufWriter::new);
            return Err(e.into());
        }

        match open_append(&self.path) {
            Ok(file) => {
                self.file = Some(BufWriter::new(file));
                self.size = 0;
                Ok(archive)
            }
            Err(e) => {
                self.file = open_append(&archive).ok().map(BufWriter::new);
                Err(e.into())
            }
        }
    }

    /// 同一秒内多次切割时追加序号，避免覆盖已有备份
    fn archive_path(&self, suffix: &str) -> PathBuf {
        let with_suffix = |suffix: &str| {
            let mut name = OsString::from(self.path.as_os_str());
            name.push(format!(".{suffix}.bak"));
            PathBuf::from(name)
        };

        let mut archive = with_suffix(suffix);
        let mut seq = 1;
        while archive.exists() {
            archive = with_suffix(&format!("{suffix}-{seq}"));
            seq += 1;
        }
        archive
    }

    pub fn close(&mut self) -> Result<(), LogError> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.get_ref().sync_all()?;
        }
        Ok(())
    }
}

/// 后台线程中的文件处理器：切割检查 + 写入
pub struct FileProcessor {
    writer: FileWriter,
    policy: RotationPolicy,
    time_format: String,
    /// 按大小切割失败后，再写满一个阈值才重试
    size_offset: u64,
    line: Vec<u8>,
}

impl FileProcessor {
    pub fn open(config: &FileConfig, time_format: &str) -> Result<Self, LogError> {
        Self::open_at(config, time_format, Local::now())
    }

    /// `now` 作为按时间切割的初始锚点
    pub fn open_at(config: &FileConfig, time_format: &str, now: DateTime<Local>) -> Result<Self, LogError> {
        let writer = FileWriter::open(config.path())?;
        Ok(Self {
            writer,
            policy: RotationPolicy::new(config.rotation, now),
            time_format: time_format.to_string(),
            size_offset: 0,
            line: Vec::with_capacity(256),
        })
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    fn rotate_if_needed(&mut self, at: DateTime<Local>) {
        let current = self.writer.size().saturating_sub(self.size_offset);
        if !self.policy.should_rotate(current, at) {
            return;
        }

        let suffix = self.policy.archive_suffix(Local::now());
        let result = self.writer.rotate(&suffix);

        match self.policy.rotation() {
            Rotation::ByTime { .. } => self.policy.advance(at),
            Rotation::BySize { .. } if result.is_err() => self.size_offset = self.writer.size(),
            _ => self.size_offset = 0,
        }

        if let Err(e) = result {
            eprintln!("[{}] 切割日志文件 {} 失败: {}", self.name(), self.writer.path().display(), e);
        }
    }
}

impl LogProcessor for FileProcessor {
    fn name(&self) -> &'static str {
        "file"
    }

    fn process(&mut self, record: &Record) -> Result<(), LogError> {
        // 时间格式无法解析出日期时退回到当前时间
        let at = record.parse_timestamp(&self.time_format).unwrap_or_else(Local::now);
        self.rotate_if_needed(at);

        self.line.clear();
        record.write_to(&mut self.line)?;
        self.writer.write(&self.line)
    }

    fn flush(&mut self) -> Result<(), LogError> {
        self.writer.flush()
    }

    fn cleanup(&mut self) -> Result<(), LogError> {
        self.writer.close()
    }
}

/// 文件日志处理器 - 非阻塞入队
pub struct FileHandler {
    level: Level,
    path: PathBuf,
    queue: RecordQueue,
    worker: Mutex<Option<AsyncWorker>>,
    closed: AtomicBool,
}

impl FileHandler {
    /// 打开日志文件并启动后台线程
    pub fn new(config: FileConfig, time_format: &str) -> Result<Self, LogError> {
        config.validate()?;
        validate_time_format(time_format)?;

        // 按时间切割依赖把日志时间解析回来
        if matches!(config.rotation, Rotation::ByTime { .. }) {
            let sample = format_timestamp(&Local::now(), time_format);
            if parse_timestamp(&sample, time_format).is_none() {
                return Err(ConfigError::TimeFormatNotParseable(time_format.to_string()).into());
            }
        }

        let processor = FileProcessor::open(&config, time_format)?;
        let (queue, receiver) = record_queue(config.worker.queue_capacity);
        let worker = AsyncWorker::spawn(processor, receiver, config.worker.clone())?;

        Ok(Self {
            level: config.level,
            path: config.path(),
            queue,
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
        })
    }

    /// 当前活动日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 因队列饱和被丢弃的日志条数
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker
            .lock()
            .as_ref()
            .map(AsyncWorker::state)
            .unwrap_or(WorkerState::Stopped)
    }
}

impl LogHandler for FileHandler {
    fn handle(&self, record: &Record) {
        if self.closed.load(Ordering::Acquire) || record.level < self.level {
            return;
        }
        self.queue.try_enqueue(record.clone());
    }

    /// 后台线程在队列为空时自行刷新
    fn flush(&self) {}

    fn close(&self) {
        // 先标记关闭，再通知后台线程
        self.closed.store(true, Ordering::Release);
        // 在锁外等待后台线程退出
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.shutdown();
        }
    }

    fn level(&self) -> Level {
        self.level
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::File
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        self.close();
    }
}
