//! 终端日志处理器 - 同步输出到标准输出

use std::any::Any;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::{Level, Record};
use crate::handler::{HandlerType, LogHandler};

/// 终端输出配置
#[derive(Debug, Clone)]
pub struct TermConfig {
    /// 终端独立的最低级别
    pub level: Level,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self { level: Level::Debug }
    }
}

/// 终端日志处理器
pub struct TermHandler {
    config: TermConfig,
    writer: Mutex<Box<dyn Write + Send>>,
    closed: AtomicBool,
}

impl TermHandler {
    /// 输出到标准输出
    pub fn new(config: TermConfig) -> Self {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    /// 输出到任意 writer
    pub fn with_writer(config: TermConfig, writer: Box<dyn Write + Send>) -> Self {
        Self {
            config,
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }
}

impl LogHandler for TermHandler {
    fn handle(&self, record: &Record) {
        if self.closed.load(Ordering::Acquire) || record.level < self.config.level {
            return;
        }

        let mut writer = self.writer.lock();
        if let Err(e) = record.write_to(&mut **writer).and_then(|_| writer.flush()) {
            eprintln!("[term] 写入失败: {}", e);
        }
    }

    fn flush(&self) {
        if let Err(e) = self.writer.lock().flush() {
            eprintln!("[term] 刷新失败: {}", e);
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.flush();
        }
    }

    fn level(&self) -> Level {
        self.config.level
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::Terminal
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
