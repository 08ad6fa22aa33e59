//! 日志处理器模块

use std::any::Any;

use crate::config::{Level, Record};

/// 日志处理器 trait
pub trait LogHandler: Send + Sync + Any {
    /// 处理日志记录，不返回结果，错误只在处理器内部报告
    fn handle(&self, record: &Record);

    /// 刷新处理器
    fn flush(&self);

    /// 关闭处理器，之后的日志都被忽略
    fn close(&self);

    /// 处理器自己的最低级别
    fn level(&self) -> Level;

    /// 获取处理器类型
    fn handler_type(&self) -> HandlerType;

    /// 类型安全的向下转型
    fn as_any(&self) -> &dyn Any;
}

/// 处理器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerType {
    Terminal,
    File,
}

pub mod term;
pub mod file;

pub use term::{TermConfig, TermHandler};
pub use file::{FileHandler, FileProcessor, FileWriter};
