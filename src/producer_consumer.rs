//! 有界队列 + 单消费者后台线程
//!
//! 任意数量的生产者线程通过非阻塞发送把日志放入有界队列，
//! 唯一的后台线程独占处理器（文件句柄与切割状态），顺序地完成切割和写入，
//! 因此文件句柄不需要加锁。

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, select};
use serde::{Deserialize, Serialize};

use crate::config::Record;
use crate::error::{ConfigError, LogError};

/// 默认队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 50_000;

/// 后台线程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// 队列容量，队列满时新日志被丢弃
    pub queue_capacity: usize,
    /// 队列为空时每次等待的时长（毫秒）
    pub idle_backoff_ms: u64,
    /// 关闭时的空闲超时（毫秒），超时内没有新日志则停止
    pub drain_timeout_ms: u64,
}

impl WorkerConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.idle_backoff_ms == 0 {
            return Err(ConfigError::InvalidWorkerTiming("空闲等待时间不能为 0"));
        }
        if self.idle_backoff_ms > 60_000 {
            return Err(ConfigError::InvalidWorkerTiming("空闲等待时间过长 (最大 60秒)"));
        }
        if self.drain_timeout_ms == 0 {
            return Err(ConfigError::InvalidWorkerTiming("关闭超时不能为 0"));
        }
        if self.drain_timeout_ms > 60_000 {
            return Err(ConfigError::InvalidWorkerTiming("关闭超时过长 (最大 60秒)"));
        }
        Ok(())
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_backoff_ms: 500,
            drain_timeout_ms: 1000,
        }
    }
}

/// 创建有界队列，返回生产者端和消费者端
pub fn record_queue(capacity: usize) -> (RecordQueue, Receiver<Record>) {
    let (sender, receiver) = bounded(capacity);
    let queue = RecordQueue {
        sender,
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (queue, receiver)
}

/// 队列的生产者端，可以在线程间克隆共享
#[derive(Clone)]
pub struct RecordQueue {
    sender: Sender<Record>,
    dropped: Arc<AtomicU64>,
}

impl RecordQueue {
    /// 非阻塞入队；队列已满或消费者已退出时丢弃该日志并返回 false
    pub fn try_enqueue(&self, record: Record) -> bool {
        match self.sender.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// 因队列饱和被丢弃的日志条数
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }
}

/// 处理器 trait - 由后台线程独占调用
pub trait LogProcessor: Send + 'static {
    /// 处理器名称，用于错误输出
    fn name(&self) -> &'static str;

    /// 处理单条日志
    fn process(&mut self, record: &Record) -> Result<(), LogError>;

    /// 刷新操作，队列变空时调用
    fn flush(&mut self) -> Result<(), LogError>;

    /// 清理资源
    fn cleanup(&mut self) -> Result<(), LogError>;
}

/// 后台线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }
}

/// 后台工作线程句柄
pub struct AsyncWorker {
    shutdown: Option<Sender<()>>,
    worker_thread: Option<thread::JoinHandle<()>>,
    state: Arc<AtomicU8>,
}

impl AsyncWorker {
    /// 启动后台线程，处理器的所有权移交给该线程
    pub fn spawn<P>(processor: P, receiver: Receiver<Record>, config: WorkerConfig) -> Result<Self, LogError>
    where
        P: LogProcessor,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let state = Arc::new(AtomicU8::new(WorkerState::Running as u8));
        let thread_state = Arc::clone(&state);

        let worker_thread = thread::Builder::new()
            .name(format!("alog-{}", processor.name()))
            .spawn(move || {
                Self::worker_thread(processor, receiver, shutdown_rx, config, thread_state);
            })?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            worker_thread: Some(worker_thread),
            state,
        })
    }

    /// 工作线程实现：RUNNING -> DRAINING -> STOPPED
    fn worker_thread<P>(
        mut processor: P,
        receiver: Receiver<Record>,
        shutdown: Receiver<()>,
        config: WorkerConfig,
        state: Arc<AtomicU8>,
    ) where
        P: LogProcessor,
    {
        let processor_name = processor.name();
        let idle_backoff = config.idle_backoff();

        loop {
            let running = select! {
                recv(receiver) -> msg => match msg {
                    Ok(record) => {
                        Self::process_one(&mut processor, &receiver, &record, processor_name);
                        true
                    }
                    // 所有生产者都已经退出
                    Err(_) => false,
                },
                // 关闭信号：发送端被丢弃
                recv(shutdown) -> _ => false,
                default(idle_backoff) => true,
            };
            if !running {
                break;
            }
        }

        state.store(WorkerState::Draining as u8, Ordering::Release);

        // 每收到一条日志就重新计时，空闲超时后强制结束
        let drain_timeout = config.drain_timeout();
        loop {
            match receiver.recv_timeout(drain_timeout) {
                Ok(record) => Self::process_one(&mut processor, &receiver, &record, processor_name),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Err(e) = processor.flush() {
            eprintln!("[{}] 关闭时处理器刷新失败: {}", processor_name, e);
        }
        if let Err(e) = processor.cleanup() {
            eprintln!("[{}] 处理器清理失败: {}", processor_name, e);
        }

        state.store(WorkerState::Stopped as u8, Ordering::Release);
    }

    fn process_one<P>(processor: &mut P, receiver: &Receiver<Record>, record: &Record, processor_name: &'static str)
    where
        P: LogProcessor,
    {
        if let Err(e) = processor.process(record) {
            eprintln!("[{}] 写入日志失败: {}", processor_name, e);
        }

        if receiver.is_empty() {
            if let Err(e) = processor.flush() {
                eprintln!("[{}] 处理器刷新失败: {}", processor_name, e);
            }
        }
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 发送关闭信号并等待后台线程结束
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // 丢弃发送端即为关闭信号
        self.shutdown.take();

        if let Some(thread) = self.worker_thread.take() {
            if thread.join().is_err() {
                eprintln!("[worker] 后台线程异常退出");
                self.state.store(WorkerState::Stopped as u8, Ordering::Release);
            }
        }
    }
}

impl Drop for AsyncWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
