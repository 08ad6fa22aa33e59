//! 按级别过滤：低于最低级别的日志不会出现在任何输出中

use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use alog::{CallSite, FileConfig, Level, Logger, LoggerBuilder, TermConfig};
use parking_lot::Mutex;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn levels_in(output: &str) -> Vec<Level> {
    output
        .lines()
        .map(|line| {
            let level = line.split("] [").nth(1).unwrap();
            level.parse().unwrap()
        })
        .collect()
}

fn log_every_level(logger: &Logger) {
    for level in Level::ALL {
        logger.log(level, format_args!("{} 级别消息", level), CallSite::new(file!(), "log_every_level", line!()));
    }
}

#[test]
fn test_level_logging() {
    for minimum in Level::ALL {
        let dir = tempfile::tempdir().unwrap();
        let term = SharedBuf::default();
        let mut file_config = FileConfig::new(dir.path(), "level.log");
        file_config.worker.drain_timeout_ms = 50;
        let path = file_config.path();

        let logger = LoggerBuilder::new()
            .with_level(minimum)
            .add_terminal_with_writer(TermConfig::default(), Box::new(term.clone()))
            .add_file(file_config)
            .build()
            .unwrap();

        log_every_level(&logger);
        logger.close();

        let expected: Vec<Level> = Level::ALL.into_iter().filter(|level| *level >= minimum).collect();
        let term_output = String::from_utf8(term.0.lock().clone()).unwrap();
        let file_output = fs::read_to_string(&path).unwrap();

        assert_eq!(levels_in(&term_output), expected, "terminal at {minimum}");
        assert_eq!(levels_in(&file_output), expected, "file at {minimum}");
    }
}

#[test]
fn test_macros_respect_level() {
    let term = SharedBuf::default();
    let logger = LoggerBuilder::new()
        .with_level(Level::Error)
        .add_terminal_with_writer(TermConfig::default(), Box::new(term.clone()))
        .build()
        .unwrap();

    alog::debug!(logger: &logger, "debug");
    alog::info!(logger: &logger, "info");
    alog::warn!(logger: &logger, "warn");
    alog::error!(logger: &logger, "error");
    alog::fatal!(logger: &logger, "fatal");

    let output = String::from_utf8(term.0.lock().clone()).unwrap();
    assert_eq!(levels_in(&output), vec![Level::Error, Level::Fatal]);
}

#[test]
fn test_each_sink_has_its_own_level() {
    let dir = tempfile::tempdir().unwrap();
    let term = SharedBuf::default();
    let mut file_config = FileConfig::new(dir.path(), "sinks.log").with_level(Level::Debug);
    file_config.worker.drain_timeout_ms = 50;
    let path = file_config.path();

    let logger = LoggerBuilder::new()
        .with_level(Level::Debug)
        .add_terminal_with_writer(TermConfig { level: Level::Warn }, Box::new(term.clone()))
        .add_file(file_config)
        .build()
        .unwrap();

    log_every_level(&logger);
    logger.close();

    let term_output = String::from_utf8(term.0.lock().clone()).unwrap();
    assert_eq!(levels_in(&term_output), vec![Level::Warn, Level::Error, Level::Fatal]);
    assert_eq!(levels_in(&fs::read_to_string(&path).unwrap()), Level::ALL.to_vec());
}
