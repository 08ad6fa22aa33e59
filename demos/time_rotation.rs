//! 按时间切割示例：每 10 分钟一个文件，终端只显示警告以上

use std::time::Duration;

use alog::{FileConfig, Level, LoggerBuilder, Rotation, TermConfig};

fn main() -> Result<(), alog::LogError> {
    let level = std::env::var("ALOG_LEVEL").unwrap_or_else(|_| "debug".to_string());

    let logger = LoggerBuilder::new()
        .with_level_str(&level)?
        .with_time_format("%Y-%m-%d %H:%M:%S")
        .add_terminal_with_config(TermConfig { level: Level::Warn })
        .add_file(
            FileConfig::new("./logs/time", "app.log")
                .with_rotation(Rotation::by_time(Duration::from_secs(10 * 60))),
        )
        .build()?;

    for i in 0..20 {
        alog::debug!(logger: &logger, "tick {}", i);
        if i % 5 == 0 {
            alog::warn!(logger: &logger, "checkpoint {}", i);
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    println!("dropped: {}", logger.dropped());
    logger.close();
    Ok(())
}
