//! 文件轮转示例

use std::thread;
use std::time::Duration;

use alog::{FileConfig, Level, LoggerBuilder, Rotation, error, info, warn};

fn main() -> Result<(), alog::LogError> {
    let file_config = FileConfig::new("./logs/rotation", "rotation.log")
        .with_rotation(Rotation::by_size(1024)); // 1KB - 很小以测试轮转

    LoggerBuilder::new()
        .with_level(Level::Info)
        .add_terminal()
        .add_file(file_config)
        .init()?;

    println!("开始测试文件轮转...");

    // 生成大量日志以触发轮转
    for i in 0..100 {
        info!("这是第 {} 条日志，用于测试文件轮转功能", i);
        warn!("警告日志 {}", i);
        error!("错误日志 {}", i);

        thread::sleep(Duration::from_millis(10));
    }

    // 退出前显式关闭，排空队列
    alog::shutdown();
    println!("日志生成完成，请检查 ./logs/rotation 目录");
    Ok(())
}
