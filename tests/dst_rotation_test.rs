//! 夏令时切换日的按时间切割（固定 America/New_York 时区）

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use alog::config::DEFAULT_TIME_FORMAT;
use alog::handler::FileProcessor;
use alog::{FileConfig, Level, LogProcessor, Record, Rotation, RotationPolicy};

static NEW_YORK: Once = Once::new();

/// 本文件的所有测试共用同一个时区，在读取本地时间之前设置
fn use_new_york_time() {
    NEW_YORK.call_once(|| unsafe { std::env::set_var("TZ", "America/New_York") });
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest().unwrap()
}

fn record(message: &str, timestamp: &str) -> Record {
    Record {
        level: Level::Info,
        message: message.to_string(),
        file: "dst_rotation_test.rs".to_string(),
        function: "record".to_string(),
        line: 1,
        timestamp: timestamp.to_string(),
    }
}

fn archives(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bak"))
        .collect();
    found.sort();
    found
}

#[test]
fn test_daily_rotation_on_spring_forward_day() {
    use_new_york_time();

    // 2024-03-10 只有 23 小时
    let policy = RotationPolicy::new(Rotation::daily(), local(2024, 3, 10, 0, 0));
    let elapsed = local(2024, 3, 11, 0, 30) - local(2024, 3, 10, 0, 0);
    assert_eq!(elapsed, chrono::TimeDelta::minutes(23 * 60 + 30));

    assert!(!policy.should_rotate(0, local(2024, 3, 10, 3, 30)));
    assert!(!policy.should_rotate(0, local(2024, 3, 10, 23, 30)));
    assert!(policy.should_rotate(0, local(2024, 3, 11, 0, 30)));
    assert_eq!(policy.archive_suffix(Local::now()), "20240310");
}

#[test]
fn test_daily_rotation_on_fall_back_day_rotates_once() {
    use_new_york_time();

    // 2024-11-03 有 25 小时
    let dir = tempfile::tempdir().unwrap();
    let config = FileConfig::new(dir.path(), "daily.log").with_rotation(Rotation::daily());
    let mut processor = FileProcessor::open_at(&config, DEFAULT_TIME_FORMAT, local(2024, 11, 3, 0, 0)).unwrap();

    for minute in 30..35 {
        let late = record(&format!("late {minute}"), &format!("2024-11-03 23:{minute}:00"));
        processor.process(&late).unwrap();
    }
    assert!(archives(dir.path()).is_empty());

    processor.process(&record("next day", "2024-11-04 00:10:00")).unwrap();
    processor.process(&record("next day again", "2024-11-04 00:20:00")).unwrap();
    processor.cleanup().unwrap();

    let archive = dir.path().join("daily.log.20241103.bak");
    assert_eq!(archives(dir.path()), vec![archive.clone()]);
    assert_eq!(fs::read_to_string(&archive).unwrap().lines().count(), 5);
    assert_eq!(fs::read_to_string(config.path()).unwrap().lines().count(), 2);
}

#[test]
fn test_hourly_rotation_during_repeated_hour() {
    use_new_york_time();

    let hourly = Rotation::by_time(Duration::from_secs(60 * 60));
    let first_pass = Local.with_ymd_and_hms(2024, 11, 3, 1, 10, 0).earliest().unwrap();
    let second_pass = Local.with_ymd_and_hms(2024, 11, 3, 1, 40, 0).latest().unwrap();
    assert!(second_pass - first_pass > chrono::TimeDelta::hours(1));

    let policy = RotationPolicy::new(hourly, first_pass);
    assert!(!policy.should_rotate(0, second_pass));
    assert!(policy.should_rotate(0, local(2024, 11, 3, 2, 5)));
}
