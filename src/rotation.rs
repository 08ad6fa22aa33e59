//! 文件切割策略
//!
//! 大小和时间两种模式都在写入每条日志之前检查一次：
//! 大小模式使用写入器统计的字节数，时间模式使用日志自身的时间，
//! 这样日志总是落在与其时间相符的文件里。
//!
//! 时间段按本地挂钟时间划分：日志所在时间段的起点晚于当前起点时才切割，
//! 夏令时切换当天（23 或 25 小时）同样只切割一次。

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::config::{Rotation, format_timestamp, format_wall_clock};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// 按大小切割时备份文件使用的时间后缀格式
const SIZE_SUFFIX_FORMAT: &str = "%Y%m%d%H%M%S";

/// 切割状态，由后台工作线程独占
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    rotation: Rotation,
    /// 当前时间段起点（本地挂钟时间），仅按时间切割时存在
    period_start: Option<NaiveDateTime>,
}

impl RotationPolicy {
    /// 以 `now` 所在的时间段起点作为锚点
    pub fn new(rotation: Rotation, now: DateTime<Local>) -> Self {
        let period_start = match rotation {
            Rotation::ByTime { interval } => Some(align_to_interval(now.naive_local(), interval)),
            _ => None,
        };
        Self { rotation, period_start }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// 时间段起点；起点落在夏令时跳过的时段内时返回 `None`
    pub fn period_start(&self) -> Option<DateTime<Local>> {
        self.period_start
            .and_then(|start| Local.from_local_datetime(&start).earliest())
    }

    /// 判断写入 `at` 时刻的日志前是否需要切割
    pub fn should_rotate(&self, current_size: u64, at: DateTime<Local>) -> bool {
        match self.rotation {
            Rotation::None => false,
            Rotation::BySize { max_size } => current_size >= max_size,
            // 早于时间段起点的日志不触发切割
            Rotation::ByTime { interval } => self
                .period_start
                .is_some_and(|start| align_to_interval(at.naive_local(), interval) > start),
        }
    }

    /// 备份文件名中的后缀
    pub fn archive_suffix(&self, now: DateTime<Local>) -> String {
        match (self.rotation, self.period_start) {
            (Rotation::ByTime { interval }, Some(start)) => {
                format_wall_clock(&start, suffix_format(interval))
            }
            _ => format_timestamp(&now, SIZE_SUFFIX_FORMAT),
        }
    }

    /// 时间切割完成后，以触发切割的日志时间重新对齐时间段起点
    pub fn advance(&mut self, at: DateTime<Local>) {
        if let Rotation::ByTime { interval } = self.rotation {
            self.period_start = Some(align_to_interval(at.naive_local(), interval));
        }
    }
}

/// 根据间隔的粒度决定后缀精度
fn suffix_format(interval: Duration) -> &'static str {
    let secs = interval.as_secs();
    if interval.subsec_nanos() != 0 {
        SIZE_SUFFIX_FORMAT
    } else if secs % SECS_PER_DAY == 0 {
        "%Y%m%d"
    } else if secs % SECS_PER_HOUR == 0 {
        "%Y%m%d%H"
    } else if secs % SECS_PER_MINUTE == 0 {
        "%Y%m%d%H%M"
    } else {
        SIZE_SUFFIX_FORMAT
    }
}

/// 在本地挂钟时间上向下对齐到间隔边界（24小时即对齐到本地零点）
fn align_to_interval(wall: NaiveDateTime, interval: Duration) -> NaiveDateTime {
    let step = interval.as_secs() as i64;
    if step == 0 {
        return wall;
    }

    let secs = wall.and_utc().timestamp();
    let aligned = secs - secs.rem_euclid(step);

    DateTime::from_timestamp(aligned, 0)
        .map(|utc| utc.naive_utc())
        .unwrap_or(wall)
}
