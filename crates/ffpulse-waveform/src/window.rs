//! # 脉冲窗口
//!
//! 设备表固定为 `table_len` 个采样，覆盖 `max_pulse_us` 微秒。
//! 只有窗口内（前 `active_count` 个采样）驱动输出，其余位置必须为 0。

use crate::resample::resample;
use ffpulse_protocol::{MAX_PULSE_US, TABLE_LEN};

/// 脉冲时间窗口（微秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseWindow {
    pub offset_us: f64,
    pub duration_us: f64,
}

impl PulseWindow {
    pub fn new(offset_us: f64, duration_us: f64) -> Self {
        Self {
            offset_us,
            duration_us,
        }
    }

    /// 由起止时间构造
    pub fn from_span(t_start_us: f64, t_end_us: f64) -> Self {
        Self::new(t_start_us, t_end_us - t_start_us)
    }

    pub fn end_us(&self) -> f64 {
        self.offset_us + self.duration_us
    }
}

/// 设备表的几何参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableGeometry {
    /// 表长度（采样点数）
    pub table_len: usize,
    /// 表覆盖的最大脉冲长度（微秒）
    pub max_pulse_us: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            table_len: TABLE_LEN,
            max_pulse_us: MAX_PULSE_US,
        }
    }
}

impl TableGeometry {
    /// 窗口内的采样点数：`round(duration / max_pulse * table_len)`，限制在 `[0, table_len]`
    pub fn active_count(&self, duration_us: f64) -> usize {
        if duration_us.is_nan() || duration_us <= 0.0 || self.max_pulse_us <= 0.0 {
            return 0;
        }
        let count = (duration_us / self.max_pulse_us * self.table_len as f64).round();
        (count as usize).min(self.table_len)
    }

    /// 单个采样对应的时间（微秒）
    pub fn sample_period_us(&self) -> f64 {
        self.max_pulse_us / self.table_len as f64
    }

    /// 持续时间是否超出设备上限
    pub fn exceeds_max_pulse(&self, duration_us: f64) -> bool {
        duration_us > self.max_pulse_us
    }
}

/// 将重采样后的信号放进定长表
///
/// 前 `active_count` 个位置写入 `resampled` 的前缀，其余位置保持 0。
/// 结果长度恒为 `geometry.table_len`。
pub fn apply_window(resampled: &[f64], window: &PulseWindow, geometry: &TableGeometry) -> Vec<f64> {
    let mut table = vec![0.0; geometry.table_len];
    let active = geometry.active_count(window.duration_us).min(resampled.len());
    table[..active].copy_from_slice(&resampled[..active]);
    table
}

/// 均匀时基信号的完整合成：重采样到窗口长度，再补零到表长度
pub fn synthesize(signal: &[f64], window: &PulseWindow, geometry: &TableGeometry) -> Vec<f64> {
    let active = geometry.active_count(window.duration_us);
    apply_window(&resample(signal, active), window, geometry)
}
